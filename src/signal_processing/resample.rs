//! Rational-ratio upsampling by linear interpolation
//!
//! The rate ratio is approximated as `p/q`. `p - 1` points are interpolated
//! between neighbouring samples (and extrapolated after the last one with
//! the final slope), then every `q`-th value is kept. For N input samples
//! the output holds about `N * p / q` values.

use crate::constants::RATIO_ACCURACY;
use crate::error::{DspError, Result};
use std::iter::StepBy;

/// Closest simple fraction to `value` within `accuracy` (Stern-Brocot search)
///
/// Returns `(numerator, denominator)`. `value` must be non-negative and
/// finite; `accuracy` must be positive.
pub fn real_to_fraction(value: f64, accuracy: f64) -> Result<(u64, u64)> {
    if !(value >= 0.0 && value.is_finite()) {
        return Err(DspError::InvalidArgument(format!(
            "cannot approximate {} as a fraction",
            value
        )));
    }
    if !(accuracy > 0.0 && accuracy < 1.0) {
        return Err(DspError::InvalidArgument(format!(
            "fraction accuracy must be in (0, 1), got {}",
            accuracy
        )));
    }

    let whole = value.floor();
    let frac = value - whole;
    let whole = whole as u64;

    if frac < accuracy {
        return Ok((whole, 1));
    }
    if 1.0 - accuracy < frac {
        return Ok((whole + 1, 1));
    }

    let (mut lower_n, mut lower_d) = (0u64, 1u64);
    let (mut upper_n, mut upper_d) = (1u64, 1u64);
    loop {
        let middle_n = lower_n + upper_n;
        let middle_d = lower_d + upper_d;

        if middle_d as f64 * (frac + accuracy) < middle_n as f64 {
            upper_n = middle_n;
            upper_d = middle_d;
        } else if (middle_n as f64) < (frac - accuracy) * middle_d as f64 {
            lower_n = middle_n;
            lower_d = middle_d;
        } else {
            return Ok((whole * middle_d + middle_n, middle_d));
        }
    }
}

/// Lazy linear interpolator inserting a fixed number of points per gap
///
/// Each gap between neighbouring samples is a segment of `inserted + 1`
/// values computed on demand from its start and slope, so memory does not
/// depend on `inserted`. After the last sample one more segment is
/// extrapolated with the final slope.
pub struct Interpolator<I> {
    source: I,
    inserted: usize,
    /// First value of the current segment
    start: Option<f64>,
    /// Sample that opens the next segment
    upcoming: Option<f64>,
    slope: f64,
    /// Offset of the next value within the current segment
    position: usize,
    started: bool,
}

impl<I: Iterator<Item = f64>> Interpolator<I> {
    pub fn new(source: I, inserted: usize) -> Self {
        Self {
            source,
            inserted,
            start: None,
            upcoming: None,
            slope: 0.0,
            position: 0,
            started: false,
        }
    }

    fn segment_len(&self) -> usize {
        self.inserted.saturating_add(1)
    }

    fn open_segment(&mut self, start: f64) {
        // At the end of the source the previous slope is kept
        self.upcoming = self.source.next();
        if let Some(end) = self.upcoming {
            self.slope = (end - start) / self.segment_len() as f64;
        }
        self.start = Some(start);
        self.position = 0;
    }

    /// Start of a segment with values left, opening the next one if needed
    fn current_segment(&mut self) -> Option<f64> {
        loop {
            match self.start {
                Some(start) if self.position < self.segment_len() => return Some(start),
                Some(_) => match self.upcoming.take() {
                    Some(next) => self.open_segment(next),
                    None => {
                        self.start = None;
                        return None;
                    }
                },
                None => {
                    if self.started {
                        return None;
                    }
                    self.started = true;
                    let first = self.source.next()?;
                    self.open_segment(first);
                }
            }
        }
    }
}

impl<I: Iterator<Item = f64>> Iterator for Interpolator<I> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let start = self.current_segment()?;
        let value = start + self.slope * self.position as f64;
        self.position += 1;
        Some(value)
    }

    /// Skips within a segment without computing the skipped values
    fn nth(&mut self, mut n: usize) -> Option<f64> {
        loop {
            self.current_segment()?;
            let remaining = self.segment_len() - self.position;
            if n < remaining {
                self.position += n;
                return self.next();
            }
            n -= remaining;
            self.position = self.segment_len();
        }
    }
}

/// Upsampled stream returned by [`upsample`]
pub struct Upsample<I> {
    inner: StepBy<Interpolator<I>>,
}

impl<I: Iterator<Item = f64>> Iterator for Upsample<I> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.inner.next()
    }
}

/// Upsample a signal from `actual_rate` to `desired_rate`
///
/// # Errors
/// Returns `DspError::InvalidArgument` if either rate is not positive or if
/// `desired_rate < actual_rate`.
pub fn upsample<I>(
    signal: I,
    actual_rate: f64,
    desired_rate: f64,
) -> Result<Upsample<I::IntoIter>>
where
    I: IntoIterator<Item = f64>,
{
    if !(actual_rate > 0.0 && desired_rate > 0.0) {
        return Err(DspError::InvalidArgument(format!(
            "sample rates must be positive: actual={} desired={}",
            actual_rate, desired_rate
        )));
    }
    let ratio = desired_rate / actual_rate;
    if ratio < 1.0 {
        return Err(DspError::InvalidArgument(format!(
            "desired rate {} is below actual rate {}",
            desired_rate, actual_rate
        )));
    }

    let (numerator, denominator) = real_to_fraction(ratio, RATIO_ACCURACY)?;
    log::debug!(
        "Upsampling {} -> {} Hz as {}/{}",
        actual_rate,
        desired_rate,
        numerator,
        denominator
    );

    let interpolator = Interpolator::new(signal.into_iter(), (numerator - 1) as usize);
    Ok(Upsample {
        inner: interpolator.step_by(denominator as usize),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_real_to_fraction() {
        assert_eq!(real_to_fraction(1.25, 1e-5).unwrap(), (5, 4));
        assert_eq!(real_to_fraction(2.0, 1e-5).unwrap(), (2, 1));
        assert_eq!(real_to_fraction(1.0, 1e-5).unwrap(), (1, 1));
        assert_eq!(real_to_fraction(4.0 / 3.0, 1e-5).unwrap(), (4, 3));
        assert_eq!(real_to_fraction(48000.0 / 44100.0, 1e-5).unwrap(), (160, 147));
        assert_eq!(
            real_to_fraction(std::f64::consts::PI, 1e-5).unwrap(),
            (355, 113)
        );
    }

    #[test]
    fn test_real_to_fraction_rejects_bad_input() {
        assert!(real_to_fraction(-1.0, 1e-5).is_err());
        assert!(real_to_fraction(f64::NAN, 1e-5).is_err());
        assert!(real_to_fraction(1.5, 0.0).is_err());
    }

    #[test]
    fn test_interpolator() {
        let out: Vec<f64> = Interpolator::new(vec![0.0, 3.0, 0.0].into_iter(), 2).collect();
        assert_eq!(out, vec![0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0, -1.0, -2.0]);
    }

    #[test]
    fn test_interpolator_short_inputs() {
        assert_eq!(Interpolator::new(Vec::<f64>::new().into_iter(), 3).count(), 0);

        let single: Vec<f64> = Interpolator::new(vec![7.0].into_iter(), 2).collect();
        assert_eq!(single, vec![7.0, 7.0, 7.0]);

        let pair: Vec<f64> = Interpolator::new(vec![0.0, 1.0].into_iter(), 1).collect();
        assert_eq!(pair, vec![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_interpolator_nth_matches_next() {
        let source = vec![0.0, 4.0, 2.0, -2.0];
        let all: Vec<f64> = Interpolator::new(source.clone().into_iter(), 3).collect();
        for n in 0..all.len() {
            let mut it = Interpolator::new(source.clone().into_iter(), 3);
            assert_eq!(it.nth(n), Some(all[n]));
            assert_eq!(it.next(), all.get(n + 1).copied());
        }
        assert_eq!(Interpolator::new(source.into_iter(), 3).nth(all.len()), None);
    }

    #[test]
    fn test_interpolator_huge_gap_is_lazy() {
        let mut it = Interpolator::new(vec![0.0, 1.0].into_iter(), 999_999_999);
        assert_eq!(it.next(), Some(0.0));
        assert_abs_diff_eq!(it.nth(499_999_999).unwrap(), 0.5, epsilon = 1e-12);
        // Second segment starts at the last sample
        assert_eq!(it.nth(499_999_999), Some(1.0));
    }

    #[test]
    fn test_upsample_extreme_ratio() {
        let out: Vec<f64> = upsample(vec![1.0, 2.0], 1.0, 1e15).unwrap().take(3).collect();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], 1.0);
        assert_abs_diff_eq!(out[2], 1.0 + 2e-15, epsilon = 1e-15);

        // A large denominator skips through segments without computing them
        let thinned: Vec<f64> = upsample(vec![0.0, 10.0, 20.0], 1000.0, 1000.5)
            .unwrap()
            .collect();
        // 1000.5 / 1000 is approximated as 1962 / 1961
        assert_eq!(thinned.len(), 4);
        assert_eq!(thinned[0], 0.0);
        assert!(thinned.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_upsample_lengths() {
        assert_eq!(upsample(vec![0.0; 100], 50.0, 100.0).unwrap().count(), 200);
        assert_eq!(upsample(vec![0.0; 100], 80.0, 100.0).unwrap().count(), 125);
        assert_eq!(upsample(vec![0.0; 100], 100.0, 100.0).unwrap().count(), 100);
    }

    #[test]
    fn test_upsample_reconstructs_ramp() {
        let ramp: Vec<f64> = (0..50).map(|i| (2 * i) as f64).collect();
        let out: Vec<f64> = upsample(ramp, 50.0, 100.0).unwrap().collect();
        assert_eq!(out.len(), 100);
        for (i, value) in out.iter().enumerate() {
            assert_abs_diff_eq!(*value, i as f64, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_upsample_rejects_downsampling() {
        assert!(matches!(
            upsample(vec![1.0, 2.0], 100.0, 50.0),
            Err(DspError::InvalidArgument(_))
        ));
        assert!(upsample(vec![1.0], 0.0, 50.0).is_err());
    }
}
