//! Elementary statistics over sample sequences

use crate::error::{DspError, Result};

/// A local extremum found by [`find_extremes`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    /// Index into the original signal
    pub index: usize,
    pub value: f64,
}

/// Arithmetic mean
pub fn mean(samples: &[f64]) -> Result<f64> {
    if samples.is_empty() {
        return Err(DspError::EmptyInput);
    }
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation (divides by N)
pub fn standard_deviation(samples: &[f64]) -> Result<f64> {
    let mean = mean(samples)?;
    let variance =
        samples.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    Ok(variance.sqrt())
}

/// Pearson correlation coefficient of two equally long sequences
///
/// Constant input has no defined correlation and yields NaN.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(DspError::SampleCountMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        covariance += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }

    Ok(covariance / (var_x * var_y).sqrt())
}

/// Sample quantile, Hyndman-Fan definition 8 (median-unbiased)
///
/// `quantile(data, 0.9)` is the value that 90% of `data` lies below.
///
/// # Errors
/// * `DspError::EmptyInput` for empty data
/// * `DspError::InvalidArgument` if `tau` is outside `[0, 1]`
pub fn quantile(data: &[f64], tau: f64) -> Result<f64> {
    if data.is_empty() {
        return Err(DspError::EmptyInput);
    }
    if !(0.0..=1.0).contains(&tau) {
        return Err(DspError::InvalidArgument(format!(
            "quantile selector must be in [0, 1], got {}",
            tau
        )));
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    let last = sorted.len() - 1;

    if tau == 0.0 || sorted.len() == 1 {
        return Ok(sorted[0]);
    }
    if tau == 1.0 {
        return Ok(sorted[last]);
    }

    let h = (sorted.len() as f64 + 1.0 / 3.0) * tau + 1.0 / 3.0;
    let hf = h.floor() as usize;
    let value = if hf < 1 {
        sorted[0]
    } else if hf > last {
        sorted[last]
    } else {
        sorted[hf - 1] + (h - hf as f64) * (sorted[hf] - sorted[hf - 1])
    };
    Ok(value)
}

/// Lazy first difference of a sample stream
///
/// Yields `x[i + 1] - x[i]`, one value fewer than the source.
pub struct Derivative<I> {
    source: I,
    prev: Option<f64>,
}

impl<I: Iterator<Item = f64>> Iterator for Derivative<I> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let prev = match self.prev {
            Some(prev) => prev,
            None => self.source.next()?,
        };
        let curr = self.source.next()?;
        self.prev = Some(curr);
        Some(curr - prev)
    }
}

pub fn derivative<I>(signal: I) -> Derivative<I::IntoIter>
where
    I: IntoIterator<Item = f64>,
{
    Derivative {
        source: signal.into_iter(),
        prev: None,
    }
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Points where the derivative changes sign
///
/// A flat step counts as its own sign, so plateaus report their edges.
pub fn find_extremes(signal: &[f64]) -> Vec<Extremum> {
    let slopes: Vec<i8> = derivative(signal.iter().copied()).map(sign).collect();

    slopes
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] != pair[1])
        .map(|(i, _)| Extremum {
            index: i + 1,
            value: signal[i + 1],
        })
        .collect()
}

/// Evaluate `f` at `count` evenly spaced points starting at `from`
///
/// The step is `(to - from) / count`, so `to` itself is not sampled.
pub fn tabulate<F>(f: F, from: f64, to: f64, count: usize) -> impl Iterator<Item = f64>
where
    F: Fn(f64) -> f64,
{
    let step = (to - from) / count as f64;
    (0..count).map(move |i| f(from + step * i as f64))
}
