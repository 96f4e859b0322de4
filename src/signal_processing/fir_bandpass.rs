use crate::error::{DspError, Result};
use crate::signal_processing::convolution::{convolve, trim_transient};
use crate::signal_processing::{Filter, FilterKernel};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Blackman-windowed FIR band-pass filter
///
/// Built as the complement of a low-pass below the band plus a high-pass
/// above it. Each edge is pushed outward by half the transition bandwidth
/// `4 / order * sample_rate`, so the -6 dB points sit outside `low_hz` and
/// `high_hz`. The kernel is scaled to unity gain at the band center.
///
/// Filtering is non-causal: the full convolution is trimmed by half a kernel
/// at each end, giving zero group delay.
#[derive(Debug, Clone)]
pub struct FirBandpass {
    kernel: FilterKernel,
    transition_bandwidth: f64,
}

impl FirBandpass {
    /// Design a band-pass filter of `order + 1` taps
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `low_hz` - Lower band edge in Hz
    /// * `high_hz` - Upper band edge in Hz
    /// * `order` - Filter order; must be even so the kernel has a center tap
    ///
    /// # Errors
    /// * `DspError::EvenKernelSize` if `order + 1` is even
    /// * `DspError::InvalidArgument` for a non-positive sample rate, a zero
    ///   order or an inverted band
    /// * `DspError::DegenerateKernel` if the band center has no gain
    pub fn new(sample_rate: f64, low_hz: f64, high_hz: f64, order: usize) -> Result<Self> {
        if !order.is_multiple_of(2) {
            return Err(DspError::EvenKernelSize(order + 1));
        }
        if order == 0 {
            return Err(DspError::InvalidArgument(
                "band-pass order must be at least 2".to_string(),
            ));
        }
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(DspError::InvalidArgument(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        if low_hz >= high_hz {
            return Err(DspError::InvalidArgument(format!(
                "band edges out of order: low={} high={}",
                low_hz, high_hz
            )));
        }

        let transition_bandwidth = (4.0 / order as f64) * sample_rate;
        let upper = (high_hz + transition_bandwidth / 2.0) / sample_rate;
        let lower = (low_hz - transition_bandwidth / 2.0) / sample_rate;
        let center = order / 2;

        let window = blackman(order);

        // High-pass above the band
        let mut high: Vec<f64> = centered_sinc(order, upper)
            .iter()
            .zip(&window)
            .map(|(s, w)| -(s * w) / PI)
            .collect();
        high[center] += 1.0;

        // Low-pass below the band
        let low = centered_sinc(order, lower)
            .into_iter()
            .zip(&window)
            .map(|(s, w)| (s * w) / PI);

        let mut taps: Vec<f64> = low.zip(&high).map(|(l, h)| -(l + h)).collect();
        taps[center] += 1.0;

        let gain = gain_at(&taps, (low_hz + high_hz) / 2.0 / sample_rate);
        if gain == 0.0 || !gain.is_finite() {
            return Err(DspError::DegenerateKernel(format!(
                "band-pass gain at band center is {}",
                gain
            )));
        }
        for tap in taps.iter_mut() {
            *tap /= gain;
        }

        log::debug!(
            "Band-pass {}-{} Hz: {} taps, transition {:.1} Hz",
            low_hz,
            high_hz,
            taps.len(),
            transition_bandwidth
        );

        Ok(Self {
            kernel: FilterKernel::new(taps)?,
            transition_bandwidth,
        })
    }

    pub fn kernel(&self) -> &FilterKernel {
        &self.kernel
    }

    /// Transition bandwidth in Hz
    pub fn transition_bandwidth(&self) -> f64 {
        self.transition_bandwidth
    }

    /// Filter samples with zero delay; output length equals input length
    pub fn filter(&self, input: &[f64]) -> Vec<f64> {
        let full = convolve(input, self.kernel.taps());
        trim_transient(&full, self.kernel.len())
    }
}

impl Filter for FirBandpass {
    fn kernel(&mut self) -> Result<&FilterKernel> {
        Ok(&self.kernel)
    }

    fn apply(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        Ok(self.filter(input))
    }
}

/// Blackman window over `order + 1` points, both ends at zero
fn blackman(order: usize) -> Vec<f64> {
    let n = order as f64;
    (0..=order)
        .map(|i| {
            let i = i as f64;
            0.42 - 0.5 * (2.0 * PI * i / n).cos() + 0.08 * (4.0 * PI * i / n).cos()
        })
        .collect()
}

/// Unnormalized sinc `sin(2π·fc·k) / k` for `k` in `-order/2..=order/2`
fn centered_sinc(order: usize, cutoff: f64) -> Vec<f64> {
    let center = (order / 2) as i64;
    (0..=order as i64)
        .map(|i| {
            let k = (i - center) as f64;
            if i == center {
                2.0 * PI * cutoff
            } else {
                (2.0 * PI * cutoff * k).sin() / k
            }
        })
        .collect()
}

/// Magnitude response of `taps` at a normalized frequency (cycles/sample)
fn gain_at(taps: &[f64], frequency: f64) -> f64 {
    taps.iter()
        .enumerate()
        .map(|(i, &tap)| Complex64::from_polar(tap, -2.0 * PI * frequency * i as f64))
        .sum::<Complex64>()
        .norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal_processing::math::gain_db;
    use approx::assert_abs_diff_eq;

    const SAMPLE_RATE: f64 = 1000.0;

    fn tone(freq: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / SAMPLE_RATE).sin())
            .collect()
    }

    fn measure_gain_db(filter: &FirBandpass, freq: f64) -> f64 {
        let input = tone(freq, 4000);
        let output = filter.filter(&input);
        let edge = filter.kernel().len();
        gain_db(
            &input[edge..input.len() - edge],
            &output[edge..output.len() - edge],
        )
    }

    #[test]
    fn test_fir_bandpass_design() {
        let filter = FirBandpass::new(SAMPLE_RATE, 100.0, 200.0, 200).unwrap();
        assert_eq!(filter.kernel().len(), 201);
        assert_abs_diff_eq!(filter.transition_bandwidth(), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kernel_is_symmetric() {
        let filter = FirBandpass::new(SAMPLE_RATE, 100.0, 200.0, 100).unwrap();
        let taps = filter.kernel().taps();
        for i in 0..taps.len() / 2 {
            assert_abs_diff_eq!(taps[i], taps[taps.len() - 1 - i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_odd_order_is_rejected() {
        assert_eq!(
            FirBandpass::new(SAMPLE_RATE, 100.0, 200.0, 101).unwrap_err(),
            DspError::EvenKernelSize(102)
        );
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(matches!(
            FirBandpass::new(SAMPLE_RATE, 100.0, 200.0, 0),
            Err(DspError::InvalidArgument(_))
        ));
        assert!(matches!(
            FirBandpass::new(0.0, 100.0, 200.0, 100),
            Err(DspError::InvalidArgument(_))
        ));
        assert!(matches!(
            FirBandpass::new(SAMPLE_RATE, 200.0, 100.0, 100),
            Err(DspError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_fir_bandpass_passes_center_frequency() {
        let filter = FirBandpass::new(SAMPLE_RATE, 100.0, 200.0, 200).unwrap();
        let gain = measure_gain_db(&filter, 150.0);
        assert!(gain.abs() < 0.5, "Center frequency gain off: {} dB", gain);
    }

    #[test]
    fn test_fir_bandpass_attenuates_out_of_band() {
        let filter = FirBandpass::new(SAMPLE_RATE, 100.0, 200.0, 200).unwrap();
        for freq in [20.0, 400.0] {
            let gain = measure_gain_db(&filter, freq);
            assert!(gain < -40.0, "{} Hz not attenuated enough: {} dB", freq, gain);
        }
    }

    #[test]
    fn test_filter_has_no_delay() {
        let filter = FirBandpass::new(SAMPLE_RATE, 100.0, 200.0, 200).unwrap();
        let input = tone(150.0, 2000);
        let output = filter.filter(&input);
        assert_eq!(output.len(), input.len());

        // Zero-phase in the passband: output tracks input sample for sample
        for i in 400..1600 {
            assert_abs_diff_eq!(output[i], input[i], epsilon = 0.05);
        }
    }

    #[test]
    fn test_filter_trait() {
        let mut filter = FirBandpass::new(SAMPLE_RATE, 100.0, 200.0, 64).unwrap();
        let input = tone(150.0, 300);
        let expected = filter.filter(&input);
        assert_eq!(Filter::apply(&mut filter, &input).unwrap(), expected);
        assert_eq!(Filter::kernel(&mut filter).unwrap().len(), 65);
    }
}
