use crate::error::{DspError, Result};

/// Scale taps so they sum to 1 (unity DC gain)
///
/// # Errors
/// Returns `DspError::DegenerateKernel` if the sum is zero or not finite.
pub fn normalize_by_sum(taps: &mut [f64]) -> Result<()> {
    let sum: f64 = taps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return Err(DspError::DegenerateKernel(format!(
            "tap sum is {} over {} taps",
            sum,
            taps.len()
        )));
    }

    for tap in taps.iter_mut() {
        *tap /= sum;
    }
    Ok(())
}

/// Turn a response into its complement: negate every tap, add 1 at the center
pub fn spectral_inversion(taps: &mut [f64]) {
    for tap in taps.iter_mut() {
        *tap = -*tap;
    }
    let center = taps.len() / 2;
    if let Some(tap) = taps.get_mut(center) {
        *tap += 1.0;
    }
}

/// Replace NaN values with `replacement`
pub fn replace_nan(values: &mut [f64], replacement: f64) {
    for value in values.iter_mut().filter(|v| v.is_nan()) {
        *value = replacement;
    }
}

/// Mean power of a signal
pub fn signal_power(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|&x| x * x).sum::<f64>() / signal.len() as f64
}

/// Gain in dB between two signals, measured on RMS
pub fn gain_db(input: &[f64], output: &[f64]) -> f64 {
    10.0 * (signal_power(output) / signal_power(input)).log10()
}
