//! Time-domain application of FIR kernels

/// Full linear convolution
///
/// Output length is `signal.len() + kernel.len() - 1`, including the
/// transient at both ends. Returns an empty vector if either input is empty.
pub fn convolve(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }

    let mut output = vec![0.0; signal.len() + kernel.len() - 1];
    for (i, &s) in signal.iter().enumerate() {
        for (j, &k) in kernel.iter().enumerate() {
            output[i + j] += s * k;
        }
    }
    output
}

/// Drop `kernel_len / 2` samples from each end of a full convolution
///
/// For an odd kernel this recovers a sequence aligned with, and as long as,
/// the original signal.
pub fn trim_transient(full: &[f64], kernel_len: usize) -> Vec<f64> {
    let edge = kernel_len / 2;
    if full.len() <= 2 * edge {
        return Vec::new();
    }
    full[edge..full.len() - edge].to_vec()
}

/// Causal direct-form filtering
///
/// `output[y] = Σ kernel[b] * input[y - b]` over every tap `b` with
/// `y - b > 0`. The bound is strict: `input[0]` never contributes, so
/// `output[0]` is always zero and every output lacks the contribution of the
/// first input sample. Output length equals input length.
pub fn filter_causal(input: &[f64], kernel: &[f64]) -> Vec<f64> {
    (0..input.len())
        .map(|y| {
            kernel
                .iter()
                .enumerate()
                .rev()
                .filter(|&(b, _)| y > b)
                .map(|(b, &tap)| tap * input[y - b])
                .sum::<f64>()
        })
        .collect()
}
