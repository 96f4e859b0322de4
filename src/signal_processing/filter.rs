use crate::error::Result;
use crate::signal_processing::FilterKernel;

/// Common trait for FIR filter designers
///
/// Implemented by FirFilter (windowed-sinc, causal application) and
/// FirBandpass (Blackman band-pass, centered full convolution).
pub trait Filter {
    /// Current kernel, synthesizing it first if needed
    fn kernel(&mut self) -> Result<&FilterKernel>;

    /// Filter a block of samples, returning a sequence of the same length
    fn apply(&mut self, input: &[f64]) -> Result<Vec<f64>>;

    /// Filter a buffer of samples in-place
    fn process_buffer(&mut self, buffer: &mut [f64]) -> Result<()> {
        let output = self.apply(buffer)?;
        buffer.copy_from_slice(&output);
        Ok(())
    }
}
