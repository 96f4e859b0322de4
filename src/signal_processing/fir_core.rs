use crate::error::{DspError, Result};

/// Symmetric FIR tap kernel shared by every designer
///
/// The tap count is always odd so the center tap exists; the spectral
/// inversion used to derive high-pass and band-pass responses adds to it.
/// A kernel is only ever replaced as a whole, never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterKernel {
    taps: Vec<f64>,
}

impl FilterKernel {
    /// Wrap synthesized taps
    ///
    /// # Errors
    /// Returns `DspError::EvenKernelSize` for an even (or zero) tap count.
    pub fn new(taps: Vec<f64>) -> Result<Self> {
        if taps.len().is_multiple_of(2) {
            return Err(DspError::EvenKernelSize(taps.len()));
        }
        Ok(Self { taps })
    }

    /// Get access to the tap coefficients
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    pub fn into_taps(self) -> Vec<f64> {
        self.taps
    }

    /// Get the number of taps (filter length)
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Index of the center tap
    pub fn center(&self) -> usize {
        self.taps.len() / 2
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        (self.taps.len() - 1) / 2
    }

    /// Sum of all taps, i.e. the DC gain
    pub fn dc_gain(&self) -> f64 {
        self.taps.iter().sum()
    }
}
