//! Windowed-sinc FIR designer
//!
//! A low-pass kernel is synthesized from a sampled sinc, tapered by a window
//! and normalized to unity DC gain. High-pass, band-stop and band-pass
//! kernels are derived from low-pass kernels by spectral inversion and
//! summation, which requires an odd tap count.
//!
//! The kernel is cached. Any parameter change marks it stale and the next
//! call to [`FirFilter::ensure_kernel`] (or any method that applies the
//! filter) regenerates it in full.

use crate::constants::{CUTOFF_FIT_FACTOR, REFERENCE_CORE_SIZE, REFERENCE_SAMPLE_RATE};
use crate::error::{DspError, Result};
use crate::signal_processing::convolution::filter_causal;
use crate::signal_processing::math::{normalize_by_sum, replace_nan, spectral_inversion};
use crate::signal_processing::window::{WindowKind, apply_window};
use crate::signal_processing::{Filter, FilterKernel};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Frequency response shape
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum PassingType {
    #[default]
    LowPass,
    HighPass,
    BandStop,
    BandPass,
}

impl fmt::Display for PassingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PassingType::LowPass => "low_pass",
            PassingType::HighPass => "high_pass",
            PassingType::BandStop => "band_stop",
            PassingType::BandPass => "band_pass",
        };
        f.write_str(name)
    }
}

impl FromStr for PassingType {
    type Err = DspError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "low_pass" | "lowpass" => Ok(PassingType::LowPass),
            "high_pass" | "highpass" => Ok(PassingType::HighPass),
            "band_stop" | "bandstop" => Ok(PassingType::BandStop),
            "band_pass" | "bandpass" => Ok(PassingType::BandPass),
            _ => Err(DspError::UnsupportedParameter(format!(
                "passing type \"{}\"",
                s
            ))),
        }
    }
}

/// Windowed-sinc filter parameters
///
/// `cutoff_hz` drives low-pass and high-pass designs; `low_cutoff_hz` and
/// `high_cutoff_hz` drive band-stop and band-pass designs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParameters {
    /// Number of taps (must be odd)
    pub core_size: usize,
    /// Window used to taper the sinc
    pub window: WindowKind,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Response shape
    pub passing_type: PassingType,
    /// Cutoff for low-pass and high-pass designs, in Hz
    pub cutoff_hz: f64,
    /// Lower band edge for band designs, in Hz
    pub low_cutoff_hz: f64,
    /// Upper band edge for band designs, in Hz
    pub high_cutoff_hz: f64,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            core_size: 253,
            window: WindowKind::Hamming,
            sample_rate: 1000.0,
            passing_type: PassingType::LowPass,
            cutoff_hz: 50.0,
            low_cutoff_hz: 40.0,
            high_cutoff_hz: 60.0,
        }
    }
}

impl FilterParameters {
    pub fn low_pass(core_size: usize, sample_rate: f64, cutoff_hz: f64) -> Self {
        Self {
            core_size,
            sample_rate,
            passing_type: PassingType::LowPass,
            cutoff_hz,
            ..Default::default()
        }
    }

    pub fn high_pass(core_size: usize, sample_rate: f64, cutoff_hz: f64) -> Self {
        Self {
            passing_type: PassingType::HighPass,
            ..Self::low_pass(core_size, sample_rate, cutoff_hz)
        }
    }

    pub fn band_stop(core_size: usize, sample_rate: f64, low_hz: f64, high_hz: f64) -> Self {
        Self {
            core_size,
            sample_rate,
            passing_type: PassingType::BandStop,
            low_cutoff_hz: low_hz,
            high_cutoff_hz: high_hz,
            ..Default::default()
        }
    }

    pub fn band_pass(core_size: usize, sample_rate: f64, low_hz: f64, high_hz: f64) -> Self {
        Self {
            passing_type: PassingType::BandPass,
            ..Self::band_stop(core_size, sample_rate, low_hz, high_hz)
        }
    }

    pub fn with_window(mut self, window: WindowKind) -> Self {
        self.window = window;
        self
    }

    /// Factor converting cutoffs in Hz to the sinc's phase coefficient
    ///
    /// Rescales the fitted 253-tap / 10 Hz reference design to this size and
    /// rate. Kept exact so kernels stay reproducible.
    pub fn cutoff_scale(&self) -> f64 {
        (self.core_size as f64 / REFERENCE_CORE_SIZE)
            * (REFERENCE_SAMPLE_RATE / self.sample_rate)
            * CUTOFF_FIT_FACTOR
    }
}

/// Windowed-sinc kernel synthesis result
struct Synthesis {
    kernel: FilterKernel,
    energy_loss: f64,
}

/// Synthesize a kernel from parameters
///
/// # Errors
/// * `DspError::EvenKernelSize` if `core_size` is even
/// * `DspError::InvalidArgument` if the sample rate is not positive
/// * `DspError::DegenerateKernel` if a tap sum is zero during normalization
fn synthesize(params: &FilterParameters) -> Result<Synthesis> {
    if params.core_size.is_multiple_of(2) {
        return Err(DspError::EvenKernelSize(params.core_size));
    }
    if !(params.sample_rate > 0.0 && params.sample_rate.is_finite()) {
        return Err(DspError::InvalidArgument(format!(
            "sample rate must be positive, got {}",
            params.sample_rate
        )));
    }

    let scale = params.cutoff_scale();
    let size = params.core_size;
    let window = params.window;

    let (taps, energy_loss) = match params.passing_type {
        PassingType::LowPass => low_pass_core(size, window, scale * params.cutoff_hz)?,
        PassingType::HighPass => high_pass_core(size, window, scale * params.cutoff_hz)?,
        PassingType::BandStop => band_stop_core(
            size,
            window,
            scale * params.low_cutoff_hz,
            scale * params.high_cutoff_hz,
        )?,
        PassingType::BandPass => band_pass_core(
            size,
            window,
            scale * params.low_cutoff_hz,
            scale * params.high_cutoff_hz,
        )?,
    };

    Ok(Synthesis {
        kernel: FilterKernel::new(taps)?,
        energy_loss,
    })
}

/// Symmetric sampled sinc of `size` taps
///
/// Sample `i` of the right half sits at phase `i / size`; the phase-zero
/// term takes the analytic limit. NaN taps (degenerate cutoffs) become 1.
fn sinc_core(size: usize, cutoff: f64) -> Vec<f64> {
    let coef = 2.0 * PI * cutoff;
    let half: Vec<f64> = (0..=size / 2)
        .map(|i| {
            let phase = i as f64 / size as f64;
            if phase == 0.0 {
                coef
            } else {
                (coef * phase).sin() / phase
            }
        })
        .collect();

    let mut taps: Vec<f64> = half.iter().skip(1).rev().copied().collect();
    taps.extend_from_slice(&half);
    replace_nan(&mut taps, 1.0);
    taps
}

fn low_pass_core(size: usize, window: WindowKind, cutoff: f64) -> Result<(Vec<f64>, f64)> {
    let mut taps = sinc_core(size, cutoff);
    let energy_loss = apply_window(&mut taps, window);
    log::trace!("{} window energy loss: {:.4}", window, energy_loss);
    normalize_by_sum(&mut taps)?;
    Ok((taps, energy_loss))
}

fn high_pass_core(size: usize, window: WindowKind, cutoff: f64) -> Result<(Vec<f64>, f64)> {
    let (mut taps, energy_loss) = low_pass_core(size, window, cutoff)?;
    spectral_inversion(&mut taps);
    Ok((taps, energy_loss))
}

fn band_stop_core(
    size: usize,
    window: WindowKind,
    low: f64,
    high: f64,
) -> Result<(Vec<f64>, f64)> {
    let (mut taps, _) = low_pass_core(size, window, low)?;
    let (high_taps, energy_loss) = high_pass_core(size, window, high)?;
    for (tap, h) in taps.iter_mut().zip(high_taps) {
        *tap += h;
    }
    normalize_by_sum(&mut taps)?;
    Ok((taps, energy_loss))
}

fn band_pass_core(
    size: usize,
    window: WindowKind,
    low: f64,
    high: f64,
) -> Result<(Vec<f64>, f64)> {
    let (mut taps, energy_loss) = band_stop_core(size, window, low, high)?;
    normalize_by_sum(&mut taps)?;
    spectral_inversion(&mut taps);
    Ok((taps, energy_loss))
}

/// Kernel cache state
#[derive(Debug, Clone, Default)]
enum KernelState {
    /// Parameters changed since the last synthesis (or never synthesized)
    #[default]
    Stale,
    Fresh(FilterKernel),
}

/// Windowed-sinc FIR filter with a lazily regenerated kernel
#[derive(Debug, Clone, Default)]
pub struct FirFilter {
    params: FilterParameters,
    state: KernelState,
    energy_loss: Option<f64>,
}

impl FirFilter {
    pub fn new(params: FilterParameters) -> Self {
        Self {
            params,
            state: KernelState::Stale,
            energy_loss: None,
        }
    }

    pub fn from_config(params: &FilterParameters) -> Self {
        Self::new(params.clone())
    }

    pub fn parameters(&self) -> &FilterParameters {
        &self.params
    }

    /// True if the next use will regenerate the kernel
    pub fn is_stale(&self) -> bool {
        matches!(self.state, KernelState::Stale)
    }

    /// The cached kernel, without regenerating
    pub fn cached_kernel(&self) -> Option<&FilterKernel> {
        match &self.state {
            KernelState::Fresh(kernel) => Some(kernel),
            KernelState::Stale => None,
        }
    }

    /// Window energy-loss ratio (`N / Σw`) of the last synthesis
    pub fn energy_loss(&self) -> Option<f64> {
        self.energy_loss
    }

    fn invalidate(&mut self) {
        self.state = KernelState::Stale;
    }

    pub fn set_parameters(&mut self, params: FilterParameters) {
        self.params = params;
        self.invalidate();
    }

    pub fn set_core_size(&mut self, core_size: usize) {
        self.params.core_size = core_size;
        self.invalidate();
    }

    pub fn set_window(&mut self, window: WindowKind) {
        self.params.window = window;
        self.invalidate();
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.params.sample_rate = sample_rate;
        self.invalidate();
    }

    pub fn set_passing_type(&mut self, passing_type: PassingType) {
        self.params.passing_type = passing_type;
        self.invalidate();
    }

    pub fn set_cutoff_hz(&mut self, cutoff_hz: f64) {
        self.params.cutoff_hz = cutoff_hz;
        self.invalidate();
    }

    pub fn set_low_cutoff_hz(&mut self, low_cutoff_hz: f64) {
        self.params.low_cutoff_hz = low_cutoff_hz;
        self.invalidate();
    }

    pub fn set_high_cutoff_hz(&mut self, high_cutoff_hz: f64) {
        self.params.high_cutoff_hz = high_cutoff_hz;
        self.invalidate();
    }

    /// Regenerate the kernel if stale and return it
    ///
    /// A failed synthesis leaves the filter stale.
    pub fn ensure_kernel(&mut self) -> Result<&FilterKernel> {
        loop {
            match self.state {
                KernelState::Fresh(ref kernel) => return Ok(kernel),
                KernelState::Stale => {
                    log::debug!(
                        "Synthesizing {} kernel: {} taps, {} window, {} Hz",
                        self.params.passing_type,
                        self.params.core_size,
                        self.params.window,
                        self.params.sample_rate
                    );
                    let synthesis = synthesize(&self.params)?;
                    self.energy_loss = Some(synthesis.energy_loss);
                    self.state = KernelState::Fresh(synthesis.kernel);
                }
            }
        }
    }

    /// Filter samples causally with the current kernel
    ///
    /// Output has the same length as the input; see
    /// [`filter_causal`](crate::signal_processing::convolution::filter_causal)
    /// for the start-up boundary.
    pub fn handle(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        let kernel = self.ensure_kernel()?;
        Ok(filter_causal(input, kernel.taps()))
    }

    /// Number of leading output samples affected by the start-up transient
    pub fn distorted_samples_count(&mut self) -> Result<usize> {
        self.ensure_kernel()?;
        Ok(self.params.core_size)
    }

    /// Drop the cached kernel
    pub fn reset(&mut self) {
        self.invalidate();
    }
}

impl Filter for FirFilter {
    fn kernel(&mut self) -> Result<&FilterKernel> {
        self.ensure_kernel()
    }

    fn apply(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.handle(input)
    }
}
