//! In-place radix-2 FFT
//!
//! Fixed-size Cooley-Tukey transform over a complex working buffer. The
//! output follows the one-sided amplitude convention: every bin is scaled by
//! 2/N and the DC bin is halved once more, so a unit-amplitude sinusoid reads
//! as magnitude 1.0 at its bin.

use crate::error::{DspError, Result};
use crate::signal_processing::ComplexSample;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Fixed-length FFT engine with a precomputed twiddle table
pub struct FftEngine {
    size: usize,
    buffer: Vec<ComplexSample>,
    twiddles: Vec<ComplexSample>,
}

impl FftEngine {
    /// Create an engine for transforms of `size` points
    ///
    /// # Errors
    /// Returns `DspError::NotPowerOfTwo` unless `size` is a power of two.
    pub fn new(size: usize) -> Result<Self> {
        if !size.is_power_of_two() {
            return Err(DspError::NotPowerOfTwo(size));
        }

        let twiddles = (0..size / 2)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / size as f64;
                ComplexSample::new(angle.cos(), angle.sin())
            })
            .collect();

        Ok(Self {
            size,
            buffer: vec![ComplexSample::ZERO; size],
            twiddles,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Load real samples into the working buffer (imaginary parts zero)
    pub fn set_samples(&mut self, samples: &[f64]) -> Result<()> {
        self.check_len(samples.len())?;
        for (slot, &s) in self.buffer.iter_mut().zip(samples) {
            *slot = ComplexSample::from_real(s);
        }
        Ok(())
    }

    /// Load complex samples into the working buffer
    ///
    /// The twiddles rotate by `e^{+j2πi/N}`, so bin `k` collects the
    /// component `e^{-j2πkn/N}`. A complex tone `e^{+j2πkn/N}` lands in bin
    /// `N - k` and is absent from the one-sided [`spectrum`](Self::spectrum).
    /// Real input is unaffected apart from the sign of the phase.
    pub fn set_complex_samples(&mut self, samples: &[Complex64]) -> Result<()> {
        self.check_len(samples.len())?;
        for (slot, &s) in self.buffer.iter_mut().zip(samples) {
            *slot = s.into();
        }
        Ok(())
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        if actual != self.size {
            return Err(DspError::SampleCountMismatch {
                expected: self.size,
                actual,
            });
        }
        Ok(())
    }

    /// Transform the working buffer in place
    pub fn compute_transform(&mut self) {
        log::trace!("Computing {}-point FFT", self.size);

        self.bit_reverse();
        self.butterflies();

        let scale = 2.0 / self.size as f64;
        for value in self.buffer.iter_mut() {
            *value = value.scale(scale);
        }
        self.buffer[0] = self.buffer[0].scale(0.5);
    }

    /// One-sided spectrum: the first N/2 bins of the transformed buffer
    pub fn spectrum(&self) -> Vec<ComplexSample> {
        self.buffer[..self.size / 2].to_vec()
    }

    fn bit_reverse(&mut self) {
        let n = self.size;
        for i in 1..n {
            let mut k = i;
            let mut mv = n / 2;
            let mut rev = 0;
            while k > 0 {
                if k % 2 == 1 {
                    rev += mv;
                }
                k /= 2;
                mv /= 2;
            }

            if i < rev {
                self.buffer.swap(i, rev);
            }
        }
    }

    fn butterflies(&mut self) {
        let n = self.size;
        let mut k = 1;
        while k <= n / 2 {
            let mut m = 0;
            while m <= n - 2 * k {
                for i in m..m + k {
                    // Stage angle π(i - m)/k, read from the 2π/N table
                    let w = self.twiddles[(i - m) * n / k / 2];
                    let h = self.buffer[i + k] * w;
                    let v = self.buffer[i];
                    self.buffer[i] = v + h;
                    self.buffer[i + k] = v - h;
                }
                m += 2 * k;
            }
            k *= 2;
        }
    }
}

/// A (frequency, value) pair of a spectrum series
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SpectrumPoint {
    pub frequency: f64,
    pub value: f64,
}

/// Result of a forward transform
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub raw: Vec<ComplexSample>,
    pub magnitude: Vec<SpectrumPoint>,
    /// Phase in degrees
    pub phase: Vec<SpectrumPoint>,
}

impl Spectrum {
    fn from_bins(raw: Vec<ComplexSample>, sample_rate: f64) -> Self {
        let step = (sample_rate / 2.0) / raw.len() as f64;

        let magnitude = raw
            .iter()
            .enumerate()
            .map(|(i, c)| SpectrumPoint {
                frequency: step * i as f64,
                value: c.magnitude(),
            })
            .collect();
        let phase = raw
            .iter()
            .enumerate()
            .map(|(i, c)| SpectrumPoint {
                frequency: step * i as f64,
                value: c.phase_degrees(),
            })
            .collect();

        Self {
            raw,
            magnitude,
            phase,
        }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Bin with the largest magnitude
    pub fn peak(&self) -> Option<SpectrumPoint> {
        self.magnitude
            .iter()
            .copied()
            .max_by(|a, b| a.value.total_cmp(&b.value))
    }

    /// The `count` largest-magnitude bins, strongest first
    pub fn strongest(&self, count: usize) -> Vec<SpectrumPoint> {
        let mut points = self.magnitude.clone();
        points.sort_by(|a, b| b.value.total_cmp(&a.value));
        points.truncate(count);
        points
    }
}

/// Transform real samples; the length must be a power of two
pub fn forward(samples: &[f64], sample_rate: f64) -> Result<Spectrum> {
    let mut engine = FftEngine::new(samples.len())?;
    engine.set_samples(samples)?;
    engine.compute_transform();
    Ok(Spectrum::from_bins(engine.spectrum(), sample_rate))
}

/// Transform complex samples; the length must be a power of two
///
/// Only the first N/2 bins are kept, and they hold the `e^{-j2πkn/N}`
/// components (see [`FftEngine::set_complex_samples`]). A tone of unit
/// magnitude reads 2.0 at its bin, since the one-sided scaling of 2/N
/// assumes a mirrored negative-frequency half.
pub fn forward_complex(samples: &[Complex64], sample_rate: f64) -> Result<Spectrum> {
    let mut engine = FftEngine::new(samples.len())?;
    engine.set_complex_samples(samples)?;
    engine.compute_transform();
    Ok(Spectrum::from_bins(engine.spectrum(), sample_rate))
}

/// Zero-pad to the next power of two
///
/// Returns the padded signal and the number of zeros appended.
pub fn pad_to_power_of_two(samples: &[f64]) -> (Vec<f64>, usize) {
    let target = samples.len().next_power_of_two();
    let mut padded = Vec::with_capacity(target);
    padded.extend_from_slice(samples);
    padded.resize(target, 0.0);
    (padded, target - samples.len())
}
