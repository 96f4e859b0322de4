use crate::error::{DspError, Result};
use crate::signal_processing::math::signal_power;
use rand::{Rng, RngExt};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Waveform shape produced by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    /// -1 for the first half-period, +1 for the second
    Square,
    Triangle,
    Sawtooth,
    /// Uniform noise in [-1, 1)
    RandomNoise,
    /// Average of six uniform draws, roughly Gaussian in [-1, 1)
    NormalNoise,
}

/// How added samples combine with those already in a [`Generator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    #[default]
    Add,
    Sub,
    /// Each sample is multiplied
    Mul,
    Div,
}

impl MergeMode {
    fn merge(self, a: f64, b: f64) -> f64 {
        match self {
            MergeMode::Add => a + b,
            MergeMode::Sub => a - b,
            MergeMode::Mul => a * b,
            MergeMode::Div => a / b,
        }
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random::<f64>() * 2.0 - 1.0
}

/// Waveform value at `phase` radians (noise kinds ignore the phase)
pub fn waveform<R: Rng + ?Sized>(rng: &mut R, kind: Waveform, phase: f64) -> f64 {
    let phase = phase % TAU;
    match kind {
        Waveform::Sine => phase.sin(),
        Waveform::Square => {
            if (phase / PI).floor() % 2.0 == 1.0 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => {
            if phase < PI {
                2.0 * (phase - PI / 2.0) / PI
            } else {
                1.0 - 2.0 * (phase - PI) / PI
            }
        }
        Waveform::Sawtooth => (phase - PI) / PI,
        Waveform::RandomNoise => uniform(rng),
        Waveform::NormalNoise => (0..6).map(|_| uniform(rng)).sum::<f64>() / 6.0,
    }
}

fn samples_count(duration: f64, sample_rate: f64) -> usize {
    (duration * sample_rate).round().max(0.0) as usize
}

/// Lazy tone iterator, see [`tone`]
pub struct Tone<'a, R: ?Sized> {
    rng: &'a mut R,
    kind: Waveform,
    frequency: f64,
    duration: f64,
    count: usize,
    index: usize,
}

impl<R: Rng + ?Sized> Iterator for Tone<'_, R> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.index >= self.count {
            return None;
        }
        let t = self.duration * self.index as f64 / self.count as f64;
        self.index += 1;
        Some(waveform(self.rng, self.kind, self.frequency * TAU * t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

/// `duration * sample_rate` samples of a unit-amplitude waveform
pub fn tone<R: Rng + ?Sized>(
    rng: &mut R,
    kind: Waveform,
    frequency: f64,
    duration: f64,
    sample_rate: f64,
) -> Tone<'_, R> {
    Tone {
        rng,
        kind,
        frequency,
        duration,
        count: samples_count(duration, sample_rate),
        index: 0,
    }
}

/// Uniform noise of the given amplitude
pub fn noise<R: Rng + ?Sized>(
    rng: &mut R,
    sample_rate: f64,
    amplitude: f64,
    duration: f64,
) -> Vec<f64> {
    (0..samples_count(duration, sample_rate))
        .map(|_| amplitude * uniform(rng))
        .collect()
}

/// Add white Gaussian noise at the given SNR relative to the signal power
///
/// A silent signal is left untouched.
pub fn add_awgn<R: Rng + ?Sized>(rng: &mut R, samples: &mut [f64], snr_db: f64) -> Result<()> {
    let power = signal_power(samples);
    if power == 0.0 {
        return Ok(());
    }

    let noise_power = power / 10.0_f64.powf(snr_db / 10.0);
    let normal = Normal::new(0.0, noise_power.sqrt())
        .map_err(|e| DspError::InvalidArgument(format!("noise level for {} dB: {}", snr_db, e)))?;

    for sample in samples.iter_mut() {
        *sample += normal.sample(rng);
    }
    Ok(())
}

/// Builder composing a signal from tones, noise and raw samples
///
/// Each addition is merged sample by sample into the buffer, growing it with
/// zeros when the addition ends past the current length. Offsets are in
/// seconds.
///
/// # Example
/// ```
/// use dspkit::simulation::{Generator, MergeMode, Waveform};
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let signal = Generator::new(1000.0)
///     .add_tone(&mut rng, Waveform::Sine, 50.0, 1.0, Some(1.0), 0.0, MergeMode::Add)
///     .add_noise(&mut rng, 0.1, None, 0.0, MergeMode::Add)
///     .add_offset(0.5);
/// assert_eq!(signal.samples().len(), 1000);
/// ```
#[derive(Debug, Clone)]
pub struct Generator {
    sample_rate: f64,
    samples: Vec<f64>,
}

impl Generator {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            samples: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    /// Length of the generated signal in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Shift every sample by a constant
    pub fn add_offset(mut self, amplitude: f64) -> Self {
        for sample in self.samples.iter_mut() {
            *sample += amplitude;
        }
        self
    }

    /// Merge raw samples starting `offset` seconds in
    pub fn add_samples(mut self, samples: &[f64], offset: f64, mode: MergeMode) -> Self {
        let start = samples_count(offset, self.sample_rate);
        let end = start + samples.len();
        if end > self.samples.len() {
            self.samples.resize(end, 0.0);
        }
        for (dst, &src) in self.samples[start..end].iter_mut().zip(samples) {
            *dst = mode.merge(*dst, src);
        }
        self
    }

    /// Merge a tone starting `offset` seconds in
    ///
    /// A `duration` of `None` spans the current signal.
    #[allow(clippy::too_many_arguments)]
    pub fn add_tone<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        kind: Waveform,
        frequency: f64,
        amplitude: f64,
        duration: Option<f64>,
        offset: f64,
        mode: MergeMode,
    ) -> Self {
        let duration = duration.unwrap_or_else(|| self.duration());
        let samples: Vec<f64> = tone(rng, kind, frequency, duration, self.sample_rate)
            .map(|v| amplitude * v)
            .collect();
        self.add_samples(&samples, offset, mode)
    }

    /// Merge uniform noise starting `offset` seconds in
    ///
    /// A `duration` of `None` spans the current signal.
    pub fn add_noise<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        amplitude: f64,
        duration: Option<f64>,
        offset: f64,
        mode: MergeMode,
    ) -> Self {
        let duration = duration.unwrap_or_else(|| self.duration());
        let samples = noise(rng, self.sample_rate, amplitude, duration);
        self.add_samples(&samples, offset, mode)
    }
}
