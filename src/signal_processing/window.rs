//! Window coefficient functions
//!
//! Every window is a closed-form cosine series evaluated at a phase in
//! [0, 2π). Applying a window to N samples evaluates sample `i` at phase
//! `2π·i/N` (periodic form), which is what the FIR designer relies on.

use crate::error::DspError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Window shape used to taper a sinc kernel or a block of samples
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// No tapering
    Rectangular,
    #[default]
    Hamming,
    Blackman,
    /// Five-term flat-top (amplitude-accurate, wide main lobe)
    FlatTop,
    Hann,
}

impl WindowKind {
    pub const ALL: [WindowKind; 5] = [
        WindowKind::Rectangular,
        WindowKind::Hamming,
        WindowKind::Blackman,
        WindowKind::FlatTop,
        WindowKind::Hann,
    ];
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowKind::Rectangular => "rectangular",
            WindowKind::Hamming => "hamming",
            WindowKind::Blackman => "blackman",
            WindowKind::FlatTop => "flat_top",
            WindowKind::Hann => "hann",
        };
        f.write_str(name)
    }
}

impl FromStr for WindowKind {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "rectangular" | "none" => Ok(WindowKind::Rectangular),
            "hamming" => Ok(WindowKind::Hamming),
            "blackman" => Ok(WindowKind::Blackman),
            "flat_top" | "flattop" => Ok(WindowKind::FlatTop),
            "hann" | "hanning" => Ok(WindowKind::Hann),
            _ => Err(DspError::UnsupportedParameter(format!(
                "window kind \"{}\"",
                s
            ))),
        }
    }
}

/// Window coefficient at the given phase (radians)
pub fn window(phase: f64, kind: WindowKind) -> f64 {
    match kind {
        WindowKind::Rectangular => 1.0,
        WindowKind::Hamming => 0.54 - 0.46 * phase.cos(),
        WindowKind::Blackman => 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos(),
        WindowKind::FlatTop => {
            1.0 - 1.93 * phase.cos() + 1.29 * (2.0 * phase).cos() - 0.388 * (3.0 * phase).cos()
                + 0.028 * (4.0 * phase).cos()
        }
        WindowKind::Hann => 0.5 - 0.5 * phase.cos(),
    }
}

/// Phase of sample `index` in a periodic window of `count` points
fn sample_phase(index: usize, count: usize) -> f64 {
    (index as f64 / count as f64) * 2.0 * PI
}

/// Generate `count` window coefficients
pub fn window_points(kind: WindowKind, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| window(sample_phase(i, count), kind))
        .collect()
}

/// Multiply samples by the window in-place
///
/// Returns the energy-loss ratio `N / Σw`, i.e. the factor that restores the
/// amplitude of a windowed constant signal. An empty slice loses nothing.
pub fn apply_window(samples: &mut [f64], kind: WindowKind) -> f64 {
    let count = samples.len();
    if count == 0 {
        return 1.0;
    }

    let mut weight_sum = 0.0;
    for (i, sample) in samples.iter_mut().enumerate() {
        let w = window(sample_phase(i, count), kind);
        *sample *= w;
        weight_sum += w;
    }

    count as f64 / weight_sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_window_endpoints() {
        assert_abs_diff_eq!(window(0.0, WindowKind::Hamming), 0.08, epsilon = 1e-12);
        assert_abs_diff_eq!(window(PI, WindowKind::Hamming), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(window(0.0, WindowKind::Hann), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(window(PI, WindowKind::Hann), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(window(0.0, WindowKind::Blackman), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(window(PI, WindowKind::Blackman), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(window(0.0, WindowKind::FlatTop), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(window(PI, WindowKind::FlatTop), 4.636, epsilon = 1e-12);
        assert_eq!(window(1.234, WindowKind::Rectangular), 1.0);
    }

    #[test]
    fn test_window_points_periodic() {
        let points = window_points(WindowKind::Hann, 8);
        assert_eq!(points.len(), 8);
        assert_abs_diff_eq!(points[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[4], 1.0, epsilon = 1e-12);
        // Periodic form: points[i] == points[N - i]
        for i in 1..4 {
            assert_abs_diff_eq!(points[i], points[8 - i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_energy_loss() {
        let mut samples = vec![1.0; 64];
        let loss = apply_window(&mut samples, WindowKind::Rectangular);
        assert_abs_diff_eq!(loss, 1.0, epsilon = 1e-12);

        let mut samples = vec![1.0; 64];
        let loss = apply_window(&mut samples, WindowKind::Hann);
        assert_abs_diff_eq!(loss, 2.0, epsilon = 1e-9);

        let mut samples = vec![1.0; 64];
        let loss = apply_window(&mut samples, WindowKind::Hamming);
        assert_abs_diff_eq!(loss, 1.0 / 0.54, epsilon = 1e-9);
    }

    #[test]
    fn test_apply_window_scales_samples() {
        let mut samples = vec![2.0; 4];
        apply_window(&mut samples, WindowKind::Hann);
        // Phases 0, π/2, π, 3π/2
        assert_abs_diff_eq!(samples[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(samples[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(samples[2], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(samples[3], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_window_kind_parsing() {
        assert_eq!("hamming".parse::<WindowKind>().unwrap(), WindowKind::Hamming);
        assert_eq!("Flat-Top".parse::<WindowKind>().unwrap(), WindowKind::FlatTop);
        assert_eq!("hann".parse::<WindowKind>().unwrap(), WindowKind::Hann);
        for kind in WindowKind::ALL {
            assert_eq!(kind.to_string().parse::<WindowKind>().unwrap(), kind);
        }
        assert!(matches!(
            "kaiser".parse::<WindowKind>(),
            Err(DspError::UnsupportedParameter(_))
        ));
    }
}
