//! Configuration for spectrum analysis and filtering.
//!
//! Every section has a `Default`, so a TOML file only needs the keys it
//! changes:
//!
//! ```toml
//! [filter]
//! passing_type = "band_pass"
//! core_size = 301
//! low_cutoff_hz = 900.0
//! high_cutoff_hz = 1100.0
//!
//! [stream]
//! smoothing = "moving_median"
//! window_size = 7
//! ```

use crate::error::{DspError, Result};
use crate::signal_processing::{FilterParameters, WindowKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration
///
/// # Example
/// ```
/// use dspkit::config::DspConfig;
///
/// let mut config = DspConfig::default();
/// config.filter.cutoff_hz = 120.0;
/// assert_eq!(config.filter.core_size, 253);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DspConfig {
    /// Spectrum analysis settings
    pub analysis: AnalysisConfig,
    /// Windowed-sinc filter design
    pub filter: FilterParameters,
    /// Post-filter smoothing and resampling
    pub stream: StreamConfig,
}

/// Spectrum analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Window applied to the block before transforming
    pub window: WindowKind,
    /// Zero-pad input up to the next power of two instead of truncating
    pub pad_to_power_of_two: bool,
    /// Number of strongest bins to report
    pub peak_count: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: WindowKind::Rectangular,
            pad_to_power_of_two: true,
            peak_count: 5,
        }
    }
}

/// Smoothing applied to filtered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
    MovingAverage,
    MovingMedian,
}

/// Stream post-processing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Optional smoothing stage
    pub smoothing: Option<Smoothing>,
    /// Smoothing window in samples
    pub window_size: usize,
    /// Upsample the output to this rate in Hz
    pub resample_to_hz: Option<f64>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            smoothing: None,
            window_size: 5,
            resample_to_hz: None,
        }
    }
}

impl DspConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DspError::Config(e.to_string()))
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| DspError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}
