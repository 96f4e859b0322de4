//! Numeric constants shared by the filter designers and resampler.
//!
//! The cutoff scale constants describe the reference design the windowed-sinc
//! designer was fitted against: a 253-tap kernel at a 10 Hz sample rate.
//! Changing any of them changes every synthesized kernel.

/// Tap count of the reference design.
pub const REFERENCE_CORE_SIZE: f64 = 253.0;

/// Sample rate (Hz) of the reference design.
pub const REFERENCE_SAMPLE_RATE: f64 = 10.0;

/// Empirically fitted gain applied on top of the size/rate ratio.
pub const CUTOFF_FIT_FACTOR: f64 = 25.333_333_3;

/// Absolute tolerance when approximating a resampling ratio by a fraction.
pub const RATIO_ACCURACY: f64 = 1e-5;
