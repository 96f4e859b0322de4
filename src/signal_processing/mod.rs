pub mod complex;
pub mod convolution;
pub mod fft;
pub mod filter;
pub mod fir_bandpass;
pub mod fir_core;
pub mod fir_designer;
pub mod math;
pub mod resample;
pub mod stats;
pub mod stream;
pub mod window;

pub use complex::ComplexSample;
pub use convolution::{convolve, filter_causal, trim_transient};
pub use fft::{FftEngine, Spectrum, SpectrumPoint};
pub use filter::Filter;
pub use fir_bandpass::FirBandpass;
pub use fir_core::FilterKernel;
pub use fir_designer::{FilterParameters, FirFilter, PassingType};
pub use resample::upsample;
pub use stream::{MovingAverage, MovingMedian, moving_average, moving_median};
pub use window::{WindowKind, apply_window, window, window_points};
