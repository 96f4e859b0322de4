pub mod config;
pub mod constants;
pub mod error;
pub mod output;
pub mod signal_processing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::DspConfig;
pub use error::{DspError, Result};
pub use wav::{WavSignal, load_wav, save_wav};
