use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Kernel size must be odd, got {0}")]
    EvenKernelSize(usize),

    #[error("Parameter not supported: {0}")]
    UnsupportedParameter(String),

    #[error("Transform length must be a power of two, got {0}")]
    NotPowerOfTwo(usize),

    #[error("Sample count mismatch: expected {expected}, got {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error("Input sequence is empty")]
    EmptyInput,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Kernel cannot be normalized: {0}")]
    DegenerateKernel(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DspError>;
