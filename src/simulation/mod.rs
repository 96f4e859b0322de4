mod generator;

pub use generator::{Generator, MergeMode, Tone, Waveform, add_awgn, noise, tone, waveform};
