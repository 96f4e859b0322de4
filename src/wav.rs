use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Mono signal read from a WAV file
#[derive(Debug, Clone, PartialEq)]
pub struct WavSignal {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
}

/// Read a WAV file as mono `f64` samples in [-1, 1]
///
/// Integer formats are scaled by their full-scale value; multi-channel files
/// are averaged down to one channel.
pub fn load_wav(path: impl AsRef<Path>) -> Result<WavSignal, hound::Error> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = 2_f64.powi(spec.bits_per_sample as i32 - 1);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let samples = interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect();

    Ok(WavSignal {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Write mono 32-bit float samples
pub fn save_wav(
    path: impl AsRef<Path>,
    samples: &[f64],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;

    for &sample in samples {
        writer.write_sample(sample as f32)?;
    }

    writer.finalize()?;
    Ok(())
}
