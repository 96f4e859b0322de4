use anyhow::{Context, Result};
use clap::Parser;
use dspkit::save_wav;
use dspkit::simulation::{Generator, MergeMode, Waveform, add_awgn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate_wav")]
#[command(about = "Generate synthetic test signals as WAV files")]
struct Args {
    /// Output WAV file
    output: PathBuf,

    /// TOML signal description
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tones: comma-separated "freq[:amplitude[:waveform]]" (e.g., "50,120:0.5:square")
    #[arg(short, long)]
    tones: Option<String>,

    /// Signal duration in seconds
    #[arg(short, long, default_value_t = 1.0)]
    duration: f64,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,

    /// Uniform noise amplitude (CLI override)
    #[arg(long)]
    noise: Option<f64>,

    /// AWGN SNR in dB (CLI override)
    #[arg(long)]
    snr: Option<f64>,

    /// DC offset added last
    #[arg(long, default_value_t = 0.0)]
    offset: f64,

    /// Seed for reproducibility
    #[arg(short, long, default_value_t = 0)]
    seed: u64,
}

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    tones: Option<Vec<ToneSection>>,
    noise: Option<NoiseSection>,
    awgn: Option<AwgnSection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ToneSection {
    frequency_hz: f64,
    #[serde(default = "unit_amplitude")]
    amplitude: f64,
    #[serde(default = "sine")]
    waveform: Waveform,
    /// Start time in seconds
    #[serde(default)]
    offset_s: f64,
    #[serde(default)]
    merge: MergeMode,
}

#[derive(Debug, Deserialize)]
struct NoiseSection {
    amplitude: f64,
}

#[derive(Debug, Deserialize)]
struct AwgnSection {
    snr_db: f64,
}

fn unit_amplitude() -> f64 {
    1.0
}

fn sine() -> Waveform {
    Waveform::Sine
}

fn parse_tones(s: &str) -> Result<Vec<ToneSection>> {
    s.split(',')
        .map(|spec| {
            let mut parts = spec.trim().split(':');
            let frequency_hz = parts
                .next()
                .unwrap_or_default()
                .parse()
                .with_context(|| format!("Invalid tone frequency in \"{}\"", spec))?;
            let amplitude = match parts.next() {
                Some(a) => a
                    .parse()
                    .with_context(|| format!("Invalid tone amplitude in \"{}\"", spec))?,
                None => unit_amplitude(),
            };
            let waveform = match parts.next() {
                Some(w) => <Waveform as clap::ValueEnum>::from_str(w, true)
                    .map_err(|e| anyhow::anyhow!("Invalid waveform in \"{}\": {}", spec, e))?,
                None => sine(),
            };
            if parts.next().is_some() {
                anyhow::bail!(
                    "Invalid tone format \"{}\". Use 'freq[:amplitude[:waveform]]'",
                    spec
                );
            }
            Ok(ToneSection {
                frequency_hz,
                amplitude,
                waveform,
                offset_s: 0.0,
                merge: MergeMode::Add,
            })
        })
        .collect()
}

fn load_toml_config(path: &PathBuf) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let toml_config = if let Some(ref config_path) = args.config {
        load_toml_config(config_path)?
    } else {
        TomlConfig::default()
    };

    let tones = match args.tones {
        Some(ref spec) => parse_tones(spec)?,
        None => toml_config.tones.unwrap_or_default(),
    };
    let noise = args.noise.or(toml_config.noise.map(|n| n.amplitude));
    let snr = args.snr.or(toml_config.awgn.map(|a| a.snr_db));

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let sample_rate = args.sample_rate as f64;

    // Silence first so every addition spans the full duration
    let silence = vec![0.0; (args.duration * sample_rate).round() as usize];
    let mut generator = Generator::new(sample_rate).add_samples(&silence, 0.0, MergeMode::Add);

    for tone in &tones {
        log::info!(
            "Tone: {:?} {} Hz, amplitude {}, {:?} at {} s",
            tone.waveform,
            tone.frequency_hz,
            tone.amplitude,
            tone.merge,
            tone.offset_s
        );
        // Delayed tones stop at the end of the silence
        let duration = (generator.duration() - tone.offset_s).max(0.0);
        generator = generator.add_tone(
            &mut rng,
            tone.waveform,
            tone.frequency_hz,
            tone.amplitude,
            Some(duration),
            tone.offset_s,
            tone.merge,
        );
    }
    if let Some(amplitude) = noise {
        generator = generator.add_noise(&mut rng, amplitude, None, 0.0, MergeMode::Add);
    }

    let mut samples = generator.add_offset(args.offset).into_samples();
    if let Some(snr_db) = snr {
        add_awgn(&mut rng, &mut samples, snr_db).context("Failed to add noise")?;
    }

    save_wav(&args.output, &samples, args.sample_rate).context("Failed to write WAV file")?;

    eprintln!(
        "Generated {} samples ({} tones) in {}",
        samples.len(),
        tones.len(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tones_defaults() {
        let tones = parse_tones("50,120.5").unwrap();
        assert_eq!(tones.len(), 2);
        assert_eq!(tones[0].frequency_hz, 50.0);
        assert_eq!(tones[0].amplitude, 1.0);
        assert_eq!(tones[1].waveform, Waveform::Sine);
    }

    #[test]
    fn test_parse_tones_full() {
        let tones = parse_tones("440:0.25:square, 10:2:sawtooth").unwrap();
        assert_eq!(
            tones[0],
            ToneSection {
                frequency_hz: 440.0,
                amplitude: 0.25,
                waveform: Waveform::Square,
                offset_s: 0.0,
                merge: MergeMode::Add,
            }
        );
        assert_eq!(tones[1].waveform, Waveform::Sawtooth);
    }

    #[test]
    fn test_parse_tones_invalid() {
        assert!(parse_tones("abc").is_err());
        assert!(parse_tones("50:x").is_err());
        assert!(parse_tones("50:1:wobble").is_err());
        assert!(parse_tones("50:1:sine:extra").is_err());
    }

    #[test]
    fn test_toml_tones() {
        let config: TomlConfig = toml::from_str(
            r#"
            [[tones]]
            frequency_hz = 50.0

            [[tones]]
            frequency_hz = 200.0
            amplitude = 0.1
            waveform = "triangle"
            offset_s = 0.25
            merge = "mul"

            [awgn]
            snr_db = 20.0
            "#,
        )
        .unwrap();
        let tones = config.tones.unwrap();
        assert_eq!(tones[0].amplitude, 1.0);
        assert_eq!(tones[1].waveform, Waveform::Triangle);
        assert_eq!(tones[0].merge, MergeMode::Add);
        assert_eq!(tones[1].offset_s, 0.25);
        assert_eq!(tones[1].merge, MergeMode::Mul);
        assert_eq!(config.awgn.unwrap().snr_db, 20.0);
    }
}
