use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use rolling_stats::Stats;
use std::path::{Path, PathBuf};

use dspkit::config::{DspConfig, Smoothing};
use dspkit::output::{OutputFormat, SpectrumReport, create_formatter};
use dspkit::signal_processing::fft::{forward, pad_to_power_of_two};
use dspkit::signal_processing::{
    Filter, FirBandpass, FirFilter, PassingType, WindowKind, apply_window, moving_average,
    moving_median, upsample,
};
use dspkit::{load_wav, save_wav};

#[derive(Parser, Debug)]
#[command(name = "dspkit")]
#[command(about = "Spectrum analysis and FIR filtering of WAV files", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the one-sided spectrum of WAV files
    Spectrum {
        /// WAV files to analyze
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: text, csv, json
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Window applied before the transform
        #[arg(short, long, value_enum)]
        window: Option<WindowKind>,

        /// Number of strongest bins to report
        #[arg(short, long)]
        peaks: Option<usize>,

        /// Truncate to a power of two instead of zero-padding
        #[arg(long)]
        truncate: bool,
    },

    /// Filter a WAV file and write the result
    Filter {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Response shape
        #[arg(short = 't', long, value_enum)]
        passing_type: Option<PassingType>,

        /// Window used to taper the kernel
        #[arg(short, long, value_enum)]
        window: Option<WindowKind>,

        /// Number of taps (odd)
        #[arg(short = 'n', long)]
        core_size: Option<usize>,

        /// Cutoff in Hz for low-pass and high-pass designs
        #[arg(long)]
        cutoff: Option<f64>,

        /// Lower band edge in Hz
        #[arg(long)]
        low: Option<f64>,

        /// Upper band edge in Hz
        #[arg(long)]
        high: Option<f64>,

        /// Use the Blackman band-pass design of this (even) order instead
        #[arg(long)]
        bandpass_order: Option<usize>,

        /// Smooth the filtered signal
        #[arg(long, value_enum)]
        smoothing: Option<Smoothing>,

        /// Upsample the filtered signal to this rate in Hz
        #[arg(long)]
        resample_to: Option<f64>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => DspConfig::load(path).context("Failed to load configuration")?,
        None => DspConfig::default(),
    };

    match args.command {
        Command::Spectrum {
            files,
            format,
            window,
            peaks,
            truncate,
        } => {
            if let Some(window) = window {
                config.analysis.window = window;
            }
            if let Some(peaks) = peaks {
                config.analysis.peak_count = peaks;
            }
            if truncate {
                config.analysis.pad_to_power_of_two = false;
            }

            let formatter = create_formatter(format, args.verbose > 0);
            if let Some(header) = formatter.header() {
                println!("{}", header);
            }
            for path in &files {
                let output = analyze_file(path, &config, formatter.as_ref())
                    .with_context(|| format!("Failed to analyze {}", path.display()))?;
                println!("{}", output);
            }
        }
        Command::Filter {
            input,
            output,
            passing_type,
            window,
            core_size,
            cutoff,
            low,
            high,
            bandpass_order,
            smoothing,
            resample_to,
        } => {
            let params = &mut config.filter;
            if let Some(passing_type) = passing_type {
                params.passing_type = passing_type;
            }
            if let Some(window) = window {
                params.window = window;
            }
            if let Some(core_size) = core_size {
                params.core_size = core_size;
            }
            if let Some(cutoff) = cutoff {
                params.cutoff_hz = cutoff;
            }
            if let Some(low) = low {
                params.low_cutoff_hz = low;
            }
            if let Some(high) = high {
                params.high_cutoff_hz = high;
            }
            if smoothing.is_some() {
                config.stream.smoothing = smoothing;
            }
            if resample_to.is_some() {
                config.stream.resample_to_hz = resample_to;
            }

            filter_file(&input, &output, &config, bandpass_order)?;
        }
    }

    Ok(())
}

fn analyze_file(
    path: &Path,
    config: &DspConfig,
    formatter: &dyn dspkit::output::Formatter,
) -> anyhow::Result<String> {
    let signal = load_wav(path).context("Failed to read WAV file")?;
    if signal.samples.is_empty() {
        bail!("WAV file has no samples");
    }

    let mut samples = signal.samples;
    let padded_samples = if config.analysis.pad_to_power_of_two {
        let (padded, added) = pad_to_power_of_two(&samples);
        samples = padded;
        added
    } else {
        let len = if samples.len().is_power_of_two() {
            samples.len()
        } else {
            samples.len().next_power_of_two() / 2
        };
        log::info!("Truncating {} samples to {}", samples.len(), len);
        samples.truncate(len);
        0
    };

    let loss = apply_window(&mut samples, config.analysis.window);
    log::debug!(
        "{} window over {} samples, energy loss {:.3}",
        config.analysis.window,
        samples.len(),
        loss
    );

    let sample_rate = signal.sample_rate as f64;
    let spectrum = forward(&samples, sample_rate)?;
    let source = path.display().to_string();
    let report = SpectrumReport {
        source: &source,
        sample_rate,
        padded_samples,
        peaks: spectrum.strongest(config.analysis.peak_count),
        spectrum: &spectrum,
    };

    Ok(formatter.format(&report))
}

fn filter_file(
    input: &Path,
    output: &Path,
    config: &DspConfig,
    bandpass_order: Option<usize>,
) -> anyhow::Result<()> {
    let signal = load_wav(input)
        .with_context(|| format!("Failed to read WAV file {}", input.display()))?;
    let sample_rate = signal.sample_rate as f64;

    let mut params = config.filter.clone();
    params.sample_rate = sample_rate;

    let mut filter: Box<dyn Filter> = match bandpass_order {
        Some(order) => Box::new(
            FirBandpass::new(
                sample_rate,
                params.low_cutoff_hz,
                params.high_cutoff_hz,
                order,
            )
            .context("Invalid band-pass design")?,
        ),
        None => Box::new(FirFilter::from_config(&params)),
    };

    let taps = filter.kernel().context("Invalid filter design")?.len();
    log::info!("Filtering {} samples with {} taps", signal.samples.len(), taps);

    let filtered = filter.apply(&signal.samples)?;

    let smoothed: Vec<f64> = match config.stream.smoothing {
        Some(Smoothing::MovingAverage) => {
            moving_average(filtered, config.stream.window_size).collect()
        }
        Some(Smoothing::MovingMedian) => {
            moving_median(filtered, config.stream.window_size).collect()
        }
        None => filtered,
    };

    let (result, output_rate) = match config.stream.resample_to_hz {
        Some(rate) => (
            upsample(smoothed, sample_rate, rate)?.collect::<Vec<f64>>(),
            rate,
        ),
        None => (smoothed, sample_rate),
    };

    save_wav(output, &result, output_rate.round() as u32)
        .with_context(|| format!("Failed to write WAV file {}", output.display()))?;

    let mut stats: Stats<f64> = Stats::new();
    for &sample in &result {
        stats.update(sample);
    }

    println!("=== {} -> {} ===", input.display(), output.display());
    println!("Kernel: {} taps", taps);
    if let Some(rate) = config.stream.resample_to_hz {
        println!("Resampled: {} Hz -> {} Hz", sample_rate, rate);
    }
    println!("Samples: {}", stats.count);
    println!("Mean: {:.6}", stats.mean);
    println!("Std dev: {:.6}", stats.std_dev);
    println!("Range: {:.6} .. {:.6}", stats.min, stats.max);

    Ok(())
}
