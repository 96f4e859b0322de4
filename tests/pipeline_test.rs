use dspkit::config::{DspConfig, Smoothing};
use dspkit::signal_processing::fft::forward;
use dspkit::signal_processing::stats::{mean, standard_deviation};
use dspkit::signal_processing::{
    Filter, FirFilter, WindowKind, apply_window, moving_average, moving_median, upsample,
};
use dspkit::simulation::{Generator, MergeMode, Waveform, add_awgn};
use dspkit::{load_wav, save_wav};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SAMPLE_RATE: f64 = 1024.0;

fn two_tone_signal(seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Generator::new(SAMPLE_RATE)
        .add_tone(&mut rng, Waveform::Sine, 32.0, 1.0, Some(2.0), 0.0, MergeMode::Add)
        .add_tone(&mut rng, Waveform::Sine, 256.0, 0.5, None, 0.0, MergeMode::Add)
        .add_noise(&mut rng, 0.01, None, 0.0, MergeMode::Add)
        .into_samples()
}

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("dspkit_pipeline_{}_{}.wav", name, std::process::id()))
}

#[test]
fn test_seeded_generation_is_reproducible() {
    assert_eq!(two_tone_signal(7), two_tone_signal(7));
    assert_ne!(two_tone_signal(7), two_tone_signal(8));
}

#[test]
fn test_generate_filter_and_analyze() {
    let signal = two_tone_signal(3);
    assert_eq!(signal.len(), 2048);

    let path = temp_path("two_tone");
    save_wav(&path, &signal, SAMPLE_RATE as u32).unwrap();
    let loaded = load_wav(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded.sample_rate, 1024);
    assert_eq!(loaded.samples.len(), signal.len());

    let config = DspConfig::from_toml_str(
        r#"
        [filter]
        core_size = 127
        sample_rate = 1024.0
        cutoff_hz = 100.0
        "#,
    )
    .unwrap();
    let mut filter = FirFilter::from_config(&config.filter);
    let filtered = filter.apply(&loaded.samples).unwrap();

    let mut block = filtered[1024..].to_vec();
    apply_window(&mut block, WindowKind::Rectangular);
    let spectrum = forward(&block, SAMPLE_RATE).unwrap();

    let peaks = spectrum.strongest(2);
    assert!((peaks[0].frequency - 32.0).abs() < 1e-9);
    assert!((peaks[0].value - 1.0).abs() < 0.05);
    // The 256 Hz tone is deep in the stopband
    assert!(spectrum.magnitude[256].value < 0.01);
}

#[test]
fn test_awgn_sets_noise_level() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let clean = Generator::new(SAMPLE_RATE)
        .add_tone(&mut rng, Waveform::Sine, 50.0, 1.0, Some(8.0), 0.0, MergeMode::Add)
        .into_samples();

    let mut noisy = clean.clone();
    add_awgn(&mut rng, &mut noisy, 10.0).unwrap();

    let noise: Vec<f64> = noisy.iter().zip(&clean).map(|(n, c)| n - c).collect();
    // Signal power 0.5 at 10 dB SNR leaves noise power 0.05
    let sigma = standard_deviation(&noise).unwrap();
    assert!((sigma - 0.05_f64.sqrt()).abs() < 0.01, "sigma = {}", sigma);
    assert!(mean(&noise).unwrap().abs() < 0.01);
}

#[test]
fn test_merge_modes_compose() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let envelope = vec![0.5; 1024];
    let modulated = Generator::new(SAMPLE_RATE)
        .add_tone(&mut rng, Waveform::Square, 8.0, 1.0, Some(1.0), 0.0, MergeMode::Add)
        .add_samples(&envelope, 0.0, MergeMode::Mul)
        .into_samples();
    assert!(modulated.iter().all(|v| v.abs() == 0.5));

    // The same envelope applied through the tone itself
    let enveloped = Generator::new(SAMPLE_RATE)
        .add_samples(&envelope, 0.0, MergeMode::Add)
        .add_tone(&mut rng, Waveform::Square, 8.0, 1.0, None, 0.0, MergeMode::Mul)
        .into_samples();
    assert_eq!(enveloped, modulated);
}

#[test]
fn test_smoothing_then_upsampling() {
    let config =
        DspConfig::from_toml_str("[stream]\nsmoothing = \"moving_median\"\nwindow_size = 3\n")
            .unwrap();
    assert_eq!(config.stream.smoothing, Some(Smoothing::MovingMedian));

    let spiky = vec![1.0, 1.0, 9.0, 1.0, 1.0, -9.0, 1.0, 1.0];
    let smoothed: Vec<f64> = moving_median(spiky, config.stream.window_size).collect();
    assert!(smoothed[2..].iter().all(|&v| v == 1.0));

    let upsampled: Vec<f64> = upsample(smoothed, 100.0, 200.0).unwrap().collect();
    assert_eq!(upsampled.len(), 16);
    assert!(upsampled[4..].iter().all(|&v| v == 1.0));
}

#[test]
fn test_moving_average_levels_step() {
    let step: Vec<f64> = (0..20).map(|i| if i < 10 { 0.0 } else { 1.0 }).collect();
    let smoothed: Vec<f64> = moving_average(step, 4).collect();
    assert_eq!(smoothed[9], 0.0);
    assert_eq!(smoothed[10], 0.25);
    assert_eq!(smoothed[13], 1.0);
}
