use super::{Formatter, SpectrumReport};
use std::fmt::Write;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, report: &SpectrumReport) -> String {
        let resolution = report.sample_rate / (2.0 * report.spectrum.len().max(1) as f64);
        let mut out = format!(
            "{}: {} bins, {:.3} Hz resolution, {} padded samples",
            report.source,
            report.spectrum.len(),
            resolution,
            report.padded_samples
        );

        for (rank, peak) in report.peaks.iter().enumerate() {
            let _ = write!(
                out,
                "\n  #{:<2} {:>10.3} Hz  {:.6}",
                rank + 1,
                peak.frequency,
                peak.value
            );
        }

        if self.verbose {
            for (mag, phase) in report.spectrum.magnitude.iter().zip(&report.spectrum.phase) {
                let _ = write!(
                    out,
                    "\n  {:>10.3} Hz  mag: {:.6}  phase: {:>7.2}°",
                    mag.frequency, mag.value, phase.value
                );
            }
        }

        out
    }
}
