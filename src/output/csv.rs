use super::{Formatter, SpectrumReport};

/// One row per bin
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, report: &SpectrumReport) -> String {
        report
            .spectrum
            .magnitude
            .iter()
            .zip(&report.spectrum.phase)
            .map(|(mag, phase)| format!("{:.4},{:.6},{:.2}", mag.frequency, mag.value, phase.value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn header(&self) -> Option<&'static str> {
        Some("frequency_hz,magnitude,phase_degrees")
    }
}
