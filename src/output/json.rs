use super::{Formatter, SpectrumReport, iso8601_timestamp};
use crate::signal_processing::SpectrumPoint;
use serde::Serialize;

/// Single JSON document per report
pub struct JsonFormatter;

#[derive(Serialize)]
struct Bin {
    frequency: f64,
    magnitude: f64,
    phase: f64,
}

#[derive(Serialize)]
struct Document<'a> {
    ts: String,
    source: &'a str,
    sample_rate: f64,
    padded_samples: usize,
    peaks: &'a [SpectrumPoint],
    bins: Vec<Bin>,
}

impl Formatter for JsonFormatter {
    fn format(&self, report: &SpectrumReport) -> String {
        let bins = report
            .spectrum
            .magnitude
            .iter()
            .zip(&report.spectrum.phase)
            .map(|(mag, phase)| Bin {
                frequency: mag.frequency,
                magnitude: mag.value,
                phase: phase.value,
            })
            .collect();

        let document = Document {
            ts: iso8601_timestamp(),
            source: report.source,
            sample_rate: report.sample_rate,
            padded_samples: report.padded_samples,
            peaks: &report.peaks,
            bins,
        };

        serde_json::to_string(&document).unwrap_or_else(|e| {
            log::error!("Failed to serialize report for {}: {}", report.source, e);
            String::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::{report_fixture, spectrum_fixture};

    #[test]
    fn test_json_document() {
        let spectrum = spectrum_fixture();
        let output = JsonFormatter.format(&report_fixture(&spectrum));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["source"], "tone.wav");
        assert_eq!(value["bins"].as_array().unwrap().len(), 4);
        assert_eq!(value["peaks"][0]["frequency"], 1.0);
        assert!(value["ts"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_non_finite_values_become_null() {
        let mut spectrum = spectrum_fixture();
        spectrum.magnitude[2].value = f64::NAN;
        spectrum.phase[3].value = f64::INFINITY;

        let output = JsonFormatter.format(&report_fixture(&spectrum));
        assert!(!output.is_empty());

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(value["bins"][2]["magnitude"].is_null());
        assert!(value["bins"][3]["phase"].is_null());
        let magnitude = value["bins"][1]["magnitude"].as_f64().unwrap();
        assert!((magnitude - 1.0).abs() < 1e-9);
    }
}
