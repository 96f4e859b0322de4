mod csv;
mod json;
mod text;

use crate::signal_processing::{Spectrum, SpectrumPoint};
use chrono::Utc;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Everything a formatter needs to render one analysed signal
pub struct SpectrumReport<'a> {
    /// Where the samples came from (usually a file name)
    pub source: &'a str,
    pub sample_rate: f64,
    /// Zeros appended to reach a power-of-two length
    pub padded_samples: usize,
    pub spectrum: &'a Spectrum,
    /// Strongest bins, strongest first
    pub peaks: Vec<SpectrumPoint>,
}

pub trait Formatter {
    fn format(&self, report: &SpectrumReport) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
