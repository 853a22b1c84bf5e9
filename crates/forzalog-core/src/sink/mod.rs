//! Row sinks for decoded telemetry.
//!
//! A sink receives one header (optional) and then one row per logged packet.
//! Every write is flushed before returning so an interrupted session keeps
//! all rows written so far.

mod csv;
mod tsv;

pub use self::csv::CsvSink;
pub use self::tsv::TsvSink;

use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::protocols::forza::FieldValue;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}

pub trait RowSink {
    fn write_header(&mut self, names: &[&str]) -> Result<(), SinkError>;
    fn write_row(&mut self, values: &[FieldValue]) -> Result<(), SinkError>;
}

impl<S: RowSink + ?Sized> RowSink for Box<S> {
    fn write_header(&mut self, names: &[&str]) -> Result<(), SinkError> {
        (**self).write_header(names)
    }

    fn write_row(&mut self, values: &[FieldValue]) -> Result<(), SinkError> {
        (**self).write_row(values)
    }
}

/// Text layout of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Csv,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("unknown output format '{s}' (expected tsv or csv)")),
        }
    }
}

/// Open `path` as a row sink. Append mode keeps existing content; otherwise
/// the file is truncated.
pub fn open_file_sink(
    path: &Path,
    format: OutputFormat,
    append: bool,
) -> Result<Box<dyn RowSink>, SinkError> {
    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    let file: File = options.open(path)?;
    let sink: Box<dyn RowSink> = match format {
        OutputFormat::Tsv => Box::new(TsvSink::new(file)),
        OutputFormat::Csv => Box::new(CsvSink::new(file)),
    };
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{OutputFormat, RowSink, open_file_sink};
    use crate::protocols::forza::FieldValue;

    #[test]
    fn output_format_from_str() {
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert!("json".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn append_keeps_existing_rows() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("laps.tsv");
        fs::write(&path, "a\tb\n").unwrap();

        let mut sink = open_file_sink(&path, OutputFormat::Tsv, true).unwrap();
        sink.write_row(&[FieldValue::Int(1), FieldValue::Float(2.0)]).unwrap();
        drop(sink);

        assert_eq!(fs::read_to_string(&path).unwrap(), "a\tb\n1\t2.000000\n");
    }

    #[test]
    fn overwrite_truncates() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("laps.csv");
        fs::write(&path, "stale content that is longer than the header\n").unwrap();

        let mut sink = open_file_sink(&path, OutputFormat::Csv, false).unwrap();
        sink.write_header(&["is_race_on", "speed"]).unwrap();
        drop(sink);

        assert_eq!(fs::read_to_string(&path).unwrap(), "is_race_on,speed\n");
    }
}
