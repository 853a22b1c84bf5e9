use std::io::Write;

use super::{RowSink, SinkError};
use crate::protocols::forza::FieldValue;

/// RFC 4180 comma-separated rows; cells are quoted when needed.
pub struct CsvSink<W: Write> {
    writer: ::csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        let writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(::csv::Terminator::Any(b'\n'))
            .from_writer(out);
        Self { writer }
    }

    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|err| SinkError::Io(err.into_error()))
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_header(&mut self, names: &[&str]) -> Result<(), SinkError> {
        self.writer.write_record(names)?;
        self.writer.flush()?;
        Ok(())
    }

    fn write_row(&mut self, values: &[FieldValue]) -> Result<(), SinkError> {
        self.writer
            .write_record(values.iter().map(|value| value.to_string()))?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CsvSink;
    use crate::protocols::forza::FieldValue;
    use crate::sink::RowSink;

    #[test]
    fn quotes_cells_with_delimiters() {
        let mut sink = CsvSink::new(Vec::new());
        sink.write_header(&["wall_clock", "speed"]).unwrap();
        sink.write_row(&[
            FieldValue::Text("12:00, lap \"3\"".to_string()),
            FieldValue::Float(1.0),
        ])
        .unwrap();

        let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert_eq!(out, "wall_clock,speed\n\"12:00, lap \"\"3\"\"\",1.000000\n");
    }
}
