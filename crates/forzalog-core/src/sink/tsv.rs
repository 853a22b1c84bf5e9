use std::io::Write;

use super::{RowSink, SinkError};
use crate::protocols::forza::FieldValue;

/// Tab-separated rows, values joined as-is.
pub struct TsvSink<W: Write> {
    out: W,
}

impl<W: Write> TsvSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line<I, T>(&mut self, cells: I) -> Result<(), SinkError>
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let line = cells
            .into_iter()
            .map(|cell| cell.to_string())
            .collect::<Vec<_>>()
            .join("\t");
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> RowSink for TsvSink<W> {
    fn write_header(&mut self, names: &[&str]) -> Result<(), SinkError> {
        self.write_line(names)
    }

    fn write_row(&mut self, values: &[FieldValue]) -> Result<(), SinkError> {
        self.write_line(values)
    }
}

#[cfg(test)]
mod tests {
    use super::TsvSink;
    use crate::protocols::forza::FieldValue;
    use crate::sink::RowSink;

    #[test]
    fn header_and_row_are_tab_joined() {
        let mut sink = TsvSink::new(Vec::new());
        sink.write_header(&["is_race_on", "timestamp_ms", "speed"]).unwrap();
        sink.write_row(&[
            FieldValue::Int(1),
            FieldValue::UInt(1000),
            FieldValue::Float(12.25),
        ])
        .unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "is_race_on\ttimestamp_ms\tspeed\n1\t1000\t12.250000\n");
    }
}
