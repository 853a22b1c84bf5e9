//! forzalog core library: Forza "Data Out" telemetry decoding and recording.
//!
//! Datagrams arrive from a [`DatagramSource`] (a bound UDP socket in
//! production), are decoded by the Forza protocol module
//! (layout/reader/parser/fields) into a [`FieldTable`], and race-active
//! packets are written as rows to a [`RowSink`]. Decoding is byte-oriented and
//! side-effect free; sockets and files stay in `source` and `sink`.
//!
//! Invariants:
//! - A datagram is decoded only if its length matches the requested layout
//!   exactly; otherwise it is dropped with a [`DecodeError`].
//! - Column order is the same for decoding, header emission and rows.
//! - Every row is flushed as soon as it is written.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use forzalog_core::{OutputFormat, PacketFormat, RecordOptions, open_file_sink, run};
//!
//! let options = RecordOptions {
//!     format: PacketFormat::Dash,
//!     ..RecordOptions::default()
//! };
//! run(
//!     5300,
//!     || open_file_sink(Path::new("laps.tsv"), OutputFormat::Tsv, false),
//!     options,
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod protocols;
mod recorder;
mod sink;
mod source;

pub use protocols::forza::{
    DashTelemetry, DecodeError, FieldTable, FieldValue, PacketFormat, SledTelemetry,
    UnknownFieldError, WALL_CLOCK_FIELD, Wheels, decode, field_names, remap_fh4,
    validate_selection,
};
pub use recorder::{
    PROGRESS_INTERVAL, RecordError, RecordOptions, Recorder, RecorderStats, SessionEvent,
    SessionTracker, record_source, run,
};
pub use sink::{CsvSink, OutputFormat, RowSink, SinkError, TsvSink, open_file_sink};
pub use source::{DatagramSource, ReplaySource, SourceError, UdpSource};

/// Byte counts and ranges of the supported wire layouts.
pub mod layout {
    pub use crate::protocols::forza::layout::{
        DASH_EXTENSION_OFFSET, DASH_FIELD_COUNT, DASH_LEN, FH4_DASH_RANGE, FH4_LEN,
        FH4_SLED_RANGE, IS_RACE_ON_RANGE, MAX_DATAGRAM_LEN, SLED_FIELD_COUNT, SLED_LEN,
        TIMESTAMP_RANGE,
    };
}
