//! Receive -> decode -> filter -> write loop.
//!
//! The recorder owns the sink and the per-session packet counter. Packets are
//! decoded with the configured format; only race-active packets produce rows.
//! Malformed datagrams are dropped and reported, sink failures end the run.

use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};

use crate::protocols::forza::{
    DecodeError, PacketFormat, UnknownFieldError, WALL_CLOCK_FIELD, decode, field_names,
    validate_selection,
};
use crate::sink::{RowSink, SinkError};
use crate::source::{DatagramSource, SourceError, UdpSource};

mod session;

pub use session::{PROGRESS_INTERVAL, SessionEvent, SessionTracker};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
    #[error("Field selection error: {0}")]
    UnknownField(#[from] UnknownFieldError),
}

/// What to decode and which columns to write.
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    pub format: PacketFormat,
    /// Column subset in output order; `None` or an empty list writes every
    /// column.
    pub fields: Option<Vec<String>>,
    /// Skip the header row and keep existing content.
    pub append: bool,
}

/// Counters for one recorder run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecorderStats {
    pub datagrams: u64,
    pub rows_written: u64,
    pub dropped: u64,
    pub sessions: u64,
}

pub struct Recorder<S: RowSink> {
    sink: S,
    options: RecordOptions,
    session: SessionTracker,
    stats: RecorderStats,
    stamp_wall_clock: bool,
}

impl<S: RowSink> Recorder<S> {
    /// Validate the column selection and write the header unless appending.
    /// An empty selection writes every column.
    pub fn new(sink: S, mut options: RecordOptions) -> Result<Self, RecordError> {
        options.fields = options.fields.filter(|fields| !fields.is_empty());
        if let Some(fields) = options.fields.as_deref() {
            validate_selection(options.format, fields)?;
        }
        let stamp_wall_clock = options
            .fields
            .as_ref()
            .is_some_and(|fields| fields.iter().any(|name| name == WALL_CLOCK_FIELD));

        let mut sink = sink;
        if !options.append {
            sink.write_header(&columns(&options))?;
        }
        Ok(Self {
            sink,
            options,
            session: SessionTracker::new(),
            stats: RecorderStats::default(),
            stamp_wall_clock,
        })
    }

    /// Output columns, in row order.
    pub fn columns(&self) -> Vec<&str> {
        columns(&self.options)
    }

    pub fn stats(&self) -> RecorderStats {
        self.stats
    }

    /// Process one datagram and return the events it triggered.
    pub fn handle_datagram(&mut self, payload: &[u8]) -> Result<Vec<SessionEvent>, RecordError> {
        self.stats.datagrams += 1;
        let mut events = Vec::new();

        let mut table = match decode(payload, self.options.format) {
            Ok(table) => table,
            Err(err) => {
                self.note_drop(&err);
                events.push(SessionEvent::Dropped {
                    reason: err.to_string(),
                });
                return Ok(events);
            }
        };

        if !table.race_active() {
            events.extend(self.session.idle());
            log_events(&events);
            return Ok(events);
        }

        if let Some(started) = self.session.begin_row() {
            self.stats.sessions += 1;
            events.push(started);
        }
        if self.stamp_wall_clock {
            table.stamp_wall_clock(wall_clock_now());
        }
        let values = table.values(self.options.fields.as_deref())?;
        self.sink.write_row(&values)?;
        self.stats.rows_written += 1;
        events.extend(self.session.row_written());

        log_events(&events);
        Ok(events)
    }

    /// Close an open session and return the final counters.
    pub fn finish(mut self) -> (RecorderStats, Option<SessionEvent>) {
        let stopped = self.session.idle();
        if let Some(event) = stopped.as_ref() {
            log_events(std::slice::from_ref(event));
        }
        (self.stats, stopped)
    }

    fn note_drop(&mut self, err: &DecodeError) {
        self.stats.dropped += 1;
        if self.stats.dropped == 1 {
            warn!(
                format = %self.options.format,
                "dropping datagram: {err} (is the packet format right?)"
            );
        } else {
            debug!(dropped = self.stats.dropped, "dropping datagram: {err}");
        }
    }
}

fn columns(options: &RecordOptions) -> Vec<&str> {
    match options.fields.as_ref() {
        Some(fields) => fields.iter().map(String::as_str).collect(),
        None => field_names(options.format).to_vec(),
    }
}

fn log_events(events: &[SessionEvent]) {
    for event in events {
        match event {
            SessionEvent::Started => info!("started logging"),
            SessionEvent::Stopped { packets } => {
                info!(packets = *packets, "stopped logging")
            }
            SessionEvent::Progress { packets } => info!("logged {packets} packets"),
            SessionEvent::Dropped { .. } => {}
        }
    }
}

fn wall_clock_now() -> String {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Drive `recorder` until `source` is exhausted.
pub fn record_source<Src, S>(
    mut source: Src,
    mut recorder: Recorder<S>,
) -> Result<RecorderStats, RecordError>
where
    Src: DatagramSource,
    S: RowSink,
{
    while let Some(datagram) = source.next_datagram()? {
        recorder.handle_datagram(&datagram)?;
    }
    let (stats, _) = recorder.finish();
    info!(
        datagrams = stats.datagrams,
        rows = stats.rows_written,
        dropped = stats.dropped,
        sessions = stats.sessions,
        "source exhausted"
    );
    Ok(stats)
}

/// Listen on `port` on every interface and record until the process stops.
///
/// The column selection is checked and the socket bound before `open_sink`
/// runs, so a startup failure leaves an existing output file untouched.
pub fn run<S, F>(port: u16, open_sink: F, options: RecordOptions) -> Result<(), RecordError>
where
    S: RowSink,
    F: FnOnce() -> Result<S, SinkError>,
{
    if let Some(fields) = options.fields.as_deref() {
        validate_selection(options.format, fields)?;
    }
    let source = UdpSource::bind(port)?;
    info!(port, "listening on port {port}");
    let recorder = Recorder::new(open_sink()?, options)?;
    record_source(source, recorder).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::{RecordOptions, Recorder, SessionEvent};
    use crate::protocols::forza::{FieldValue, PacketFormat, layout};
    use crate::sink::{RowSink, SinkError};

    #[derive(Default)]
    struct MemorySink {
        header: Option<Vec<String>>,
        rows: Vec<Vec<FieldValue>>,
    }

    impl RowSink for MemorySink {
        fn write_header(&mut self, names: &[&str]) -> Result<(), SinkError> {
            self.header = Some(names.iter().map(|name| name.to_string()).collect());
            Ok(())
        }

        fn write_row(&mut self, values: &[FieldValue]) -> Result<(), SinkError> {
            self.rows.push(values.to_vec());
            Ok(())
        }
    }

    fn sled(race_on: i32, timestamp: u32) -> Vec<u8> {
        let mut payload = vec![0u8; layout::SLED_LEN];
        payload[layout::IS_RACE_ON_RANGE].copy_from_slice(&race_on.to_le_bytes());
        payload[layout::TIMESTAMP_RANGE].copy_from_slice(&timestamp.to_le_bytes());
        payload
    }

    fn sled_options(fields: Option<&[&str]>) -> RecordOptions {
        RecordOptions {
            format: PacketFormat::Sled,
            fields: fields.map(|names| names.iter().map(|name| name.to_string()).collect()),
            append: false,
        }
    }

    #[test]
    fn header_uses_selection() {
        let recorder =
            Recorder::new(MemorySink::default(), sled_options(Some(&["timestamp_ms", "is_race_on"])))
                .unwrap();
        assert_eq!(
            recorder.sink.header,
            Some(vec!["timestamp_ms".to_string(), "is_race_on".to_string()])
        );
    }

    #[test]
    fn empty_selection_records_every_column() {
        let mut recorder = Recorder::new(MemorySink::default(), sled_options(Some(&[][..]))).unwrap();
        assert_eq!(
            recorder.sink.header.as_ref().map(Vec::len),
            Some(layout::SLED_FIELD_COUNT)
        );
        assert_eq!(recorder.columns().len(), layout::SLED_FIELD_COUNT);

        recorder.handle_datagram(&sled(1, 9)).unwrap();
        assert_eq!(recorder.sink.rows[0].len(), layout::SLED_FIELD_COUNT);
        assert_eq!(recorder.sink.rows[0][1], FieldValue::UInt(9));
    }

    #[test]
    fn append_skips_header() {
        let mut options = sled_options(None);
        options.append = true;
        let recorder = Recorder::new(MemorySink::default(), options).unwrap();
        assert!(recorder.sink.header.is_none());
    }

    #[test]
    fn unknown_selection_fails_before_any_write() {
        let err = match Recorder::new(MemorySink::default(), sled_options(Some(&["speed"]))) {
            Ok(_) => panic!("expected selection error"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("unknown field 'speed'"));
    }

    #[test]
    fn malformed_datagram_is_dropped() {
        let mut recorder = Recorder::new(MemorySink::default(), sled_options(None)).unwrap();
        let events = recorder.handle_datagram(&[0u8; 17]).unwrap();
        assert!(matches!(events.as_slice(), [SessionEvent::Dropped { .. }]));

        let events = recorder.handle_datagram(&sled(1, 5)).unwrap();
        assert_eq!(events, vec![SessionEvent::Started]);
        assert_eq!(recorder.stats().dropped, 1);
        assert_eq!(recorder.stats().rows_written, 1);
    }

    #[test]
    fn inactive_packets_write_nothing() {
        let mut recorder = Recorder::new(MemorySink::default(), sled_options(None)).unwrap();
        assert!(recorder.handle_datagram(&sled(0, 1)).unwrap().is_empty());
        assert!(recorder.sink.rows.is_empty());
    }

    #[test]
    fn wall_clock_is_stamped_when_selected() {
        let mut recorder = Recorder::new(
            MemorySink::default(),
            sled_options(Some(&["timestamp_ms", "wall_clock"])),
        )
        .unwrap();
        recorder.handle_datagram(&sled(1, 77)).unwrap();

        let row = &recorder.sink.rows[0];
        assert_eq!(row[0], FieldValue::UInt(77));
        match &row[1] {
            FieldValue::Text(stamp) => assert!(!stamp.is_empty()),
            other => panic!("unexpected wall clock value: {other:?}"),
        }
    }

    #[test]
    fn finish_closes_open_session() {
        let mut recorder = Recorder::new(MemorySink::default(), sled_options(None)).unwrap();
        recorder.handle_datagram(&sled(1, 1)).unwrap();
        recorder.handle_datagram(&sled(1, 2)).unwrap();
        let (stats, stopped) = recorder.finish();
        assert_eq!(stopped, Some(SessionEvent::Stopped { packets: 2 }));
        assert_eq!(stats.sessions, 1);
    }
}
