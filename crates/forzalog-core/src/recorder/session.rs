/// Logged packets between two progress events.
pub const PROGRESS_INTERVAL: u64 = 60;

/// Session boundary and progress notifications produced while recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// First race-active packet after an idle period.
    Started,
    /// Race no longer active; `packets` rows were logged in the session.
    Stopped { packets: u64 },
    /// Emitted every [`PROGRESS_INTERVAL`] logged packets.
    Progress { packets: u64 },
    /// Datagram did not decode and was discarded.
    Dropped { reason: String },
}

/// Per-session packet counter. Zero means "not logging".
#[derive(Debug, Default)]
pub struct SessionTracker {
    logged: u64,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Race inactive: closes the current session, if any.
    pub fn idle(&mut self) -> Option<SessionEvent> {
        let packets = std::mem::take(&mut self.logged);
        (packets > 0).then_some(SessionEvent::Stopped { packets })
    }

    /// Race active, before the row is written.
    pub fn begin_row(&self) -> Option<SessionEvent> {
        (self.logged == 0).then_some(SessionEvent::Started)
    }

    /// Row written; counts it and reports progress on every interval.
    pub fn row_written(&mut self) -> Option<SessionEvent> {
        self.logged += 1;
        (self.logged % PROGRESS_INTERVAL == 0).then_some(SessionEvent::Progress {
            packets: self.logged,
        })
    }
}
