use std::collections::VecDeque;

use super::{DatagramSource, SourceError};

/// Finite in-memory source, drained in order.
#[derive(Debug, Default)]
pub struct ReplaySource {
    datagrams: VecDeque<Vec<u8>>,
}

impl ReplaySource {
    pub fn new<I>(datagrams: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            datagrams: datagrams.into_iter().collect(),
        }
    }
}

impl DatagramSource for ReplaySource {
    fn next_datagram(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        Ok(self.datagrams.pop_front())
    }
}
