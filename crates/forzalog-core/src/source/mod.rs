mod replay;
mod udp;

pub use replay::ReplaySource;
pub use udp::UdpSource;

use std::net::SocketAddr;

use thiserror::Error;

/// A sequence of raw datagrams.
///
/// Network sources never end; finite sources return `Ok(None)` once drained.
pub trait DatagramSource {
    fn next_datagram(&mut self) -> Result<Option<Vec<u8>>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
