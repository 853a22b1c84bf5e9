use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use tracing::trace;

use super::{DatagramSource, SourceError};
use crate::protocols::forza::layout;

/// Blocking UDP listener. `recv_from` has no timeout; idle periods (menus,
/// paused games) simply block.
pub struct UdpSource {
    socket: UdpSocket,
    buf: [u8; layout::MAX_DATAGRAM_LEN],
}

impl UdpSource {
    /// Bind on every interface.
    pub fn bind(port: u16) -> Result<Self, SourceError> {
        Self::bind_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
    }

    pub fn bind_addr(addr: SocketAddr) -> Result<Self, SourceError> {
        let socket = UdpSocket::bind(addr).map_err(|source| SourceError::Bind { addr, source })?;
        Ok(Self {
            socket,
            buf: [0u8; layout::MAX_DATAGRAM_LEN],
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SourceError> {
        Ok(self.socket.local_addr()?)
    }
}

impl DatagramSource for UdpSource {
    fn next_datagram(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        let (len, peer) = self.socket.recv_from(&mut self.buf)?;
        trace!(%peer, len, "datagram received");
        Ok(Some(self.buf[..len].to_vec()))
    }
}
