use thiserror::Error;

use super::PacketFormat;

/// Errors returned when a datagram does not match the requested layout.
///
/// # Examples
/// ```
/// use forzalog_core::{DecodeError, PacketFormat, decode};
///
/// let err = decode(&[0u8; 10], PacketFormat::Sled).unwrap_err();
/// assert!(matches!(err, DecodeError::LengthMismatch { expected: 232, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{format} packet length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        format: PacketFormat,
        expected: usize,
        actual: usize,
    },
}

/// A field name that is not part of a packet format's column set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field '{name}' for {format} packets")]
pub struct UnknownFieldError {
    pub name: String,
    pub format: PacketFormat,
}
