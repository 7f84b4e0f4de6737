//! Transport-level error types covering I/O, framing and codec failures.

use core::fmt;
use std::io;

use crate::protocol;

/// Unified error type for transport and session operations.
#[derive(Debug)]
pub enum TransportError {
    /// Underlying stream failure.
    Io(io::Error),
    /// Packet encoding/decoding failure.
    Protocol(protocol::Error),
    /// Inbound frame exceeds the configured maximum packet size.
    PacketTooLarge {
        /// Length announced by the fixed header.
        len: usize,
        /// Maximum packet size accepted by the session.
        max: usize,
    },
    /// Peer closed the stream.
    Closed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Protocol(err) => write!(f, "protocol error: {err}"),
            Self::PacketTooLarge { len, max } => {
                write!(f, "packet too large: {len} bytes (max {max})")
            }
            Self::Closed => write!(f, "connection closed by peer"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Protocol(err) => Some(err),
            Self::PacketTooLarge { .. } | Self::Closed => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<protocol::Error> for TransportError {
    fn from(err: protocol::Error) -> Self {
        Self::Protocol(err)
    }
}
