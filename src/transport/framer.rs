//! Frame accumulator for partial reads.
//!
//! Bytes arrive in arbitrary-sized chunks. The fixed header's remaining
//! length marks where each packet ends; complete packets are split off the
//! front of a single `BytesMut` buffer.

use bytes::{Bytes, BytesMut};

use super::TransportError;
use crate::protocol::{FixedHeader, MAX_PACKET_SIZE};

const DEFAULT_CAPACITY: usize = 4 * 1024;

/// Splits an inbound byte stream into complete packets
#[derive(Debug)]
pub struct PacketFramer {
    buffer: BytesMut,
    max_packet_size: usize,
}

impl PacketFramer {
    /// Create a framer accepting packets up to the protocol maximum
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_packet_size(MAX_PACKET_SIZE)
    }

    /// Create a framer rejecting packets larger than `max_packet_size`
    #[must_use]
    pub fn with_max_packet_size(max_packet_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(DEFAULT_CAPACITY),
            max_packet_size,
        }
    }

    /// Append received bytes
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Split off the next complete packet, if one is buffered.
    ///
    /// A malformed or oversized fixed header discards everything buffered.
    /// Packet boundaries are lost at that point, so bytes still in flight
    /// for the rejected packet cannot be told apart from new packets and
    /// the connection should be closed.
    pub fn next_packet(&mut self) -> Result<Option<Bytes>, TransportError> {
        let total = match FixedHeader::peek(&self.buffer) {
            Ok(Some(total)) => total,
            Ok(None) => return Ok(None),
            Err(err) => {
                self.buffer.clear();
                return Err(err.into());
            }
        };
        if total > self.max_packet_size {
            self.buffer.clear();
            return Err(TransportError::PacketTooLarge {
                len: total,
                max: self.max_packet_size,
            });
        }
        if self.buffer.len() < total {
            // Grow in steps; the declared length is untrusted until the bytes arrive
            let missing = total - self.buffer.len();
            self.buffer.reserve(missing.min(DEFAULT_CAPACITY));
            return Ok(None);
        }
        Ok(Some(self.buffer.split_to(total).freeze()))
    }

    /// Append `chunk` and drain every complete packet
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Bytes>, TransportError> {
        self.extend(chunk);
        let mut packets = Vec::new();
        while let Some(packet) = self.next_packet()? {
            packets.push(packet);
        }
        Ok(packets)
    }

    /// Bytes held for an incomplete packet
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any buffered bytes
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PacketFramer {
    fn default() -> Self {
        Self::new()
    }
}
