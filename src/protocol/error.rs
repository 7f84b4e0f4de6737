//! Codec error types

use thiserror::Error;

use super::PacketType;

/// Errors raised while encoding or decoding control packets
#[derive(Error, Debug)]
pub enum Error {
    /// Read past the end of the available bytes
    #[error("buffer underrun: need {needed} bytes, {available} available")]
    BufferUnderrun {
        /// Bytes the read required
        needed: usize,
        /// Bytes left after the cursor
        available: usize,
    },

    /// High nibble of the control byte maps to no packet type
    #[error("unknown packet type nibble: {nibble:#x}")]
    UnknownPacketType {
        /// Offending nibble
        nibble: u8,
    },

    /// Packet type is valid on the wire but has no codec
    #[error("unsupported packet type: {packet_type}")]
    UnsupportedPacketType {
        /// Type read from the fixed header
        packet_type: PacketType,
    },

    /// Length does not fit its wire encoding
    #[error("length overflow: {length} exceeds {max}")]
    LengthOverflow {
        /// Requested length
        length: usize,
        /// Largest encodable length
        max: usize,
    },

    /// QoS bits hold the reserved value
    #[error("invalid QoS level: {value}")]
    InvalidQos {
        /// Raw 2-bit value
        value: u8,
    },

    /// CONNACK return code outside the defined range
    #[error("invalid connect return code: {code:#x}")]
    InvalidReturnCode {
        /// Raw return code
        code: u8,
    },

    /// Message variant was asked to parse a different packet type
    #[error("expected {expected} packet, found {found}")]
    UnexpectedPacketType {
        /// Type the variant decodes
        expected: PacketType,
        /// Type found in the fixed header
        found: PacketType,
    },

    /// QoS 1/2 publish generated without a packet identifier
    #[error("packet identifier required for QoS > 0")]
    MissingPacketId,

    /// Length-prefixed string is not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
