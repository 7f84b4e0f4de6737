//! MQTT control packet codec
//!
//! This module provides the buffer, fixed header, per-packet sections and
//! the dispatcher that decodes a packet by its type.

mod buffer;
mod codec;
mod connack;
mod connect;
mod error;
mod field;
mod header;
mod message;
pub(crate) mod metrics;
mod publish;
mod subscribe;
mod types;

pub use buffer::Buffer;
pub use codec::{decode, encode};
pub use connack::{ConnectAckVariableHeader, ConnectReturnCode};
pub use connect::{ConnectFlags, ConnectPayload, ConnectVariableHeader, LastWill};
pub use error::{Error, Result};
pub use field::{Empty, Section};
pub use header::{FixedHeader, MAX_LENGTH_BYTES, length_bytes};
pub use message::{
    ConnectAckMessage, ConnectMessage, Message, PublishMessage, SubAckMessage, SubscribeMessage,
};
pub use metrics::{Direction, MetricsSnapshot, metrics_snapshot};
pub use publish::{PublishPayload, PublishVariableHeader};
pub use subscribe::{
    PacketIdHeader, SubAckPayload, SubscribePayload, SubscribeReturnCode, Subscription,
};
pub use types::{PacketType, QoS};

/// Largest value the remaining-length varint can carry
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;

/// Largest length-prefixed string in bytes
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Largest complete packet: control byte, 4 length bytes and the body
pub const MAX_PACKET_SIZE: usize = 1 + MAX_LENGTH_BYTES + MAX_REMAINING_LENGTH;

/// Protocol name sent in CONNECT
pub const PROTOCOL_NAME: &str = "MQTT";

/// Protocol level for MQTT 3.1.1
pub const PROTOCOL_LEVEL: u8 = 4;
