//! Bit-exact codec for MQTT control packets over a byte stream.
//!
//! The [`protocol`] module holds the codec: a cursor-based [`Buffer`], the
//! [`FixedHeader`] with its variable-byte remaining length, per-packet
//! variable headers and payloads, and the [`decode`] dispatcher. The
//! [`transport`] module holds the collaborators that move bytes: a
//! [`transport::PacketFramer`] for chunked input and a [`transport::Session`].
//!
//! # Quick Start
//!
//! ```rust
//! use mqtt_wire::{Message, QoS, SubscribeMessage};
//!
//! // Build and encode a SUBSCRIBE
//! let mut msg: Message = SubscribeMessage::single(1, "sensors/temp", QoS::AtLeastOnce).into();
//! let bytes = msg.encode()?;
//!
//! // Decode it again through the dispatcher
//! let decoded = Message::decode(bytes)?;
//! assert_eq!(decoded, msg);
//! # Ok::<(), mqtt_wire::Error>(())
//! ```
//!
//! # Tracing
//!
//! Encode, decode and session operations emit `tracing` spans and events.
//! Install any subscriber to collect them; nothing is printed otherwise.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod protocol;
pub mod transport;

pub use protocol::{
    Buffer, ConnectAckMessage, ConnectMessage, ConnectReturnCode, Error, FixedHeader, Message,
    PacketType, PublishMessage, QoS, Result, SubAckMessage, SubscribeMessage,
    SubscribeReturnCode, Subscription, decode, encode,
};
pub use transport::{Session, SessionConfig, Transport, TransportError};

/// Protocol revision implemented by the codec
pub const VERSION: &str = "3.1.1";

/// Default MQTT port
pub const DEFAULT_PORT: u16 = 1883;
