//! Client session: packet identifiers, outbound encoding and inbound dispatch.

use std::num::NonZeroU16;

use bytes::Bytes;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{PacketFramer, Transport, TransportError};
use crate::protocol::{
    self, ConnectMessage, MAX_PACKET_SIZE, Message, PublishMessage, QoS, SubscribeMessage,
    Subscription,
};

/// Session configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// Client identifier sent in CONNECT.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    pub keep_alive: u16,
    /// Ask the broker to discard previous session state.
    pub clean_session: bool,
    /// Optional username.
    pub username: Option<String>,
    /// Optional password.
    pub password: Option<String>,
    /// Largest inbound packet accepted, in bytes.
    pub max_packet_size: usize,
    /// Bytes requested from the transport per read.
    pub read_chunk_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            client_id: format!("mqtt-wire-{}", Uuid::new_v4().simple()),
            keep_alive: 60,
            clean_session: true,
            username: None,
            password: None,
            max_packet_size: MAX_PACKET_SIZE,
            read_chunk_size: 4096,
        }
    }
}

/// Per-connection packet identifier counter.
///
/// Identifiers increase monotonically from 1 and wrap back to 1; 0 is never
/// issued.
#[derive(Debug, Clone)]
pub struct PacketIdAllocator {
    next: NonZeroU16,
}

impl PacketIdAllocator {
    /// Start at identifier 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: NonZeroU16::MIN,
        }
    }

    /// Issue the next identifier.
    pub fn next_id(&mut self) -> u16 {
        let id = self.next;
        self.next = id.checked_add(1).unwrap_or(NonZeroU16::MIN);
        id.get()
    }
}

impl Default for PacketIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// A client session over a byte-stream transport.
#[derive(Debug)]
pub struct Session<T> {
    transport: T,
    config: SessionConfig,
    framer: PacketFramer,
    packet_ids: PacketIdAllocator,
    read_buf: Vec<u8>,
}

impl<T: Transport> Session<T> {
    /// Create a session; nothing is sent until [`connect`](Self::connect).
    pub fn new(transport: T, config: SessionConfig) -> Self {
        let framer = PacketFramer::with_max_packet_size(config.max_packet_size);
        let read_buf = vec![0u8; config.read_chunk_size.max(1)];
        Self {
            transport,
            config,
            framer,
            packet_ids: PacketIdAllocator::new(),
            read_buf,
        }
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Encode and send any message.
    pub fn send(&mut self, message: &mut Message) -> Result<Bytes, TransportError> {
        let bytes = protocol::encode(message)?;
        debug!(
            packet_type = %message.packet_type(),
            len = bytes.len(),
            "sending packet"
        );
        self.transport.send(&bytes)?;
        Ok(bytes)
    }

    /// Send CONNECT built from the session configuration.
    #[instrument(level = "debug", skip(self), fields(client_id = %self.config.client_id))]
    pub fn connect(&mut self) -> Result<(), TransportError> {
        let connect = ConnectMessage::new(self.config.client_id.clone())
            .with_keep_alive(self.config.keep_alive)
            .with_clean_session(self.config.clean_session)
            .with_credentials(self.config.username.clone(), self.config.password.clone());
        self.send(&mut connect.into())?;
        Ok(())
    }

    /// Send PUBLISH, returning the packet identifier used for QoS 1/2.
    #[instrument(level = "debug", skip(self, payload))]
    pub fn publish(
        &mut self,
        topic: &str,
        payload: impl Into<Bytes>,
        qos: QoS,
        retain: bool,
    ) -> Result<Option<u16>, TransportError> {
        let packet_id = match qos {
            QoS::AtMostOnce => None,
            _ => Some(self.packet_ids.next_id()),
        };
        let publish = PublishMessage::new(topic, payload, qos, packet_id).with_retain(retain);
        self.send(&mut publish.into())?;
        Ok(packet_id)
    }

    /// Send SUBSCRIBE, returning its packet identifier.
    #[instrument(level = "debug", skip(self))]
    pub fn subscribe(&mut self, subscriptions: Vec<Subscription>) -> Result<u16, TransportError> {
        let packet_id = self.packet_ids.next_id();
        self.send(&mut SubscribeMessage::new(packet_id, subscriptions).into())?;
        Ok(packet_id)
    }

    /// Hand externally received bytes to the session.
    ///
    /// `handler` runs once per complete decoded packet. A packet that fails
    /// to decode stops delivery and is returned as an error; packets after
    /// it stay buffered for the next call.
    pub fn feed<F>(&mut self, chunk: &[u8], mut handler: F) -> Result<usize, TransportError>
    where
        F: FnMut(Message),
    {
        self.framer.extend(chunk);
        let mut delivered = 0;
        while let Some(frame) = self.framer.next_packet()? {
            match protocol::decode(frame) {
                Ok(message) => {
                    handler(message);
                    delivered += 1;
                }
                Err(err) => {
                    warn!(error = %err, "rejecting inbound packet");
                    return Err(err.into());
                }
            }
        }
        Ok(delivered)
    }

    /// Dispatch complete packets, reading one chunk from the transport only
    /// when none are already buffered.
    pub fn poll<F>(&mut self, mut handler: F) -> Result<usize, TransportError>
    where
        F: FnMut(Message),
    {
        let delivered = self.feed(&[], &mut handler)?;
        if delivered > 0 {
            return Ok(delivered);
        }

        let len = self.transport.recv(&mut self.read_buf)?;
        if len == 0 {
            return Err(TransportError::Closed);
        }
        self.framer.extend(&self.read_buf[..len]);
        self.feed(&[], handler)
    }
}
