//! Packet encode and the inbound dispatcher.

use bytes::Bytes;
use tracing::{debug, instrument};

use super::metrics::{Direction, Metrics};
use super::{
    Buffer, ConnectAckMessage, ConnectMessage, Error, FixedHeader, Message, PacketType,
    PublishMessage, Result, SubAckMessage, SubscribeMessage,
};

/// Encode a message to wire bytes.
///
/// The message's stored fixed header is refreshed with the computed
/// remaining length.
#[instrument(level = "trace", skip(message), fields(packet_type = %message.packet_type()))]
pub fn encode(message: &mut Message) -> Result<Bytes> {
    match message.generate() {
        Ok(bytes) => {
            Metrics::record_packet(Direction::Encoded, message.packet_type(), bytes.len());
            Ok(bytes)
        }
        Err(err) => {
            Metrics::record_error();
            Err(err)
        }
    }
}

/// Decode exactly one complete packet.
///
/// Peeks the fixed header to pick the variant, then parses the variant from
/// a fresh copy of the input so it reads its own fixed header again.
///
/// # Errors
///
/// Returns an error if:
/// - The fixed header is malformed (`UnknownPacketType`, `LengthOverflow`)
/// - The type has no codec (`UnsupportedPacketType`)
/// - The input is shorter than its remaining length (`BufferUnderrun`)
#[instrument(level = "trace", skip(bytes))]
pub fn decode(bytes: impl Into<Bytes>) -> Result<Message> {
    let bytes: Bytes = bytes.into();
    let result = dispatch(Buffer::from(bytes));
    match &result {
        Ok(message) => {
            let header = message.fixed_header();
            let total = header.encoded_len() + header.remaining_length() as usize;
            Metrics::record_packet(Direction::Decoded, message.packet_type(), total);
        }
        Err(_) => Metrics::record_error(),
    }
    result
}

fn dispatch(mut buf: Buffer) -> Result<Message> {
    let header = FixedHeader::parse(&mut buf)?;
    debug!(
        packet_type = %header.packet_type(),
        remaining_length = header.remaining_length(),
        "dispatching packet"
    );

    let mut fresh = buf.duplicate();
    let message = match header.packet_type() {
        PacketType::Connect => Message::Connect(ConnectMessage::parse(&mut fresh)?),
        PacketType::ConnectAck => Message::ConnectAck(ConnectAckMessage::parse(&mut fresh)?),
        PacketType::Publish => Message::Publish(PublishMessage::parse(&mut fresh)?),
        PacketType::Subscribe => Message::Subscribe(SubscribeMessage::parse(&mut fresh)?),
        PacketType::SubscribeAck => Message::SubAck(SubAckMessage::parse(&mut fresh)?),
        packet_type @ (PacketType::PublishAck
        | PacketType::PublishReceived
        | PacketType::PublishRelease
        | PacketType::PublishComplete
        | PacketType::Unsubscribe
        | PacketType::UnsubscribeAck
        | PacketType::PingRequest
        | PacketType::PingResponse
        | PacketType::Disconnect) => {
            return Err(Error::UnsupportedPacketType { packet_type });
        }
    };
    Ok(message)
}
