//! Complete control packets: fixed header + variable header + payload.
//!
//! Generating encodes the variable header and payload into their own
//! buffers first, so the remaining length is known before the fixed header
//! is written. Parsing reads the fixed header, then carves the body into a
//! sub-buffer of exactly `remaining_length` bytes and parses the sections
//! from it in order.

use bytes::Bytes;
use tracing::debug;

use super::connack::{ConnectAckVariableHeader, ConnectReturnCode};
use super::connect::{ConnectFlags, ConnectPayload, ConnectVariableHeader, LastWill};
use super::field::{Empty, Section};
use super::publish::{PublishPayload, PublishVariableHeader};
use super::subscribe::{
    PacketIdHeader, SubAckPayload, SubscribePayload, SubscribeReturnCode, Subscription,
};
use super::{Buffer, Error, FixedHeader, MAX_REMAINING_LENGTH, PacketType, QoS, Result};

/// Encode `variable_header` and `payload` behind `header`.
///
/// `header` only receives the new remaining length once encoding succeeds.
fn compose<V: Section, P: Section>(
    header: &mut FixedHeader,
    variable_header: &V,
    payload: &P,
) -> Result<Bytes> {
    let mut vh = Buffer::new();
    variable_header.generate(&mut vh)?;
    let mut body = Buffer::new();
    payload.generate(&mut body)?;

    let total = vh.length() + body.length();
    let remaining_length = u32::try_from(total).map_err(|_| Error::LengthOverflow {
        length: total,
        max: MAX_REMAINING_LENGTH,
    })?;

    let mut fixed = *header;
    fixed.set_remaining_length(remaining_length);
    let mut out = Buffer::with_capacity(fixed.encoded_len() + total);
    fixed.generate(&mut out)?;
    out.write_buffer(&vh);
    out.write_buffer(&body);

    *header = fixed;
    Ok(out.to_bytes())
}

/// Parse the fixed header and split off the packet body
fn open(buf: &mut Buffer, expected: PacketType) -> Result<(FixedHeader, Buffer)> {
    let header = FixedHeader::parse(buf)?;
    if header.packet_type() != expected {
        return Err(Error::UnexpectedPacketType {
            expected,
            found: header.packet_type(),
        });
    }
    let body = buf.extract_sub_buffer(header.remaining_length() as usize)?;
    Ok((header, body))
}

fn close(header: &FixedHeader, body: &Buffer) {
    if body.remaining() > 0 {
        debug!(
            packet_type = %header.packet_type(),
            trailing = body.remaining(),
            "ignoring trailing bytes in packet body"
        );
    }
}

/// CONNECT packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectMessage {
    fixed_header: FixedHeader,
    /// Protocol name, level, flags and keep-alive
    pub variable_header: ConnectVariableHeader,
    /// Client identifier and optional will/credentials
    pub payload: ConnectPayload,
}

impl ConnectMessage {
    /// Create a clean-session CONNECT for `client_id`
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        let mut variable_header = ConnectVariableHeader::default();
        variable_header.flags.clean_session = true;
        Self {
            fixed_header: FixedHeader::new(PacketType::Connect, 0),
            variable_header,
            payload: ConnectPayload {
                client_id: client_id.into(),
                ..ConnectPayload::default()
            },
        }
    }

    /// Set the keep-alive interval in seconds
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: u16) -> Self {
        self.variable_header.keep_alive = keep_alive;
        self
    }

    /// Set the clean-session flag
    #[must_use]
    pub fn with_clean_session(mut self, clean_session: bool) -> Self {
        self.variable_header.flags.clean_session = clean_session;
        self
    }

    /// Attach credentials, keeping the flags in step with the payload
    #[must_use]
    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.variable_header.flags.username_flag = username.is_some();
        self.variable_header.flags.password_flag = password.is_some();
        self.payload.username = username;
        self.payload.password = password;
        self
    }

    /// Attach a last-will message
    #[must_use]
    pub fn with_will(mut self, will: LastWill, qos: QoS, retain: bool) -> Self {
        self.variable_header.flags.will_flag = true;
        self.variable_header.flags.will_qos = qos;
        self.variable_header.flags.will_retain = retain;
        self.payload.will = Some(will);
        self
    }

    /// Fixed header from the last generate or parse
    #[must_use]
    pub const fn fixed_header(&self) -> &FixedHeader {
        &self.fixed_header
    }

    /// Connect flags
    #[must_use]
    pub const fn flags(&self) -> ConnectFlags {
        self.variable_header.flags
    }

    /// Client identifier
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.payload.client_id
    }

    /// Encode to wire bytes.
    ///
    /// The will, username and password flags are set from the payload
    /// fields before encoding, so the bytes always match the flag byte.
    pub fn generate(&mut self) -> Result<Bytes> {
        let flags = &mut self.variable_header.flags;
        flags.will_flag = self.payload.will.is_some();
        flags.username_flag = self.payload.username.is_some();
        flags.password_flag = self.payload.password.is_some();
        compose(&mut self.fixed_header, &self.variable_header, &self.payload)
    }

    /// Decode from the cursor
    pub fn parse(buf: &mut Buffer) -> Result<Self> {
        let (fixed_header, mut body) = open(buf, PacketType::Connect)?;
        let variable_header = ConnectVariableHeader::parse(&mut body, ())?;
        let payload = ConnectPayload::parse(&mut body, variable_header.flags)?;
        close(&fixed_header, &body);
        Ok(Self {
            fixed_header,
            variable_header,
            payload,
        })
    }
}

/// CONNACK packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectAckMessage {
    fixed_header: FixedHeader,
    /// Acknowledge flags and return code
    pub variable_header: ConnectAckVariableHeader,
    payload: Empty,
}

impl ConnectAckMessage {
    /// Create a CONNACK
    #[must_use]
    pub fn new(session_present: bool, return_code: ConnectReturnCode) -> Self {
        Self {
            fixed_header: FixedHeader::new(PacketType::ConnectAck, 0),
            variable_header: ConnectAckVariableHeader::new(session_present, return_code),
            payload: Empty,
        }
    }

    /// Fixed header from the last generate or parse
    #[must_use]
    pub const fn fixed_header(&self) -> &FixedHeader {
        &self.fixed_header
    }

    /// Session-present bit
    #[must_use]
    pub const fn session_present(&self) -> bool {
        self.variable_header.session_present()
    }

    /// Return code
    #[must_use]
    pub const fn return_code(&self) -> ConnectReturnCode {
        self.variable_header.return_code
    }

    /// Encode to wire bytes
    pub fn generate(&mut self) -> Result<Bytes> {
        compose(&mut self.fixed_header, &self.variable_header, &self.payload)
    }

    /// Decode from the cursor
    pub fn parse(buf: &mut Buffer) -> Result<Self> {
        let (fixed_header, mut body) = open(buf, PacketType::ConnectAck)?;
        let variable_header = ConnectAckVariableHeader::parse(&mut body, ())?;
        let payload = Empty::parse(&mut body, ())?;
        close(&fixed_header, &body);
        Ok(Self {
            fixed_header,
            variable_header,
            payload,
        })
    }
}

/// PUBLISH packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishMessage {
    fixed_header: FixedHeader,
    /// Topic name and packet identifier
    pub variable_header: PublishVariableHeader,
    /// Application message
    pub payload: PublishPayload,
}

impl PublishMessage {
    /// Create a PUBLISH; `packet_id` is dropped for QoS 0
    #[must_use]
    pub fn new(
        topic_name: impl Into<String>,
        data: impl Into<Bytes>,
        qos: QoS,
        packet_id: Option<u16>,
    ) -> Self {
        Self {
            fixed_header: FixedHeader::new(PacketType::Publish, 0).with_flags(false, qos, false),
            variable_header: PublishVariableHeader::new(topic_name, qos, packet_id),
            payload: PublishPayload { data: data.into() },
        }
    }

    /// Set the retain flag
    #[must_use]
    pub fn with_retain(mut self, retain: bool) -> Self {
        self.set_flags(self.dup(), self.qos(), retain);
        self
    }

    /// Set the duplicate-delivery flag
    #[must_use]
    pub fn with_dup(mut self, dup: bool) -> Self {
        self.set_flags(dup, self.qos(), self.retain());
        self
    }

    /// Replace the fixed-header flags
    pub fn set_flags(&mut self, dup: bool, qos: QoS, retain: bool) {
        self.fixed_header = self.fixed_header.with_flags(dup, qos, retain);
        self.variable_header.set_qos(qos);
    }

    /// Fixed header from the last generate or parse
    #[must_use]
    pub const fn fixed_header(&self) -> &FixedHeader {
        &self.fixed_header
    }

    /// Topic name
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.variable_header.topic_name
    }

    /// Packet identifier, `None` for QoS 0
    #[must_use]
    pub const fn packet_id(&self) -> Option<u16> {
        self.variable_header.packet_id
    }

    /// Raw payload bytes
    #[must_use]
    pub const fn payload(&self) -> &Bytes {
        &self.payload.data
    }

    /// Delivery QoS
    #[must_use]
    pub const fn qos(&self) -> QoS {
        self.fixed_header.qos()
    }

    /// Duplicate-delivery flag
    #[must_use]
    pub const fn dup(&self) -> bool {
        self.fixed_header.dup()
    }

    /// Retain flag
    #[must_use]
    pub const fn retain(&self) -> bool {
        self.fixed_header.retain()
    }

    /// Encode to wire bytes
    pub fn generate(&mut self) -> Result<Bytes> {
        self.variable_header.set_qos(self.fixed_header.qos());
        compose(&mut self.fixed_header, &self.variable_header, &self.payload)
    }

    /// Decode from the cursor
    pub fn parse(buf: &mut Buffer) -> Result<Self> {
        let (fixed_header, mut body) = open(buf, PacketType::Publish)?;
        let variable_header = PublishVariableHeader::parse(&mut body, fixed_header.qos())?;
        let payload = PublishPayload::parse(&mut body, ())?;
        Ok(Self {
            fixed_header,
            variable_header,
            payload,
        })
    }
}

/// SUBSCRIBE packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeMessage {
    fixed_header: FixedHeader,
    /// Packet identifier
    pub variable_header: PacketIdHeader,
    /// Requested topic filters
    pub payload: SubscribePayload,
}

impl SubscribeMessage {
    /// Create a SUBSCRIBE for `subscriptions`
    #[must_use]
    pub fn new(packet_id: u16, subscriptions: Vec<Subscription>) -> Self {
        Self {
            // SUBSCRIBE carries the fixed flag pattern 0b0010
            fixed_header: FixedHeader::new(PacketType::Subscribe, 0).with_flags(
                false,
                QoS::AtLeastOnce,
                false,
            ),
            variable_header: PacketIdHeader { packet_id },
            payload: SubscribePayload { subscriptions },
        }
    }

    /// Create a SUBSCRIBE for a single filter
    #[must_use]
    pub fn single(packet_id: u16, topic_filter: impl Into<String>, qos: QoS) -> Self {
        Self::new(packet_id, vec![Subscription::new(topic_filter, qos)])
    }

    /// Fixed header from the last generate or parse
    #[must_use]
    pub const fn fixed_header(&self) -> &FixedHeader {
        &self.fixed_header
    }

    /// Packet identifier
    #[must_use]
    pub const fn packet_id(&self) -> u16 {
        self.variable_header.packet_id
    }

    /// Requested subscriptions
    #[must_use]
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.payload.subscriptions
    }

    /// Encode to wire bytes
    pub fn generate(&mut self) -> Result<Bytes> {
        compose(&mut self.fixed_header, &self.variable_header, &self.payload)
    }

    /// Decode from the cursor
    pub fn parse(buf: &mut Buffer) -> Result<Self> {
        let (fixed_header, mut body) = open(buf, PacketType::Subscribe)?;
        let variable_header = PacketIdHeader::parse(&mut body, ())?;
        let payload = SubscribePayload::parse(&mut body, ())?;
        Ok(Self {
            fixed_header,
            variable_header,
            payload,
        })
    }
}

/// SUBACK packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubAckMessage {
    fixed_header: FixedHeader,
    /// Packet identifier of the acknowledged SUBSCRIBE
    pub variable_header: PacketIdHeader,
    /// Granted QoS per filter
    pub payload: SubAckPayload,
}

impl SubAckMessage {
    /// Create a SUBACK
    #[must_use]
    pub fn new(packet_id: u16, return_codes: Vec<SubscribeReturnCode>) -> Self {
        Self {
            fixed_header: FixedHeader::new(PacketType::SubscribeAck, 0),
            variable_header: PacketIdHeader { packet_id },
            payload: SubAckPayload { return_codes },
        }
    }

    /// Fixed header from the last generate or parse
    #[must_use]
    pub const fn fixed_header(&self) -> &FixedHeader {
        &self.fixed_header
    }

    /// Packet identifier
    #[must_use]
    pub const fn packet_id(&self) -> u16 {
        self.variable_header.packet_id
    }

    /// Return codes in request order
    #[must_use]
    pub fn return_codes(&self) -> &[SubscribeReturnCode] {
        &self.payload.return_codes
    }

    /// Encode to wire bytes
    pub fn generate(&mut self) -> Result<Bytes> {
        compose(&mut self.fixed_header, &self.variable_header, &self.payload)
    }

    /// Decode from the cursor
    pub fn parse(buf: &mut Buffer) -> Result<Self> {
        let (fixed_header, mut body) = open(buf, PacketType::SubscribeAck)?;
        let variable_header = PacketIdHeader::parse(&mut body, ())?;
        let payload = SubAckPayload::parse(&mut body, ())?;
        Ok(Self {
            fixed_header,
            variable_header,
            payload,
        })
    }
}

/// Any packet this crate can encode and decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// CONNECT
    Connect(ConnectMessage),
    /// CONNACK
    ConnectAck(ConnectAckMessage),
    /// PUBLISH
    Publish(PublishMessage),
    /// SUBSCRIBE
    Subscribe(SubscribeMessage),
    /// SUBACK
    SubAck(SubAckMessage),
}

impl Message {
    /// Packet type of the variant
    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        match self {
            Self::Connect(_) => PacketType::Connect,
            Self::ConnectAck(_) => PacketType::ConnectAck,
            Self::Publish(_) => PacketType::Publish,
            Self::Subscribe(_) => PacketType::Subscribe,
            Self::SubAck(_) => PacketType::SubscribeAck,
        }
    }

    /// Fixed header from the last generate or parse
    #[must_use]
    pub const fn fixed_header(&self) -> &FixedHeader {
        match self {
            Self::Connect(m) => m.fixed_header(),
            Self::ConnectAck(m) => m.fixed_header(),
            Self::Publish(m) => m.fixed_header(),
            Self::Subscribe(m) => m.fixed_header(),
            Self::SubAck(m) => m.fixed_header(),
        }
    }

    /// Encode to wire bytes, refreshing the stored remaining length
    pub fn generate(&mut self) -> Result<Bytes> {
        match self {
            Self::Connect(m) => m.generate(),
            Self::ConnectAck(m) => m.generate(),
            Self::Publish(m) => m.generate(),
            Self::Subscribe(m) => m.generate(),
            Self::SubAck(m) => m.generate(),
        }
    }

    /// Encode to wire bytes
    pub fn encode(&mut self) -> Result<Bytes> {
        super::encode(self)
    }

    /// Decode one complete packet
    pub fn decode(bytes: impl Into<Bytes>) -> Result<Self> {
        super::decode(bytes)
    }
}

impl From<ConnectMessage> for Message {
    fn from(message: ConnectMessage) -> Self {
        Self::Connect(message)
    }
}

impl From<ConnectAckMessage> for Message {
    fn from(message: ConnectAckMessage) -> Self {
        Self::ConnectAck(message)
    }
}

impl From<PublishMessage> for Message {
    fn from(message: PublishMessage) -> Self {
        Self::Publish(message)
    }
}

impl From<SubscribeMessage> for Message {
    fn from(message: SubscribeMessage) -> Self {
        Self::Subscribe(message)
    }
}

impl From<SubAckMessage> for Message {
    fn from(message: SubAckMessage) -> Self {
        Self::SubAck(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_wire_bytes() {
        let mut msg = SubscribeMessage::single(10, "sensors/temp", QoS::AtLeastOnce);
        let bytes = msg.generate().unwrap();

        let mut expected = vec![0x82, 17, 0x00, 0x0A, 0x00, 12];
        expected.extend_from_slice(b"sensors/temp");
        expected.push(0x01);
        assert_eq!(bytes.as_ref(), expected.as_slice());
        assert_eq!(msg.fixed_header().remaining_length(), 17);
    }

    #[test]
    fn test_connack_has_no_payload() {
        let mut msg = ConnectAckMessage::new(false, ConnectReturnCode::Accepted);
        let bytes = msg.generate().unwrap();
        assert_eq!(bytes.as_ref(), &[0x20, 0x02, 0x00, 0x00]);
    }

    #[test]
    fn test_connect_roundtrip() {
        let mut msg = ConnectMessage::new("client-1")
            .with_keep_alive(30)
            .with_credentials(Some("user".into()), Some("secret".into()));
        let bytes = msg.generate().unwrap();
        let decoded = ConnectMessage::parse(&mut Buffer::from(bytes)).unwrap();
        assert_eq!(decoded, msg);
        assert!(decoded.flags().username_flag);
        assert_eq!(decoded.client_id(), "client-1");
    }

    #[test]
    fn test_connect_with_will_roundtrip() {
        let will = LastWill {
            topic: "status".into(),
            message: Bytes::from_static(b"offline"),
        };
        let mut msg = ConnectMessage::new("c").with_will(will, QoS::AtLeastOnce, true);
        let bytes = msg.generate().unwrap();
        let decoded = ConnectMessage::parse(&mut Buffer::from(bytes)).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.flags().will_qos, QoS::AtLeastOnce);
    }

    #[test]
    fn test_connect_flags_follow_payload_fields() {
        let mut msg = ConnectMessage::new("c");
        msg.payload.username = Some("u".into());
        msg.payload.will = Some(LastWill {
            topic: "gone".into(),
            message: Bytes::from_static(b"bye"),
        });
        let bytes = msg.generate().unwrap();
        assert!(msg.flags().username_flag);
        assert!(msg.flags().will_flag);
        assert!(!msg.flags().password_flag);

        let decoded = ConnectMessage::parse(&mut Buffer::from(bytes)).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.payload.username.as_deref(), Some("u"));
    }

    #[test]
    fn test_connect_stale_flag_cleared() {
        let mut msg = ConnectMessage::new("c");
        msg.variable_header.flags.password_flag = true;
        let bytes = msg.generate().unwrap();
        assert!(!msg.flags().password_flag);
        let decoded = ConnectMessage::parse(&mut Buffer::from(bytes)).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_publish_roundtrip_sets_length() {
        let mut msg = PublishMessage::new("a/b", "hi", QoS::ExactlyOnce, Some(5)).with_retain(true);
        let bytes = msg.generate().unwrap();
        assert_eq!(bytes[0], 0x35);
        // topic (2 + 3) + packet id (2) + payload (2)
        assert_eq!(bytes[1], 9);

        let decoded = PublishMessage::parse(&mut Buffer::from(bytes)).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.payload.as_text(), Some("hi"));
    }

    #[test]
    fn test_publish_downgrade_drops_packet_id() {
        let mut msg = PublishMessage::new("t", "x", QoS::AtLeastOnce, Some(3));
        msg.set_flags(false, QoS::AtMostOnce, false);
        assert_eq!(msg.packet_id(), None);
        let bytes = msg.generate().unwrap();
        assert_eq!(bytes.len(), 2 + 3 + 1);
    }

    #[test]
    fn test_publish_payload_bounded_by_remaining_length() {
        let mut msg = PublishMessage::new("t", "abc", QoS::AtMostOnce, None);
        let mut bytes = msg.generate().unwrap().to_vec();
        bytes.extend_from_slice(&[0xEE, 0xEE]);

        let mut buf = Buffer::from(bytes);
        let decoded = PublishMessage::parse(&mut buf).unwrap();
        assert_eq!(decoded.payload().as_ref(), b"abc");
        assert_eq!(buf.remaining(), 2);
    }

    #[test]
    fn test_failed_generate_keeps_header() {
        let mut msg = PublishMessage::new("t", "x", QoS::AtLeastOnce, None);
        assert!(matches!(msg.generate(), Err(Error::MissingPacketId)));
        assert_eq!(msg.fixed_header().remaining_length(), 0);
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut msg = ConnectAckMessage::new(true, ConnectReturnCode::Accepted);
        let bytes = msg.generate().unwrap();
        let result = SubAckMessage::parse(&mut Buffer::from(bytes));
        assert!(matches!(
            result,
            Err(Error::UnexpectedPacketType {
                expected: PacketType::SubscribeAck,
                found: PacketType::ConnectAck
            })
        ));
    }

    #[test]
    fn test_truncated_body_underruns() {
        let mut msg = SubscribeMessage::single(1, "sensors/temp", QoS::AtMostOnce);
        let bytes = msg.generate().unwrap();
        let truncated = &bytes[..bytes.len() - 1];
        assert!(matches!(
            SubscribeMessage::parse(&mut Buffer::from(truncated)),
            Err(Error::BufferUnderrun { .. })
        ));
    }
}
