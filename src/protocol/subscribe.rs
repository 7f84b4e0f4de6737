//! SUBSCRIBE and SUBACK sections

use super::field::Section;
use super::{Buffer, QoS, Result};

const QOS_BITS: u8 = 0x03;
const FAILURE: u8 = 0x80;

/// Variable header shared by SUBSCRIBE and SUBACK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketIdHeader {
    /// Packet identifier
    pub packet_id: u16,
}

impl Section for PacketIdHeader {
    type Context = ();

    fn generate(&self, buf: &mut Buffer) -> Result<()> {
        buf.write_short(self.packet_id);
        Ok(())
    }

    fn parse(buf: &mut Buffer, (): ()) -> Result<Self> {
        Ok(Self {
            packet_id: buf.read_short()?,
        })
    }
}

/// One topic filter and its requested QoS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Topic filter
    pub topic_filter: String,
    /// Requested QoS
    pub qos: QoS,
}

impl Subscription {
    /// Create a subscription entry
    #[must_use]
    pub fn new(topic_filter: impl Into<String>, qos: QoS) -> Self {
        Self {
            topic_filter: topic_filter.into(),
            qos,
        }
    }
}

/// SUBSCRIBE payload, read until the end of the packet body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscribePayload {
    /// Requested subscriptions in wire order
    pub subscriptions: Vec<Subscription>,
}

impl Section for SubscribePayload {
    type Context = ();

    fn generate(&self, buf: &mut Buffer) -> Result<()> {
        for subscription in &self.subscriptions {
            buf.write_length_prefixed_string(&subscription.topic_filter)?;
            buf.write_byte(subscription.qos.as_u8() & QOS_BITS);
        }
        Ok(())
    }

    fn parse(buf: &mut Buffer, (): ()) -> Result<Self> {
        let mut subscriptions = Vec::new();
        while buf.remaining() > 0 {
            let topic_filter = buf.read_length_prefixed_string()?;
            let qos = QoS::from_u8(buf.read_byte()? & QOS_BITS)?;
            subscriptions.push(Subscription { topic_filter, qos });
        }
        Ok(Self { subscriptions })
    }
}

/// Per-filter result in a SUBACK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeReturnCode {
    /// Subscription granted at this QoS
    Success(QoS),
    /// Subscription refused (0x80)
    Failure,
}

impl SubscribeReturnCode {
    /// Convert from byte, masking granted QoS to its low 2 bits
    pub fn from_u8(byte: u8) -> Result<Self> {
        if byte == FAILURE {
            return Ok(Self::Failure);
        }
        Ok(Self::Success(QoS::from_u8(byte & QOS_BITS)?))
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Success(qos) => qos.as_u8(),
            Self::Failure => FAILURE,
        }
    }
}

/// SUBACK payload, one return code per requested filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubAckPayload {
    /// Return codes in request order
    pub return_codes: Vec<SubscribeReturnCode>,
}

impl Section for SubAckPayload {
    type Context = ();

    fn generate(&self, buf: &mut Buffer) -> Result<()> {
        for code in &self.return_codes {
            buf.write_byte(code.as_u8());
        }
        Ok(())
    }

    fn parse(buf: &mut Buffer, (): ()) -> Result<Self> {
        let mut return_codes = Vec::with_capacity(buf.remaining());
        while buf.remaining() > 0 {
            return_codes.push(SubscribeReturnCode::from_u8(buf.read_byte()?)?);
        }
        Ok(Self { return_codes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_payload_layout() {
        let payload = SubscribePayload {
            subscriptions: vec![Subscription::new("sensors/temp", QoS::AtLeastOnce)],
        };
        let mut buf = Buffer::new();
        payload.generate(&mut buf).unwrap();

        let mut expected = vec![0x00, 12];
        expected.extend_from_slice(b"sensors/temp");
        expected.push(1);
        assert_eq!(buf.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_requested_qos_is_masked() {
        let mut buf = Buffer::from(&[0x00, 0x01, b'#', 0xFD][..]);
        let payload = SubscribePayload::parse(&mut buf, ()).unwrap();
        assert_eq!(payload.subscriptions[0].qos, QoS::AtLeastOnce);
    }

    #[test]
    fn test_multiple_filters() {
        let mut buf = Buffer::from(&[0x00, 0x01, b'a', 0x00, 0x00, 0x01, b'b', 0x02][..]);
        let payload = SubscribePayload::parse(&mut buf, ()).unwrap();
        assert_eq!(
            payload.subscriptions,
            vec![
                Subscription::new("a", QoS::AtMostOnce),
                Subscription::new("b", QoS::ExactlyOnce),
            ]
        );
    }

    #[test]
    fn test_suback_codes() {
        let mut buf = Buffer::from(&[0x00, 0x01, 0x80, 0x06][..]);
        let payload = SubAckPayload::parse(&mut buf, ()).unwrap();
        assert_eq!(
            payload.return_codes,
            vec![
                SubscribeReturnCode::Success(QoS::AtMostOnce),
                SubscribeReturnCode::Success(QoS::AtLeastOnce),
                SubscribeReturnCode::Failure,
                SubscribeReturnCode::Success(QoS::ExactlyOnce),
            ]
        );
    }
}
