//! Packet types and QoS levels

use std::fmt;

use super::{Error, Result};

/// Control packet types, discriminant is the wire nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PacketType {
    /// Client request to connect
    Connect = 1,
    /// Connect acknowledgment
    ConnectAck = 2,
    /// Publish message
    Publish = 3,
    /// Publish acknowledgment (QoS 1)
    PublishAck = 4,
    /// Publish received (QoS 2, part 1)
    PublishReceived = 5,
    /// Publish release (QoS 2, part 2)
    PublishRelease = 6,
    /// Publish complete (QoS 2, part 3)
    PublishComplete = 7,
    /// Subscribe request
    Subscribe = 8,
    /// Subscribe acknowledgment
    SubscribeAck = 9,
    /// Unsubscribe request
    Unsubscribe = 10,
    /// Unsubscribe acknowledgment
    UnsubscribeAck = 11,
    /// Ping request
    PingRequest = 12,
    /// Ping response
    PingResponse = 13,
    /// Client is disconnecting
    Disconnect = 14,
}

impl PacketType {
    /// Convert from the high nibble of a control byte
    #[must_use]
    pub const fn from_nibble(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Connect),
            2 => Some(Self::ConnectAck),
            3 => Some(Self::Publish),
            4 => Some(Self::PublishAck),
            5 => Some(Self::PublishReceived),
            6 => Some(Self::PublishRelease),
            7 => Some(Self::PublishComplete),
            8 => Some(Self::Subscribe),
            9 => Some(Self::SubscribeAck),
            10 => Some(Self::Unsubscribe),
            11 => Some(Self::UnsubscribeAck),
            12 => Some(Self::PingRequest),
            13 => Some(Self::PingResponse),
            14 => Some(Self::Disconnect),
            _ => None,
        }
    }

    /// Convert to the wire nibble
    #[must_use]
    pub const fn as_nibble(self) -> u8 {
        self as u8
    }

    /// Check whether this crate can encode and decode the type
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(
            self,
            Self::Connect | Self::ConnectAck | Self::Publish | Self::Subscribe | Self::SubscribeAck
        )
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connect => "CONNECT",
            Self::ConnectAck => "CONNACK",
            Self::Publish => "PUBLISH",
            Self::PublishAck => "PUBACK",
            Self::PublishReceived => "PUBREC",
            Self::PublishRelease => "PUBREL",
            Self::PublishComplete => "PUBCOMP",
            Self::Subscribe => "SUBSCRIBE",
            Self::SubscribeAck => "SUBACK",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::UnsubscribeAck => "UNSUBACK",
            Self::PingRequest => "PINGREQ",
            Self::PingResponse => "PINGRESP",
            Self::Disconnect => "DISCONNECT",
        };
        write!(f, "{name}")
    }
}

/// Delivery guarantee level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum QoS {
    /// Fire and forget
    #[default]
    AtMostOnce = 0,
    /// Acknowledged delivery
    AtLeastOnce = 1,
    /// Assured single delivery
    ExactlyOnce = 2,
}

impl QoS {
    /// Convert from a 2-bit value, 3 is reserved
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::AtMostOnce),
            1 => Ok(Self::AtLeastOnce),
            2 => Ok(Self::ExactlyOnce),
            _ => Err(Error::InvalidQos { value }),
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for QoS {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_u8(value)
    }
}

impl fmt::Display for QoS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QoS{}", self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_type_nibble_roundtrip() {
        for nibble in 1..=14 {
            let packet_type = PacketType::from_nibble(nibble).unwrap();
            assert_eq!(packet_type.as_nibble(), nibble);
        }
        assert!(PacketType::from_nibble(0).is_none());
        assert!(PacketType::from_nibble(15).is_none());
    }

    #[test]
    fn test_supported_types() {
        let supported: Vec<_> = (1..=14)
            .filter_map(PacketType::from_nibble)
            .filter(|t| t.is_supported())
            .collect();
        assert_eq!(
            supported,
            vec![
                PacketType::Connect,
                PacketType::ConnectAck,
                PacketType::Publish,
                PacketType::Subscribe,
                PacketType::SubscribeAck,
            ]
        );
    }

    #[test]
    fn test_qos_reserved_value() {
        assert_eq!(QoS::from_u8(2).unwrap(), QoS::ExactlyOnce);
        assert!(matches!(QoS::from_u8(3), Err(Error::InvalidQos { value: 3 })));
    }
}
