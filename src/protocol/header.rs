//! Fixed header: control byte plus the remaining-length varint.
//!
//! # Wire Format
//!
//! ```text
//!   7   6   5   4   3   2   1   0
//! +---+---+---+---+---+---+---+---+
//! |  packet type  |DUP|  QoS  |RET|
//! +---+---+---+---+---+---+---+---+
//! |  remaining length (1-4 bytes) |
//! +---+---+---+---+---+---+---+---+
//! ```

use super::{Buffer, Error, MAX_REMAINING_LENGTH, PacketType, QoS, Result};

const DUP_BIT: u8 = 0x08;
const QOS_MASK: u8 = 0x06;
const RETAIN_BIT: u8 = 0x01;
const CONTINUATION_BIT: u8 = 0x80;
const VALUE_MASK: u8 = 0x7F;

/// Maximum number of remaining-length bytes
pub const MAX_LENGTH_BYTES: usize = 4;

/// Fixed header shared by every control packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    packet_type: PacketType,
    dup: bool,
    qos: QoS,
    retain: bool,
    remaining_length: u32,
}

impl FixedHeader {
    /// Create a header with no flags set
    #[must_use]
    pub const fn new(packet_type: PacketType, remaining_length: u32) -> Self {
        Self {
            packet_type,
            dup: false,
            qos: QoS::AtMostOnce,
            retain: false,
            remaining_length,
        }
    }

    /// Set the flag bits
    #[must_use]
    pub const fn with_flags(mut self, dup: bool, qos: QoS, retain: bool) -> Self {
        self.dup = dup;
        self.qos = qos;
        self.retain = retain;
        self
    }

    /// Packet type accessor
    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    /// Duplicate-delivery flag
    #[must_use]
    pub const fn dup(&self) -> bool {
        self.dup
    }

    /// QoS level
    #[must_use]
    pub const fn qos(&self) -> QoS {
        self.qos
    }

    /// Retain flag
    #[must_use]
    pub const fn retain(&self) -> bool {
        self.retain
    }

    /// Byte count of everything after the fixed header
    #[must_use]
    pub const fn remaining_length(&self) -> u32 {
        self.remaining_length
    }

    pub(crate) fn set_remaining_length(&mut self, remaining_length: u32) {
        self.remaining_length = remaining_length;
    }

    /// Encoded size of this header
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        1 + length_bytes(self.remaining_length as usize).unwrap_or(MAX_LENGTH_BYTES)
    }

    /// Control byte: type nibble and flag bits
    #[must_use]
    pub const fn control_byte(&self) -> u8 {
        let mut byte = self.packet_type.as_nibble() << 4;
        if self.dup {
            byte |= DUP_BIT;
        }
        byte |= self.qos.as_u8() << 1;
        if self.retain {
            byte |= RETAIN_BIT;
        }
        byte
    }

    /// Write the control byte and remaining length.
    ///
    /// Fails before writing anything if the length needs more than 4 bytes.
    pub fn generate(&self, buf: &mut Buffer) -> Result<()> {
        let count = length_bytes(self.remaining_length as usize)?;
        buf.write_byte(self.control_byte());
        let value = self.remaining_length;
        for position in (0..count).rev() {
            let mut byte = ((value >> (7 * position)) as u8) & VALUE_MASK;
            if position > 0 {
                byte |= CONTINUATION_BIT;
            }
            buf.write_byte(byte);
        }
        Ok(())
    }

    /// Read the control byte and remaining length from the cursor
    pub fn parse(buf: &mut Buffer) -> Result<Self> {
        let control = buf.read_byte()?;
        let nibble = control >> 4;
        let packet_type =
            PacketType::from_nibble(nibble).ok_or(Error::UnknownPacketType { nibble })?;
        let qos = QoS::from_u8((control & QOS_MASK) >> 1)?;

        let mut value: u32 = 0;
        let mut count = 0;
        loop {
            if count == MAX_LENGTH_BYTES {
                return Err(Error::LengthOverflow {
                    length: value as usize,
                    max: MAX_REMAINING_LENGTH,
                });
            }
            let byte = buf.read_byte()?;
            count += 1;
            value = (value << 7) | u32::from(byte & VALUE_MASK);
            if byte & CONTINUATION_BIT == 0 {
                break;
            }
        }

        Ok(Self {
            packet_type,
            dup: control & DUP_BIT != 0,
            qos,
            retain: control & RETAIN_BIT != 0,
            remaining_length: value,
        })
    }

    /// Inspect the start of `bytes` without consuming it.
    ///
    /// Returns `Ok(None)` while the fixed header is incomplete, otherwise the
    /// total frame length (header plus remaining length).
    pub fn peek(bytes: &[u8]) -> Result<Option<usize>> {
        let mut value: usize = 0;
        for (index, byte) in bytes.iter().skip(1).take(MAX_LENGTH_BYTES).enumerate() {
            value = (value << 7) | usize::from(byte & VALUE_MASK);
            if byte & CONTINUATION_BIT == 0 {
                return Ok(Some(1 + index + 1 + value));
            }
        }
        if bytes.len() > MAX_LENGTH_BYTES {
            return Err(Error::LengthOverflow {
                length: value,
                max: MAX_REMAINING_LENGTH,
            });
        }
        Ok(None)
    }
}

/// Number of bytes needed to encode `length`
pub fn length_bytes(length: usize) -> Result<usize> {
    match length {
        0..=127 => Ok(1),
        128..=16_383 => Ok(2),
        16_384..=2_097_151 => Ok(3),
        2_097_152..=MAX_REMAINING_LENGTH => Ok(4),
        _ => Err(Error::LengthOverflow {
            length,
            max: MAX_REMAINING_LENGTH,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_length(length: u32) -> Result<Vec<u8>> {
        let mut buf = Buffer::new();
        FixedHeader::new(PacketType::Publish, length).generate(&mut buf)?;
        Ok(buf.to_bytes()[1..].to_vec())
    }

    #[test]
    fn test_length_boundaries() {
        let cases: [(u32, usize); 8] = [
            (0, 1),
            (127, 1),
            (128, 2),
            (16_383, 2),
            (16_384, 3),
            (2_097_151, 3),
            (2_097_152, 4),
            (268_435_455, 4),
        ];
        for (length, expected_bytes) in cases {
            let mut buf = Buffer::new();
            let header = FixedHeader::new(PacketType::Publish, length);
            header.generate(&mut buf).unwrap();
            assert_eq!(buf.length(), 1 + expected_bytes, "length {length}");
            assert_eq!(header.encoded_len(), 1 + expected_bytes);

            let decoded = FixedHeader::parse(&mut buf).unwrap();
            assert_eq!(decoded.remaining_length(), length);
            assert_eq!(buf.remaining(), 0);
        }
    }

    #[test]
    fn test_length_overflow_writes_nothing() {
        let mut buf = Buffer::new();
        let result = FixedHeader::new(PacketType::Publish, 268_435_456).generate(&mut buf);
        assert!(matches!(
            result,
            Err(Error::LengthOverflow {
                length: 268_435_456,
                ..
            })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_length_is_most_significant_group_first() {
        assert_eq!(encode_length(128).unwrap(), vec![0x81, 0x00]);
        assert_eq!(encode_length(321).unwrap(), vec![0x82, 0x41]);
        assert_eq!(encode_length(16_383).unwrap(), vec![0xFF, 0x7F]);
        assert_eq!(
            encode_length(268_435_455).unwrap(),
            vec![0xFF, 0xFF, 0xFF, 0x7F]
        );
    }

    #[test]
    fn test_five_length_bytes_rejected() {
        let mut buf = Buffer::from(&[0x30, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F][..]);
        assert!(matches!(
            FixedHeader::parse(&mut buf),
            Err(Error::LengthOverflow { .. })
        ));
    }

    #[test]
    fn test_publish_qos1_control_byte() {
        let mut buf = Buffer::from(&[0x32, 0x00][..]);
        let header = FixedHeader::parse(&mut buf).unwrap();
        assert_eq!(header.packet_type(), PacketType::Publish);
        assert!(!header.dup());
        assert_eq!(header.qos(), QoS::AtLeastOnce);
        assert!(!header.retain());
    }

    #[test]
    fn test_flag_packing() {
        let header = FixedHeader::new(PacketType::Publish, 0).with_flags(true, QoS::ExactlyOnce, true);
        assert_eq!(header.control_byte(), 0x3D);

        let header = FixedHeader::new(PacketType::Publish, 0).with_flags(false, QoS::AtLeastOnce, true);
        assert_eq!(header.control_byte(), 0x33);
    }

    #[test]
    fn test_reserved_qos_rejected() {
        let mut buf = Buffer::from(&[0x36, 0x00][..]);
        assert!(matches!(
            FixedHeader::parse(&mut buf),
            Err(Error::InvalidQos { value: 3 })
        ));
    }

    #[test]
    fn test_unknown_packet_type() {
        for control in [0x00u8, 0xF0] {
            let mut buf = Buffer::from(&[control, 0x00][..]);
            assert!(matches!(
                FixedHeader::parse(&mut buf),
                Err(Error::UnknownPacketType { .. })
            ));
        }
    }

    #[test]
    fn test_missing_length_underruns() {
        let mut buf = Buffer::from(&[0x30, 0x80][..]);
        assert!(matches!(
            FixedHeader::parse(&mut buf),
            Err(Error::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn test_peek() {
        assert_eq!(FixedHeader::peek(&[]).unwrap(), None);
        assert_eq!(FixedHeader::peek(&[0x30]).unwrap(), None);
        assert_eq!(FixedHeader::peek(&[0x30, 0x80]).unwrap(), None);
        assert_eq!(FixedHeader::peek(&[0x30, 0x05]).unwrap(), Some(7));
        assert_eq!(FixedHeader::peek(&[0x30, 0x81, 0x00]).unwrap(), Some(131));
        assert!(FixedHeader::peek(&[0x30, 0xFF, 0xFF, 0xFF, 0xFF]).is_err());
    }
}
