//! CONNECT variable header and payload

use bytes::Bytes;

use super::field::Section;
use super::{Buffer, PROTOCOL_LEVEL, PROTOCOL_NAME, QoS, Result};

/// The 8 connect flag bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectFlags {
    /// Bit 0, must be zero on the wire
    pub reserved: bool,
    /// Bit 1
    pub clean_session: bool,
    /// Bit 2
    pub will_flag: bool,
    /// Bits 3-4
    pub will_qos: QoS,
    /// Bit 5
    pub will_retain: bool,
    /// Bit 6
    pub password_flag: bool,
    /// Bit 7
    pub username_flag: bool,
}

impl ConnectFlags {
    const RESERVED: u8 = 0x01;
    const CLEAN_SESSION: u8 = 0x02;
    const WILL_FLAG: u8 = 0x04;
    const WILL_QOS_SHIFT: u8 = 3;
    const WILL_RETAIN: u8 = 0x20;
    const PASSWORD: u8 = 0x40;
    const USERNAME: u8 = 0x80;

    /// Pack into the flags byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        let mut byte = self.will_qos.as_u8() << Self::WILL_QOS_SHIFT;
        if self.reserved {
            byte |= Self::RESERVED;
        }
        if self.clean_session {
            byte |= Self::CLEAN_SESSION;
        }
        if self.will_flag {
            byte |= Self::WILL_FLAG;
        }
        if self.will_retain {
            byte |= Self::WILL_RETAIN;
        }
        if self.password_flag {
            byte |= Self::PASSWORD;
        }
        if self.username_flag {
            byte |= Self::USERNAME;
        }
        byte
    }

    /// Unpack the flags byte
    pub fn from_u8(byte: u8) -> Result<Self> {
        let will_qos = QoS::from_u8((byte >> Self::WILL_QOS_SHIFT) & 0x03)?;
        Ok(Self {
            reserved: byte & Self::RESERVED != 0,
            clean_session: byte & Self::CLEAN_SESSION != 0,
            will_flag: byte & Self::WILL_FLAG != 0,
            will_qos,
            will_retain: byte & Self::WILL_RETAIN != 0,
            password_flag: byte & Self::PASSWORD != 0,
            username_flag: byte & Self::USERNAME != 0,
        })
    }
}

/// CONNECT variable header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectVariableHeader {
    /// Protocol name, "MQTT" for 3.1.1
    pub protocol_name: String,
    /// Protocol level, 4 for 3.1.1
    pub protocol_level: u8,
    /// Connect flags
    pub flags: ConnectFlags,
    /// Keep-alive interval in seconds
    pub keep_alive: u16,
}

impl Default for ConnectVariableHeader {
    fn default() -> Self {
        Self {
            protocol_name: PROTOCOL_NAME.to_owned(),
            protocol_level: PROTOCOL_LEVEL,
            flags: ConnectFlags::default(),
            keep_alive: 0,
        }
    }
}

impl Section for ConnectVariableHeader {
    type Context = ();

    fn generate(&self, buf: &mut Buffer) -> Result<()> {
        buf.write_length_prefixed_string(&self.protocol_name)?;
        buf.write_byte(self.protocol_level);
        buf.write_byte(self.flags.as_u8());
        buf.write_short(self.keep_alive);
        Ok(())
    }

    fn parse(buf: &mut Buffer, (): ()) -> Result<Self> {
        Ok(Self {
            protocol_name: buf.read_length_prefixed_string()?,
            protocol_level: buf.read_byte()?,
            flags: ConnectFlags::from_u8(buf.read_byte()?)?,
            keep_alive: buf.read_short()?,
        })
    }
}

/// Last-will message carried in the CONNECT payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastWill {
    /// Will topic
    pub topic: String,
    /// Will message
    pub message: Bytes,
}

/// CONNECT payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectPayload {
    /// Client identifier
    pub client_id: String,
    /// Present when the will flag is set
    pub will: Option<LastWill>,
    /// Present when the username flag is set
    pub username: Option<String>,
    /// Present when the password flag is set
    pub password: Option<String>,
}

impl Section for ConnectPayload {
    type Context = ConnectFlags;

    fn generate(&self, buf: &mut Buffer) -> Result<()> {
        buf.write_length_prefixed_string(&self.client_id)?;
        if let Some(will) = &self.will {
            buf.write_length_prefixed_string(&will.topic)?;
            buf.write_length_prefixed_bytes(&will.message)?;
        }
        if let Some(username) = &self.username {
            buf.write_length_prefixed_string(username)?;
        }
        if let Some(password) = &self.password {
            buf.write_length_prefixed_string(password)?;
        }
        Ok(())
    }

    fn parse(buf: &mut Buffer, flags: ConnectFlags) -> Result<Self> {
        let client_id = buf.read_length_prefixed_string()?;
        let will = if flags.will_flag {
            Some(LastWill {
                topic: buf.read_length_prefixed_string()?,
                message: buf.read_length_prefixed_bytes()?,
            })
        } else {
            None
        };
        let username = if flags.username_flag {
            Some(buf.read_length_prefixed_string()?)
        } else {
            None
        };
        let password = if flags.password_flag {
            Some(buf.read_length_prefixed_string()?)
        } else {
            None
        };
        Ok(Self {
            client_id,
            will,
            username,
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_bit_layout() {
        let flags = ConnectFlags {
            clean_session: true,
            will_flag: true,
            will_qos: QoS::ExactlyOnce,
            will_retain: true,
            password_flag: true,
            username_flag: true,
            ..ConnectFlags::default()
        };
        assert_eq!(flags.as_u8(), 0b1111_0110);
        assert_eq!(ConnectFlags::from_u8(0b1111_0110).unwrap(), flags);
    }

    #[test]
    fn test_flags_reserved_will_qos() {
        assert!(ConnectFlags::from_u8(0b0001_1000).is_err());
    }

    #[test]
    fn test_variable_header_layout() {
        let header = ConnectVariableHeader {
            keep_alive: 60,
            flags: ConnectFlags {
                clean_session: true,
                ..ConnectFlags::default()
            },
            ..ConnectVariableHeader::default()
        };
        let mut buf = Buffer::new();
        header.generate(&mut buf).unwrap();
        assert_eq!(
            buf.as_slice(),
            &[0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04, 0x02, 0x00, 0x3C]
        );
        assert_eq!(ConnectVariableHeader::parse(&mut buf, ()).unwrap(), header);
    }

    #[test]
    fn test_payload_follows_flags() {
        let payload = ConnectPayload {
            client_id: "sensor-1".to_owned(),
            will: None,
            username: Some("user".to_owned()),
            password: None,
        };
        let mut buf = Buffer::new();
        payload.generate(&mut buf).unwrap();
        assert_eq!(buf.length(), 2 + 8 + 2 + 4);

        let flags = ConnectFlags {
            username_flag: true,
            ..ConnectFlags::default()
        };
        assert_eq!(ConnectPayload::parse(&mut buf, flags).unwrap(), payload);
    }
}
