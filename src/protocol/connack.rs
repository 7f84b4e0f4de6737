//! CONNACK variable header

use std::fmt;

use super::field::Section;
use super::{Buffer, Error, Result};

/// Result of a connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectReturnCode {
    /// Connection accepted
    Accepted = 0x00,
    /// Server does not support the requested protocol level
    UnacceptableProtocolVersion = 0x01,
    /// Client identifier rejected
    IdentifierRejected = 0x02,
    /// Service unavailable
    ServerUnavailable = 0x03,
    /// Malformed username or password
    BadUsernameOrPassword = 0x04,
    /// Client is not authorized
    NotAuthorized = 0x05,
}

impl ConnectReturnCode {
    /// Convert from byte
    pub fn from_u8(code: u8) -> Result<Self> {
        match code {
            0x00 => Ok(Self::Accepted),
            0x01 => Ok(Self::UnacceptableProtocolVersion),
            0x02 => Ok(Self::IdentifierRejected),
            0x03 => Ok(Self::ServerUnavailable),
            0x04 => Ok(Self::BadUsernameOrPassword),
            0x05 => Ok(Self::NotAuthorized),
            _ => Err(Error::InvalidReturnCode { code }),
        }
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ConnectReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Accepted => "accepted",
            Self::UnacceptableProtocolVersion => "unacceptable protocol version",
            Self::IdentifierRejected => "identifier rejected",
            Self::ServerUnavailable => "server unavailable",
            Self::BadUsernameOrPassword => "bad username or password",
            Self::NotAuthorized => "not authorized",
        };
        write!(f, "{text}")
    }
}

/// CONNACK variable header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectAckVariableHeader {
    /// Acknowledge flags, bit 0 is session-present
    pub acknowledge_flags: u8,
    /// Return code
    pub return_code: ConnectReturnCode,
}

impl ConnectAckVariableHeader {
    const SESSION_PRESENT: u8 = 0x01;

    /// Create a header with the session-present bit as given
    #[must_use]
    pub const fn new(session_present: bool, return_code: ConnectReturnCode) -> Self {
        Self {
            acknowledge_flags: if session_present {
                Self::SESSION_PRESENT
            } else {
                0
            },
            return_code,
        }
    }

    /// Check the session-present bit
    #[must_use]
    pub const fn session_present(&self) -> bool {
        self.acknowledge_flags & Self::SESSION_PRESENT != 0
    }
}

impl Section for ConnectAckVariableHeader {
    type Context = ();

    fn generate(&self, buf: &mut Buffer) -> Result<()> {
        buf.write_byte(self.acknowledge_flags);
        buf.write_byte(self.return_code.as_u8());
        Ok(())
    }

    fn parse(buf: &mut Buffer, (): ()) -> Result<Self> {
        Ok(Self {
            acknowledge_flags: buf.read_byte()?,
            return_code: ConnectReturnCode::from_u8(buf.read_byte()?)?,
        })
    }
}
