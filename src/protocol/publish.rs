//! PUBLISH variable header and payload

use bytes::Bytes;

use super::field::Section;
use super::{Buffer, Error, QoS, Result};

/// PUBLISH variable header.
///
/// Topic name, then the packet identifier. The identifier is only on the
/// wire for QoS 1 and 2; a QoS 0 PUBLISH carries the topic alone and
/// decodes with `packet_id == None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishVariableHeader {
    /// Topic name
    pub topic_name: String,
    /// Packet identifier, required when QoS > 0
    pub packet_id: Option<u16>,
    qos: QoS,
}

impl PublishVariableHeader {
    /// Create a header for a publish at `qos`
    #[must_use]
    pub fn new(topic_name: impl Into<String>, qos: QoS, packet_id: Option<u16>) -> Self {
        Self {
            topic_name: topic_name.into(),
            packet_id: if qos == QoS::AtMostOnce {
                None
            } else {
                packet_id
            },
            qos,
        }
    }

    pub(crate) fn set_qos(&mut self, qos: QoS) {
        self.qos = qos;
        if qos == QoS::AtMostOnce {
            self.packet_id = None;
        }
    }
}

impl Section for PublishVariableHeader {
    type Context = QoS;

    fn generate(&self, buf: &mut Buffer) -> Result<()> {
        let packet_id = match self.qos {
            QoS::AtMostOnce => None,
            _ => Some(self.packet_id.ok_or(Error::MissingPacketId)?),
        };
        buf.write_length_prefixed_string(&self.topic_name)?;
        if let Some(id) = packet_id {
            buf.write_short(id);
        }
        Ok(())
    }

    fn parse(buf: &mut Buffer, qos: QoS) -> Result<Self> {
        let topic_name = buf.read_length_prefixed_string()?;
        let packet_id = match qos {
            QoS::AtMostOnce => None,
            _ => Some(buf.read_short()?),
        };
        Ok(Self {
            topic_name,
            packet_id,
            qos,
        })
    }
}

/// PUBLISH payload: everything after the variable header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishPayload {
    /// Application message
    pub data: Bytes,
}

impl PublishPayload {
    /// Payload as UTF-8 text, if it is valid UTF-8
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

impl Section for PublishPayload {
    type Context = ();

    fn generate(&self, buf: &mut Buffer) -> Result<()> {
        buf.write_bytes(&self.data);
        Ok(())
    }

    fn parse(buf: &mut Buffer, (): ()) -> Result<Self> {
        Ok(Self {
            data: buf.read_remaining(),
        })
    }
}
