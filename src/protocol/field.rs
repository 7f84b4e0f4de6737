//! Typed field operations shared by every packet section.
//!
//! Multi-byte integers are big-endian. Strings carry a 2-byte length prefix
//! holding the UTF-8 byte count.

use bytes::Bytes;

use super::{Buffer, Error, MAX_STRING_LEN, Result};

impl Buffer {
    /// Append a single byte
    pub fn write_byte(&mut self, value: u8) {
        self.put(&[value]);
    }

    /// Append raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.put(bytes);
    }

    /// Append a big-endian u16
    pub fn write_short(&mut self, value: u16) {
        self.put(&value.to_be_bytes());
    }

    /// Append a 2-byte length followed by the UTF-8 bytes of `value`.
    ///
    /// Nothing is written when the encoded string exceeds 65,535 bytes.
    pub fn write_length_prefixed_string(&mut self, value: &str) -> Result<()> {
        self.write_length_prefixed_bytes(value.as_bytes())
    }

    /// Append a 2-byte length followed by `bytes`
    pub fn write_length_prefixed_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u16::try_from(bytes.len()).map_err(|_| Error::LengthOverflow {
            length: bytes.len(),
            max: MAX_STRING_LEN,
        })?;
        self.write_short(len);
        self.put(bytes);
        Ok(())
    }

    /// Append another buffer's full contents
    pub fn write_buffer(&mut self, other: &Buffer) {
        self.put(other.as_slice());
    }

    /// Read one byte
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read exactly `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(self.take(n)?))
    }

    /// Read a big-endian u16
    pub fn read_short(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a 2-byte length then that many bytes as UTF-8
    pub fn read_length_prefixed_string(&mut self) -> Result<String> {
        let bytes = self.read_length_prefixed_bytes()?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Read a 2-byte length then that many raw bytes
    pub fn read_length_prefixed_bytes(&mut self) -> Result<Bytes> {
        let len = usize::from(self.read_short()?);
        self.read_bytes(len)
    }

    /// Read everything from the cursor to the end
    pub fn read_remaining(&mut self) -> Bytes {
        let n = self.remaining();
        // n never exceeds what is left
        Bytes::copy_from_slice(self.take(n).unwrap_or_default())
    }

    /// Read `n` bytes into a new independent buffer
    pub fn extract_sub_buffer(&mut self, n: usize) -> Result<Buffer> {
        Ok(Buffer::from(self.take(n)?))
    }
}

/// A variable header or payload: a record that serializes to and from a
/// region of a [`Buffer`].
///
/// `Context` carries what parsing needs from earlier sections, such as the
/// fixed-header QoS or the CONNECT flags.
pub trait Section: Sized {
    /// Information from preceding sections needed to parse this one
    type Context: Copy;

    /// Write fields in wire order
    fn generate(&self, buf: &mut Buffer) -> Result<()>;

    /// Read fields in wire order from the shared cursor
    fn parse(buf: &mut Buffer, context: Self::Context) -> Result<Self>;
}

/// Sections with no wire representation, such as the CONNACK payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Empty;

impl Section for Empty {
    type Context = ();

    fn generate(&self, _buf: &mut Buffer) -> Result<()> {
        Ok(())
    }

    fn parse(_buf: &mut Buffer, (): ()) -> Result<Self> {
        Ok(Self)
    }
}
