//! Append-only byte buffer with an independent read cursor.
//!
//! Writes always append to the end; reads consume from `offset` forward.
//! Typed field operations live in [`field`](super::field).

use bytes::{Bytes, BytesMut};

use super::{Error, Result};

/// Growable byte sequence plus a read offset (`0 <= offset <= len`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    data: BytesMut,
    offset: usize,
}

impl Buffer {
    /// Create an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` bytes
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            offset: 0,
        }
    }

    /// Total bytes written
    #[must_use]
    pub fn length(&self) -> usize {
        self.data.len()
    }

    /// Check whether nothing has been written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current read offset
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left between the cursor and the end
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Borrow the full contents regardless of the cursor
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Copy the full contents into a new buffer with its offset reset
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            data: self.data.clone(),
            offset: 0,
        }
    }

    /// Consume the buffer into immutable bytes
    #[must_use]
    pub fn to_bytes(self) -> Bytes {
        self.data.freeze()
    }

    pub(crate) fn put(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Borrow the next `n` bytes and advance past them
    pub(crate) fn take(&mut self, n: usize) -> Result<&[u8]> {
        let available = self.remaining();
        if n > available {
            return Err(Error::BufferUnderrun {
                needed: n,
                available,
            });
        }
        let start = self.offset;
        self.offset += n;
        Ok(&self.data[start..self.offset])
    }
}

impl From<&[u8]> for Buffer {
    fn from(bytes: &[u8]) -> Self {
        Self {
            data: BytesMut::from(bytes),
            offset: 0,
        }
    }
}

impl From<Bytes> for Buffer {
    fn from(bytes: Bytes) -> Self {
        Self {
            data: BytesMut::from(bytes.as_ref()),
            offset: 0,
        }
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            data: BytesMut::from(bytes.as_slice()),
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_advances_cursor() {
        let mut buf = Buffer::from(&[1u8, 2, 3][..]);
        assert_eq!(buf.take(2).unwrap(), &[1, 2]);
        assert_eq!(buf.offset(), 2);
        assert_eq!(buf.remaining(), 1);
    }

    #[test]
    fn test_take_past_end_fails() {
        let mut buf = Buffer::from(&[1u8][..]);
        let result = buf.take(2);
        assert!(matches!(
            result,
            Err(Error::BufferUnderrun {
                needed: 2,
                available: 1
            })
        ));
        assert_eq!(buf.offset(), 0);
    }

    #[test]
    fn test_duplicate_resets_offset() {
        let mut buf = Buffer::from(vec![9u8, 8, 7]);
        buf.take(2).unwrap();
        let copy = buf.duplicate();
        assert_eq!(copy.offset(), 0);
        assert_eq!(copy.as_slice(), buf.as_slice());
        assert_eq!(buf.offset(), 2);
    }

    #[test]
    fn test_writes_append_after_reads() {
        let mut buf = Buffer::new();
        buf.put(&[1, 2]);
        buf.take(1).unwrap();
        buf.put(&[3]);
        assert_eq!(buf.length(), 3);
        assert_eq!(buf.to_bytes().as_ref(), &[1, 2, 3]);
    }
}
