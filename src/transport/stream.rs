//! Byte-stream transport seam and a blocking `Read + Write` adapter.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Byte-stream collaborator used by a session.
///
/// `recv` may return any number of bytes; packet boundaries are recovered
/// by the session's framer. `Ok(0)` means the peer closed the stream.
pub trait Transport {
    /// Send a complete buffer.
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Receive up to `buf.len()` bytes.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Transport over any blocking stream, such as a `TcpStream`.
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
}

impl<S: Read + Write> StreamTransport<S> {
    /// Wrap an established stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl StreamTransport<TcpStream> {
    /// Connect to a broker over TCP.
    pub fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// Set socket read timeout.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_read_timeout(timeout)
    }

    /// Set socket write timeout.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_write_timeout(timeout)
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}
