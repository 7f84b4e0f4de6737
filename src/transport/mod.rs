//! Byte-stream collaborators around the codec: framing, packet identifiers
//! and a client session.

mod error;
mod framer;
mod session;
mod stream;

pub use error::TransportError;
pub use framer::PacketFramer;
pub use session::{PacketIdAllocator, Session, SessionConfig};
pub use stream::{StreamTransport, Transport};
