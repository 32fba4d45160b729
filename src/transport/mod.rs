//! Byte-stream transports
//!
//! The protocol session only needs three operations from the link: how many
//! bytes are waiting, an exact read of bytes already waiting, and a write.

mod memory;
mod serial;

pub use self::memory::MemoryTransport;
pub use self::serial::SerialTransport;

use crate::core::Result;

/// Duplex byte stream used by a protocol session
pub trait Transport {
    /// Number of bytes that can be read without blocking
    fn bytes_available(&mut self) -> Result<usize>;

    /// Fills `buf` completely, blocking if the bytes are not yet here
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Writes the whole buffer to the link
    fn write_all(&mut self, data: &[u8]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn bytes_available(&mut self) -> Result<usize> {
        (**self).bytes_available()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_exact(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_all(data)
    }
}
