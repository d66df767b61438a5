//! In-process loopback transport.

use crate::error::TransportError;
use crate::transport::{Result, Transport};
use bytes::{Buf, Bytes, BytesMut};

/// A byte buffer that reads back what was written to it.
///
/// Writes append to the tail, reads consume from the head. Useful for
/// decoding captured payloads and for exercising codecs without a socket.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    buffer: BytesMut,
    open: bool,
}

impl MemoryTransport {
    /// Creates an empty, open transport.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            open: true,
        }
    }

    /// Creates an open transport pre-loaded with `data`.
    pub fn from_bytes(data: impl AsRef<[u8]>) -> Self {
        Self {
            buffer: BytesMut::from(data.as_ref()),
            open: true,
        }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buffer.len()
    }

    /// Borrows the unread bytes without consuming them.
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Takes every unread byte, leaving the buffer empty.
    pub fn take_bytes(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    fn check_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(TransportError::not_open("Connection not open"))
        }
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    fn is_open(&self) -> bool {
        self.open
    }

    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.check_open()?;
        let n = buf.len().min(self.buffer.len());
        buf[..n].copy_from_slice(&self.buffer[..n]);
        self.buffer.advance(n);
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.check_open()?;
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.check_open()
    }

    fn peek(&self) -> bool {
        !self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportErrorKind;

    #[test]
    fn test_loopback() {
        let mut t = MemoryTransport::new();
        assert!(!t.peek());
        t.write(b"hello").unwrap();
        t.write(b" world").unwrap();
        assert_eq!(t.remaining(), 11);
        assert!(t.peek());

        let mut buf = [0u8; 5];
        t.read_all(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        assert_eq!(t.bytes(), b" world");
        assert_eq!(t.take_bytes().as_ref(), b" world");
        assert_eq!(t.remaining(), 0);
    }

    #[test]
    fn test_short_read_and_eof() {
        let mut t = MemoryTransport::from_bytes([1u8, 2]);
        let mut buf = [0u8; 4];
        assert_eq!(t.read(&mut buf).unwrap(), 2);
        assert_eq!(t.read(&mut buf).unwrap(), 0);

        let mut t = MemoryTransport::from_bytes([1u8, 2]);
        let err = t.read_all(&mut buf).unwrap_err();
        assert_eq!(err.kind(), TransportErrorKind::EndOfFile);
    }

    #[test]
    fn test_open_close() {
        let mut t = MemoryTransport::default();
        assert!(t.is_open());
        t.close().unwrap();
        assert!(!t.is_open());
        t.open().unwrap();
        assert!(t.is_open());
    }

    #[test]
    fn test_closed_rejects_io() {
        let mut t = MemoryTransport::from_bytes(b"abc");
        t.close().unwrap();

        let mut buf = [0u8; 3];
        let err = t.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), TransportErrorKind::NotOpen);
        assert_eq!(t.write(b"def").unwrap_err().kind(), TransportErrorKind::NotOpen);
        assert_eq!(t.flush().unwrap_err().kind(), TransportErrorKind::NotOpen);
        assert_eq!(buf, [0u8; 3]);
        assert_eq!(t.bytes(), b"abc");

        // Reopening resumes where the buffer left off.
        t.open().unwrap();
        t.read_all(&mut buf).unwrap();
        assert_eq!(&buf, b"abc");
    }
}
