//! The duplex byte-stream contract shared by every transport.
//!
//! A transport knows nothing about encoding: the protocol layer drives it with
//! raw byte slices. Framing is itself a transport that wraps another one.

use crate::error::TransportError;

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// A blocking, duplex byte stream.
///
/// Instances are owned by a single call sequence at a time and are not
/// synchronized internally.
pub trait Transport {
    /// Returns whether the transport currently holds a live connection.
    fn is_open(&self) -> bool;

    /// Opens the transport for reading and writing.
    fn open(&mut self) -> Result<()>;

    /// Closes the transport. Closing a closed transport is a no-op.
    fn close(&mut self) -> Result<()>;

    /// Reads up to `buf.len()` bytes, returning how many were read.
    ///
    /// Short reads are allowed; `Ok(0)` means the peer has nothing more to
    /// give right now (usually end of stream).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Fills `buf` completely or fails.
    fn read_all(&mut self, buf: &mut [u8]) -> Result<()> {
        read_all(self, buf)
    }

    /// Queues `buf` for writing, returning how many bytes were accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Pushes any buffered output to the underlying stream.
    fn flush(&mut self) -> Result<()>;

    /// Liveness hint: whether the remote side may still be feeding us.
    fn peek(&self) -> bool;
}

/// Reads exactly `buf.len()` bytes from `transport`.
///
/// Loops over [`Transport::read`] until the buffer is full and fails with an
/// end-of-file error as soon as a read yields zero bytes.
pub fn read_all<T: Transport + ?Sized>(transport: &mut T, buf: &mut [u8]) -> Result<()> {
    let size = buf.len();
    let mut got = 0;
    while got < size {
        let n = transport.read(&mut buf[got..])?;
        if n == 0 {
            return Err(TransportError::end_of_file(format!(
                "Cannot read. Remote side has closed. Tried to read {} bytes, but only got {} bytes.",
                size, got
            )));
        }
        got += n;
    }
    Ok(())
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn read_all(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_all(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn peek(&self) -> bool {
        (**self).peek()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn read_all(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_all(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn peek(&self) -> bool {
        (**self).peek()
    }
}

/// Owned, type-erased transport used where the concrete stack is chosen at
/// runtime.
pub type BoxedTransport = Box<dyn Transport + Send>;

/// Builds (or wraps) transports.
pub trait TransportFactory {
    fn get_transport(&self, base: BoxedTransport) -> BoxedTransport;
}

/// Factory that hands back the base transport untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughTransportFactory;

impl TransportFactory for PassThroughTransportFactory {
    fn get_transport(&self, base: BoxedTransport) -> BoxedTransport {
        base
    }
}
