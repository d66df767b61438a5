//! Length-prefixed framing over any transport.
//!
//! Frame layout:
//!
//! ```text
//! +-------------+---------------------+
//! | frame size  | payload             |
//! | 4 bytes BE  | frame size bytes    |
//! +-------------+---------------------+
//! ```
//!
//! Writes are buffered until [`Transport::flush`], which emits one frame.
//! Reads are served out of the current frame; a new frame is pulled from the
//! inner transport only once the current one is drained.

use crate::error::TransportError;
use crate::transport::{
    BoxedTransport, PassThroughTransportFactory, Result, Transport, TransportFactory,
};
use crate::DEFAULT_MAX_FRAME_SIZE;
use bytes::{Buf, Bytes, BytesMut};
use std::fmt;

/// Size of the frame length prefix in bytes.
pub const FRAME_HEADER_SIZE: usize = 4;

/// Initial capacity of the outbound frame buffer (1 KiB).
const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Wraps a transport with 4-byte big-endian length framing.
#[derive(Debug)]
pub struct FramedTransport<T> {
    inner: T,
    write_buffer: BytesMut,
    read_buffer: Bytes,
    max_frame_size: usize,
}

impl<T: Transport> FramedTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            write_buffer: BytesMut::with_capacity(DEFAULT_BUFFER_CAPACITY),
            read_buffer: Bytes::new(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Caps the accepted frame size in both directions.
    pub fn with_max_frame_size(mut self, max: usize) -> Self {
        self.max_frame_size = max;
        self
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwraps the inner transport, discarding buffered state.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Bytes left in the current inbound frame.
    pub fn buffered(&self) -> usize {
        self.read_buffer.len()
    }

    /// Bytes waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.write_buffer.len()
    }

    fn read_frame(&mut self) -> Result<usize> {
        let mut header = [0u8; FRAME_HEADER_SIZE];
        self.inner.read_all(&mut header)?;

        let size = i32::from_be_bytes(header);
        if size < 0 {
            tracing::warn!("Rejecting frame with negative size {}", size);
            return Err(TransportError::unknown(format!(
                "Read a negative frame size ({})",
                size
            )));
        }

        let size = size as usize;
        if size > self.max_frame_size {
            tracing::warn!(
                "Rejecting frame of {} bytes (max {})",
                size,
                self.max_frame_size
            );
            return Err(TransportError::unknown(format!(
                "Frame size ({}) larger than max length ({})",
                size, self.max_frame_size
            )));
        }

        let mut frame = vec![0u8; size];
        self.inner.read_all(&mut frame)?;
        self.read_buffer = Bytes::from(frame);
        tracing::trace!("Read frame of {} bytes", size);
        Ok(size)
    }

    fn write_to_inner(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            let n = self.inner.write(buf)?;
            if n == 0 {
                return Err(TransportError::unknown(format!(
                    "Inner transport accepted 0 of {} bytes",
                    buf.len()
                )));
            }
            buf = &buf[n..];
        }
        Ok(())
    }
}

impl<T: Transport> Transport for FramedTransport<T> {
    fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    fn open(&mut self) -> Result<()> {
        self.inner.open()
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.read_buffer.is_empty() {
            self.read_frame()?;
        }
        let n = buf.len().min(self.read_buffer.len());
        self.read_buffer.copy_to_slice(&mut buf[..n]);
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.write_buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        let payload = self.write_buffer.split().freeze();
        let size = payload.len();
        if size > self.max_frame_size || size > i32::MAX as usize {
            return Err(TransportError::unknown(format!(
                "Frame size ({}) larger than max length ({})",
                size, self.max_frame_size
            )));
        }

        self.write_to_inner(&(size as u32).to_be_bytes())?;
        if size > 0 {
            self.write_to_inner(&payload)?;
        }
        tracing::trace!("Flushed frame of {} bytes", size);
        self.inner.flush()
    }

    fn peek(&self) -> bool {
        !self.read_buffer.is_empty() || self.inner.peek()
    }
}

/// Wraps every produced transport in [`FramedTransport`].
///
/// The base transport first passes through an inner factory, so layered
/// stacks compose; [`FramedTransportFactory::new`] frames the base directly.
pub struct FramedTransportFactory {
    inner: Box<dyn TransportFactory>,
    max_frame_size: usize,
}

impl FramedTransportFactory {
    pub fn new() -> Self {
        Self::wrapping(PassThroughTransportFactory)
    }

    /// Frames whatever `inner` builds from the base transport.
    pub fn wrapping(inner: impl TransportFactory + 'static) -> Self {
        Self {
            inner: Box::new(inner),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    pub fn with_max_frame_size(mut self, max: usize) -> Self {
        self.max_frame_size = max;
        self
    }
}

impl Default for FramedTransportFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FramedTransportFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramedTransportFactory")
            .field("max_frame_size", &self.max_frame_size)
            .finish_non_exhaustive()
    }
}

impl TransportFactory for FramedTransportFactory {
    fn get_transport(&self, base: BoxedTransport) -> BoxedTransport {
        let inner = self.inner.get_transport(base);
        Box::new(FramedTransport::new(inner).with_max_frame_size(self.max_frame_size))
    }
}
