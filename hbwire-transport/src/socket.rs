//! Blocking TCP socket transport.

use crate::error::{TransportError, TransportErrorKind};
use crate::transport::{Result, Transport};
use bytes::BytesMut;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Initial capacity of the write accumulation buffer (4 KiB).
pub const DEFAULT_WRITE_BUFFER_CAPACITY: usize = 4 * 1024;

/// A TCP transport with per-operation deadlines.
///
/// Writes accumulate in memory until [`Transport::flush`] sends them in one
/// go. A zero timeout means operations block indefinitely.
#[derive(Debug)]
pub struct SocketTransport {
    addr: String,
    stream: Option<TcpStream>,
    write_buffer: BytesMut,
    timeout: Duration,
}

impl SocketTransport {
    /// Creates an unconnected socket for `addr` (`host:port`).
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            stream: None,
            write_buffer: BytesMut::with_capacity(DEFAULT_WRITE_BUFFER_CAPACITY),
            timeout,
        }
    }

    /// Wraps an already connected stream.
    pub fn from_stream(stream: TcpStream, timeout: Duration) -> Self {
        let addr = stream
            .peer_addr()
            .or_else(|_| stream.local_addr())
            .map(|a| a.to_string())
            .unwrap_or_default();
        Self {
            addr,
            stream: Some(stream),
            write_buffer: BytesMut::with_capacity(DEFAULT_WRITE_BUFFER_CAPACITY),
            timeout,
        }
    }

    /// Sets the per-operation timeout. Zero disables deadlines.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Target address as configured.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Borrows the live stream, if connected.
    pub fn stream(&self) -> Option<&TcpStream> {
        self.stream.as_ref()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.stream.as_ref().and_then(|s| s.local_addr().ok())
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.as_ref().and_then(|s| s.peer_addr().ok())
    }

    /// Number of bytes written but not yet flushed.
    pub fn pending(&self) -> usize {
        self.write_buffer.len()
    }

    /// Aborts the connection from the owning side.
    pub fn interrupt(&mut self) -> Result<()> {
        self.close()
    }

    fn deadline(&self) -> Option<Duration> {
        if self.timeout.is_zero() {
            None
        } else {
            Some(self.timeout)
        }
    }

    fn push_deadline(&self, read: bool, write: bool) -> Result<()> {
        let deadline = self.deadline();
        let stream = self.connected()?;
        if read {
            stream.set_read_timeout(deadline)?;
        }
        if write {
            stream.set_write_timeout(deadline)?;
        }
        Ok(())
    }

    fn connected(&self) -> Result<&TcpStream> {
        self.stream
            .as_ref()
            .ok_or_else(|| TransportError::not_open("Connection not open"))
    }

    fn resolve(&self) -> Result<Vec<SocketAddr>> {
        if self.addr.trim().is_empty() {
            return Err(TransportError::not_open("Cannot open empty address."));
        }
        let addrs: Vec<SocketAddr> = self
            .addr
            .to_socket_addrs()
            .map_err(|e| TransportError::not_open(format!("Cannot open bad address: {}", e)))?
            .collect();
        if addrs.is_empty() {
            return Err(TransportError::not_open("Cannot open bad address."));
        }
        Ok(addrs)
    }

    fn dial(&self, addrs: &[SocketAddr]) -> io::Result<TcpStream> {
        match self.deadline() {
            None => TcpStream::connect(addrs),
            Some(timeout) => {
                let mut last_err = None;
                for addr in addrs {
                    match TcpStream::connect_timeout(addr, timeout) {
                        Ok(stream) => return Ok(stream),
                        Err(e) => last_err = Some(e),
                    }
                }
                Err(last_err.unwrap_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "no addresses to connect to")
                }))
            }
        }
    }
}

impl Transport for SocketTransport {
    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(TransportError::new(
                TransportErrorKind::AlreadyOpen,
                "Socket already connected.",
            ));
        }
        let addrs = self.resolve()?;

        tracing::debug!("Connecting to {}...", self.addr);
        let stream = self.dial(&addrs).map_err(|e| {
            tracing::debug!("Connection to {} failed: {}", self.addr, e);
            TransportError::not_open(e.to_string())
        })?;

        stream.set_nodelay(true).ok();
        tracing::debug!("TCP connected to {}", self.addr);

        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };
        tracing::debug!("Closing connection to {}", self.addr);
        self.write_buffer.clear();
        match stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.push_deadline(true, false)?;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| TransportError::not_open("Connection not open"))?;
        loop {
            match stream.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.push_deadline(false, true)?;
        self.write_buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> {
        self.push_deadline(false, true)?;
        let data = self.write_buffer.split();
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| TransportError::not_open("Connection not open"))?;
        stream.write_all(&data)?;
        stream.flush()?;
        Ok(())
    }

    fn peek(&self) -> bool {
        self.is_open()
    }
}

impl Drop for SocketTransport {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
