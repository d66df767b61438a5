//! # hbwire-transport
//!
//! Byte-stream transports for the hbwire protocol stack.
//!
//! This crate provides:
//! - The [`Transport`] contract and the reusable [`read_all`] algorithm
//! - A blocking TCP transport with per-operation deadlines
//! - Length-prefixed framing that wraps any other transport
//! - An in-memory loopback transport
//! - Transport error subtypes shared with other Thrift implementations

pub mod error;
pub mod framed;
pub mod memory;
pub mod socket;
pub mod transport;

pub use error::{TransportError, TransportErrorKind};
pub use framed::{FramedTransport, FramedTransportFactory, FRAME_HEADER_SIZE};
pub use memory::MemoryTransport;
pub use socket::SocketTransport;
pub use transport::{
    read_all, BoxedTransport, PassThroughTransportFactory, Result, Transport, TransportFactory,
};

/// Maximum frame payload size accepted by default (16 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;
