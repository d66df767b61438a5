//! # hbwire-protocol
//!
//! Thrift binary protocol for hbwire.
//!
//! This crate provides:
//! - Type tags, message and field metadata, record schemas
//! - The [`Protocol`] contract and its big-endian binary encoding
//! - Schema-less skipping of values with a recursion budget
//! - Application exceptions and the error model shared by all layers

pub mod application;
pub mod binary;
pub mod error;
pub mod field;
pub mod message;
pub mod protocol;
pub mod schema;
pub mod skip;
pub mod types;

pub use application::{ApplicationError, ApplicationErrorKind, APPLICATION_EXCEPTION_NAME};
pub use binary::{BinaryProtocol, BinaryProtocolConfig, BinaryProtocolFactory};
pub use error::{ProtocolError, ProtocolErrorKind, Result, WireError};
pub use field::{Field, FieldContainer};
pub use message::Message;
pub use protocol::{BoxedProtocol, Protocol, ProtocolFactory};
pub use schema::{ListHeader, MapHeader, SetHeader, StructSchema};
pub use skip::{skip, DEFAULT_MAX_SKIP_DEPTH};
pub use types::{MessageType, TypeTag};

/// Mask selecting the version half of a strict message header word.
pub const VERSION_MASK: u32 = 0xffff_0000;

/// Version word of strict binary message headers.
pub const VERSION_1: u32 = 0x8001_0000;
