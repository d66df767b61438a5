//! Application-level exceptions and their wire representation.
//!
//! An application exception travels as an ordinary record:
//!
//! ```text
//! struct TApplicationException {
//!   1: string message   (omitted when empty)
//!   2: i32    type
//! }
//! ```

use crate::error::{ProtocolError, Result, WireError};
use crate::field::Field;
use crate::protocol::Protocol;
use crate::schema::StructSchema;
use crate::types::TypeTag;
use std::fmt;
use thiserror::Error;

/// Record name used on the wire.
pub const APPLICATION_EXCEPTION_NAME: &str = "TApplicationException";

const MESSAGE_FIELD_ID: i16 = 1;
const TYPE_FIELD_ID: i16 = 2;

/// Application failure subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ApplicationErrorKind {
    Unknown = 0,
    UnknownMethod = 1,
    InvalidMessageType = 2,
    WrongMethodName = 3,
    BadSequenceId = 4,
    MissingResult = 5,
    InternalError = 6,
    ProtocolError = 7,
}

impl ApplicationErrorKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ApplicationErrorKind::UnknownMethod,
            2 => ApplicationErrorKind::InvalidMessageType,
            3 => ApplicationErrorKind::WrongMethodName,
            4 => ApplicationErrorKind::BadSequenceId,
            5 => ApplicationErrorKind::MissingResult,
            6 => ApplicationErrorKind::InternalError,
            7 => ApplicationErrorKind::ProtocolError,
            _ => ApplicationErrorKind::Unknown,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ApplicationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationErrorKind::Unknown => write!(f, "UNKNOWN"),
            ApplicationErrorKind::UnknownMethod => write!(f, "UNKNOWN_METHOD"),
            ApplicationErrorKind::InvalidMessageType => write!(f, "INVALID_MESSAGE_TYPE"),
            ApplicationErrorKind::WrongMethodName => write!(f, "WRONG_METHOD_NAME"),
            ApplicationErrorKind::BadSequenceId => write!(f, "BAD_SEQUENCE_ID"),
            ApplicationErrorKind::MissingResult => write!(f, "MISSING_RESULT"),
            ApplicationErrorKind::InternalError => write!(f, "INTERNAL_ERROR"),
            ApplicationErrorKind::ProtocolError => write!(f, "PROTOCOL_ERROR"),
        }
    }
}

/// Error reported by the remote RPC layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("application error ({kind}): {message}")]
pub struct ApplicationError {
    kind: ApplicationErrorKind,
    message: String,
}

impl ApplicationError {
    pub fn new(kind: ApplicationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ApplicationErrorKind {
        self.kind
    }

    /// Numeric subtype as carried on the wire.
    pub fn subtype(&self) -> i32 {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Wire schema of the exception record.
    pub fn schema() -> StructSchema {
        StructSchema::new(
            APPLICATION_EXCEPTION_NAME,
            vec![
                Field::new("message", TypeTag::String, MESSAGE_FIELD_ID),
                Field::new("type", TypeTag::I32, TYPE_FIELD_ID),
            ],
        )
    }

    /// Decodes an exception record.
    ///
    /// Unrecognized fields are skipped; absent fields default to an empty
    /// message and the `Unknown` subtype.
    pub fn read<P: Protocol + ?Sized>(protocol: &mut P) -> Result<Self> {
        let mut message = String::new();
        let mut kind = ApplicationErrorKind::Unknown;

        protocol.read_struct_begin()?;
        loop {
            let field = protocol.read_field_begin()?;
            if field.is_stop() {
                break;
            }
            match (field.id(), field.type_tag()) {
                (MESSAGE_FIELD_ID, TypeTag::String) => message = protocol.read_string()?,
                (TYPE_FIELD_ID, TypeTag::I32) => {
                    kind = ApplicationErrorKind::from_code(protocol.read_i32()?)
                }
                (_, other) => protocol.skip(other)?,
            }
            protocol.read_field_end()?;
        }
        protocol.read_struct_end()?;

        Ok(Self { kind, message })
    }

    /// Encodes this exception as a record.
    pub fn write<P: Protocol + ?Sized>(&self, protocol: &mut P) -> Result<()> {
        let schema = Self::schema();
        let fields = schema.fields();

        protocol.write_struct_begin(schema.name())?;
        if !self.message.is_empty() {
            if let Some(field) = fields.by_id(MESSAGE_FIELD_ID) {
                protocol.write_field_begin(field)?;
                protocol.write_string(&self.message)?;
                protocol.write_field_end()?;
            }
        }
        if let Some(field) = fields.by_id(TYPE_FIELD_ID) {
            protocol.write_field_begin(field)?;
            protocol.write_i32(self.kind.code())?;
            protocol.write_field_end()?;
        }
        protocol.write_field_stop()?;
        protocol.write_struct_end()
    }
}

impl Default for ApplicationError {
    fn default() -> Self {
        Self::new(ApplicationErrorKind::Unknown, "")
    }
}

impl From<ProtocolError> for ApplicationError {
    fn from(err: ProtocolError) -> Self {
        Self::new(ApplicationErrorKind::ProtocolError, err.message())
    }
}

impl From<WireError> for ApplicationError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::Application(e) => e,
            WireError::Protocol(e) => e.into(),
            WireError::Transport(e) => Self::new(ApplicationErrorKind::InternalError, e.message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::BinaryProtocol;
    use crate::error::ProtocolErrorKind;
    use crate::schema::ListHeader;
    use hbwire_transport::MemoryTransport;

    fn protocol() -> BinaryProtocol<MemoryTransport> {
        BinaryProtocol::new(MemoryTransport::new())
    }

    #[test]
    fn test_kind_codes_are_stable() {
        for code in 0..8 {
            assert_eq!(ApplicationErrorKind::from_code(code).code(), code);
        }
        assert_eq!(
            ApplicationErrorKind::from_code(99),
            ApplicationErrorKind::Unknown
        );
        assert_eq!(ApplicationErrorKind::BadSequenceId.code(), 4);
        assert_eq!(
            ApplicationErrorKind::InvalidMessageType.to_string(),
            "INVALID_MESSAGE_TYPE"
        );
    }

    #[test]
    fn test_write_layout() {
        let mut p = protocol();
        ApplicationError::new(ApplicationErrorKind::UnknownMethod, "no such method")
            .write(&mut p)
            .unwrap();

        let mut expected = vec![11u8, 0, 1, 0, 0, 0, 14];
        expected.extend_from_slice(b"no such method");
        expected.extend_from_slice(&[8, 0, 2, 0, 0, 0, 1, 0]);
        assert_eq!(p.transport_ref().bytes(), expected.as_slice());
    }

    #[test]
    fn test_empty_message_is_omitted() {
        let mut p = protocol();
        ApplicationError::new(ApplicationErrorKind::MissingResult, "")
            .write(&mut p)
            .unwrap();
        assert_eq!(p.transport_ref().bytes(), &[8, 0, 2, 0, 0, 0, 5, 0]);

        let decoded = ApplicationError::read(&mut p).unwrap();
        assert_eq!(decoded.kind(), ApplicationErrorKind::MissingResult);
        assert_eq!(decoded.message(), "");
    }

    #[test]
    fn test_roundtrip() {
        let original = ApplicationError::new(ApplicationErrorKind::BadSequenceId, "seq 4 != 5");
        let mut p = protocol();
        original.write(&mut p).unwrap();
        assert_eq!(ApplicationError::read(&mut p).unwrap(), original);
        assert_eq!(p.transport_ref().remaining(), 0);
    }

    #[test]
    fn test_read_defaults_and_skips_unknown_fields() {
        let mut p = protocol();
        p.write_struct_begin("TApplicationException").unwrap();
        p.write_field_begin(&Field::unnamed(TypeTag::List, 7)).unwrap();
        p.write_list_begin(&ListHeader::new(TypeTag::I64, 2)).unwrap();
        p.write_i64(1).unwrap();
        p.write_i64(2).unwrap();
        p.write_list_end().unwrap();
        p.write_field_end().unwrap();
        // Known id, wrong type: skipped rather than misread.
        p.write_field_begin(&Field::unnamed(TypeTag::I64, 2)).unwrap();
        p.write_i64(6).unwrap();
        p.write_field_end().unwrap();
        p.write_field_stop().unwrap();
        p.write_struct_end().unwrap();

        let decoded = ApplicationError::read(&mut p).unwrap();
        assert_eq!(decoded, ApplicationError::default());
        assert_eq!(p.transport_ref().remaining(), 0);
    }

    #[test]
    fn test_fields_in_any_order() {
        let mut p = protocol();
        p.write_field_begin(&Field::unnamed(TypeTag::I32, 2)).unwrap();
        p.write_i32(6).unwrap();
        p.write_field_begin(&Field::unnamed(TypeTag::String, 1)).unwrap();
        p.write_string("boom").unwrap();
        p.write_field_stop().unwrap();

        let decoded = ApplicationError::read(&mut p).unwrap();
        assert_eq!(decoded.kind(), ApplicationErrorKind::InternalError);
        assert_eq!(decoded.message(), "boom");
    }

    #[test]
    fn test_truncated_record_fails() {
        let mut p = protocol();
        p.write_field_begin(&Field::unnamed(TypeTag::I32, 2)).unwrap();
        let err = ApplicationError::read(&mut p).unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_conversions() {
        let from_protocol = ApplicationError::from(ProtocolError::new(
            ProtocolErrorKind::InvalidData,
            "garbage",
        ));
        assert_eq!(from_protocol.kind(), ApplicationErrorKind::ProtocolError);
        assert_eq!(from_protocol.message(), "garbage");

        let from_transport = ApplicationError::from(WireError::from(
            hbwire_transport::TransportError::not_open("closed"),
        ));
        assert_eq!(from_transport.kind(), ApplicationErrorKind::InternalError);
        assert_eq!(from_transport.subtype(), 6);
    }

    #[test]
    fn test_schema() {
        let schema = ApplicationError::schema();
        assert_eq!(schema.name(), APPLICATION_EXCEPTION_NAME);
        assert_eq!(schema.field_named("type").unwrap().id(), 2);
    }
}
