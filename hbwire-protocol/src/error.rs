//! Protocol error types and the combined wire error.

use crate::application::{ApplicationError, ApplicationErrorKind};
use hbwire_transport::{TransportError, TransportErrorKind};
use std::fmt;
use thiserror::Error;

/// Protocol failure subtypes.
///
/// The numeric values are shared with other Thrift implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ProtocolErrorKind {
    Unknown = 0,
    InvalidData = 1,
    NegativeSize = 2,
    SizeLimit = 3,
    BadVersion = 4,
    NotImplemented = 5,
    DepthLimit = 6,
}

impl ProtocolErrorKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ProtocolErrorKind::InvalidData,
            2 => ProtocolErrorKind::NegativeSize,
            3 => ProtocolErrorKind::SizeLimit,
            4 => ProtocolErrorKind::BadVersion,
            5 => ProtocolErrorKind::NotImplemented,
            6 => ProtocolErrorKind::DepthLimit,
            _ => ProtocolErrorKind::Unknown,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ProtocolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolErrorKind::Unknown => write!(f, "UNKNOWN"),
            ProtocolErrorKind::InvalidData => write!(f, "INVALID_DATA"),
            ProtocolErrorKind::NegativeSize => write!(f, "NEGATIVE_SIZE"),
            ProtocolErrorKind::SizeLimit => write!(f, "SIZE_LIMIT"),
            ProtocolErrorKind::BadVersion => write!(f, "BAD_VERSION"),
            ProtocolErrorKind::NotImplemented => write!(f, "NOT_IMPLEMENTED"),
            ProtocolErrorKind::DepthLimit => write!(f, "DEPTH_LIMIT"),
        }
    }
}

/// Error raised while encoding or decoding.
#[derive(Debug, Error)]
#[error("protocol error ({kind}): {message}")]
pub struct ProtocolError {
    kind: ProtocolErrorKind,
    message: String,
    #[source]
    source: Option<TransportError>,
}

impl ProtocolError {
    pub fn new(kind: ProtocolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a generic failure message as an `Unknown` protocol error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ProtocolErrorKind::Unknown, message)
    }

    pub fn kind(&self) -> ProtocolErrorKind {
        self.kind
    }

    /// Numeric subtype as carried on the wire.
    pub fn subtype(&self) -> i32 {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The transport failure this error was derived from, if any.
    pub fn transport_error(&self) -> Option<&TransportError> {
        self.source.as_ref()
    }
}

impl From<TransportError> for ProtocolError {
    fn from(err: TransportError) -> Self {
        // A stream that ends mid-value leaves the value itself malformed.
        let kind = match err.kind() {
            TransportErrorKind::EndOfFile => ProtocolErrorKind::InvalidData,
            _ => ProtocolErrorKind::Unknown,
        };
        Self {
            kind,
            message: err.message().to_string(),
            source: Some(err),
        }
    }
}

impl From<std::str::Utf8Error> for ProtocolError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::new(
            ProtocolErrorKind::InvalidData,
            format!("invalid UTF-8 in string: {}", err),
        )
    }
}

/// Any failure surfaced by the protocol layer.
///
/// Transport failures are carried through unchanged; use
/// [`WireError::into_protocol`] when a single kind is needed.
#[derive(Debug, Error)]
pub enum WireError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Application(#[from] ApplicationError),
}

impl WireError {
    pub fn message(&self) -> &str {
        match self {
            WireError::Transport(e) => e.message(),
            WireError::Protocol(e) => e.message(),
            WireError::Application(e) => e.message(),
        }
    }

    /// Numeric subtype within the error's own kind.
    pub fn subtype(&self) -> i32 {
        match self {
            WireError::Transport(e) => e.subtype(),
            WireError::Protocol(e) => e.subtype(),
            WireError::Application(e) => e.subtype(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, WireError::Transport(_))
    }

    pub fn protocol_kind(&self) -> Option<ProtocolErrorKind> {
        match self {
            WireError::Protocol(e) => Some(e.kind()),
            _ => None,
        }
    }

    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            WireError::Transport(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Normalizes into a protocol error.
    pub fn into_protocol(self) -> ProtocolError {
        match self {
            WireError::Transport(e) => e.into(),
            WireError::Protocol(e) => e,
            WireError::Application(e) => {
                let kind = match e.kind() {
                    ApplicationErrorKind::ProtocolError => ProtocolErrorKind::InvalidData,
                    _ => ProtocolErrorKind::Unknown,
                };
                ProtocolError::new(kind, e.message())
            }
        }
    }
}

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, WireError>;
