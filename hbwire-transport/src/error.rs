//! Transport error type and subtype codes.

use std::fmt;
use std::io;
use thiserror::Error;

/// Transport failure subtypes.
///
/// The numeric values are part of the wire contract shared with other
/// Thrift implementations and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TransportErrorKind {
    Unknown = 0,
    NotOpen = 1,
    AlreadyOpen = 2,
    TimedOut = 3,
    EndOfFile = 4,
}

impl TransportErrorKind {
    /// Maps a raw subtype code, falling back to `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => TransportErrorKind::NotOpen,
            2 => TransportErrorKind::AlreadyOpen,
            3 => TransportErrorKind::TimedOut,
            4 => TransportErrorKind::EndOfFile,
            _ => TransportErrorKind::Unknown,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Unknown => write!(f, "UNKNOWN"),
            TransportErrorKind::NotOpen => write!(f, "NOT_OPEN"),
            TransportErrorKind::AlreadyOpen => write!(f, "ALREADY_OPEN"),
            TransportErrorKind::TimedOut => write!(f, "TIMED_OUT"),
            TransportErrorKind::EndOfFile => write!(f, "END_OF_FILE"),
        }
    }
}

/// Error raised by a transport.
#[derive(Debug, Error)]
#[error("transport error ({kind}): {message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
    #[source]
    source: Option<io::Error>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a generic failure message as an `Unknown` transport error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unknown, message)
    }

    pub fn not_open(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::NotOpen, message)
    }

    pub fn end_of_file(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::EndOfFile, message)
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// Numeric subtype as carried on the wire.
    pub fn subtype(&self) -> i32 {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether the failure was a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::TimedOut
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::UnexpectedEof => TransportErrorKind::EndOfFile,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TransportErrorKind::TimedOut,
            io::ErrorKind::NotConnected => TransportErrorKind::NotOpen,
            _ => TransportErrorKind::Unknown,
        };
        Self {
            kind,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_kind_codes_are_stable() {
        assert_eq!(TransportErrorKind::Unknown.code(), 0);
        assert_eq!(TransportErrorKind::NotOpen.code(), 1);
        assert_eq!(TransportErrorKind::AlreadyOpen.code(), 2);
        assert_eq!(TransportErrorKind::TimedOut.code(), 3);
        assert_eq!(TransportErrorKind::EndOfFile.code(), 4);

        for code in 0..5 {
            assert_eq!(TransportErrorKind::from_code(code).code(), code);
        }
        assert_eq!(TransportErrorKind::from_code(42), TransportErrorKind::Unknown);
    }

    #[test]
    fn test_from_io_error() {
        let err = TransportError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert_eq!(err.kind(), TransportErrorKind::EndOfFile);
        assert!(err.source().is_some());

        let err = TransportError::from(io::Error::new(io::ErrorKind::WouldBlock, "slow"));
        assert!(err.is_timeout());

        let err = TransportError::from(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert!(err.is_timeout());

        let err = TransportError::from(io::Error::new(io::ErrorKind::NotConnected, "gone"));
        assert_eq!(err.kind(), TransportErrorKind::NotOpen);

        let err = TransportError::from(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert_eq!(err.kind(), TransportErrorKind::Unknown);
        assert_eq!(err.message(), "no");
    }

    #[test]
    fn test_display() {
        let err = TransportError::not_open("Connection not open");
        let msg = err.to_string();
        assert!(msg.contains("NOT_OPEN"));
        assert!(msg.contains("Connection not open"));
        assert_eq!(err.subtype(), 1);
    }
}
