//! Client error types.

use crate::config::ConfigError;
use hbwire_protocol::{ProtocolError, WireError};
use hbwire_transport::TransportError;
use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Wire(#[from] WireError),
}

impl ClientError {
    /// The wire failure behind this error, if any.
    pub fn wire(&self) -> Option<&WireError> {
        match self {
            ClientError::Wire(e) => Some(e),
            ClientError::Config(_) => None,
        }
    }

    /// Returns whether reconnecting could help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Wire(WireError::Transport(_)))
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        ClientError::Wire(err.into())
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        ClientError::Wire(err.into())
    }
}
