//! Client configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via HBWIRE_CONFIG)
//! 3. Environment variables

use hbwire_protocol::BinaryProtocolConfig;
use hbwire_transport::DEFAULT_MAX_FRAME_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default server address (the conventional Thrift gateway port).
pub const DEFAULT_ADDR: &str = "127.0.0.1:9090";

/// Default per-operation socket deadline in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default nesting budget when skipping values received from a peer.
///
/// The protocol layer alone leaves skipping effectively unbounded; clients
/// decode untrusted input and need a limit well below the stack's capacity.
pub const DEFAULT_CLIENT_MAX_SKIP_DEPTH: usize = 64;

/// Byte transport layered over the TCP socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Raw buffered socket.
    #[default]
    Socket,
    /// Length-prefixed frames over the socket.
    Framed,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "socket" | "buffered" => Ok(TransportKind::Socket),
            "framed" => Ok(TransportKind::Framed),
            other => Err(ConfigError::Validation(format!(
                "unknown transport '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Socket => write!(f, "socket"),
            TransportKind::Framed => write!(f, "framed"),
        }
    }
}

/// Wire encoding spoken over the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    #[default]
    Binary,
    /// Recognized so configurations can name it; connecting fails.
    Compact,
}

impl FromStr for ProtocolKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" => Ok(ProtocolKind::Binary),
            "compact" => Ok(ProtocolKind::Compact),
            other => Err(ConfigError::Validation(format!(
                "unknown protocol '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolKind::Binary => write!(f, "binary"),
            ProtocolKind::Compact => write!(f, "compact"),
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address as `host:port`.
    pub addr: String,
    /// Socket deadline in milliseconds; 0 disables it.
    pub timeout_ms: u64,
    pub transport: TransportKind,
    pub protocol: ProtocolKind,
    /// Reject message headers without a version word.
    pub strict_read: bool,
    /// Write versioned message headers.
    pub strict_write: bool,
    /// Recursion budget when skipping unknown values.
    pub max_skip_depth: usize,
    /// Byte budget for primitive reads; unset means unbounded.
    pub read_length: Option<usize>,
    /// Largest frame accepted or produced by the framed transport.
    pub max_frame_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            transport: TransportKind::default(),
            protocol: ProtocolKind::default(),
            strict_read: false,
            strict_write: true,
            max_skip_depth: DEFAULT_CLIENT_MAX_SKIP_DEPTH,
            read_length: None,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("HBWIRE_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: ClientConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("HBWIRE_ADDR") {
            self.addr = addr;
        }

        if let Ok(timeout) = std::env::var("HBWIRE_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                self.timeout_ms = ms;
            }
        }

        if let Ok(transport) = std::env::var("HBWIRE_TRANSPORT") {
            match transport.parse() {
                Ok(kind) => self.transport = kind,
                Err(e) => tracing::warn!("Ignoring HBWIRE_TRANSPORT: {}", e),
            }
        }

        if let Ok(protocol) = std::env::var("HBWIRE_PROTOCOL") {
            match protocol.parse() {
                Ok(kind) => self.protocol = kind,
                Err(e) => tracing::warn!("Ignoring HBWIRE_PROTOCOL: {}", e),
            }
        }

        if let Ok(strict) = std::env::var("HBWIRE_STRICT_READ") {
            self.strict_read = strict == "1" || strict.to_lowercase() == "true";
        }

        if let Ok(depth) = std::env::var("HBWIRE_MAX_SKIP_DEPTH") {
            if let Ok(n) = depth.parse() {
                self.max_skip_depth = n;
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addr.trim().is_empty() {
            return Err(ConfigError::Validation("addr must not be empty".to_string()));
        }
        if self.max_frame_size == 0 {
            return Err(ConfigError::Validation(
                "max_frame_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the socket deadline as Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Protocol settings derived from this configuration.
    pub fn binary_protocol_config(&self) -> BinaryProtocolConfig {
        BinaryProtocolConfig {
            strict_read: self.strict_read,
            strict_write: self.strict_write,
            read_length: self.read_length,
            max_skip_depth: self.max_skip_depth,
        }
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {}", .0.display(), .1)]
    Parse(PathBuf, String),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
