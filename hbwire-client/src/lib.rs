//! # hbwire-client
//!
//! Client plumbing for hbwire.
//!
//! This crate provides:
//! - YAML and environment based client configuration
//! - Transport and protocol selection through their factories
//! - A blocking connection that matches replies to calls

pub mod config;
pub mod connection;
pub mod error;

pub use config::{
    ClientConfig, ConfigError, ProtocolKind, TransportKind, DEFAULT_CLIENT_MAX_SKIP_DEPTH,
};
pub use connection::{connect, protocol_factory, transport_factory, Connection};
pub use error::ClientError;
