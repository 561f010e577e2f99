//! Bitrise MCP server: configuration, MCP handler and transports.
//!
//! The binary in `main.rs` is a thin wrapper; integration tests drive the same pieces in-process.

pub mod config;
pub mod error;
pub mod server;
pub mod transport;

pub use config::{Config, LogFormat, Mode};
pub use error::{Result, ServerError};
pub use server::BitriseServer;
