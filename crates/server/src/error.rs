//! Error types for the server binary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A transport failed to start or stopped with an error
    #[error("Startup error: {0}")]
    Startup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] bitrise_mcp_scope::CatalogError),

    #[error("Tool error: {0}")]
    Tools(#[from] bitrise_mcp_http_tools::HttpToolsError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
