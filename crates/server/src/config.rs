//! Command-line / environment configuration.

use crate::error::{Result, ServerError};
use bitrise_mcp_http_tools::{DEFAULT_API_BASE_URL, DEFAULT_RELEASE_MANAGEMENT_BASE_URL};
use bitrise_mcp_scope::{GroupMap, parse_group_list};
use clap::{Parser, ValueEnum};
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Which transport the server runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Stdio,
    Http(SocketAddr),
}

#[derive(Debug, Clone, Parser)]
#[command(name = "bitrise-mcp", version, about = "MCP server for the Bitrise API")]
pub struct Config {
    /// Serve streamable HTTP on this address; stdio is used when unset.
    #[arg(long, env = "ADDR")]
    pub addr: Option<SocketAddr>,

    /// Bitrise personal access token, sent as the upstream `Authorization` header.
    #[arg(long, env = "BITRISE_TOKEN", hide_env_values = true)]
    pub bitrise_token: Option<String>,

    #[arg(long, env = "BITRISE_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Base URL of the Release Management API.
    #[arg(
        long,
        env = "BITRISE_RELEASE_MANAGEMENT_BASE_URL",
        default_value = DEFAULT_RELEASE_MANAGEMENT_BASE_URL
    )]
    pub release_management_base_url: String,

    /// Comma-separated API groups whose tools are registered (default: all).
    #[arg(long, env = "ENABLED_API_GROUPS")]
    pub enabled_api_groups: Option<String>,

    /// YAML file mapping group names to tool names.
    #[arg(long, env = "API_GROUPS_FILE")]
    pub api_groups_file: Option<PathBuf>,

    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 30)]
    pub upstream_timeout_secs: u64,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
}

impl Config {
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.addr.map_or(Mode::Stdio, Mode::Http)
    }

    /// Startup group restriction; empty means "every group".
    #[must_use]
    pub fn enabled_groups(&self) -> BTreeSet<String> {
        self.enabled_api_groups
            .as_deref()
            .map(parse_group_list)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// # Errors
    ///
    /// Returns [`ServerError::Config`] when stdio mode has no token, the enabled group list
    /// names no group, or the upstream timeout is zero.
    pub fn validate(&self) -> Result<()> {
        let has_token = self
            .bitrise_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if self.mode() == Mode::Stdio && !has_token {
            return Err(ServerError::Config(
                "BITRISE_TOKEN must be provided in stdio transport mode".to_string(),
            ));
        }
        if self.enabled_api_groups.is_some() && self.enabled_groups().is_empty() {
            return Err(ServerError::Config(
                "ENABLED_API_GROUPS is set but names no group".to_string(),
            ));
        }
        if self.upstream_timeout_secs == 0 {
            return Err(ServerError::Config(
                "UPSTREAM_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured group file, if any.
    ///
    /// # Errors
    ///
    /// Returns an IO or YAML error if the file cannot be read or parsed.
    pub fn load_group_map(&self) -> Result<Option<GroupMap>> {
        self.api_groups_file
            .as_deref()
            .map(load_group_file)
            .transpose()
    }
}

/// Read a `group: [tool, ...]` YAML mapping.
///
/// # Errors
///
/// Returns an IO or YAML error if the file cannot be read or parsed.
pub fn load_group_file(path: &Path) -> Result<GroupMap> {
    let raw = std::fs::read_to_string(path)?;
    let groups: GroupMap = serde_yaml::from_str(&raw)?;
    tracing::info!(path = %path.display(), groups = groups.group_names().count(), "loaded API group mapping");
    Ok(groups)
}
