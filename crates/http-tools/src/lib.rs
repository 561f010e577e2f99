//! Bitrise API tools over HTTP.
//!
//! - [`tool`]: declarative tool definitions (parameters, schema, annotations, request assembly)
//! - [`definitions`]: the Bitrise tool set and its API groups
//! - [`belt`]: definitions bound to an [`runtime::UpstreamApi`] client
//! - [`runtime`]: the upstream HTTP client (core and Release Management APIs) and error type

pub mod belt;
pub mod definitions;
pub mod runtime;
pub mod tool;

pub use belt::ToolBelt;
pub use runtime::{
    ApiBase, DEFAULT_API_BASE_URL, DEFAULT_RELEASE_MANAGEMENT_BASE_URL, HttpToolsError,
    UpstreamApi, UpstreamRequest,
};
pub use tool::{Param, ParamType, READ_ONLY_GROUP, ToolSpec};
