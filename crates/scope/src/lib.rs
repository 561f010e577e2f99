//! Request-scoped tool visibility.
//!
//! This crate is the policy core of the Bitrise MCP server:
//! - [`RequestContext`]: the inbound request currently being served, visible to everything that
//!   runs on behalf of that request and to nothing else
//! - [`RequestScopeLayer`]: the transport-boundary middleware that establishes it
//! - [`ToolCatalog`] / [`GroupMap`]: the immutable tool list and group → tool-name mapping
//! - [`filter_tools`]: the header-driven visibility rule
//! - [`ListTools`]: the listing operation gluing the above together
//!
//! It intentionally knows nothing about MCP sessions, upstream HTTP calls or configuration files.

pub mod catalog;
pub mod context;
pub mod filter;
pub mod listing;
pub mod middleware;

pub use catalog::{CatalogError, GroupMap, NamedTool, ToolCatalog};
pub use context::{InboundRequest, RequestContext};
pub use filter::{ENABLED_API_GROUPS_HEADER, GroupSelection, filter_tools, parse_group_list};
pub use listing::{ListTools, ToolProvider};
pub use middleware::{RequestScope, RequestScopeLayer};
