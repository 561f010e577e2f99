//! MCP server handler for the Bitrise tool belt.

use crate::config::Config;
use crate::error::Result;
use axum::http::request::Parts;
use bitrise_mcp_http_tools::{HttpToolsError, ToolBelt, UpstreamApi};
use bitrise_mcp_scope::{GroupMap, InboundRequest, ListTools, ToolCatalog};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

const INSTRUCTIONS: &str = "Tools for the Bitrise CI/CD API. HTTP clients can narrow the tool \
list with the x-bitrise-enabled-api-groups header (comma-separated API groups).";

/// Cheap to clone: one instance is handed to every MCP session.
#[derive(Debug, Clone)]
pub struct BitriseServer {
    belt: ToolBelt,
    listing: ListTools<ToolCatalog<Tool>>,
}

impl BitriseServer {
    /// # Errors
    ///
    /// Returns a catalog error if the belt's tool names are not unique.
    pub fn new(belt: ToolBelt, groups: GroupMap) -> Result<Self> {
        let catalog = belt.catalog(groups)?;
        Ok(Self {
            belt,
            listing: ListTools::for_catalog(catalog),
        })
    }

    /// Wire up upstream client, tool belt and group mapping from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid upstream URL, an unreadable group file or a malformed
    /// tool set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let upstream = UpstreamApi::new(
            &config.api_base_url,
            config.bitrise_token.clone(),
            config.upstream_timeout(),
        )?
        .with_release_management_base_url(&config.release_management_base_url)?;
        let belt = ToolBelt::bitrise(upstream)?;

        let enabled = config.enabled_groups();
        let known = belt.group_map();
        for group in &enabled {
            if known.group(group).is_none() {
                tracing::warn!(group = %group, "ENABLED_API_GROUPS names an unknown group");
            }
        }
        let belt = belt.retain_groups(&enabled);

        let groups = match config.load_group_map()? {
            Some(groups) => groups,
            None => belt.group_map(),
        };
        let server = Self::new(belt, groups)?;

        let ungrouped = ungrouped_tools(&server);
        if !ungrouped.is_empty() {
            tracing::warn!(tools = ?ungrouped, "tools outside every API group are hidden from filtered listings");
        }
        tracing::info!(
            tools = server.belt.len(),
            groups = server.groups().group_names().count(),
            "tool catalog ready"
        );
        Ok(server)
    }

    #[must_use]
    pub fn belt(&self) -> &ToolBelt {
        &self.belt
    }

    #[must_use]
    pub fn groups(&self) -> &GroupMap {
        self.listing.groups()
    }
}

/// The inbound HTTP request an MCP message arrived with, if any.
///
/// The streamable HTTP transport forwards the request head with every message. Prefer the snapshot
/// the scope middleware stored in its extensions so the handler sees the identical value; fall
/// back to snapshotting the head, then to whatever scope is already active.
pub(crate) fn inbound_request(parts: Option<&Parts>) -> Option<Arc<InboundRequest>> {
    match parts {
        Some(parts) => Some(
            parts
                .extensions
                .get::<Arc<InboundRequest>>()
                .cloned()
                .unwrap_or_else(|| Arc::new(InboundRequest::from_parts(parts))),
        ),
        None => bitrise_mcp_scope::RequestContext::get(),
    }
}

fn call_error_result(err: &HttpToolsError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("call api: {err}"))])
}

impl ServerHandler for BitriseServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "bitrise".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = std::result::Result<ListToolsResult, ErrorData>> + Send + '_
    {
        let inbound = inbound_request(context.extensions.get::<Parts>());
        async move {
            let tools = bitrise_mcp_scope::RequestContext::scope(inbound, self.listing.call())
                .await
                .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
            Ok(ListToolsResult {
                meta: None,
                next_cursor: None,
                tools,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = std::result::Result<CallToolResult, ErrorData>> + Send + '_
    {
        async move {
            let arguments = request.arguments.map_or(Value::Null, Value::Object);
            match self.belt.call_tool(&request.name, &arguments).await {
                Ok(body) => Ok(CallToolResult::success(vec![Content::text(body)])),
                Err(HttpToolsError::UnknownTool(name)) => Err(ErrorData::invalid_params(
                    format!("unknown tool: {name}"),
                    None,
                )),
                Err(err) => {
                    tracing::warn!(tool = %request.name, error = %err, "tool call failed");
                    Ok(call_error_result(&err))
                }
            }
        }
    }
}

/// Tools the catalog maps into none of its groups.
pub(crate) fn ungrouped_tools(server: &BitriseServer) -> Vec<String> {
    let groups = server.groups();
    let grouped: HashSet<&str> = groups.resolve(groups.group_names());
    server
        .belt()
        .specs()
        .iter()
        .map(|spec| spec.name())
        .filter(|name| !grouped.contains(name))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, Request};
    use bitrise_mcp_scope::ENABLED_API_GROUPS_HEADER;
    use std::time::Duration;

    fn parts_with_header(value: &'static str) -> Parts {
        let (parts, ()) = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header(ENABLED_API_GROUPS_HEADER, value)
            .body(())
            .expect("request")
            .into_parts();
        parts
    }

    fn tool_names(tools: &[Tool]) -> Vec<String> {
        tools.iter().map(|t| t.name.to_string()).collect()
    }

    fn server() -> BitriseServer {
        let upstream =
            UpstreamApi::new("http://127.0.0.1:9", None, Duration::from_secs(1)).expect("valid");
        let belt = ToolBelt::bitrise(upstream).expect("valid");
        let groups = belt.group_map();
        BitriseServer::new(belt, groups).expect("unique")
    }

    #[test]
    fn inbound_request_prefers_the_middleware_snapshot() {
        let mut parts = parts_with_header("apps");
        let snapshot = Arc::new(InboundRequest::from_headers(HeaderMap::new()));
        parts.extensions.insert(Arc::clone(&snapshot));

        let found = inbound_request(Some(&parts)).expect("request");
        assert!(Arc::ptr_eq(&found, &snapshot));
    }

    #[test]
    fn inbound_request_snapshots_bare_parts() {
        let parts = parts_with_header("builds");
        let found = inbound_request(Some(&parts)).expect("request");
        assert_eq!(found.header(ENABLED_API_GROUPS_HEADER), Some("builds"));
        assert_eq!(found.uri().path(), "/mcp");
    }

    #[test]
    fn inbound_request_falls_back_to_the_ambient_scope() {
        assert!(inbound_request(None).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(ENABLED_API_GROUPS_HEADER, HeaderValue::from_static("user"));
        let ambient = Arc::new(InboundRequest::from_headers(headers));
        let found = bitrise_mcp_scope::RequestContext::sync_scope(Some(Arc::clone(&ambient)), || {
            inbound_request(None)
        })
        .expect("ambient request");
        assert!(Arc::ptr_eq(&found, &ambient));
    }

    #[tokio::test]
    async fn listing_filters_by_the_scoped_request() {
        let server = server();
        let all = server.listing.call().await.expect("infallible");
        assert_eq!(all.len(), server.belt().len());

        let parts = parts_with_header("user, group-roles");
        let visible = bitrise_mcp_scope::RequestContext::scope(
            inbound_request(Some(&parts)),
            server.listing.call(),
        )
        .await
        .expect("infallible");
        assert_eq!(
            tool_names(&visible),
            vec!["me", "list_group_roles", "replace_group_roles"]
        );
    }

    #[test]
    fn every_bitrise_tool_is_grouped() {
        assert!(ungrouped_tools(&server()).is_empty());
    }

    #[test]
    fn info_advertises_tools() {
        let info = server().get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "bitrise");
    }

    #[test]
    fn upstream_errors_become_error_results() {
        let result = call_error_result(&HttpToolsError::Transport("connection refused".into()));
        assert_eq!(result.is_error, Some(true));
    }
}
