//! The tool belt: definitions bound to an upstream client.

use crate::definitions::bitrise_tools;
use crate::runtime::{HttpToolsError, Result, UpstreamApi};
use crate::tool::ToolSpec;
use bitrise_mcp_scope::{CatalogError, GroupMap, ToolCatalog};
use rmcp::model::Tool;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Immutable set of HTTP tools, cheap to clone and share across sessions.
#[derive(Debug, Clone)]
pub struct ToolBelt {
    inner: Arc<ToolBeltInner>,
}

#[derive(Debug)]
struct ToolBeltInner {
    specs: Vec<ToolSpec>,
    index: HashMap<String, usize>,
    upstream: UpstreamApi,
}

impl ToolBelt {
    /// # Errors
    ///
    /// Returns [`HttpToolsError::Config`] for duplicate tool names or malformed definitions.
    pub fn new(specs: Vec<ToolSpec>, upstream: UpstreamApi) -> Result<Self> {
        let mut index = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            spec.validate()?;
            if index.insert(spec.name().to_string(), i).is_some() {
                return Err(HttpToolsError::Config(
                    CatalogError::DuplicateTool(spec.name().to_string()).to_string(),
                ));
            }
        }
        Ok(Self {
            inner: Arc::new(ToolBeltInner {
                specs,
                index,
                upstream,
            }),
        })
    }

    /// The full Bitrise tool set.
    ///
    /// # Errors
    ///
    /// See [`ToolBelt::new`].
    pub fn bitrise(upstream: UpstreamApi) -> Result<Self> {
        Self::new(bitrise_tools(), upstream)
    }

    /// Keep only the tools that belong to at least one of `groups`.
    ///
    /// An empty `groups` keeps everything.
    #[must_use]
    pub fn retain_groups(self, groups: &BTreeSet<String>) -> Self {
        if groups.is_empty() {
            return self;
        }
        let specs: Vec<ToolSpec> = self
            .inner
            .specs
            .iter()
            .filter(|spec| spec.groups().iter().any(|g| groups.contains(*g)))
            .cloned()
            .collect();
        let index = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name().to_string(), i))
            .collect();
        tracing::info!(
            enabled_groups = ?groups,
            kept = specs.len(),
            total = self.inner.specs.len(),
            "restricted tool set to enabled API groups"
        );
        Self {
            inner: Arc::new(ToolBeltInner {
                specs,
                index,
                upstream: self.inner.upstream.clone(),
            }),
        }
    }

    #[must_use]
    pub fn specs(&self) -> &[ToolSpec] {
        &self.inner.specs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.specs.is_empty()
    }

    /// MCP tool descriptors in catalog order.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.inner.specs.iter().map(ToolSpec::to_tool).collect()
    }

    /// Group memberships derived from the tool definitions.
    #[must_use]
    pub fn group_map(&self) -> GroupMap {
        GroupMap::from_memberships(
            self.inner
                .specs
                .iter()
                .map(|spec| (spec.name(), spec.groups())),
        )
    }

    /// Snapshot the belt as a [`ToolCatalog`] of MCP tools.
    ///
    /// # Errors
    ///
    /// Cannot fail for a belt built through [`ToolBelt::new`]; the error is kept for callers
    /// supplying their own `groups`.
    pub fn catalog(&self, groups: GroupMap) -> std::result::Result<ToolCatalog<Tool>, CatalogError> {
        ToolCatalog::new(self.list_tools(), groups)
    }

    /// Run a tool and return the upstream response body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpToolsError::UnknownTool`] for names not on the belt, and otherwise the
    /// argument, status or transport error of the call.
    pub async fn call_tool(&self, name: &str, arguments: &Value) -> Result<String> {
        let spec = self
            .inner
            .index
            .get(name)
            .map(|&i| &self.inner.specs[i])
            .ok_or_else(|| HttpToolsError::UnknownTool(name.to_string()))?;
        let request = spec.build_request(arguments)?;
        tracing::debug!(tool = %name, method = %request.method, path = %request.path, "calling upstream");
        self.inner.upstream.call(&request).await
    }
}
