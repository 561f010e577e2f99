//! The tool-listing operation.

use crate::catalog::{GroupMap, NamedTool, ToolCatalog};
use crate::filter::filter_for_current_request;
use async_trait::async_trait;
use std::convert::Infallible;
use std::sync::Arc;

/// Source of the full, ordered tool list.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    type Tool: NamedTool + Send;
    type Error: Send;

    async fn list_tools(&self) -> Result<Vec<Self::Tool>, Self::Error>;
}

#[async_trait]
impl<T> ToolProvider for ToolCatalog<T>
where
    T: NamedTool + Clone + Send + Sync,
{
    type Tool = T;
    type Error = Infallible;

    async fn list_tools(&self) -> Result<Vec<T>, Infallible> {
        Ok(self.tools().to_vec())
    }
}

/// Lists tools through a provider and filters them for the ambient request.
///
/// Nothing is cached: each call asks the provider once and re-reads the request context after
/// the provider returns.
#[derive(Debug, Clone)]
pub struct ListTools<P> {
    provider: P,
    groups: Arc<GroupMap>,
}

impl<P: ToolProvider> ListTools<P> {
    pub fn new(provider: P, groups: impl Into<Arc<GroupMap>>) -> Self {
        Self {
            provider,
            groups: groups.into(),
        }
    }

    #[must_use]
    pub fn groups(&self) -> &GroupMap {
        &self.groups
    }

    /// # Errors
    ///
    /// Returns the provider's error unchanged.
    pub async fn call(&self) -> Result<Vec<P::Tool>, P::Error> {
        let tools = self.provider.list_tools().await?;
        Ok(filter_for_current_request(tools, &self.groups))
    }
}

impl<T> ListTools<ToolCatalog<T>>
where
    T: NamedTool + Clone + Send + Sync,
{
    /// List a catalog against its own group mapping.
    #[must_use]
    pub fn for_catalog(catalog: ToolCatalog<T>) -> Self {
        let groups = catalog.shared_groups();
        Self {
            provider: catalog,
            groups,
        }
    }
}
