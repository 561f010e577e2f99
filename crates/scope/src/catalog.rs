//! Immutable tool registry and group → tool-name mapping.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Anything that is identified by a tool name.
pub trait NamedTool {
    fn name(&self) -> &str;
}

impl NamedTool for rmcp::model::Tool {
    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedTool for String {
    fn name(&self) -> &str {
        self
    }
}

impl NamedTool for &str {
    fn name(&self) -> &str {
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),
}

/// Group name → ordered tool names.
///
/// Configured once at startup; every request reads it, nothing mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupMap(BTreeMap<String, Vec<String>>);

impl GroupMap {
    #[must_use]
    pub fn new(groups: BTreeMap<String, Vec<String>>) -> Self {
        Self(groups)
    }

    /// Invert per-tool memberships (`tool → groups`) into a group map.
    ///
    /// Tool order inside each group follows the order of `memberships`.
    pub fn from_memberships<'a, I, G>(memberships: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, G)>,
        G: IntoIterator<Item = &'a str>,
    {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (tool, tool_groups) in memberships {
            for group in tool_groups {
                let members = groups.entry(group.to_string()).or_default();
                if !members.iter().any(|m| m == tool) {
                    members.push(tool.to_string());
                }
            }
        }
        Self(groups)
    }

    /// Tool names of a group, if the group exists.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, group: &str, tool: &str) -> bool {
        self.group(group)
            .is_some_and(|members| members.iter().any(|m| m == tool))
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Union of the tool names of every requested group.
    ///
    /// Unknown group names contribute nothing.
    pub fn resolve<'a, I>(&self, requested: I) -> HashSet<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        requested
            .into_iter()
            .filter_map(|group| self.group(group))
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

/// The full, ordered tool list plus the group mapping.
#[derive(Debug)]
pub struct ToolCatalog<T> {
    inner: Arc<ToolCatalogInner<T>>,
}

#[derive(Debug)]
struct ToolCatalogInner<T> {
    tools: Vec<T>,
    groups: Arc<GroupMap>,
}

impl<T> Clone for ToolCatalog<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: NamedTool> ToolCatalog<T> {
    /// Build a catalog from a tool list and a group mapping.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateTool`] if two tools share a name.
    pub fn new(tools: Vec<T>, groups: GroupMap) -> Result<Self, CatalogError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for tool in &tools {
            if !seen.insert(tool.name()) {
                return Err(CatalogError::DuplicateTool(tool.name().to_string()));
            }
        }

        for group in groups.group_names() {
            for tool in groups.group(group).unwrap_or_default() {
                if !seen.contains(tool.as_str()) {
                    tracing::warn!(group = %group, tool = %tool, "group references unknown tool");
                }
            }
        }

        Ok(Self {
            inner: Arc::new(ToolCatalogInner {
                tools,
                groups: Arc::new(groups),
            }),
        })
    }

    #[must_use]
    pub fn tools(&self) -> &[T] {
        &self.inner.tools
    }

    #[must_use]
    pub fn groups(&self) -> &GroupMap {
        &self.inner.groups
    }

    /// Shared handle to the group mapping (for [`crate::ListTools`]).
    #[must_use]
    pub fn shared_groups(&self) -> Arc<GroupMap> {
        Arc::clone(&self.inner.groups)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.inner.tools.iter().find(|t| t.name() == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_memberships_inverts_tool_groups_in_definition_order() {
        let groups = GroupMap::from_memberships([
            ("list_apps", vec!["apps", "read-only"]),
            ("delete_app", vec!["apps"]),
            ("me", vec!["user", "read-only"]),
        ]);

        assert_eq!(
            groups.group("apps"),
            Some(&["list_apps".to_string(), "delete_app".to_string()][..])
        );
        assert_eq!(
            groups.group("read-only"),
            Some(&["list_apps".to_string(), "me".to_string()][..])
        );
        assert!(groups.contains("user", "me"));
        assert!(!groups.contains("user", "list_apps"));
        assert_eq!(groups.group("builds"), None);
    }

    #[test]
    fn resolve_unions_known_groups_and_ignores_unknown_ones() {
        let groups = GroupMap::from_memberships([
            ("x", vec!["groupA"]),
            ("y", vec!["groupA"]),
            ("z", vec!["groupB"]),
        ]);

        let allowed = groups.resolve(["groupA", "nope", "groupB"]);
        assert_eq!(allowed, HashSet::from(["x", "y", "z"]));
        assert!(groups.resolve(["nope"]).is_empty());
        assert!(groups.resolve(std::iter::empty()).is_empty());
    }

    #[test]
    fn resolve_matches_group_names_exactly() {
        let groups = GroupMap::from_memberships([("x", vec!["apps"])]);
        assert!(groups.resolve(["Apps"]).is_empty());
        assert!(groups.resolve(["apps "]).is_empty());
    }

    #[test]
    fn group_map_deserializes_from_plain_mapping() {
        let groups: GroupMap =
            serde_yaml::from_str("apps: [list_apps, get_app]\nuser: [me]\n").expect("valid yaml");
        assert_eq!(groups.group_names().collect::<Vec<_>>(), vec!["apps", "user"]);
        assert!(groups.contains("apps", "get_app"));
    }

    #[test]
    fn catalog_rejects_duplicate_tool_names() {
        let err = ToolCatalog::new(
            vec!["a".to_string(), "b".to_string(), "a".to_string()],
            GroupMap::default(),
        )
        .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateTool("a".to_string()));
    }

    #[test]
    fn catalog_answers_lookups() {
        let catalog = ToolCatalog::new(
            vec!["me".to_string(), "list_apps".to_string()],
            GroupMap::from_memberships([("me", ["user"])]),
        )
        .expect("unique names");

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("list_apps").map(String::as_str), Some("list_apps"));
        assert!(catalog.get("missing").is_none());
        assert!(catalog.groups().contains("user", "me"));
    }
}
