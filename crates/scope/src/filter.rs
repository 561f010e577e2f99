//! Header-driven tool visibility.
//!
//! The rule is asymmetric on purpose:
//! - no request, or no (or an empty) `x-bitrise-enabled-api-groups` header: every tool is
//!   visible
//! - header present and non-empty: only tools of the named groups are visible, so a header that names no
//!   known group hides the whole catalog

use crate::catalog::{GroupMap, NamedTool};
use crate::context::{InboundRequest, RequestContext};
use std::collections::BTreeSet;

/// Header carrying the comma-separated API groups a caller wants to see.
pub const ENABLED_API_GROUPS_HEADER: &str = "x-bitrise-enabled-api-groups";

/// What a caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelection {
    /// No policy input: show the unfiltered catalog.
    All,
    /// Only the tools of these groups (possibly none).
    Only(BTreeSet<String>),
}

impl GroupSelection {
    #[must_use]
    pub fn from_request(request: Option<&InboundRequest>) -> Self {
        let Some(request) = request else {
            return Self::All;
        };
        let Some(value) = request.headers().get(ENABLED_API_GROUPS_HEADER) else {
            return Self::All;
        };
        if value.is_empty() {
            return Self::All;
        }
        // A header we cannot read as text still counts as "present".
        match value.to_str() {
            Ok(s) => Self::Only(parse_group_list(s)),
            Err(_) => Self::Only(BTreeSet::new()),
        }
    }
}

/// Split a comma-separated group list, trimming each entry and dropping empty ones.
#[must_use]
pub fn parse_group_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Filter `tools` down to what `request` may see.
///
/// The relative order of `tools` is preserved.
#[must_use]
pub fn filter_tools<T: NamedTool>(
    tools: Vec<T>,
    request: Option<&InboundRequest>,
    groups: &GroupMap,
) -> Vec<T> {
    let requested = match GroupSelection::from_request(request) {
        GroupSelection::All => return tools,
        GroupSelection::Only(requested) => requested,
    };

    let allowed = groups.resolve(requested.iter().map(String::as_str));
    let total = tools.len();
    let visible: Vec<T> = tools
        .into_iter()
        .filter(|t| allowed.contains(t.name()))
        .collect();

    tracing::debug!(
        requested = ?requested,
        total,
        visible = visible.len(),
        "filtered tool list"
    );
    visible
}

/// [`filter_tools`] against the ambient [`RequestContext`].
#[must_use]
pub fn filter_for_current_request<T: NamedTool>(tools: Vec<T>, groups: &GroupMap) -> Vec<T> {
    let request = RequestContext::get();
    filter_tools(tools, request.as_deref(), groups)
}
