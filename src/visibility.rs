//! Which nodes are eligible to render for a given filter and focus state.

use crate::ir::{GraphIR, Node};
use crate::kind::ObjectKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Schema filter sentinel that matches every schema.
pub const ALL_SCHEMAS: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SchemaFilter {
    #[default]
    All,
    Only(String),
}

impl SchemaFilter {
    pub fn matches(&self, schema: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(name) => name == schema,
        }
    }
}

impl From<String> for SchemaFilter {
    fn from(s: String) -> Self {
        if s == ALL_SCHEMAS {
            Self::All
        } else {
            Self::Only(s)
        }
    }
}

impl From<SchemaFilter> for String {
    fn from(f: SchemaFilter) -> Self {
        match f {
            SchemaFilter::All => ALL_SCHEMAS.to_string(),
            SchemaFilter::Only(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    /// Everything stays visible; nodes outside the focus are de-emphasized
    #[default]
    Fade,
    /// Only the focused node and its admitted neighbors are visible
    Hide,
}

impl FocusMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fade" => Some(Self::Fade),
            "hide" => Some(Self::Hide),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFilters {
    #[serde(default)]
    pub schema: SchemaFilter,
    #[serde(default = "all_kinds")]
    pub object_types: BTreeSet<ObjectKind>,
    #[serde(default)]
    pub search: String,
}

fn all_kinds() -> BTreeSet<ObjectKind> {
    ObjectKind::ALL.into_iter().collect()
}

impl Default for NodeFilters {
    fn default() -> Self {
        Self {
            schema: SchemaFilter::All,
            object_types: all_kinds(),
            search: String::new(),
        }
    }
}

impl NodeFilters {
    /// Node predicate for these filters. The search text is normalized once
    /// here rather than per node.
    pub fn matcher(&self) -> impl Fn(&Node) -> bool + '_ {
        let needle = self.search.trim().to_lowercase();
        move |node: &Node| {
            self.schema.matches(&node.schema)
                && self.object_types.contains(&node.kind)
                && matches_search(node, &needle)
        }
    }

    pub fn matches(&self, node: &Node) -> bool {
        self.matcher()(node)
    }
}

/// `needle` must already be trimmed and lowercased.
fn matches_search(node: &Node, needle: &str) -> bool {
    needle.is_empty()
        || node.label.to_lowercase().contains(&needle)
        || node.id.to_lowercase().contains(&needle)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Focus {
    #[serde(default)]
    pub mode: FocusMode,
    #[serde(default)]
    pub node_id: Option<String>,
    /// Maximum number of direct neighbors admitted around the focused node
    #[serde(default = "default_expand_threshold")]
    pub expand_threshold: usize,
}

pub const DEFAULT_EXPAND_THRESHOLD: usize = 20;

fn default_expand_threshold() -> usize {
    DEFAULT_EXPAND_THRESHOLD
}

impl Default for Focus {
    fn default() -> Self {
        Self {
            mode: FocusMode::Fade,
            node_id: None,
            expand_threshold: DEFAULT_EXPAND_THRESHOLD,
        }
    }
}

/// The focused node together with the neighbors admitted around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusNeighborhood<'a> {
    pub focused: &'a str,
    /// Sorted by id, at most `expand_threshold` long
    pub neighbors: Vec<&'a str>,
}

impl FocusNeighborhood<'_> {
    pub fn contains(&self, id: &str) -> bool {
        self.focused == id || self.neighbors.binary_search(&id).is_ok()
    }
}

/// Neighborhood of the focused node, or `None` when nothing is focused or
/// the focused id is not part of the graph.
///
/// Neighbors are nodes sharing any raw edge with the focused node in either
/// direction. When there are more than `expand_threshold` of them the
/// lexicographically smallest ids are kept.
pub fn focus_neighborhood<'a>(ir: &'a GraphIR, focus: &'a Focus) -> Option<FocusNeighborhood<'a>> {
    let focused = focus.node_id.as_deref()?;
    if !ir.contains(focused) {
        return None;
    }

    let neighbors: BTreeSet<&str> = ir
        .edges
        .iter()
        .filter_map(|e| {
            if e.source == focused {
                Some(e.target.as_str())
            } else if e.target == focused {
                Some(e.source.as_str())
            } else {
                None
            }
        })
        .filter(|id| *id != focused && ir.contains(id))
        .collect();

    Some(FocusNeighborhood {
        focused,
        neighbors: neighbors.into_iter().take(focus.expand_threshold).collect(),
    })
}

/// Node ids eligible to render.
pub fn resolve_visible_nodes(ir: &GraphIR, filters: &NodeFilters, focus: &Focus) -> BTreeSet<String> {
    let candidates = || {
        let matches = filters.matcher();
        ir.nodes
            .iter()
            .filter(|&n| matches(n))
            .map(|n| n.id.clone())
            .collect::<BTreeSet<String>>()
    };

    if focus.node_id.is_none() {
        let visible = candidates();
        tracing::debug!("Resolved {} visible nodes", visible.len());
        return visible;
    }

    let neighborhood = focus_neighborhood(ir, focus);
    let visible: BTreeSet<String> = match (focus.mode, neighborhood) {
        (FocusMode::Hide, None) => BTreeSet::new(),
        (FocusMode::Hide, Some(hood)) => std::iter::once(hood.focused)
            .chain(hood.neighbors)
            .map(str::to_string)
            .collect(),
        (FocusMode::Fade, None) => candidates(),
        (FocusMode::Fade, Some(hood)) => {
            let mut visible = candidates();
            visible.insert(hood.focused.to_string());
            visible
        }
    };

    tracing::debug!(
        "Resolved {} visible nodes with focus on {:?} ({:?})",
        visible.len(),
        focus.node_id,
        focus.mode
    );
    visible
}
