//! Edge records to render for a given visible node set and interaction state.
//!
//! Excluded edges are simply absent from the output. A record never carries a
//! visibility flag, so renderers only allocate what they draw.

use crate::edges::EdgeMeta;
use crate::ir::ColumnIndex;
use crate::policy::EdgeType;
use crate::visibility::FocusNeighborhood;
use serde::Serialize;
use std::collections::BTreeSet;

pub const DEFAULT_STROKE_WIDTH: f32 = 1.5;
pub const SELECTED_STROKE_WIDTH: f32 = 3.0;
pub const DEFAULT_OPACITY: f32 = 0.8;
pub const DIMMED_OPACITY: f32 = 0.2;
pub const SELECTED_MARKER_COLOR: &str = "#2563eb";

fn marker_color(edge_type: EdgeType) -> &'static str {
    match edge_type {
        EdgeType::Relationships => "#64748b",
        EdgeType::ViewDependencies => "#8b5cf6",
        EdgeType::TriggerDependencies => "#f59e0b",
        EdgeType::TriggerWrites => "#ef4444",
        EdgeType::ProcedureReads => "#10b981",
        EdgeType::ProcedureWrites => "#f97316",
        EdgeType::FunctionReads => "#06b6d4",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke_width: f32,
    pub opacity: f32,
    pub marker_color: &'static str,
    pub selected: bool,
}

impl EdgeStyle {
    fn default_for(edge_type: EdgeType) -> Self {
        Self {
            stroke_width: DEFAULT_STROKE_WIDTH,
            opacity: DEFAULT_OPACITY,
            marker_color: marker_color(edge_type),
            selected: false,
        }
    }

    fn selected() -> Self {
        Self {
            stroke_width: SELECTED_STROKE_WIDTH,
            opacity: 1.0,
            marker_color: SELECTED_MARKER_COLOR,
            selected: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    pub source: String,
    pub target: String,
    pub source_handle: String,
    pub target_handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
    pub style: EdgeStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeState {
    pub edges: Vec<EdgeRecord>,
    pub visible_edge_ids: BTreeSet<String>,
}

/// Everything the derivation reads. Borrowed, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct EdgeStateInput<'a> {
    pub edges: &'a [EdgeMeta],
    pub edge_types: &'a BTreeSet<EdgeType>,
    pub renderable: &'a BTreeSet<String>,
    pub columns: &'a ColumnIndex,
    /// Resolved fade-mode focus. Edges other than those joining the focused
    /// node to an admitted neighbor are dimmed
    pub focus: Option<&'a FocusNeighborhood<'a>>,
    pub selected_edge_ids: &'a BTreeSet<String>,
    pub hovered_edge_id: Option<&'a str>,
    pub show_labels: bool,
    pub show_inline_label_on_hover: bool,
}

impl EdgeStateInput<'_> {
    fn includes(&self, edge: &EdgeMeta) -> bool {
        self.edge_types.contains(&edge.edge_type)
            && self.renderable.contains(&edge.source)
            && self.renderable.contains(&edge.target)
            && self.has_column(&edge.source, edge.source_column.as_deref())
            && self.has_column(&edge.target, edge.target_column.as_deref())
    }

    fn has_column(&self, node_id: &str, column: Option<&str>) -> bool {
        match column {
            None => true,
            Some(column) => self
                .columns
                .get(node_id)
                .is_some_and(|names| names.contains(column)),
        }
    }

    fn style(&self, edge: &EdgeMeta) -> EdgeStyle {
        if self.selected_edge_ids.contains(&edge.id) {
            return EdgeStyle::selected();
        }
        let mut style = EdgeStyle::default_for(edge.edge_type);
        if let Some(hood) = self.focus {
            if !in_focus(hood, edge) {
                style.opacity = DIMMED_OPACITY;
            }
        }
        style
    }

    fn label(&self, edge: &EdgeMeta) -> Option<String> {
        let hovered = self.hovered_edge_id == Some(edge.id.as_str());
        let label = if hovered && self.show_inline_label_on_hover {
            edge.label.as_deref().map(str::trim)
        } else if self.show_labels {
            edge.label.as_deref()
        } else {
            None
        };
        label.filter(|l| !l.trim().is_empty()).map(str::to_string)
    }
}

fn in_focus(hood: &FocusNeighborhood<'_>, edge: &EdgeMeta) -> bool {
    (edge.source == hood.focused && hood.contains(&edge.target))
        || (edge.target == hood.focused && hood.contains(&edge.source))
}

pub fn derive_edge_state(input: &EdgeStateInput<'_>) -> EdgeState {
    let edges: Vec<EdgeRecord> = input
        .edges
        .iter()
        .filter(|e| input.includes(e))
        .map(|e| EdgeRecord {
            id: e.id.clone(),
            edge_type: e.edge_type,
            source: e.source.clone(),
            target: e.target.clone(),
            source_handle: e.source_handle.clone(),
            target_handle: e.target_handle.clone(),
            source_column: e.source_column.clone(),
            target_column: e.target_column.clone(),
            style: input.style(e),
            label: input.label(e),
        })
        .collect();

    let visible_edge_ids = edges.iter().map(|e| e.id.clone()).collect();

    tracing::debug!(
        "Derived {} of {} edges over {} renderable nodes",
        edges.len(),
        input.edges.len(),
        input.renderable.len()
    );

    EdgeState {
        edges,
        visible_edge_ids,
    }
}
