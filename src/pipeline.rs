//! Snapshot-driven derivation: one immutable `ViewState` in, one
//! `DerivedView` out, memoized on the structural value of the inputs.

use crate::edge_state::{EdgeState, EdgeStateInput, derive_edge_state};
use crate::edges::EdgeOptions;
use crate::ir::GraphIR;
use crate::policy::EdgeType;
use crate::schema::SchemaGraph;
use crate::visibility::{
    Focus, FocusMode, FocusNeighborhood, NodeFilters, focus_neighborhood, resolve_visible_nodes,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// All filter, focus and interaction inputs at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewState {
    pub filters: NodeFilters,
    pub focus: Focus,
    pub edge_types: BTreeSet<EdgeType>,
    pub selected_edge_ids: BTreeSet<String>,
    pub hovered_edge_id: Option<String>,
    pub show_labels: bool,
    pub show_inline_label_on_hover: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filters: NodeFilters::default(),
            focus: Focus::default(),
            edge_types: EdgeType::ALL.into_iter().collect(),
            selected_edge_ids: BTreeSet::new(),
            hovered_edge_id: None,
            show_labels: false,
            show_inline_label_on_hover: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedView {
    pub visible_nodes: BTreeSet<String>,
    /// Visible nodes outside the focus neighborhood in fade mode
    pub dimmed_nodes: BTreeSet<String>,
    #[serde(flatten)]
    pub edges: EdgeState,
}

/// Neighborhood that drives dimming. Only fade mode dims, and a focus on an
/// id missing from the graph behaves as no focus.
fn fade_neighborhood<'a>(ir: &'a GraphIR, focus: &'a Focus) -> Option<FocusNeighborhood<'a>> {
    match focus.mode {
        FocusMode::Fade => focus_neighborhood(ir, focus),
        FocusMode::Hide => None,
    }
}

fn dimmed_nodes(visible: &BTreeSet<String>, hood: Option<&FocusNeighborhood<'_>>) -> BTreeSet<String> {
    match hood {
        Some(hood) => visible
            .iter()
            .filter(|id| !hood.contains(id))
            .cloned()
            .collect(),
        None => BTreeSet::new(),
    }
}

fn derive_edges(
    ir: &GraphIR,
    state: &ViewState,
    visible: &BTreeSet<String>,
    hood: Option<&FocusNeighborhood<'_>>,
) -> EdgeState {
    derive_edge_state(&EdgeStateInput {
        edges: &ir.edges,
        edge_types: &state.edge_types,
        renderable: visible,
        columns: &ir.columns,
        focus: hood,
        selected_edge_ids: &state.selected_edge_ids,
        hovered_edge_id: state.hovered_edge_id.as_deref(),
        show_labels: state.show_labels,
        show_inline_label_on_hover: state.show_inline_label_on_hover,
    })
}

/// Derive the full render output for one snapshot.
pub fn derive_view(ir: &GraphIR, state: &ViewState) -> DerivedView {
    let visible_nodes = resolve_visible_nodes(ir, &state.filters, &state.focus);
    let hood = fade_neighborhood(ir, &state.focus);
    let dimmed_nodes = dimmed_nodes(&visible_nodes, hood.as_ref());
    let edges = derive_edges(ir, state, &visible_nodes, hood.as_ref());

    DerivedView {
        visible_nodes,
        dimmed_nodes,
        edges,
    }
}

/// Single-entry cache keyed by value equality.
#[derive(Debug)]
struct Memo<K, V> {
    entry: Option<(K, Arc<V>)>,
}

impl<K: PartialEq + Clone, V> Memo<K, V> {
    fn new() -> Self {
        Self { entry: None }
    }

    fn get_or_compute(&mut self, key: &K, compute: impl FnOnce() -> V) -> Arc<V> {
        if let Some((cached, value)) = &self.entry {
            if cached == key {
                return Arc::clone(value);
            }
        }
        let value = Arc::new(compute());
        self.entry = Some((key.clone(), Arc::clone(&value)));
        value
    }

    fn clear(&mut self) {
        self.entry = None;
    }
}

/// Holds the loaded graph and memoizes derivations over successive snapshots.
///
/// Node visibility only depends on filters and focus, so hover and selection
/// changes reuse the last visible set and only re-derive edges.
#[derive(Debug)]
pub struct Pipeline {
    ir: Arc<GraphIR>,
    visible: Memo<(NodeFilters, Focus), BTreeSet<String>>,
    view: Memo<ViewState, DerivedView>,
}

impl Pipeline {
    pub fn new(ir: GraphIR) -> Self {
        Self {
            ir: Arc::new(ir),
            visible: Memo::new(),
            view: Memo::new(),
        }
    }

    pub fn from_schema(schema: &SchemaGraph, options: EdgeOptions) -> Self {
        Self::new(GraphIR::from_schema(schema, options))
    }

    /// Replace the graph wholesale; every cached result is dropped.
    pub fn load(&mut self, ir: GraphIR) {
        self.ir = Arc::new(ir);
        self.visible.clear();
        self.view.clear();
    }

    pub fn graph(&self) -> Arc<GraphIR> {
        Arc::clone(&self.ir)
    }

    pub fn derive(&mut self, state: &ViewState) -> Arc<DerivedView> {
        let ir = &self.ir;
        let visible = &mut self.visible;

        self.view.get_or_compute(state, || {
            let key = (state.filters.clone(), state.focus.clone());
            let visible_nodes =
                visible.get_or_compute(&key, || resolve_visible_nodes(ir, &state.filters, &state.focus));

            let hood = fade_neighborhood(ir, &state.focus);
            DerivedView {
                dimmed_nodes: dimmed_nodes(&visible_nodes, hood.as_ref()),
                edges: derive_edges(ir, state, &visible_nodes, hood.as_ref()),
                visible_nodes: (*visible_nodes).clone(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge_state::{DEFAULT_OPACITY, DIMMED_OPACITY};
    use crate::mock;

    fn pipeline() -> Pipeline {
        Pipeline::from_schema(&mock::generate("medium"), EdgeOptions::default())
    }

    #[test]
    fn test_memo_returns_same_result_for_equal_state() {
        let mut p = pipeline();
        let state = ViewState::default();

        let first = p.derive(&state);
        let second = p.derive(&state.clone());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_memo_matches_pure_derivation() {
        let mut p = pipeline();
        let ir = p.graph();
        let mut state = ViewState::default();
        state.filters.search = "order".to_string();

        assert_eq!(*p.derive(&state), derive_view(&ir, &state));

        state.hovered_edge_id = p.derive(&state).edges.edges.first().map(|e| e.id.clone());
        state.show_labels = true;
        assert_eq!(*p.derive(&state), derive_view(&ir, &state));
    }

    #[test]
    fn test_full_subset_full_round_trip() {
        let mut p = pipeline();
        let ir = p.graph();
        let full = ViewState::default();
        let focus_id = ir.edges[0].source.clone();
        let focused = ViewState {
            focus: Focus {
                mode: FocusMode::Hide,
                node_id: Some(focus_id),
                expand_threshold: 3,
            },
            ..ViewState::default()
        };

        let before = p.derive(&full);
        let narrowed = p.derive(&focused);
        let after = p.derive(&full);

        assert!(narrowed.visible_nodes.len() <= 4);
        assert!(narrowed.edges.edges.len() < before.edges.edges.len());
        assert_eq!(*before, *after);
    }

    #[test]
    fn test_fade_focus_dims_outside_neighborhood() {
        let mut p = pipeline();
        let ir = p.graph();
        let focus_id = ir.edges[0].source.clone();
        let state = ViewState {
            focus: Focus {
                mode: FocusMode::Fade,
                node_id: Some(focus_id.clone()),
                expand_threshold: 5,
            },
            ..ViewState::default()
        };

        let view = p.derive(&state);
        assert_eq!(view.visible_nodes.len(), ir.nodes.len());
        assert!(!view.dimmed_nodes.contains(&focus_id));
        assert!(view.dimmed_nodes.len() >= ir.nodes.len() - 6);
    }

    #[test]
    fn test_fade_focus_on_missing_node_matches_no_focus() {
        let mut p = Pipeline::from_schema(&mock::generate("small"), EdgeOptions::default());
        let ir = p.graph();
        let stale = ViewState {
            focus: Focus {
                mode: FocusMode::Fade,
                node_id: Some("dbo.dropped".to_string()),
                expand_threshold: 5,
            },
            ..ViewState::default()
        };
        let unfocused = derive_view(&ir, &ViewState::default());

        assert_eq!(derive_view(&ir, &stale), unfocused);
        assert_eq!(*p.derive(&stale), unfocused);
        assert!(
            unfocused
                .edges
                .edges
                .iter()
                .all(|e| e.style.opacity == DEFAULT_OPACITY)
        );
    }

    #[test]
    fn test_fade_edge_dimming_follows_truncated_neighborhood() {
        let mut p = pipeline();
        let ir = p.graph();

        // Focus the node with the most distinct rendered neighbors
        let baseline = p.derive(&ViewState::default());
        let neighbor_count = |id: &str| {
            baseline
                .edges
                .edges
                .iter()
                .filter_map(|e| {
                    if e.source == id && e.target != id {
                        Some(e.target.as_str())
                    } else if e.target == id && e.source != id {
                        Some(e.source.as_str())
                    } else {
                        None
                    }
                })
                .collect::<BTreeSet<&str>>()
                .len()
        };
        let focus_id = ir
            .nodes
            .iter()
            .map(|n| n.id.as_str())
            .max_by_key(|id| neighbor_count(*id))
            .unwrap()
            .to_string();
        assert!(neighbor_count(focus_id.as_str()) >= 2);

        let state = ViewState {
            focus: Focus {
                mode: FocusMode::Fade,
                node_id: Some(focus_id.clone()),
                expand_threshold: 1,
            },
            ..ViewState::default()
        };
        let view = p.derive(&state);

        let mut truncated_incident = 0;
        for edge in &view.edges.edges {
            let other = if edge.source == focus_id {
                Some(&edge.target)
            } else if edge.target == focus_id {
                Some(&edge.source)
            } else {
                None
            };
            let lit = other.is_some_and(|o| !view.dimmed_nodes.contains(o));
            if other.is_some() && !lit {
                truncated_incident += 1;
            }
            if lit {
                assert_eq!(edge.style.opacity, DEFAULT_OPACITY, "{}", edge.id);
            } else {
                assert_eq!(edge.style.opacity, DIMMED_OPACITY, "{}", edge.id);
            }
            if view.dimmed_nodes.contains(&edge.source) || view.dimmed_nodes.contains(&edge.target) {
                assert_eq!(edge.style.opacity, DIMMED_OPACITY, "{}", edge.id);
            }
        }
        assert!(truncated_incident > 0);
    }

    #[test]
    fn test_hide_focus_does_not_dim_edges() {
        let mut p = pipeline();
        let ir = p.graph();
        let state = ViewState {
            focus: Focus {
                mode: FocusMode::Hide,
                node_id: Some(ir.edges[0].source.clone()),
                expand_threshold: 5,
            },
            ..ViewState::default()
        };

        let view = p.derive(&state);
        assert!(view.dimmed_nodes.is_empty());
        assert!(
            view.edges
                .edges
                .iter()
                .all(|e| e.style.opacity == DEFAULT_OPACITY)
        );
    }

    #[test]
    fn test_load_replaces_graph() {
        let mut p = pipeline();
        let state = ViewState::default();
        let before = p.derive(&state);

        p.load(GraphIR::from_schema(&mock::generate("small"), EdgeOptions::default()));
        let after = p.derive(&state);

        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.visible_nodes.len() < before.visible_nodes.len());
    }

    #[test]
    fn test_view_state_json_defaults() {
        let state: ViewState = serde_json::from_str(
            r#"{ "filters": { "search": "cust" }, "focus": { "mode": "hide", "nodeId": "dbo.Customer0" } }"#,
        )
        .unwrap();

        assert_eq!(state.filters.search, "cust");
        assert_eq!(state.filters.object_types.len(), 5);
        assert_eq!(state.focus.mode, FocusMode::Hide);
        assert_eq!(state.focus.expand_threshold, 20);
        assert_eq!(state.edge_types.len(), EdgeType::ALL.len());
        assert!(state.show_inline_label_on_hover);
    }

    #[test]
    fn test_unknown_edge_type_rejected_at_boundary() {
        let result: Result<ViewState, _> =
            serde_json::from_str(r#"{ "edgeTypes": ["relationships", "foreignKeys"] }"#);
        assert!(result.is_err());
    }
}
