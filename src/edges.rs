//! Raw dependency edges and their construction from a schema graph.

use crate::handle::{HandleDirection, HandleKey};
use crate::kind::KindIndex;
use crate::policy::{self, EdgeType};
use crate::schema::SchemaGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMeta {
    pub id: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    pub source: String,
    pub target: String,
    pub source_handle: String,
    pub target_handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl EdgeMeta {
    /// Edge anchored on whole nodes.
    pub fn node_level(id: String, edge_type: EdgeType, source: &str, target: &str) -> Self {
        Self {
            id,
            edge_type,
            source: source.to_string(),
            target: target.to_string(),
            source_handle: HandleKey::node(source, HandleDirection::Source).encode(),
            target_handle: HandleKey::node(target, HandleDirection::Target).encode(),
            source_column: None,
            target_column: None,
            label: None,
        }
    }

    /// Edge anchored on one column at each end.
    pub fn column_level(
        id: String,
        edge_type: EdgeType,
        (source, source_column): (&str, &str),
        (target, target_column): (&str, &str),
    ) -> Self {
        Self {
            id,
            edge_type,
            source: source.to_string(),
            target: target.to_string(),
            source_handle: HandleKey::column(source, source_column, HandleDirection::Source)
                .encode(),
            target_handle: HandleKey::column(target, target_column, HandleDirection::Target)
                .encode(),
            source_column: Some(source_column.to_string()),
            target_column: Some(target_column.to_string()),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Each handle encodes exactly this edge's endpoint node, its declared
    /// column (or none), and the matching direction.
    pub fn handles_consistent(&self) -> bool {
        let expected = |node: &str, column: &Option<String>, direction| HandleKey {
            node_id: node.to_string(),
            column: column.clone(),
            direction,
        };

        HandleKey::decode(&self.source_handle)
            == Some(expected(&self.source, &self.source_column, HandleDirection::Source))
            && HandleKey::decode(&self.target_handle)
                == Some(expected(&self.target, &self.target_column, HandleDirection::Target))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeOptions {
    /// Emit column-level view lineage edges in addition to view-level ones
    pub column_lineage: bool,
}

struct EdgeCollector<'a> {
    kinds: &'a KindIndex,
    seen: HashSet<String>,
    edges: Vec<EdgeMeta>,
}

impl EdgeCollector<'_> {
    fn push(&mut self, edge: EdgeMeta) {
        if !policy::is_allowed(self.kinds, &edge.source, &edge.target, edge.edge_type) {
            tracing::warn!(
                "Skipping edge {}: {} not allowed from {} ({}) to {} ({})",
                edge.id,
                edge.edge_type.as_str(),
                edge.source,
                self.kinds.classify(&edge.source).as_str(),
                edge.target,
                self.kinds.classify(&edge.target).as_str()
            );
            return;
        }
        if !self.seen.insert(edge.id.clone()) {
            tracing::warn!("Skipping duplicate edge id {}", edge.id);
            return;
        }
        self.edges.push(edge);
    }
}

/// Derive the raw edge list from a schema graph, in collection order.
pub fn build_edges(graph: &SchemaGraph, kinds: &KindIndex, options: EdgeOptions) -> Vec<EdgeMeta> {
    let mut out = EdgeCollector {
        kinds,
        seen: HashSet::new(),
        edges: Vec::new(),
    };

    for rel in &graph.relationships {
        let edge = match (&rel.from_column, &rel.to_column) {
            (Some(from_col), Some(to_col)) => EdgeMeta::column_level(
                rel.id.clone(),
                EdgeType::Relationships,
                (&rel.from, from_col),
                (&rel.to, to_col),
            )
            .with_label(format!("{} → {}", from_col, to_col)),
            _ => EdgeMeta::node_level(rel.id.clone(), EdgeType::Relationships, &rel.from, &rel.to),
        };
        out.push(edge);
    }

    for view in &graph.views {
        for table_id in &view.referenced_tables {
            out.push(EdgeMeta::node_level(
                format!("view-edge-{}-{}", view.id, table_id),
                EdgeType::ViewDependencies,
                table_id,
                &view.id,
            ));
        }

        if options.column_lineage {
            for column in &view.columns {
                for (n, source) in column.source_columns.iter().enumerate() {
                    out.push(EdgeMeta::column_level(
                        format!("view-col-edge-{}-{}-{}", view.id, column.name, n),
                        EdgeType::ViewDependencies,
                        (&source.table, &source.column),
                        (&view.id, &column.name),
                    ));
                }
            }
        }
    }

    for trigger in &graph.triggers {
        out.push(
            EdgeMeta::node_level(
                format!("trigger-edge-{}", trigger.id),
                EdgeType::TriggerDependencies,
                &trigger.table_id,
                &trigger.id,
            )
            .with_label(trigger_events(trigger)),
        );

        for table_id in trigger.referenced_tables.iter().filter(|t| **t != trigger.table_id) {
            out.push(EdgeMeta::node_level(
                format!("trigger-ref-edge-{}-{}", trigger.id, table_id),
                EdgeType::TriggerDependencies,
                &trigger.id,
                table_id,
            ));
        }

        for table_id in trigger.affected_tables.iter().filter(|t| **t != trigger.table_id) {
            out.push(
                EdgeMeta::node_level(
                    format!("trigger-affects-{}-{}", trigger.id, table_id),
                    EdgeType::TriggerWrites,
                    &trigger.id,
                    table_id,
                )
                .with_label("writes"),
            );
        }
    }

    for procedure in &graph.stored_procedures {
        for table_id in &procedure.referenced_tables {
            out.push(
                EdgeMeta::node_level(
                    format!("proc-edge-{}-{}", procedure.id, table_id),
                    EdgeType::ProcedureReads,
                    table_id,
                    &procedure.id,
                )
                .with_label("reads"),
            );
        }
        for table_id in &procedure.affected_tables {
            out.push(
                EdgeMeta::node_level(
                    format!("proc-affects-{}-{}", procedure.id, table_id),
                    EdgeType::ProcedureWrites,
                    &procedure.id,
                    table_id,
                )
                .with_label("writes"),
            );
        }
    }

    for function in &graph.scalar_functions {
        for table_id in &function.referenced_tables {
            out.push(
                EdgeMeta::node_level(
                    format!("func-edge-{}-{}", function.id, table_id),
                    EdgeType::FunctionReads,
                    table_id,
                    &function.id,
                )
                .with_label("reads"),
            );
        }
    }

    tracing::debug!("Built {} edges", out.edges.len());
    out.edges
}

fn trigger_events(trigger: &crate::schema::Trigger) -> String {
    let events: Vec<&str> = [
        (trigger.fires_on_insert, "INSERT"),
        (trigger.fires_on_update, "UPDATE"),
        (trigger.fires_on_delete, "DELETE"),
    ]
    .iter()
    .filter(|(fires, _)| *fires)
    .map(|(_, name)| *name)
    .collect();

    if events.is_empty() {
        trigger.trigger_type.clone()
    } else {
        format!("{} {}", trigger.trigger_type, events.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;
    use crate::schema::{Column, ColumnSource, RelationshipEdge, TableNode, Trigger, ViewNode};

    fn table(id: &str, columns: &[&str]) -> TableNode {
        TableNode {
            id: id.to_string(),
            name: id.rsplit('.').next().unwrap_or(id).to_string(),
            schema: "dbo".to_string(),
            columns: columns
                .iter()
                .map(|c| Column {
                    name: c.to_string(),
                    data_type: "int".to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn trigger(id: &str, table_id: &str) -> Trigger {
        Trigger {
            id: id.to_string(),
            name: id.to_string(),
            schema: "dbo".to_string(),
            table_id: table_id.to_string(),
            trigger_type: "AFTER".to_string(),
            is_disabled: false,
            fires_on_insert: true,
            fires_on_update: true,
            fires_on_delete: false,
            definition: String::new(),
            referenced_tables: vec![table_id.to_string(), "dbo.b".to_string()],
            affected_tables: vec!["dbo.b".to_string()],
        }
    }

    #[test]
    fn test_relationship_column_and_node_level() {
        let graph = SchemaGraph {
            tables: vec![table("dbo.a", &["b_id"]), table("dbo.b", &["id"])],
            relationships: vec![
                RelationshipEdge {
                    id: "FK_1".to_string(),
                    from: "dbo.a".to_string(),
                    to: "dbo.b".to_string(),
                    from_column: Some("b_id".to_string()),
                    to_column: Some("id".to_string()),
                },
                RelationshipEdge {
                    id: "FK_2".to_string(),
                    from: "dbo.a".to_string(),
                    to: "dbo.b".to_string(),
                    from_column: None,
                    to_column: None,
                },
            ],
            ..Default::default()
        };
        let kinds = KindIndex::from_schema(&graph);
        let edges = build_edges(&graph, &kinds, EdgeOptions::default());

        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].source_column.as_deref(), Some("b_id"));
        assert_eq!(edges[0].label.as_deref(), Some("b_id → id"));
        assert_eq!(edges[1].source_column, None);
        assert!(edges.iter().all(EdgeMeta::handles_consistent));
    }

    #[test]
    fn test_trigger_edges_skip_owner() {
        let graph = SchemaGraph {
            tables: vec![table("dbo.a", &[]), table("dbo.b", &[])],
            triggers: vec![trigger("dbo.a.TR_1", "dbo.a")],
            ..Default::default()
        };
        let kinds = KindIndex::from_schema(&graph);
        let edges = build_edges(&graph, &kinds, EdgeOptions::default());
        let ids: Vec<&str> = edges.iter().map(|e| e.id.as_str()).collect();

        assert_eq!(
            ids,
            vec![
                "trigger-edge-dbo.a.TR_1",
                "trigger-ref-edge-dbo.a.TR_1-dbo.b",
                "trigger-affects-dbo.a.TR_1-dbo.b",
            ]
        );
        assert_eq!(edges[0].source, "dbo.a");
        assert_eq!(edges[0].label.as_deref(), Some("AFTER INSERT, UPDATE"));
        assert_eq!(edges[2].edge_type, EdgeType::TriggerWrites);
    }

    #[test]
    fn test_policy_rejects_dangling_and_illegal() {
        let graph = SchemaGraph {
            tables: vec![table("dbo.a", &[])],
            views: vec![ViewNode {
                id: "dbo.v".to_string(),
                name: "v".to_string(),
                schema: "dbo".to_string(),
                columns: vec![],
                definition: String::new(),
                referenced_tables: vec!["dbo.a".to_string(), "dbo.gone".to_string()],
            }],
            relationships: vec![RelationshipEdge {
                id: "FK_view".to_string(),
                from: "dbo.v".to_string(),
                to: "dbo.a".to_string(),
                from_column: None,
                to_column: None,
            }],
            ..Default::default()
        };
        let kinds = KindIndex::from_schema(&graph);
        let edges = build_edges(&graph, &kinds, EdgeOptions::default());

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].id, "view-edge-dbo.v-dbo.a");
        assert_eq!(edges[0].source, "dbo.a");
        assert_eq!(edges[0].target, "dbo.v");
    }

    #[test]
    fn test_column_lineage_opt_in() {
        let graph = SchemaGraph {
            tables: vec![table("dbo.a", &["id"])],
            views: vec![ViewNode {
                id: "dbo.v".to_string(),
                name: "v".to_string(),
                schema: "dbo".to_string(),
                columns: vec![Column {
                    name: "a_id".to_string(),
                    data_type: "int".to_string(),
                    source_columns: vec![ColumnSource {
                        table: "dbo.a".to_string(),
                        column: "id".to_string(),
                    }],
                    ..Default::default()
                }],
                definition: String::new(),
                referenced_tables: vec!["dbo.a".to_string()],
            }],
            ..Default::default()
        };
        let kinds = KindIndex::from_schema(&graph);

        let plain = build_edges(&graph, &kinds, EdgeOptions::default());
        assert_eq!(plain.len(), 1);

        let lineage = build_edges(&graph, &kinds, EdgeOptions { column_lineage: true });
        assert_eq!(lineage.len(), 2);
        assert_eq!(lineage[1].id, "view-col-edge-dbo.v-a_id-0");
        assert_eq!(lineage[1].target_column.as_deref(), Some("a_id"));
        assert!(lineage[1].handles_consistent());
    }

    #[test]
    fn test_mock_edges_unique_and_legal() {
        for size in ["small", "medium", "large"] {
            let graph = mock::generate(size);
            let kinds = KindIndex::from_schema(&graph);
            let edges = build_edges(&graph, &kinds, EdgeOptions { column_lineage: true });

            let ids: HashSet<&str> = edges.iter().map(|e| e.id.as_str()).collect();
            assert_eq!(ids.len(), edges.len(), "duplicate edge ids for {size}");
            for edge in &edges {
                assert!(kinds.contains(&edge.source), "{} source dangling", edge.id);
                assert!(kinds.contains(&edge.target), "{} target dangling", edge.id);
                assert!(policy::is_allowed(&kinds, &edge.source, &edge.target, edge.edge_type));
                assert!(edge.handles_consistent(), "{} handles inconsistent", edge.id);
            }
        }
    }

    #[test]
    fn test_handles_consistent_detects_mismatch() {
        let mut edge = EdgeMeta::column_level(
            "e".to_string(),
            EdgeType::Relationships,
            ("dbo.a", "x"),
            ("dbo.b", "y"),
        );
        assert!(edge.handles_consistent());

        edge.source_column = Some("z".to_string());
        assert!(!edge.handles_consistent());

        let mut edge = EdgeMeta::node_level("n".to_string(), EdgeType::Relationships, "dbo.a", "dbo.b");
        edge.target_column = Some("y".to_string());
        assert!(!edge.handles_consistent());
    }
}
