use crate::edges::{EdgeMeta, EdgeOptions, build_edges};
use crate::kind::{KindIndex, ObjectKind};
use crate::schema::{Column, SchemaGraph};
use std::collections::{HashMap, HashSet};

/// Column names per node id, for edge endpoint validation.
pub type ColumnIndex = HashMap<String, HashSet<String>>;

/// A loaded schema flattened into one node list, its raw edges and the
/// lookup tables derived from it. Built once per load and never mutated.
#[derive(Debug, Clone)]
pub struct GraphIR {
    pub nodes: Vec<Node>,
    pub edges: Vec<EdgeMeta>,
    pub kinds: KindIndex,
    pub columns: ColumnIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub schema: String,
    pub kind: ObjectKind,
    pub columns: Vec<ColumnIR>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnIR {
    pub name: String,
    pub typ: String,
    pub is_nullable: bool,
    pub is_pk: bool,
}

impl From<&Column> for ColumnIR {
    fn from(c: &Column) -> Self {
        ColumnIR {
            name: c.name.clone(),
            typ: c.data_type.clone(),
            is_nullable: c.is_nullable,
            is_pk: c.is_primary_key,
        }
    }
}

impl GraphIR {
    pub fn from_schema(schema: &SchemaGraph, options: EdgeOptions) -> Self {
        let kinds = KindIndex::from_schema(schema);

        let no_columns: &[Column] = &[];
        let entries = schema
            .tables
            .iter()
            .map(|t| (&t.id, &t.name, &t.schema, t.columns.as_slice()))
            .chain(
                schema
                    .views
                    .iter()
                    .map(|v| (&v.id, &v.name, &v.schema, v.columns.as_slice())),
            )
            .chain(
                schema
                    .triggers
                    .iter()
                    .map(|t| (&t.id, &t.name, &t.schema, no_columns)),
            )
            .chain(
                schema
                    .stored_procedures
                    .iter()
                    .map(|p| (&p.id, &p.name, &p.schema, no_columns)),
            )
            .chain(
                schema
                    .scalar_functions
                    .iter()
                    .map(|f| (&f.id, &f.name, &f.schema, no_columns)),
            );

        let mut nodes = Vec::with_capacity(schema.node_count());
        let mut seen: HashSet<&str> = HashSet::with_capacity(schema.node_count());
        for (id, name, owner, columns) in entries {
            // Shadowed duplicates keep the first collection's node only
            if !seen.insert(id.as_str()) {
                continue;
            }
            nodes.push(Node {
                id: id.clone(),
                label: name.clone(),
                schema: owner.clone(),
                kind: kinds.classify(id),
                columns: columns.iter().map(ColumnIR::from).collect(),
            });
        }

        let columns: ColumnIndex = nodes
            .iter()
            .filter(|n| n.kind.is_relation())
            .map(|n| {
                let names = n.columns.iter().map(|c| c.name.clone()).collect();
                (n.id.clone(), names)
            })
            .collect();

        let edges = build_edges(schema, &kinds, options);

        tracing::debug!(
            "Loaded schema graph: {} nodes, {} edges",
            nodes.len(),
            edges.len()
        );

        GraphIR {
            nodes,
            edges,
            kinds,
            columns,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.kinds.contains(id)
    }

    pub fn classify(&self, id: &str) -> ObjectKind {
        self.kinds.classify(id)
    }

    /// Sorted, de-duplicated schema names present in the graph.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.iter().map(|n| n.schema.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
