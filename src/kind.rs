//! Object kind classification.

use crate::schema::SchemaGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    Table,
    View,
    Trigger,
    Procedure,
    Function,
    Unknown,
}

impl ObjectKind {
    /// Every kind a schema object can actually have.
    pub const ALL: [ObjectKind; 5] = [
        Self::Table,
        Self::View,
        Self::Trigger,
        Self::Procedure,
        Self::Function,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" | "tables" => Some(Self::Table),
            "view" | "views" => Some(Self::View),
            "trigger" | "triggers" => Some(Self::Trigger),
            "procedure" | "procedures" => Some(Self::Procedure),
            "function" | "functions" => Some(Self::Function),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
            Self::Trigger => "trigger",
            Self::Procedure => "procedure",
            Self::Function => "function",
            Self::Unknown => "unknown",
        }
    }

    /// Tables and views share the relational side of the dependency grammar.
    pub fn is_relation(self) -> bool {
        matches!(self, Self::Table | Self::View)
    }
}

/// Node id -> kind, built once per loaded schema.
#[derive(Debug, Clone, Default)]
pub struct KindIndex {
    kinds: HashMap<String, ObjectKind>,
}

impl KindIndex {
    pub fn from_schema(graph: &SchemaGraph) -> Self {
        let mut index = Self {
            kinds: HashMap::with_capacity(graph.node_count()),
        };

        // Insertion order is classification priority
        for t in &graph.tables {
            index.insert(&t.id, ObjectKind::Table);
        }
        for v in &graph.views {
            index.insert(&v.id, ObjectKind::View);
        }
        for t in &graph.triggers {
            index.insert(&t.id, ObjectKind::Trigger);
        }
        for p in &graph.stored_procedures {
            index.insert(&p.id, ObjectKind::Procedure);
        }
        for f in &graph.scalar_functions {
            index.insert(&f.id, ObjectKind::Function);
        }

        index
    }

    fn insert(&mut self, id: &str, kind: ObjectKind) {
        if let Some(existing) = self.kinds.get(id) {
            tracing::warn!(
                "Duplicate object id {} ({} shadows {})",
                id,
                existing.as_str(),
                kind.as_str()
            );
            return;
        }
        self.kinds.insert(id.to_string(), kind);
    }

    pub fn classify(&self, id: &str) -> ObjectKind {
        self.kinds.get(id).copied().unwrap_or(ObjectKind::Unknown)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.kinds.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ScalarFunction, StoredProcedure, TableNode, Trigger, ViewNode};

    fn table(id: &str) -> TableNode {
        TableNode {
            id: id.to_string(),
            name: id.to_string(),
            schema: "dbo".to_string(),
            columns: vec![],
        }
    }

    fn view(id: &str) -> ViewNode {
        ViewNode {
            id: id.to_string(),
            name: id.to_string(),
            schema: "dbo".to_string(),
            columns: vec![],
            definition: String::new(),
            referenced_tables: vec![],
        }
    }

    #[test]
    fn test_classify_each_collection() {
        let graph = SchemaGraph {
            tables: vec![table("t")],
            views: vec![view("v")],
            triggers: vec![Trigger {
                id: "tr".to_string(),
                name: "tr".to_string(),
                schema: "dbo".to_string(),
                table_id: "t".to_string(),
                trigger_type: "AFTER".to_string(),
                is_disabled: false,
                fires_on_insert: true,
                fires_on_update: false,
                fires_on_delete: false,
                definition: String::new(),
                referenced_tables: vec![],
                affected_tables: vec![],
            }],
            stored_procedures: vec![StoredProcedure {
                id: "p".to_string(),
                name: "p".to_string(),
                schema: "dbo".to_string(),
                procedure_type: String::new(),
                parameters: vec![],
                definition: String::new(),
                referenced_tables: vec![],
                affected_tables: vec![],
            }],
            scalar_functions: vec![ScalarFunction {
                id: "f".to_string(),
                name: "f".to_string(),
                schema: "dbo".to_string(),
                function_type: String::new(),
                parameters: vec![],
                return_type: "int".to_string(),
                definition: String::new(),
                referenced_tables: vec![],
                affected_tables: vec![],
            }],
            relationships: vec![],
        };
        let index = KindIndex::from_schema(&graph);

        assert_eq!(index.classify("t"), ObjectKind::Table);
        assert_eq!(index.classify("v"), ObjectKind::View);
        assert_eq!(index.classify("tr"), ObjectKind::Trigger);
        assert_eq!(index.classify("p"), ObjectKind::Procedure);
        assert_eq!(index.classify("f"), ObjectKind::Function);
        assert_eq!(index.classify("missing"), ObjectKind::Unknown);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_table_wins_on_duplicate_id() {
        let graph = SchemaGraph {
            tables: vec![table("dbo.x")],
            views: vec![view("dbo.x")],
            ..Default::default()
        };
        let index = KindIndex::from_schema(&graph);

        assert_eq!(index.classify("dbo.x"), ObjectKind::Table);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(ObjectKind::from_str("Views"), Some(ObjectKind::View));
        assert_eq!(ObjectKind::from_str("procedure"), Some(ObjectKind::Procedure));
        assert_eq!(ObjectKind::from_str("unknown"), None);
        assert_eq!(ObjectKind::from_str("sequence"), None);
    }
}
