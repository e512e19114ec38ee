//! Raw schema graph as produced by the introspection layer.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaGraph {
    #[serde(default)]
    pub tables: Vec<TableNode>,
    #[serde(default)]
    pub views: Vec<ViewNode>,
    #[serde(default)]
    pub relationships: Vec<RelationshipEdge>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub stored_procedures: Vec<StoredProcedure>,
    #[serde(default)]
    pub scalar_functions: Vec<ScalarFunction>,
}

impl SchemaGraph {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn node_count(&self) -> usize {
        self.tables.len()
            + self.views.len()
            + self.triggers.len()
            + self.stored_procedures.len()
            + self.scalar_functions.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    /// Upstream columns a view column is computed from
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_columns: Vec<ColumnSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSource {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableNode {
    pub id: String,
    pub name: String,
    pub schema: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewNode {
    pub id: String,
    pub name: String,
    pub schema: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub referenced_tables: Vec<String>,
}

/// Foreign key between two tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureParameter {
    pub name: String,
    pub data_type: String,
    pub is_output: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub id: String,
    pub name: String,
    pub schema: String,
    /// Table the trigger is attached to
    pub table_id: String,
    #[serde(default)]
    pub trigger_type: String,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub fires_on_insert: bool,
    #[serde(default)]
    pub fires_on_update: bool,
    #[serde(default)]
    pub fires_on_delete: bool,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub referenced_tables: Vec<String>,
    #[serde(default)]
    pub affected_tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProcedure {
    pub id: String,
    pub name: String,
    pub schema: String,
    #[serde(default)]
    pub procedure_type: String,
    #[serde(default)]
    pub parameters: Vec<ProcedureParameter>,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub referenced_tables: Vec<String>,
    #[serde(default)]
    pub affected_tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarFunction {
    pub id: String,
    pub name: String,
    pub schema: String,
    #[serde(default)]
    pub function_type: String,
    #[serde(default)]
    pub parameters: Vec<ProcedureParameter>,
    #[serde(default)]
    pub return_type: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub referenced_tables: Vec<String>,
    #[serde(default)]
    pub affected_tables: Vec<String>,
}
