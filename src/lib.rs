pub mod config;
pub mod edge_state;
pub mod edges;
pub mod handle;
pub mod ir;
pub mod kind;
pub mod mock;
pub mod pipeline;
pub mod policy;
pub mod schema;
pub mod visibility;

use wasm_bindgen::prelude::*;

use edges::EdgeOptions;
use ir::GraphIR;
use pipeline::{Pipeline, ViewState};
use schema::SchemaGraph;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn parse_state(state_json: &str) -> Result<ViewState, String> {
    serde_json::from_str(state_json).map_err(|e| format!("Invalid view state: {}", e))
}

/// One-shot derivation: schema JSON + view state JSON -> derived view JSON
#[wasm_bindgen(js_name = "deriveView")]
pub fn derive_view_json(schema_json: &str, state_json: &str) -> Result<String, String> {
    let schema = SchemaGraph::from_json(schema_json).map_err(|e| e.to_string())?;
    let state = parse_state(state_json)?;

    let ir = GraphIR::from_schema(&schema, EdgeOptions::default());
    let view = pipeline::derive_view(&ir, &state);
    serde_json::to_string(&view).map_err(|e| e.to_string())
}

/// Edge types legal from `source` to `target`, as a JSON array of tags
#[wasm_bindgen(js_name = "allowedEdgeKinds")]
pub fn allowed_edge_kinds_json(
    schema_json: &str,
    source: &str,
    target: &str,
) -> Result<String, String> {
    let schema = SchemaGraph::from_json(schema_json).map_err(|e| e.to_string())?;
    let kinds = kind::KindIndex::from_schema(&schema);
    let allowed = policy::allowed_edge_kinds(&kinds, source, target);
    serde_json::to_string(&allowed).map_err(|e| e.to_string())
}

/// A loaded schema kept across interactions so repeated snapshots are
/// derived against the same graph and memoized.
#[wasm_bindgen]
pub struct Diagram {
    pipeline: Pipeline,
}

#[wasm_bindgen]
impl Diagram {
    #[wasm_bindgen(constructor)]
    pub fn new(schema_json: &str, column_lineage: bool) -> Result<Diagram, String> {
        let schema = SchemaGraph::from_json(schema_json).map_err(|e| e.to_string())?;
        Ok(Diagram {
            pipeline: Pipeline::from_schema(&schema, EdgeOptions { column_lineage }),
        })
    }

    /// Replace the schema after a reconnect or reload
    pub fn reload(&mut self, schema_json: &str, column_lineage: bool) -> Result<(), String> {
        let schema = SchemaGraph::from_json(schema_json).map_err(|e| e.to_string())?;
        self.pipeline
            .load(GraphIR::from_schema(&schema, EdgeOptions { column_lineage }));
        Ok(())
    }

    pub fn derive(&mut self, state_json: &str) -> Result<String, String> {
        let state = parse_state(state_json)?;
        let view = self.pipeline.derive(&state);
        serde_json::to_string(&*view).map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "schemaNames")]
    pub fn schema_names(&self) -> Vec<String> {
        self.pipeline
            .graph()
            .schema_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_json() -> String {
        serde_json::to_string(&mock::generate("small")).unwrap()
    }

    #[test]
    fn test_derive_view_json() {
        let out = derive_view_json(&mock_json(), "{}").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert!(value["visibleNodes"].as_array().unwrap().len() > 10);
        assert!(value["edges"].is_array());
        assert!(value["visibleEdgeIds"].is_array());
        assert!(value["dimmedNodes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_derive_view_json_rejects_bad_state() {
        let err = derive_view_json(&mock_json(), r#"{ "focus": { "mode": "blur" } }"#).unwrap_err();
        assert!(err.starts_with("Invalid view state"));
    }

    #[test]
    fn test_allowed_edge_kinds_json() {
        let graph = mock::generate("small");
        let json = serde_json::to_string(&graph).unwrap();

        let out = allowed_edge_kinds_json(&json, &graph.tables[0].id, &graph.views[0].id).unwrap();
        assert_eq!(out, r#"["viewDependencies"]"#);

        let out = allowed_edge_kinds_json(&json, &graph.views[0].id, &graph.tables[0].id).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_diagram_derive_and_reload() {
        let mut diagram = Diagram::new(&mock_json(), false).unwrap();
        let first = diagram.derive(r#"{ "filters": { "schema": "hr" } }"#).unwrap();
        assert!(first.contains("hr."));
        assert_eq!(diagram.schema_names(), vec!["dbo", "hr", "inventory", "sales"]);

        diagram.reload(r#"{ "tables": [] }"#, false).unwrap();
        assert!(diagram.schema_names().is_empty());
    }
}
