//! User settings that seed the initial view state.

use crate::edges::EdgeOptions;
use crate::pipeline::ViewState;
use crate::visibility::{DEFAULT_EXPAND_THRESHOLD, Focus, FocusMode, NodeFilters, SchemaFilter};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub schema_filter: SchemaFilter,
    pub focus_mode: FocusMode,
    pub focus_expand_threshold: usize,
    pub show_labels: bool,
    pub show_inline_label_on_hover: bool,
    /// Build column-level view lineage edges when loading a schema
    pub column_lineage: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_filter: SchemaFilter::All,
            focus_mode: FocusMode::Fade,
            focus_expand_threshold: DEFAULT_EXPAND_THRESHOLD,
            show_labels: false,
            show_inline_label_on_hover: true,
            column_lineage: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn edge_options(&self) -> EdgeOptions {
        EdgeOptions {
            column_lineage: self.column_lineage,
        }
    }

    /// Initial snapshot: every kind and edge type shown, nothing focused.
    pub fn view_state(&self) -> ViewState {
        ViewState {
            filters: NodeFilters {
                schema: self.schema_filter.clone(),
                ..NodeFilters::default()
            },
            focus: Focus {
                mode: self.focus_mode,
                node_id: None,
                expand_threshold: self.focus_expand_threshold,
            },
            show_labels: self.show_labels,
            show_inline_label_on_hover: self.show_inline_label_on_hover,
            ..ViewState::default()
        }
    }
}
