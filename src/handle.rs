//! Anchor identifiers for edge endpoints.
//!
//! A handle names either a whole node or one column of a node, plus the side
//! of the edge it anchors. The string form length-prefixes the node id so ids
//! and column names may contain any character without colliding:
//!
//! - node level:   `node:<len>:<node id>-source`
//! - column level: `col:<len>:<node id>:<column>-target`

use std::fmt;

const NODE_PREFIX: &str = "node:";
const COLUMN_PREFIX: &str = "col:";
const SOURCE_SUFFIX: &str = "-source";
const TARGET_SUFFIX: &str = "-target";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleDirection {
    Source,
    Target,
}

impl HandleDirection {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Source => SOURCE_SUFFIX,
            Self::Target => TARGET_SUFFIX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandleKey {
    pub node_id: String,
    pub column: Option<String>,
    pub direction: HandleDirection,
}

impl HandleKey {
    pub fn node(node_id: &str, direction: HandleDirection) -> Self {
        Self {
            node_id: node_id.to_string(),
            column: None,
            direction,
        }
    }

    pub fn column(node_id: &str, column: &str, direction: HandleDirection) -> Self {
        Self {
            node_id: node_id.to_string(),
            column: Some(column.to_string()),
            direction,
        }
    }

    pub fn is_column_level(&self) -> bool {
        self.column.is_some()
    }

    pub fn encode(&self) -> String {
        let base = match &self.column {
            Some(column) => build_column_handle_base(&self.node_id, column),
            None => build_node_handle_base(&self.node_id),
        };
        base + self.direction.suffix()
    }

    pub fn decode(handle: &str) -> Option<Self> {
        let (base, direction) = if let Some(base) = handle.strip_suffix(SOURCE_SUFFIX) {
            (base, HandleDirection::Source)
        } else if let Some(base) = handle.strip_suffix(TARGET_SUFFIX) {
            (base, HandleDirection::Target)
        } else {
            return None;
        };

        if let Some(rest) = base.strip_prefix(NODE_PREFIX) {
            let (node_id, rest) = split_length_prefixed(rest)?;
            if !rest.is_empty() {
                return None;
            }
            Some(Self::node(node_id, direction))
        } else if let Some(rest) = base.strip_prefix(COLUMN_PREFIX) {
            let (node_id, rest) = split_length_prefixed(rest)?;
            let column = rest.strip_prefix(':')?;
            Some(Self::column(node_id, column, direction))
        } else {
            None
        }
    }
}

impl fmt::Display for HandleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

pub fn build_node_handle_base(node_id: &str) -> String {
    format!("{}{}:{}", NODE_PREFIX, node_id.len(), node_id)
}

pub fn build_column_handle_base(node_id: &str, column: &str) -> String {
    format!("{}{}:{}:{}", COLUMN_PREFIX, node_id.len(), node_id, column)
}

/// Split `<len>:<payload of len bytes><rest>` into (payload, rest).
fn split_length_prefixed(s: &str) -> Option<(&str, &str)> {
    let (len, rest) = s.split_once(':')?;
    if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let len: usize = len.parse().ok()?;
    if !rest.is_char_boundary(len) {
        return None;
    }
    Some(rest.split_at(len))
}
