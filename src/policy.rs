//! Edge types and the directional rule table deciding which are legal
//! between two object kinds.

use crate::kind::{KindIndex, ObjectKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeType {
    Relationships,
    ViewDependencies,
    TriggerDependencies,
    TriggerWrites,
    ProcedureReads,
    ProcedureWrites,
    FunctionReads,
}

impl EdgeType {
    pub const ALL: [EdgeType; 7] = [
        Self::Relationships,
        Self::ViewDependencies,
        Self::TriggerDependencies,
        Self::TriggerWrites,
        Self::ProcedureReads,
        Self::ProcedureWrites,
        Self::FunctionReads,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "relationships" => Some(Self::Relationships),
            "viewDependencies" => Some(Self::ViewDependencies),
            "triggerDependencies" => Some(Self::TriggerDependencies),
            "triggerWrites" => Some(Self::TriggerWrites),
            "procedureReads" => Some(Self::ProcedureReads),
            "procedureWrites" => Some(Self::ProcedureWrites),
            "functionReads" => Some(Self::FunctionReads),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relationships => "relationships",
            Self::ViewDependencies => "viewDependencies",
            Self::TriggerDependencies => "triggerDependencies",
            Self::TriggerWrites => "triggerWrites",
            Self::ProcedureReads => "procedureReads",
            Self::ProcedureWrites => "procedureWrites",
            Self::FunctionReads => "functionReads",
        }
    }
}

/// Edge types legal from a `source` kind to a `target` kind. First match wins.
pub fn allowed_for_kinds(source: ObjectKind, target: ObjectKind) -> &'static [EdgeType] {
    use ObjectKind::*;

    match (source, target) {
        (Table | View, View) => &[EdgeType::ViewDependencies],
        // A view is never upstream of a plain table
        (View, Table) => &[],
        (Table | View, Table | View) => &[EdgeType::Relationships],
        (Table | View, Trigger) => &[EdgeType::TriggerDependencies],
        (Trigger, Table | View) => &[EdgeType::TriggerDependencies, EdgeType::TriggerWrites],
        (Table | View, Procedure) => &[EdgeType::ProcedureReads],
        (Procedure, Table | View) => &[EdgeType::ProcedureWrites],
        (Table | View, Function) => &[EdgeType::FunctionReads],
        _ => &[],
    }
}

/// Classify both endpoints and look up the legal edge types between them.
pub fn allowed_edge_kinds(kinds: &KindIndex, source_id: &str, target_id: &str) -> Vec<EdgeType> {
    allowed_for_kinds(kinds.classify(source_id), kinds.classify(target_id)).to_vec()
}

pub fn is_allowed(kinds: &KindIndex, source_id: &str, target_id: &str, edge_type: EdgeType) -> bool {
    allowed_for_kinds(kinds.classify(source_id), kinds.classify(target_id)).contains(&edge_type)
}
