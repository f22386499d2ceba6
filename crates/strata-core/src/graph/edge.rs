use serde::{Deserialize, Serialize};

use super::node::layer_of;

/// A directed relationship between two node types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEdge {
    pub id: String,
    #[serde(alias = "sourcePredicateNodeType")]
    pub source_spec_node_type: String,
    #[serde(alias = "destinationPredicateNodeType")]
    pub destination_spec_node_type: String,
    pub predicate: String,
}

impl RelationshipEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        predicate: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_spec_node_type: source.into(),
            destination_spec_node_type: destination.into(),
            predicate: predicate.into(),
        }
    }

    pub fn source_layer(&self) -> &str {
        layer_of(&self.source_spec_node_type)
    }

    pub fn destination_layer(&self) -> &str {
        layer_of(&self.destination_spec_node_type)
    }

    /// Returns true if both endpoints belong to the same layer.
    pub fn is_intra_layer(&self) -> bool {
        self.source_layer() == self.destination_layer()
    }

    /// Returns the first required field that is blank, if any.
    pub(crate) fn missing_field(&self) -> Option<&'static str> {
        if self.id.trim().is_empty() {
            Some("id")
        } else if self.source_spec_node_type.trim().is_empty() {
            Some("sourceSpecNodeType")
        } else if self.destination_spec_node_type.trim().is_empty() {
            Some("destinationSpecNodeType")
        } else if self.predicate.trim().is_empty() {
            Some("predicate")
        } else {
            None
        }
    }
}

/// A data-integrity problem noticed while building a graph.
///
/// Warnings never abort a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityWarning {
    pub edge_id: String,
    pub kind: IntegrityWarningKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrityWarningKind {
    /// Edge endpoint is not declared by any layer; the edge is still indexed.
    UndeclaredNodeType,
    /// Edge is missing a required field and was skipped.
    MalformedEdge,
    /// Edge id was already used in this build; the later edge was skipped.
    DuplicateEdgeId,
    /// Instance relationship points at an element that does not exist.
    UnresolvedTarget,
}

impl IntegrityWarning {
    pub fn new(
        edge_id: impl Into<String>,
        kind: IntegrityWarningKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            edge_id: edge_id.into(),
            kind,
            detail: detail.into(),
        }
    }
}
