use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{read_document, SpecError};

/// A materialized architecture model: elements and their relationships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Model {
    pub name: String,
    pub version: Option<String>,
    pub elements: Vec<ModelElement>,
}

/// A single model element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelElement {
    pub id: String,
    /// Declared node type of this element (`{layer}.{type}`)
    pub spec_node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Outgoing relationships
    pub relationships: Vec<ElementRelationship>,
}

/// An outgoing relationship from one element to another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementRelationship {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Target element id
    pub target: String,
    pub predicate: String,
}

/// Name and version stamped on audit reports and snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelIdentity {
    pub name: String,
    pub version: Option<String>,
}

impl Model {
    /// Loads a model from a YAML or JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        read_document(path.as_ref())
    }

    /// Parses a model from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Builds an index from element id to element.
    pub fn element_index(&self) -> HashMap<&str, &ModelElement> {
        self.elements.iter().map(|e| (e.id.as_str(), e)).collect()
    }

    pub fn identity(&self) -> ModelIdentity {
        ModelIdentity {
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }
}
