//! Specification and model documents consumed by the audit engine.
//!
//! A specification declares the layers of an architecture model, the node types
//! each layer offers, the predicates available for relationships and the
//! relationship types declared between node types. It can live in one YAML/JSON
//! file or be split across a directory of fragments:
//!
//! ```yaml
//! name: enterprise-architecture
//! version: "1.0.0"
//! predicates:
//!   - predicate: depends-on
//!     category: structural-dependency
//!     semantics: { directionality: unidirectional, transitivity: true }
//! layers:
//!   - id: application
//!     inspiredBy: ArchiMate 3.2
//!     nodeTypes: [component, service]
//! relationships:
//!   - id: app-component-serves-service
//!     sourceSpecNodeType: application.component
//!     destinationSpecNodeType: application.service
//!     predicate: serves
//!     cardinality: { min: 1 }
//! ```

mod error;
mod model;

pub use error::SpecError;
pub use model::{ElementRelationship, Model, ModelElement, ModelIdentity};

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::PredicateMetadata;
use crate::graph::NODE_TYPE_SEPARATOR;

/// A complete (or merged) specification document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Specification {
    /// Specification name, used as the report identity when no model is given
    pub name: Option<String>,
    /// Specification version
    pub version: Option<String>,
    /// Predicate declarations feeding the catalog
    pub predicates: Vec<PredicateMetadata>,
    /// Layer declarations, in display order
    pub layers: Vec<LayerSpec>,
    /// Declared relationship types between node types
    pub relationships: Vec<RelationshipSpec>,
}

/// A layer of the architecture model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerSpec {
    /// Layer identifier, also the prefix of its node type keys
    pub id: String,
    /// Display name
    pub name: Option<String>,
    /// Standard the layer is modelled after (e.g. "ArchiMate 3.2")
    pub inspired_by: Option<String>,
    /// Node types declared by this layer, qualified as `{layer}.{type}`
    pub node_types: Vec<String>,
}

/// A declared relationship type between two node types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelationshipSpec {
    pub id: String,
    #[serde(alias = "sourcePredicateNodeType")]
    pub source_spec_node_type: String,
    #[serde(alias = "destinationPredicateNodeType")]
    pub destination_spec_node_type: String,
    pub predicate: String,
    /// How many instances of this relationship each source element needs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
}

/// Instance-count bounds of a declared relationship type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cardinality {
    pub min: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl Specification {
    /// Loads a specification from a file or a directory of fragments.
    ///
    /// Directory fragments are merged in path order.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let mut spec = if path.is_dir() {
            Self::from_dir(path)?
        } else {
            read_document(path)?
        };
        spec.normalize();
        Ok(spec)
    }

    /// Parses a specification from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let mut spec: Specification = serde_yaml::from_str(yaml)?;
        spec.normalize();
        Ok(spec)
    }

    fn from_dir(dir: &Path) -> Result<Self, SpecError> {
        let walker = WalkBuilder::new(dir).hidden(true).git_ignore(true).build();

        let mut files: Vec<PathBuf> = walker
            .flatten()
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && document_format(path).is_some())
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(SpecError::Empty(dir.to_path_buf()));
        }

        let mut spec = Specification::default();
        for file in files {
            debug!(path = %file.display(), "Reading specification fragment");
            let mut fragment: Specification = read_document(&file)?;
            fragment.normalize();
            spec.merge(fragment);
        }
        Ok(spec)
    }

    /// Merges another fragment into this specification.
    ///
    /// Layers sharing an id are combined; the first declared name, version and
    /// standard win.
    pub fn merge(&mut self, other: Specification) {
        if self.name.is_none() {
            self.name = other.name;
        }
        if self.version.is_none() {
            self.version = other.version;
        }
        self.predicates.extend(other.predicates);
        self.relationships.extend(other.relationships);

        for layer in other.layers {
            match self.layers.iter_mut().find(|l| l.id == layer.id) {
                Some(existing) => {
                    if existing.name.is_none() {
                        existing.name = layer.name;
                    }
                    if existing.inspired_by.is_none() {
                        existing.inspired_by = layer.inspired_by;
                    }
                    for node_type in layer.node_types {
                        if !existing.node_types.contains(&node_type) {
                            existing.node_types.push(node_type);
                        }
                    }
                }
                None => self.layers.push(layer),
            }
        }
    }

    /// Qualifies short node type names with their layer id.
    fn normalize(&mut self) {
        for layer in &mut self.layers {
            for node_type in &mut layer.node_types {
                if !node_type.contains(NODE_TYPE_SEPARATOR) {
                    *node_type = format!("{}{}{}", layer.id, NODE_TYPE_SEPARATOR, node_type);
                }
            }
        }
    }

    /// Gets a layer by id.
    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Returns true if any layer declares this node type.
    pub fn declares_node_type(&self, node_type: &str) -> bool {
        self.layers
            .iter()
            .any(|l| l.node_types.iter().any(|n| n == node_type))
    }

    /// Identity used on reports when no model is supplied.
    pub fn identity(&self) -> ModelIdentity {
        ModelIdentity {
            name: self.name.clone().unwrap_or_else(|| "specification".to_string()),
            version: self.version.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Yaml,
    Json,
}

fn document_format(path: &Path) -> Option<DocumentFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Some(DocumentFormat::Yaml),
        Some("json") => Some(DocumentFormat::Json),
        _ => None,
    }
}

/// Reads a YAML or JSON document, choosing the parser by extension.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, SpecError> {
    let format =
        document_format(path).ok_or_else(|| SpecError::UnsupportedFormat(path.to_path_buf()))?;
    let content = fs::read_to_string(path).map_err(|e| SpecError::io(path, e))?;

    match format {
        DocumentFormat::Yaml => serde_yaml::from_str(&content).map_err(|source| SpecError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
        DocumentFormat::Json => serde_json::from_str(&content).map_err(|source| SpecError::Json {
            path: path.to_path_buf(),
            source,
        }),
    }
}
