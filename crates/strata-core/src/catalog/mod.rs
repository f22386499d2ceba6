//! Read-only registry of predicate metadata.
//!
//! The catalog is created unloaded and populated by a single call to
//! [`PredicateCatalog::load`]. Queries made before that fail with
//! [`CatalogError::NotLoaded`]; once loaded the metadata never changes. Build a
//! new catalog (and new analyzers) to pick up changed declarations.

mod error;
mod predicate;

pub use error::CatalogError;
pub use predicate::{Directionality, PredicateMetadata, PredicateSemantics};

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::spec::Specification;

/// Where the catalog reads its declarations from.
#[derive(Debug, Clone)]
enum CatalogSource {
    Declarations(Vec<PredicateMetadata>),
    Path(PathBuf),
}

/// Registry of predicate metadata keyed by predicate name.
#[derive(Debug, Clone)]
pub struct PredicateCatalog {
    source: CatalogSource,
    index: Option<BTreeMap<String, PredicateMetadata>>,
}

impl PredicateCatalog {
    /// Creates an unloaded catalog over in-memory declarations.
    pub fn new(declarations: Vec<PredicateMetadata>) -> Self {
        Self {
            source: CatalogSource::Declarations(declarations),
            index: None,
        }
    }

    /// Creates an unloaded catalog over a specification's predicates.
    pub fn from_specification(spec: &Specification) -> Self {
        Self::new(spec.predicates.clone())
    }

    /// Creates an unloaded catalog that reads a specification file or
    /// directory when loaded.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: CatalogSource::Path(path.into()),
            index: None,
        }
    }

    /// Parses and validates all declarations. Calling it again is a no-op.
    pub fn load(&mut self) -> Result<(), CatalogError> {
        if self.index.is_some() {
            debug!("Predicate catalog already loaded");
            return Ok(());
        }

        let declarations = match &self.source {
            CatalogSource::Declarations(declarations) => declarations.clone(),
            CatalogSource::Path(path) => Specification::from_path(path)?.predicates,
        };

        let index = build_index(declarations)?;
        info!(predicates = index.len(), "Predicate catalog loaded");
        self.index = Some(index);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    fn index(&self) -> Result<&BTreeMap<String, PredicateMetadata>, CatalogError> {
        self.index.as_ref().ok_or(CatalogError::NotLoaded)
    }

    /// Looks up a predicate by name.
    pub fn get_by_predicate(&self, name: &str) -> Result<Option<&PredicateMetadata>, CatalogError> {
        Ok(self.index()?.get(name))
    }

    /// Returns the predicates applicable to a layer, sorted by name.
    pub fn get_by_layer(&self, layer: &str) -> Result<Vec<&str>, CatalogError> {
        Ok(self
            .index()?
            .values()
            .filter(|meta| meta.applies_to(layer))
            .map(|meta| meta.predicate.as_str())
            .collect())
    }

    /// All predicates, sorted by name.
    pub fn predicates(&self) -> Result<impl Iterator<Item = &PredicateMetadata>, CatalogError> {
        Ok(self.index()?.values())
    }

    /// Predicates flagged transitive, sorted by name.
    pub fn transitive_predicates(&self) -> Result<Vec<&PredicateMetadata>, CatalogError> {
        Ok(self
            .index()?
            .values()
            .filter(|meta| meta.semantics.transitivity)
            .collect())
    }

    pub fn len(&self) -> Result<usize, CatalogError> {
        Ok(self.index()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CatalogError> {
        Ok(self.index()?.is_empty())
    }
}

fn build_index(
    declarations: Vec<PredicateMetadata>,
) -> Result<BTreeMap<String, PredicateMetadata>, CatalogError> {
    let mut index = BTreeMap::new();
    for meta in declarations {
        if meta.predicate.trim().is_empty() {
            return Err(CatalogError::InvalidPredicate {
                predicate: meta.predicate,
                reason: "predicate name is empty".to_string(),
            });
        }
        if index.contains_key(&meta.predicate) {
            return Err(CatalogError::DuplicatePredicate(meta.predicate));
        }
        index.insert(meta.predicate.clone(), meta);
    }

    for meta in index.values() {
        let Some(inverse) = meta.inverse_predicate.as_deref() else {
            continue;
        };
        if !index.contains_key(inverse) {
            return Err(CatalogError::InvalidPredicate {
                predicate: meta.predicate.clone(),
                reason: format!("inverse predicate '{inverse}' is not declared"),
            });
        }
        if meta.semantics.symmetry && inverse != meta.predicate {
            return Err(CatalogError::InvalidPredicate {
                predicate: meta.predicate.clone(),
                reason: format!("symmetric predicate cannot have a distinct inverse '{inverse}'"),
            });
        }
    }

    Ok(index)
}
