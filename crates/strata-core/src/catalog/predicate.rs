//! Predicate metadata: the relational properties attached to each predicate.

use serde::{Deserialize, Serialize};

/// Metadata describing one relationship predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredicateMetadata {
    /// Unique predicate key (e.g. "depends-on")
    pub predicate: String,
    /// Predicate expressing the same relationship in the other direction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_predicate: Option<String>,
    /// Coarse semantic grouping (e.g. "structural-dependency")
    pub category: String,
    #[serde(default)]
    pub semantics: PredicateSemantics,
    /// Layers the predicate applies to. Empty means every layer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Formal relational properties of a predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredicateSemantics {
    pub directionality: Directionality,
    pub transitivity: bool,
    pub symmetry: bool,
    pub reflexivity: bool,
}

/// Whether a predicate reads the same in both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directionality {
    #[default]
    Unidirectional,
    Bidirectional,
}

impl PredicateMetadata {
    pub fn new(predicate: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            inverse_predicate: None,
            category: category.into(),
            semantics: PredicateSemantics::default(),
            layers: Vec::new(),
            description: None,
        }
    }

    pub fn with_inverse(mut self, inverse: impl Into<String>) -> Self {
        self.inverse_predicate = Some(inverse.into());
        self
    }

    pub fn transitive(mut self) -> Self {
        self.semantics.transitivity = true;
        self
    }

    /// Marks the predicate symmetric (and therefore bidirectional).
    pub fn symmetric(mut self) -> Self {
        self.semantics.symmetry = true;
        self.semantics.directionality = Directionality::Bidirectional;
        self
    }

    pub fn reflexive(mut self) -> Self {
        self.semantics.reflexivity = true;
        self
    }

    pub fn for_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layers = layers.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if the predicate may be used by node types of `layer`.
    pub fn applies_to(&self, layer: &str) -> bool {
        self.layers.is_empty() || self.layers.iter().any(|l| l == layer)
    }

    /// Returns true if `other` is declared as this predicate's inverse, or the
    /// other way around.
    pub fn is_inverse_of(&self, other: &PredicateMetadata) -> bool {
        self.inverse_predicate.as_deref() == Some(other.predicate.as_str())
            || other.inverse_predicate.as_deref() == Some(self.predicate.as_str())
    }
}
