//! Detection of node types that lack expected relationships.
//!
//! A declared node type is expected to take part in relationships when the
//! catalog offers at least one predicate for its layer. Expected node types
//! are then ranked:
//!
//! | Priority | Condition |
//! |----------|-----------|
//! | high     | no relationships at all |
//! | medium   | some relationships, but a required relationship type (cardinality min >= 1) is missing |
//! | low      | only incoming relationships, nothing outgoing |

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CatalogError, PredicateCatalog};
use crate::graph::RelationshipGraph;
use crate::spec::{RelationshipSpec, Specification};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPriority {
    High,
    Medium,
    Low,
}

impl GapPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapPriority::High => "high",
            GapPriority::Medium => "medium",
            GapPriority::Low => "low",
        }
    }
}

impl fmt::Display for GapPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node type missing relationships it is expected to have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapCandidate {
    pub layer_id: String,
    pub node_type: String,
    pub priority: GapPriority,
    pub detail: String,
    /// Predicates that would close the gap
    #[serde(default)]
    pub suggested_predicates: Vec<String>,
}

/// Result of a gap analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapAnalysis {
    gaps: Vec<GapCandidate>,
}

impl GapAnalysis {
    pub fn gaps(&self) -> &[GapCandidate] {
        &self.gaps
    }

    pub fn by_layer(&self, layer: &str) -> Vec<&GapCandidate> {
        self.gaps.iter().filter(|g| g.layer_id == layer).collect()
    }

    pub fn by_priority(&self, priority: GapPriority) -> Vec<&GapCandidate> {
        self.gaps.iter().filter(|g| g.priority == priority).collect()
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn into_report(self) -> GapReport {
        GapReport::new(self.gaps)
    }
}

/// Gap envelope as persisted in reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReport {
    pub gaps: Vec<GapCandidate>,
    pub summary: GapSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapSummary {
    pub total: usize,
    /// QUIRK: despite its name this field counts gaps by *priority*, not by
    /// layer. Downstream consumers read it under this key, so it stays.
    pub by_layer: PriorityCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl GapReport {
    pub fn new(gaps: Vec<GapCandidate>) -> Self {
        let mut counts = PriorityCounts::default();
        for gap in &gaps {
            match gap.priority {
                GapPriority::High => counts.high += 1,
                GapPriority::Medium => counts.medium += 1,
                GapPriority::Low => counts.low += 1,
            }
        }
        Self {
            summary: GapSummary {
                total: gaps.len(),
                by_layer: counts,
            },
            gaps,
        }
    }
}

/// Finds declared node types lacking expected relationships.
pub struct GapAnalyzer<'a> {
    catalog: &'a PredicateCatalog,
    spec: &'a Specification,
}

impl<'a> GapAnalyzer<'a> {
    pub fn new(catalog: &'a PredicateCatalog, spec: &'a Specification) -> Self {
        Self { catalog, spec }
    }

    pub fn analyze(&self, graph: &RelationshipGraph) -> Result<GapAnalysis, CatalogError> {
        let required = self.required_relationships()?;
        let mut gaps = Vec::new();

        for layer in graph.declared_layers() {
            let applicable = self.catalog.get_by_layer(layer)?;
            if applicable.is_empty() {
                debug!(layer, "No applicable predicates; layer not expected to relate");
                continue;
            }

            for node_type in graph.declared_node_types(layer) {
                let gap = classify(
                    graph,
                    layer,
                    node_type,
                    &applicable,
                    required.get(node_type.as_str()).map(Vec::as_slice).unwrap_or_default(),
                );
                gaps.extend(gap);
            }
        }

        gaps.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.node_type.cmp(&b.node_type))
        });
        debug!(gaps = gaps.len(), "Gap analysis finished");
        Ok(GapAnalysis { gaps })
    }

    /// Declared relationship types with a positive cardinality minimum, by
    /// source node type. Relationship types whose predicate is unknown to the
    /// catalog are skipped.
    fn required_relationships(
        &self,
    ) -> Result<HashMap<&'a str, Vec<&'a RelationshipSpec>>, CatalogError> {
        let spec: &'a Specification = self.spec;
        let mut required: HashMap<&'a str, Vec<&'a RelationshipSpec>> = HashMap::new();
        for rel in &spec.relationships {
            let is_required = rel.cardinality.map_or(false, |c| c.min > 0);
            if is_required && self.catalog.get_by_predicate(&rel.predicate)?.is_some() {
                required
                    .entry(rel.source_spec_node_type.as_str())
                    .or_default()
                    .push(rel);
            }
        }
        Ok(required)
    }
}

fn classify(
    graph: &RelationshipGraph,
    layer: &str,
    node_type: &str,
    applicable: &[&str],
    required: &[&RelationshipSpec],
) -> Option<GapCandidate> {
    let incoming = graph.in_degree(node_type);
    let outgoing = graph.out_degree(node_type);
    let all_applicable = || -> Vec<String> { applicable.iter().map(|p| p.to_string()).collect() };

    let (priority, detail, suggested_predicates) = if incoming + outgoing == 0 {
        (
            GapPriority::High,
            format!(
                "{} has no relationships although {} predicate(s) apply to layer '{}'",
                node_type,
                applicable.len(),
                layer
            ),
            all_applicable(),
        )
    } else {
        let missing: Vec<&RelationshipSpec> = required
            .iter()
            .copied()
            .filter(|rel| {
                !graph.outgoing(node_type).any(|edge| {
                    edge.predicate == rel.predicate
                        && edge.destination_spec_node_type == rel.destination_spec_node_type
                })
            })
            .collect();

        if !missing.is_empty() {
            let listed: Vec<String> = missing
                .iter()
                .map(|rel| format!("{} -> {}", rel.predicate, rel.destination_spec_node_type))
                .collect();
            let predicates: BTreeSet<String> =
                missing.iter().map(|rel| rel.predicate.clone()).collect();
            (
                GapPriority::Medium,
                format!(
                    "{node_type} is below its required relationship minimum; missing {}",
                    listed.join(", ")
                ),
                predicates.into_iter().collect::<Vec<_>>(),
            )
        } else if outgoing == 0 {
            (
                GapPriority::Low,
                format!(
                    "{node_type} is only a relationship target ({incoming} incoming, no outgoing)"
                ),
                all_applicable(),
            )
        } else {
            return None;
        }
    };

    Some(GapCandidate {
        layer_id: layer.to_string(),
        node_type: node_type.to_string(),
        priority,
        detail,
        suggested_predicates,
    })
}
