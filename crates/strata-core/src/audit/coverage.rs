//! Per-layer coverage metrics.
//!
//! For every layer in scope this measures how many declared node types take
//! part in relationships and how much of the layer's predicate vocabulary is
//! actually used.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{percentage, ratio};
use crate::catalog::{CatalogError, PredicateCatalog};
use crate::graph::RelationshipGraph;
use crate::spec::{LayerSpec, Specification};

/// Coverage metrics of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMetrics {
    pub layer_id: String,
    pub node_type_count: usize,
    pub relationship_count: usize,
    pub isolated_node_types: Vec<String>,
    pub isolation_percentage: f64,
    pub available_predicates: Vec<String>,
    pub used_predicates: Vec<String>,
    pub utilization_percentage: f64,
    pub relationships_per_node_type: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_alignment: Option<StandardAlignment>,
}

/// How well a layer's used predicates match the standard it is inspired by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardAlignment {
    pub standard: String,
    pub reference_predicates: Vec<String>,
    pub aligned_predicates: Vec<String>,
    pub alignment_percentage: f64,
}

/// Coverage envelope with totals across layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub coverage: Vec<CoverageMetrics>,
    pub summary: CoverageSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub total_layers: usize,
    pub total_relationships: usize,
    pub isolated_node_types: usize,
    pub total_node_types: usize,
    pub isolation_percentage: f64,
}

impl CoverageReport {
    pub fn layer(&self, layer_id: &str) -> Option<&CoverageMetrics> {
        self.coverage.iter().find(|m| m.layer_id == layer_id)
    }
}

// =============================================================================
// Standard keyword table
// =============================================================================

struct StandardProfile {
    keywords: &'static [&'static str],
    standard: &'static str,
    reference_predicates: &'static [&'static str],
}

const STANDARD_PROFILES: &[StandardProfile] = &[
    StandardProfile {
        keywords: &["archimate"],
        standard: "ArchiMate",
        reference_predicates: &[
            "access",
            "aggregation",
            "assignment",
            "association",
            "composition",
            "flow",
            "influence",
            "realization",
            "serving",
            "specialization",
            "triggering",
        ],
    },
    StandardProfile {
        keywords: &["openapi", "swagger"],
        standard: "OpenAPI",
        reference_predicates: &["consumes", "depends-on", "exposes", "produces", "references"],
    },
    StandardProfile {
        keywords: &["json schema", "json-schema", "jsonschema"],
        standard: "JSON Schema",
        reference_predicates: &["composes", "contains", "extends", "references"],
    },
    StandardProfile {
        keywords: &["opentelemetry", "otel"],
        standard: "OpenTelemetry",
        reference_predicates: &["emits", "measures", "monitors", "traces"],
    },
    StandardProfile {
        keywords: &["uml"],
        standard: "UML",
        reference_predicates: &[
            "aggregation",
            "association",
            "composition",
            "dependency",
            "generalization",
            "realization",
        ],
    },
    StandardProfile {
        keywords: &["bpmn"],
        standard: "BPMN",
        reference_predicates: &["association", "flows-to", "message-flow", "triggers"],
    },
    StandardProfile {
        keywords: &["c4 model", "c4"],
        standard: "C4",
        reference_predicates: &["calls", "contains", "depends-on", "uses"],
    },
];

fn recognize_standard(inspired_by: &str) -> Option<&'static StandardProfile> {
    let lowered = inspired_by.to_lowercase();
    STANDARD_PROFILES
        .iter()
        .find(|profile| profile.keywords.iter().any(|k| lowered.contains(k)))
}

fn standard_alignment(layer: &LayerSpec, used: &[String]) -> Option<StandardAlignment> {
    let profile = recognize_standard(layer.inspired_by.as_deref()?)?;

    let aligned_predicates: Vec<String> = profile
        .reference_predicates
        .iter()
        .filter(|p| used.iter().any(|u| u == *p))
        .map(|p| p.to_string())
        .collect();

    Some(StandardAlignment {
        standard: profile.standard.to_string(),
        alignment_percentage: percentage(
            aligned_predicates.len(),
            profile.reference_predicates.len(),
        ),
        reference_predicates: profile
            .reference_predicates
            .iter()
            .map(|p| p.to_string())
            .collect(),
        aligned_predicates,
    })
}

// =============================================================================
// Analyzer
// =============================================================================

/// Computes [`CoverageMetrics`] for each layer of a specification.
pub struct CoverageAnalyzer<'a> {
    catalog: &'a PredicateCatalog,
    spec: &'a Specification,
}

impl<'a> CoverageAnalyzer<'a> {
    pub fn new(catalog: &'a PredicateCatalog, spec: &'a Specification) -> Self {
        Self { catalog, spec }
    }

    /// Analyzes every layer the graph covers.
    pub fn analyze(&self, graph: &RelationshipGraph) -> Result<CoverageReport, CatalogError> {
        let layers = self
            .spec
            .layers
            .iter()
            .filter(|layer| graph.layer_filter().map_or(true, |f| f == layer.id));

        let mut coverage = Vec::new();
        for layer in layers {
            coverage.push(self.analyze_layer(graph, layer)?);
        }

        let total_node_types = coverage.iter().map(|m| m.node_type_count).sum();
        let isolated = coverage.iter().map(|m| m.isolated_node_types.len()).sum();
        let summary = CoverageSummary {
            total_layers: coverage.len(),
            total_relationships: coverage.iter().map(|m| m.relationship_count).sum(),
            isolated_node_types: isolated,
            total_node_types,
            isolation_percentage: percentage(isolated, total_node_types),
        };

        Ok(CoverageReport { coverage, summary })
    }

    /// Computes the metrics of a single layer.
    pub fn analyze_layer(
        &self,
        graph: &RelationshipGraph,
        layer: &LayerSpec,
    ) -> Result<CoverageMetrics, CatalogError> {
        let node_types = graph.declared_node_types(&layer.id);
        let isolated_node_types: Vec<String> = node_types
            .iter()
            .filter(|n| graph.total_degree(n) == 0)
            .cloned()
            .collect();

        let layer_edges: Vec<_> = graph
            .edges()
            .iter()
            .filter(|e| e.source_layer() == layer.id)
            .collect();

        let available: BTreeSet<&str> = self.catalog.get_by_layer(&layer.id)?.into_iter().collect();
        let mut used = BTreeSet::new();
        for edge in &layer_edges {
            if available.contains(edge.predicate.as_str()) {
                used.insert(edge.predicate.as_str());
            } else {
                warn!(
                    layer = %layer.id,
                    edge = %edge.id,
                    predicate = %edge.predicate,
                    "Predicate is not applicable to layer; excluded from utilization"
                );
            }
        }

        let used_predicates: Vec<String> = used.iter().map(|p| p.to_string()).collect();
        let standard_alignment = standard_alignment(layer, &used_predicates);

        Ok(CoverageMetrics {
            layer_id: layer.id.clone(),
            node_type_count: node_types.len(),
            relationship_count: layer_edges.len(),
            isolation_percentage: percentage(isolated_node_types.len(), node_types.len()),
            isolated_node_types,
            available_predicates: available.iter().map(|p| p.to_string()).collect(),
            utilization_percentage: percentage(used.len(), available.len()),
            used_predicates,
            relationships_per_node_type: ratio(layer_edges.len(), node_types.len()),
            standard_alignment,
        })
    }
}
