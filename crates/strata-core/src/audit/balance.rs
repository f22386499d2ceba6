//! Relationship density assessment.
//!
//! Every node type is sorted into a density category by its type name, and its
//! outgoing intra-layer relationship count is compared with that category's
//! target range.
//!
//! | Category    | Type name rule (checked in order)                       | Target |
//! |-------------|---------------------------------------------------------|--------|
//! | enumeration | ends with level, type, status, priority, scope, ...     | 1..=2  |
//! | structural  | contains component, container, service, module, ...     | 2..=4  |
//! | behavioral  | contains process, operation, event, flow, ...           | 3..=5  |
//! | reference   | anything else                                           | 0..=1  |

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::{layer_of, type_name_of, RelationshipGraph};
use crate::spec::Model;

const ENUMERATION_SUFFIXES: &[&str] = &[
    "level", "type", "status", "priority", "scope", "action", "category", "format",
];

const STRUCTURAL_KEYWORDS: &[&str] = &[
    "component",
    "container",
    "service",
    "module",
    "collaboration",
    "interface",
    "device",
    "node",
    "artifact",
];

const BEHAVIORAL_KEYWORDS: &[&str] = &[
    "process",
    "operation",
    "event",
    "flow",
    "interaction",
    "function",
    "trigger",
];

/// Density category of a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityCategory {
    Structural,
    Behavioral,
    Enumeration,
    Reference,
}

impl DensityCategory {
    /// Classifies a node type key by the type-name part of the key.
    pub fn classify(node_type: &str) -> Self {
        let name = type_name_of(node_type).to_lowercase();

        if ENUMERATION_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            DensityCategory::Enumeration
        } else if STRUCTURAL_KEYWORDS.iter().any(|k| name.contains(k)) {
            DensityCategory::Structural
        } else if BEHAVIORAL_KEYWORDS.iter().any(|k| name.contains(k)) {
            DensityCategory::Behavioral
        } else {
            DensityCategory::Reference
        }
    }

    /// Inclusive `[min, max]` target for outgoing intra-layer relationships.
    pub fn target_range(&self) -> [usize; 2] {
        match self {
            DensityCategory::Structural => [2, 4],
            DensityCategory::Behavioral => [3, 5],
            DensityCategory::Enumeration => [1, 2],
            DensityCategory::Reference => [0, 1],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DensityCategory::Structural => "structural",
            DensityCategory::Behavioral => "behavioral",
            DensityCategory::Enumeration => "enumeration",
            DensityCategory::Reference => "reference",
        }
    }
}

impl fmt::Display for DensityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    Under,
    Balanced,
    Over,
}

impl BalanceStatus {
    /// Compares a count with an inclusive `[min, max]` range.
    pub fn evaluate(count: usize, [min, max]: [usize; 2]) -> Self {
        if count < min {
            BalanceStatus::Under
        } else if count > max {
            BalanceStatus::Over
        } else {
            BalanceStatus::Balanced
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceStatus::Under => "under",
            BalanceStatus::Balanced => "balanced",
            BalanceStatus::Over => "over",
        }
    }
}

impl fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Density verdict for one node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAssessment {
    pub node_type: String,
    pub layer: String,
    pub category: DensityCategory,
    pub current_count: usize,
    pub target_range: [usize; 2],
    pub status: BalanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl BalanceAssessment {
    /// Assesses one node type with a known outgoing intra-layer count.
    pub fn new(node_type: &str, current_count: usize) -> Self {
        let category = DensityCategory::classify(node_type);
        let target_range = category.target_range();
        let status = BalanceStatus::evaluate(current_count, target_range);
        let [min, max] = target_range;

        let recommendation = match status {
            BalanceStatus::Under => Some(format!(
                "Add {} relationship instance(s) from {} to reach minimum target of {}",
                min - current_count,
                node_type,
                min
            )),
            BalanceStatus::Over => Some(format!(
                "Consider removing {} instance(s) from {} or reviewing category classification ({})",
                current_count - max,
                node_type,
                category
            )),
            BalanceStatus::Balanced => None,
        };

        Self {
            node_type: node_type.to_string(),
            layer: layer_of(node_type).to_string(),
            category,
            current_count,
            target_range,
            status,
            recommendation,
        }
    }
}

/// Balance envelope as persisted in reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub assessments: Vec<BalanceAssessment>,
    pub summary: BalanceSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub total: usize,
    pub by_status: StatusCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub under: usize,
    pub balanced: usize,
    pub over: usize,
}

impl BalanceReport {
    pub fn new(assessments: Vec<BalanceAssessment>) -> Self {
        let mut counts = StatusCounts::default();
        for assessment in &assessments {
            match assessment.status {
                BalanceStatus::Under => counts.under += 1,
                BalanceStatus::Balanced => counts.balanced += 1,
                BalanceStatus::Over => counts.over += 1,
            }
        }
        Self {
            summary: BalanceSummary {
                total: assessments.len(),
                by_status: counts,
            },
            assessments,
        }
    }

    pub fn get(&self, node_type: &str) -> Option<&BalanceAssessment> {
        self.assessments.iter().find(|a| a.node_type == node_type)
    }

    pub fn by_status(&self, status: BalanceStatus) -> Vec<&BalanceAssessment> {
        self.assessments
            .iter()
            .filter(|a| a.status == status)
            .collect()
    }
}

/// Assesses relationship density at the specification or the instance level.
#[derive(Debug, Clone, Default)]
pub struct BalanceAssessor {
    layer_filter: Option<String>,
}

impl BalanceAssessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts assessment to one layer.
    pub fn for_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer_filter = Some(layer.into());
        self
    }

    /// Spec-level: counts declared intra-layer relationship types leaving
    /// each node type of a type-level graph.
    pub fn assess_specification(&self, graph: &RelationshipGraph) -> BalanceReport {
        let assessments = graph
            .node_types()
            .filter(|n| self.in_scope(n))
            .map(|node_type| {
                let count = graph
                    .outgoing(node_type)
                    .filter(|edge| edge.is_intra_layer())
                    .count();
                BalanceAssessment::new(node_type, count)
            })
            .collect();

        BalanceReport::new(assessments)
    }

    /// Instance-level: counts intra-layer relationships leaving the elements
    /// of each declared node type, summed per node type.
    ///
    /// Relationships to elements missing from the model are not counted.
    pub fn assess_model(&self, model: &Model) -> BalanceReport {
        let elements = model.element_index();
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for element in &model.elements {
            let node_type = element.spec_node_type.as_str();
            if node_type.is_empty() || !self.in_scope(node_type) {
                continue;
            }
            let layer = layer_of(node_type);

            let intra_layer = element
                .relationships
                .iter()
                .filter_map(|rel| elements.get(rel.target.as_str()))
                .filter(|target| layer_of(&target.spec_node_type) == layer)
                .count();

            *counts.entry(node_type).or_default() += intra_layer;
        }

        let assessments = counts
            .into_iter()
            .map(|(node_type, count)| BalanceAssessment::new(node_type, count))
            .collect();

        BalanceReport::new(assessments)
    }

    fn in_scope(&self, node_type: &str) -> bool {
        self.layer_filter
            .as_deref()
            .map_or(true, |layer| layer_of(node_type) == layer)
    }
}
