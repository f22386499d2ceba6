//! Differences between two audit reports.
//!
//! Findings are matched by stable keys, never by position:
//!
//! | Section          | Key |
//! |------------------|-----|
//! | coverage         | layer id |
//! | gaps             | node type |
//! | duplicates       | sorted relationship-id pair |
//! | balance          | node type |
//! | instance balance | node type |

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::{
    AuditReport, BalanceReport, BalanceStatus, Confidence, ConnectivityStats, CoverageMetrics,
    CoverageReport, DuplicateCandidate, DuplicateReport, GapCandidate, GapPriority, GapReport,
};
use crate::spec::ModelIdentity;

/// Which report a diff side came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEndpoint {
    pub timestamp: DateTime<Utc>,
    pub model: ModelIdentity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDiff {
    pub before: DiffEndpoint,
    pub after: DiffEndpoint,
    pub coverage: CoverageDiff,
    pub gaps: GapDiff,
    pub duplicates: DuplicateDiff,
    pub balance: BalanceDiff,
    /// Empty unless both reports carry an instance-level balance
    #[serde(default)]
    pub instance_balance: BalanceDiff,
    pub connectivity: ConnectivityDelta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageDiff {
    pub added_layers: Vec<String>,
    pub removed_layers: Vec<String>,
    /// Layers present on both sides whose metrics changed
    pub changed_layers: Vec<LayerCoverageDelta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerCoverageDelta {
    pub layer_id: String,
    pub node_type_count: i64,
    pub relationship_count: i64,
    pub isolation_percentage: f64,
    pub utilization_percentage: f64,
    pub newly_isolated: Vec<String>,
    pub no_longer_isolated: Vec<String>,
    pub newly_used_predicates: Vec<String>,
    pub no_longer_used_predicates: Vec<String>,
}

impl LayerCoverageDelta {
    pub fn is_empty(&self) -> bool {
        self.node_type_count == 0
            && self.relationship_count == 0
            && self.isolation_percentage == 0.0
            && self.utilization_percentage == 0.0
            && self.newly_isolated.is_empty()
            && self.no_longer_isolated.is_empty()
            && self.newly_used_predicates.is_empty()
            && self.no_longer_used_predicates.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapDiff {
    pub added: Vec<GapCandidate>,
    pub removed: Vec<GapCandidate>,
    pub priority_changes: Vec<PriorityChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityChange {
    pub node_type: String,
    pub before: GapPriority,
    pub after: GapPriority,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateDiff {
    pub added: Vec<DuplicateCandidate>,
    pub removed: Vec<DuplicateCandidate>,
    pub confidence_changes: Vec<ConfidenceChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceChange {
    pub relationship_ids: [String; 2],
    pub before: Confidence,
    pub after: Confidence,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDiff {
    pub transitions: Vec<StatusTransition>,
    pub added_node_types: Vec<String>,
    pub removed_node_types: Vec<String>,
}

impl BalanceDiff {
    pub fn change_count(&self) -> usize {
        self.transitions.len() + self.added_node_types.len() + self.removed_node_types.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTransition {
    pub node_type: String,
    pub before: BalanceStatus,
    pub after: BalanceStatus,
    pub before_count: usize,
    pub after_count: usize,
}

/// `after - before` of the connectivity stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityDelta {
    pub node_count: i64,
    pub edge_count: i64,
    pub component_count: i64,
    pub isolated_count: i64,
    pub largest_component_size: i64,
}

impl ConnectivityDelta {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Change counts per section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub coverage_changes: usize,
    pub gap_changes: usize,
    pub duplicate_changes: usize,
    pub balance_changes: usize,
    #[serde(default)]
    pub instance_balance_changes: usize,
    pub connectivity_changed: bool,
}

impl DiffSummary {
    pub fn total(&self) -> usize {
        self.coverage_changes
            + self.gap_changes
            + self.duplicate_changes
            + self.balance_changes
            + self.instance_balance_changes
            + usize::from(self.connectivity_changed)
    }
}

impl AuditDiff {
    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            coverage_changes: self.coverage.added_layers.len()
                + self.coverage.removed_layers.len()
                + self.coverage.changed_layers.len(),
            gap_changes: self.gaps.added.len()
                + self.gaps.removed.len()
                + self.gaps.priority_changes.len(),
            duplicate_changes: self.duplicates.added.len()
                + self.duplicates.removed.len()
                + self.duplicates.confidence_changes.len(),
            balance_changes: self.balance.change_count(),
            instance_balance_changes: self.instance_balance.change_count(),
            connectivity_changed: !self.connectivity.is_empty(),
        }
    }

    pub fn has_changes(&self) -> bool {
        self.summary().total() > 0
    }
}

/// Compares two audit reports.
pub struct DifferentialAnalyzer;

impl DifferentialAnalyzer {
    pub fn compare(before: &AuditReport, after: &AuditReport) -> AuditDiff {
        AuditDiff {
            before: DiffEndpoint {
                timestamp: before.timestamp,
                model: before.model.clone(),
            },
            after: DiffEndpoint {
                timestamp: after.timestamp,
                model: after.model.clone(),
            },
            coverage: compare_coverage(&before.coverage, &after.coverage),
            gaps: compare_gaps(&before.gaps, &after.gaps),
            duplicates: compare_duplicates(&before.duplicates, &after.duplicates),
            balance: compare_balance(&before.balance, &after.balance),
            instance_balance: match (&before.instance_balance, &after.instance_balance) {
                (Some(before), Some(after)) => compare_balance(before, after),
                _ => BalanceDiff::default(),
            },
            connectivity: compare_connectivity(
                &before.connectivity.stats,
                &after.connectivity.stats,
            ),
        }
    }
}

fn delta(before: usize, after: usize) -> i64 {
    after as i64 - before as i64
}

/// Items only in `after`, then items only in `before`, both sorted.
fn set_changes(before: &[String], after: &[String]) -> (Vec<String>, Vec<String>) {
    let before: BTreeSet<&String> = before.iter().collect();
    let after: BTreeSet<&String> = after.iter().collect();
    (
        after.difference(&before).map(|s| s.to_string()).collect(),
        before.difference(&after).map(|s| s.to_string()).collect(),
    )
}

fn compare_coverage(before: &CoverageReport, after: &CoverageReport) -> CoverageDiff {
    let old: BTreeMap<&str, &CoverageMetrics> = before
        .coverage
        .iter()
        .map(|m| (m.layer_id.as_str(), m))
        .collect();
    let new: BTreeMap<&str, &CoverageMetrics> = after
        .coverage
        .iter()
        .map(|m| (m.layer_id.as_str(), m))
        .collect();

    let mut diff = CoverageDiff::default();
    for (layer, metrics) in &new {
        match old.get(layer) {
            None => diff.added_layers.push(layer.to_string()),
            Some(previous) => {
                let layer_delta = compare_layer(previous, metrics);
                if !layer_delta.is_empty() {
                    diff.changed_layers.push(layer_delta);
                }
            }
        }
    }
    diff.removed_layers = old
        .keys()
        .filter(|layer| !new.contains_key(*layer))
        .map(|layer| layer.to_string())
        .collect();
    diff
}

fn compare_layer(before: &CoverageMetrics, after: &CoverageMetrics) -> LayerCoverageDelta {
    let (newly_isolated, no_longer_isolated) =
        set_changes(&before.isolated_node_types, &after.isolated_node_types);
    let (newly_used_predicates, no_longer_used_predicates) =
        set_changes(&before.used_predicates, &after.used_predicates);

    LayerCoverageDelta {
        layer_id: after.layer_id.clone(),
        node_type_count: delta(before.node_type_count, after.node_type_count),
        relationship_count: delta(before.relationship_count, after.relationship_count),
        isolation_percentage: after.isolation_percentage - before.isolation_percentage,
        utilization_percentage: after.utilization_percentage - before.utilization_percentage,
        newly_isolated,
        no_longer_isolated,
        newly_used_predicates,
        no_longer_used_predicates,
    }
}

fn compare_gaps(before: &GapReport, after: &GapReport) -> GapDiff {
    let old: BTreeMap<&str, &GapCandidate> = before
        .gaps
        .iter()
        .map(|g| (g.node_type.as_str(), g))
        .collect();
    let new: BTreeMap<&str, &GapCandidate> = after
        .gaps
        .iter()
        .map(|g| (g.node_type.as_str(), g))
        .collect();

    let mut diff = GapDiff::default();
    for (node_type, gap) in &new {
        match old.get(node_type) {
            None => diff.added.push((*gap).clone()),
            Some(previous) if previous.priority != gap.priority => {
                diff.priority_changes.push(PriorityChange {
                    node_type: node_type.to_string(),
                    before: previous.priority,
                    after: gap.priority,
                })
            }
            Some(_) => {}
        }
    }
    diff.removed = old
        .iter()
        .filter(|(node_type, _)| !new.contains_key(*node_type))
        .map(|(_, gap)| (*gap).clone())
        .collect();
    diff
}

fn compare_duplicates(before: &DuplicateReport, after: &DuplicateReport) -> DuplicateDiff {
    let old: BTreeMap<(String, String), &DuplicateCandidate> = before
        .candidates
        .iter()
        .map(|c| (c.pair_key(), c))
        .collect();
    let new: BTreeMap<(String, String), &DuplicateCandidate> = after
        .candidates
        .iter()
        .map(|c| (c.pair_key(), c))
        .collect();

    let mut diff = DuplicateDiff::default();
    for (key, candidate) in &new {
        match old.get(key) {
            None => diff.added.push((*candidate).clone()),
            Some(previous) if previous.confidence != candidate.confidence => {
                diff.confidence_changes.push(ConfidenceChange {
                    relationship_ids: [key.0.clone(), key.1.clone()],
                    before: previous.confidence,
                    after: candidate.confidence,
                })
            }
            Some(_) => {}
        }
    }
    diff.removed = old
        .iter()
        .filter(|(key, _)| !new.contains_key(*key))
        .map(|(_, candidate)| (*candidate).clone())
        .collect();
    diff
}

fn compare_balance(before: &BalanceReport, after: &BalanceReport) -> BalanceDiff {
    let old: BTreeMap<&str, _> = before
        .assessments
        .iter()
        .map(|a| (a.node_type.as_str(), a))
        .collect();
    let new: BTreeMap<&str, _> = after
        .assessments
        .iter()
        .map(|a| (a.node_type.as_str(), a))
        .collect();

    let mut diff = BalanceDiff::default();
    for (node_type, assessment) in &new {
        match old.get(node_type) {
            None => diff.added_node_types.push(node_type.to_string()),
            Some(previous) if previous.status != assessment.status => {
                diff.transitions.push(StatusTransition {
                    node_type: node_type.to_string(),
                    before: previous.status,
                    after: assessment.status,
                    before_count: previous.current_count,
                    after_count: assessment.current_count,
                })
            }
            Some(_) => {}
        }
    }
    diff.removed_node_types = old
        .keys()
        .filter(|node_type| !new.contains_key(*node_type))
        .map(|node_type| node_type.to_string())
        .collect();
    diff
}

fn compare_connectivity(
    before: &ConnectivityStats,
    after: &ConnectivityStats,
) -> ConnectivityDelta {
    ConnectivityDelta {
        node_count: delta(before.node_count, after.node_count),
        edge_count: delta(before.edge_count, after.edge_count),
        component_count: delta(before.component_count, after.component_count),
        isolated_count: delta(before.isolated_count, after.isolated_count),
        largest_component_size: delta(before.largest_component_size, after.largest_component_size),
    }
}
