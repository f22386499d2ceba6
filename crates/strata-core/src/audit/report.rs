//! Combined audit report and the [`Auditor`] that assembles it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::balance::{BalanceAssessment, BalanceAssessor, BalanceReport};
use super::connectivity::{ConnectivityAnalyzer, ConnectivityReport};
use super::coverage::{CoverageAnalyzer, CoverageMetrics, CoverageReport};
use super::duplicates::{Confidence, DuplicateCandidate, DuplicateDetector, DuplicateReport};
use super::gaps::{GapAnalyzer, GapCandidate, GapReport};
use super::matches_layer_prefix;
use crate::catalog::{CatalogError, PredicateCatalog};
use crate::config::{AuditConfig, DEFAULT_MAX_CHAIN_BRANCHES};
use crate::graph::{layer_of, IntegrityWarning, RelationshipGraph};
use crate::spec::{Model, ModelIdentity, Specification};

/// Full result of one audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub timestamp: DateTime<Utc>,
    pub model: ModelIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_filter: Option<String>,
    pub coverage: CoverageReport,
    pub duplicates: DuplicateReport,
    pub gaps: GapReport,
    pub balance: BalanceReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_balance: Option<BalanceReport>,
    pub connectivity: ConnectivityReport,
    #[serde(default)]
    pub integrity_warnings: Vec<IntegrityWarning>,
}

/// Every finding of a report that concerns one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerAuditBundle {
    pub layer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageMetrics>,
    pub duplicates: Vec<DuplicateCandidate>,
    pub gaps: Vec<GapCandidate>,
    pub balance: Vec<BalanceAssessment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instance_balance: Vec<BalanceAssessment>,
    pub isolated_nodes: Vec<String>,
}

impl AuditReport {
    /// Layer ids covered by the report, in specification order.
    pub fn layers(&self) -> Vec<String> {
        self.coverage
            .coverage
            .iter()
            .map(|m| m.layer_id.clone())
            .collect()
    }

    pub fn layer_bundle(&self, layer: &str) -> LayerAuditBundle {
        let in_layer = |node_type: &str| layer_of(node_type) == layer;

        LayerAuditBundle {
            layer_id: layer.to_string(),
            coverage: self.coverage.layer(layer).cloned(),
            duplicates: self
                .duplicates
                .candidates
                .iter()
                .filter(|c| matches_layer_prefix(&c.source_node_type, layer))
                .cloned()
                .collect(),
            gaps: self
                .gaps
                .gaps
                .iter()
                .filter(|g| g.layer_id == layer)
                .cloned()
                .collect(),
            balance: self
                .balance
                .assessments
                .iter()
                .filter(|a| a.layer == layer)
                .cloned()
                .collect(),
            instance_balance: self
                .instance_balance
                .iter()
                .flat_map(|report| report.assessments.iter())
                .filter(|a| a.layer == layer)
                .cloned()
                .collect(),
            isolated_nodes: self
                .connectivity
                .isolated_nodes
                .iter()
                .filter(|n| in_layer(n))
                .cloned()
                .collect(),
        }
    }
}

/// Knobs of an audit run.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditOptions {
    /// Restrict the audit to one layer
    pub layer: Option<String>,
    /// Edge budget of each transitive-chain search (0 = unbounded)
    pub max_chain_branches: usize,
    /// Drop duplicate candidates below this confidence
    pub min_confidence: Option<Confidence>,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            layer: None,
            max_chain_branches: DEFAULT_MAX_CHAIN_BRANCHES,
            min_confidence: None,
        }
    }
}

impl AuditOptions {
    pub fn from_config(config: &AuditConfig) -> Self {
        Self {
            max_chain_branches: config.max_chain_branches,
            ..Self::default()
        }
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_min_confidence(mut self, confidence: Confidence) -> Self {
        self.min_confidence = Some(confidence);
        self
    }
}

/// Runs every analyzer over a specification (and optionally a model).
pub struct Auditor<'a> {
    catalog: &'a PredicateCatalog,
    spec: &'a Specification,
    options: AuditOptions,
}

impl<'a> Auditor<'a> {
    pub fn new(catalog: &'a PredicateCatalog, spec: &'a Specification) -> Self {
        Self {
            catalog,
            spec,
            options: AuditOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AuditOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the type-level graph and assembles a timestamped report.
    ///
    /// With a model, the instance-level balance is assessed as well and the
    /// model's integrity warnings are included.
    pub fn run(&self, model: Option<&Model>) -> Result<AuditReport, CatalogError> {
        let layer = self.options.layer.as_deref();
        let graph = RelationshipGraph::from_specification(self.spec, layer);

        let coverage = CoverageAnalyzer::new(self.catalog, self.spec).analyze(&graph)?;

        let mut duplicates = DuplicateDetector::new(self.catalog).detect(&graph)?;
        if let Some(confidence) = self.options.min_confidence {
            duplicates = duplicates.at_least(confidence);
        }

        let gaps = GapAnalyzer::new(self.catalog, self.spec).analyze(&graph)?;
        let assessor = match layer {
            Some(layer) => BalanceAssessor::new().for_layer(layer),
            None => BalanceAssessor::new(),
        };
        // Cross-layer edge endpoints are graph nodes but not part of the filtered layer
        let balance = assessor.assess_specification(&graph);
        let connectivity = ConnectivityAnalyzer::new(self.catalog)
            .with_max_branches(self.options.max_chain_branches)
            .analyze(&graph)?;

        let mut integrity_warnings = graph.warnings().to_vec();
        let instance_balance = model.map(|model| {
            let instances = RelationshipGraph::from_model(model, self.spec, layer);
            integrity_warnings.extend_from_slice(instances.warnings());
            assessor.assess_model(model)
        });

        let report = AuditReport {
            timestamp: Utc::now(),
            model: model.map_or_else(|| self.spec.identity(), Model::identity),
            layer_filter: self.options.layer.clone(),
            coverage,
            duplicates: duplicates.into_report(),
            gaps: gaps.into_report(),
            balance,
            instance_balance,
            connectivity,
            integrity_warnings,
        };

        info!(
            model = %report.model.name,
            layers = report.coverage.summary.total_layers,
            duplicates = report.duplicates.summary.total,
            gaps = report.gaps.summary.total,
            warnings = report.integrity_warnings.len(),
            "Audit complete"
        );
        Ok(report)
    }
}
