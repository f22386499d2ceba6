//! Relationship audit analyzers.
//!
//! Each analyzer is a pure function of a [`RelationshipGraph`](crate::graph::RelationshipGraph)
//! and, where needed, the [`PredicateCatalog`](crate::catalog::PredicateCatalog).
//! [`Auditor`] runs all of them and assembles an [`AuditReport`].

pub mod balance;
pub mod connectivity;
pub mod coverage;
pub mod duplicates;
pub mod gaps;
pub mod report;

pub use balance::{
    BalanceAssessment, BalanceAssessor, BalanceReport, BalanceStatus, BalanceSummary,
    DensityCategory, StatusCounts,
};
pub use connectivity::{
    ConnectedComponent, ConnectivityAnalyzer, ConnectivityReport, ConnectivityStats, NodeDegree,
    TransitiveChain,
};
pub use coverage::{
    CoverageAnalyzer, CoverageMetrics, CoverageReport, CoverageSummary, StandardAlignment,
};
pub use duplicates::{
    Confidence, ConfidenceCounts, DuplicateAnalysis, DuplicateCandidate, DuplicateDetector,
    DuplicateReport, DuplicateSummary,
};
pub use gaps::{
    GapAnalysis, GapAnalyzer, GapCandidate, GapPriority, GapReport, GapSummary, PriorityCounts,
};
pub use report::{AuditOptions, AuditReport, Auditor, LayerAuditBundle};

use crate::graph::NODE_TYPE_SEPARATOR;

/// `part / whole * 100`, or 0 when `whole` is 0.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// `num / den`, or 0 when `den` is 0.
pub(crate) fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// True when `node_type` lies under `prefix` on a segment boundary.
///
/// `"api"` and `"api."` both match `"api.endpoint"`, but `"ap"` does not.
pub(crate) fn matches_layer_prefix(node_type: &str, prefix: &str) -> bool {
    match node_type.strip_prefix(prefix) {
        Some(rest) => {
            rest.is_empty()
                || prefix.ends_with(NODE_TYPE_SEPARATOR)
                || rest.starts_with(NODE_TYPE_SEPARATOR)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_denominators() {
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(ratio(3, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(ratio(3, 2), 1.5);
    }

    #[test]
    fn test_matches_layer_prefix() {
        assert!(matches_layer_prefix("api.endpoint", "api"));
        assert!(matches_layer_prefix("api.endpoint", "api."));
        assert!(matches_layer_prefix("api.endpoint", "api.endpoint"));
        assert!(!matches_layer_prefix("api.endpoint", "ap"));
        assert!(!matches_layer_prefix("apis.endpoint", "api"));
    }
}
