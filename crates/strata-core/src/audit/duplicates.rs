//! Semantic-overlap detection between relationships that share endpoints.
//!
//! Relationships are grouped by their unordered endpoint pair. Within each
//! group every unordered pair is compared once using the predicates' catalog
//! metadata:
//!
//! 1. same category: `high` confidence when transitivity and symmetry agree,
//!    `medium` otherwise
//! 2. declared inverses of each other: `high`
//! 3. anything else is not a duplicate
//!
//! Pairs involving a predicate the catalog does not know are skipped.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::matches_layer_prefix;
use crate::catalog::{CatalogError, PredicateCatalog, PredicateMetadata};
use crate::graph::{RelationshipEdge, RelationshipGraph};

/// How confident the detector is that two relationships overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two relationships between the same node types that likely mean the same thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCandidate {
    pub relationship_ids: [String; 2],
    pub predicates: [String; 2],
    pub source_node_type: String,
    pub destination_node_type: String,
    pub reason: String,
    pub confidence: Confidence,
}

impl DuplicateCandidate {
    /// Order-independent key of the relationship pair.
    pub fn pair_key(&self) -> (String, String) {
        let [a, b] = &self.relationship_ids;
        if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }
}

/// Result of a duplicate detection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuplicateAnalysis {
    candidates: Vec<DuplicateCandidate>,
}

impl DuplicateAnalysis {
    pub fn candidates(&self) -> &[DuplicateCandidate] {
        &self.candidates
    }

    /// Candidates whose source node type lies under a layer prefix.
    pub fn by_layer(&self, prefix: &str) -> Vec<&DuplicateCandidate> {
        self.candidates
            .iter()
            .filter(|c| matches_layer_prefix(&c.source_node_type, prefix))
            .collect()
    }

    pub fn by_confidence(&self, confidence: Confidence) -> Vec<&DuplicateCandidate> {
        self.candidates
            .iter()
            .filter(|c| c.confidence == confidence)
            .collect()
    }

    /// Keeps only candidates at or above a confidence level.
    pub fn at_least(self, confidence: Confidence) -> Self {
        Self {
            candidates: self
                .candidates
                .into_iter()
                .filter(|c| c.confidence <= confidence)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn into_report(self) -> DuplicateReport {
        DuplicateReport::new(self.candidates)
    }
}

/// Duplicate envelope as persisted in reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    pub candidates: Vec<DuplicateCandidate>,
    pub summary: DuplicateSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateSummary {
    pub total: usize,
    pub by_confidence: ConfidenceCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl DuplicateReport {
    pub fn new(candidates: Vec<DuplicateCandidate>) -> Self {
        let mut counts = ConfidenceCounts::default();
        for candidate in &candidates {
            match candidate.confidence {
                Confidence::High => counts.high += 1,
                Confidence::Medium => counts.medium += 1,
                Confidence::Low => counts.low += 1,
            }
        }
        Self {
            summary: DuplicateSummary {
                total: candidates.len(),
                by_confidence: counts,
            },
            candidates,
        }
    }
}

/// Detects overlapping relationships.
///
/// Detection is a pure function of the graph and the catalog; callers that
/// want caching keep the returned [`DuplicateAnalysis`].
pub struct DuplicateDetector<'a> {
    catalog: &'a PredicateCatalog,
}

impl<'a> DuplicateDetector<'a> {
    pub fn new(catalog: &'a PredicateCatalog) -> Self {
        Self { catalog }
    }

    pub fn detect(&self, graph: &RelationshipGraph) -> Result<DuplicateAnalysis, CatalogError> {
        let mut groups: BTreeMap<(&str, &str), Vec<&RelationshipEdge>> = BTreeMap::new();
        for edge in graph.edges() {
            let (a, b) = (
                edge.source_spec_node_type.as_str(),
                edge.destination_spec_node_type.as_str(),
            );
            let key = if a <= b { (a, b) } else { (b, a) };
            groups.entry(key).or_default().push(edge);
        }

        let mut candidates = Vec::new();
        for group in groups.values().filter(|g| g.len() >= 2) {
            for (i, first) in group.iter().enumerate() {
                for second in &group[i + 1..] {
                    if let Some(candidate) = self.compare(first, second)? {
                        candidates.push(candidate);
                    }
                }
            }
        }

        debug!(candidates = candidates.len(), "Duplicate detection finished");
        Ok(DuplicateAnalysis { candidates })
    }

    fn compare(
        &self,
        first: &RelationshipEdge,
        second: &RelationshipEdge,
    ) -> Result<Option<DuplicateCandidate>, CatalogError> {
        let (Some(a), Some(b)) = (
            self.catalog.get_by_predicate(&first.predicate)?,
            self.catalog.get_by_predicate(&second.predicate)?,
        ) else {
            return Ok(None);
        };

        Ok(classify(a, b).map(|(reason, confidence)| DuplicateCandidate {
            relationship_ids: [first.id.clone(), second.id.clone()],
            predicates: [first.predicate.clone(), second.predicate.clone()],
            source_node_type: first.source_spec_node_type.clone(),
            destination_node_type: first.destination_spec_node_type.clone(),
            reason,
            confidence,
        }))
    }
}

fn classify(a: &PredicateMetadata, b: &PredicateMetadata) -> Option<(String, Confidence)> {
    if a.category == b.category {
        let (sa, sb) = (&a.semantics, &b.semantics);
        let mut reasons = vec![format!("Both predicates in \"{}\" category", a.category)];
        if sa.transitivity && sb.transitivity {
            reasons.push("both transitive".to_string());
        }
        if sa.symmetry && sb.symmetry {
            reasons.push("both symmetric".to_string());
        }

        let confidence = if sa.transitivity == sb.transitivity && sa.symmetry == sb.symmetry {
            Confidence::High
        } else {
            Confidence::Medium
        };
        return Some((reasons.join(", "), confidence));
    }

    if a.is_inverse_of(b) {
        return Some((
            "Predicates are inverses of each other".to_string(),
            Confidence::High,
        ));
    }

    None
}
