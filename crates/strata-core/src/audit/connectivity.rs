//! Connectivity structure of a relationship graph: connected components,
//! degree distribution, isolated node types and transitive chains.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ratio;
use crate::catalog::{CatalogError, PredicateCatalog};
use crate::config::defaults::DEFAULT_MAX_CHAIN_BRANCHES;
use crate::graph::RelationshipGraph;

/// Node types reachable from each other in the undirected view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedComponent {
    pub nodes: Vec<String>,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDegree {
    pub node_type: String,
    pub in_degree: usize,
    pub out_degree: usize,
    pub total_degree: usize,
}

/// Longest simple path found along one transitive predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitiveChain {
    pub predicate: String,
    pub chain: Vec<String>,
    pub length: usize,
    /// Set when the search budget ran out before every path was explored
    #[serde(default, skip_serializing_if = "is_false")]
    pub truncated: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub component_count: usize,
    pub isolated_count: usize,
    pub largest_component_size: usize,
    pub average_degree: f64,
    pub transitive_chain_count: usize,
}

/// Connectivity envelope as persisted in reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityReport {
    pub components: Vec<ConnectedComponent>,
    pub degrees: Vec<NodeDegree>,
    pub isolated_nodes: Vec<String>,
    pub transitive_chains: Vec<TransitiveChain>,
    pub stats: ConnectivityStats,
}

impl ConnectivityReport {
    pub fn degree(&self, node_type: &str) -> Option<&NodeDegree> {
        self.degrees.iter().find(|d| d.node_type == node_type)
    }

    /// The component containing a node type.
    pub fn component_of(&self, node_type: &str) -> Option<&ConnectedComponent> {
        self.components
            .iter()
            .find(|c| c.nodes.iter().any(|n| n == node_type))
    }
}

pub struct ConnectivityAnalyzer<'a> {
    catalog: &'a PredicateCatalog,
    max_branches: usize,
}

impl<'a> ConnectivityAnalyzer<'a> {
    pub fn new(catalog: &'a PredicateCatalog) -> Self {
        Self {
            catalog,
            max_branches: DEFAULT_MAX_CHAIN_BRANCHES,
        }
    }

    /// Caps the edges followed per chain search. 0 disables the cap.
    pub fn with_max_branches(mut self, max_branches: usize) -> Self {
        self.max_branches = max_branches;
        self
    }

    pub fn analyze(&self, graph: &RelationshipGraph) -> Result<ConnectivityReport, CatalogError> {
        let components = components(graph);
        let degrees = degrees(graph);
        let mut isolated_nodes: Vec<String> = degrees
            .iter()
            .filter(|d| d.total_degree == 0)
            .map(|d| d.node_type.clone())
            .collect();
        isolated_nodes.sort();

        let transitive_chains = self.transitive_chains(graph)?;

        let total_degree: usize = degrees.iter().map(|d| d.total_degree).sum();
        let stats = ConnectivityStats {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            component_count: components.len(),
            isolated_count: isolated_nodes.len(),
            largest_component_size: components.first().map_or(0, |c| c.size),
            average_degree: ratio(total_degree, graph.node_count()),
            transitive_chain_count: transitive_chains.len(),
        };

        debug!(
            components = stats.component_count,
            isolated = stats.isolated_count,
            chains = stats.transitive_chain_count,
            "Connectivity analysis finished"
        );

        Ok(ConnectivityReport {
            components,
            degrees,
            isolated_nodes,
            transitive_chains,
            stats,
        })
    }

    /// Chains along every transitive predicate, in predicate order.
    pub fn transitive_chains(
        &self,
        graph: &RelationshipGraph,
    ) -> Result<Vec<TransitiveChain>, CatalogError> {
        let mut chains = Vec::new();
        for metadata in self.catalog.transitive_predicates()? {
            chains.extend(self.chains_for(graph, &metadata.predicate));
        }
        Ok(chains)
    }

    fn chains_for(&self, graph: &RelationshipGraph, predicate: &str) -> Vec<TransitiveChain> {
        let mut successors: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut has_incoming: HashSet<&str> = HashSet::new();
        for edge in graph.edges().iter().filter(|e| e.predicate == predicate) {
            successors
                .entry(edge.source_spec_node_type.as_str())
                .or_default()
                .insert(edge.destination_spec_node_type.as_str());
            has_incoming.insert(edge.destination_spec_node_type.as_str());
        }

        // Roots first, then the rest (cycles have no root).
        let (roots, rest): (Vec<&str>, Vec<&str>) = successors
            .keys()
            .copied()
            .partition(|node| !has_incoming.contains(node));

        let mut covered: HashSet<&str> = HashSet::new();
        let mut chains = Vec::new();
        for start in roots.into_iter().chain(rest) {
            if covered.contains(start) {
                continue;
            }
            let (path, truncated) = longest_path(&successors, start, self.max_branches);
            if truncated {
                warn!(
                    predicate,
                    start,
                    budget = self.max_branches,
                    "Transitive chain search budget exhausted; keeping longest chain found so far"
                );
            }
            if path.len() < 2 {
                continue;
            }
            covered.extend(path.iter().copied());
            chains.push(TransitiveChain {
                predicate: predicate.to_string(),
                length: path.len(),
                chain: path.into_iter().map(str::to_string).collect(),
                truncated,
            });
        }
        chains
    }
}

/// Longest simple path from `start`, searched depth first with an explicit
/// stack. Every edge followed counts against `budget` (0 = unbounded).
/// Returns the path and whether the budget cut the search short.
fn longest_path<'g>(
    successors: &BTreeMap<&'g str, BTreeSet<&'g str>>,
    start: &'g str,
    budget: usize,
) -> (Vec<&'g str>, bool) {
    let mut best = vec![start];
    // One frame per node of the current path: the node and the index of the
    // next successor to try from it.
    let mut frames: Vec<(&'g str, usize)> = vec![(start, 0)];
    let mut followed = 0usize;

    while let Some(&(node, cursor)) = frames.last() {
        let next = successors.get(node).and_then(|succ| {
            succ.iter()
                .enumerate()
                .skip(cursor)
                .find(|(_, candidate)| !frames.iter().any(|(n, _)| n == *candidate))
        });

        let Some((index, &succ)) = next else {
            frames.pop();
            continue;
        };
        if budget > 0 && followed >= budget {
            return (best, true);
        }
        followed += 1;

        if let Some(frame) = frames.last_mut() {
            frame.1 = index + 1;
        }
        frames.push((succ, 0));
        if frames.len() > best.len() {
            best = frames.iter().map(|(n, _)| *n).collect();
        }
    }

    (best, false)
}

/// Connected components of the undirected view.
///
/// Nodes are sorted within a component; components are sorted by size
/// (largest first), then by their first node.
pub fn components(graph: &RelationshipGraph) -> Vec<ConnectedComponent> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut components = Vec::new();

    for start in graph.node_types() {
        if !visited.insert(start) {
            continue;
        }
        let mut nodes = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            nodes.push(node.to_string());
            for neighbor in graph.neighbors(node) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        nodes.sort();
        components.push(ConnectedComponent {
            size: nodes.len(),
            nodes,
        });
    }

    components.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.nodes.cmp(&b.nodes)));
    components
}

/// Degree of every node type, highest total first.
pub fn degrees(graph: &RelationshipGraph) -> Vec<NodeDegree> {
    let mut degrees: Vec<NodeDegree> = graph
        .node_types()
        .map(|node_type| {
            let in_degree = graph.in_degree(node_type);
            let out_degree = graph.out_degree(node_type);
            NodeDegree {
                node_type: node_type.to_string(),
                in_degree,
                out_degree,
                total_degree: in_degree + out_degree,
            }
        })
        .collect();

    degrees.sort_by(|a, b| {
        b.total_degree
            .cmp(&a.total_degree)
            .then_with(|| a.node_type.cmp(&b.node_type))
    });
    degrees
}
