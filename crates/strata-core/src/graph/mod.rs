//! Directed multigraph of node types and relationship edges.
//!
//! Two views can be built:
//!
//! - **type-level** ([`RelationshipGraph::from_specification`]): one edge per
//!   declared relationship type
//! - **instance-level** ([`RelationshipGraph::from_model`]): one edge per model
//!   element relationship, lifted to the elements' declared node types
//!
//! Building never fails. Edges that reference undeclared node types are still
//! indexed, malformed edges are skipped, and both are recorded as
//! [`IntegrityWarning`]s.

mod edge;
mod node;

pub use edge::{IntegrityWarning, IntegrityWarningKind, RelationshipEdge};
pub use node::{layer_of, type_name_of, NODE_TYPE_SEPARATOR};

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::{debug, warn};

use crate::spec::{Model, Specification};

/// Adjacency-indexed relationship graph.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    edges: Vec<RelationshipEdge>,
    /// Every node type in scope: declared ones plus edge endpoints
    nodes: BTreeSet<String>,
    /// Declared node types in scope, by layer
    declared: BTreeMap<String, Vec<String>>,
    /// Every declared node type, in or out of scope
    all_declared: HashSet<String>,
    outgoing: HashMap<String, Vec<usize>>,
    incoming: HashMap<String, Vec<usize>>,
    neighbors: HashMap<String, BTreeSet<String>>,
    edge_ids: HashSet<String>,
    warnings: Vec<IntegrityWarning>,
    layer_filter: Option<String>,
}

impl RelationshipGraph {
    /// Builds a graph from declared node types and a set of edges.
    ///
    /// With a layer filter, only that layer's declared node types and the
    /// edges whose source lies in that layer are kept.
    pub fn build<I, E>(declared_node_types: I, edges: E, layer_filter: Option<&str>) -> Self
    where
        I: IntoIterator<Item = String>,
        E: IntoIterator<Item = RelationshipEdge>,
    {
        let mut graph = Self {
            layer_filter: layer_filter.map(str::to_string),
            ..Self::default()
        };

        for node_type in declared_node_types {
            graph.declare(node_type);
        }

        for edge in edges {
            if graph.in_scope(edge.source_layer()) {
                graph.insert_edge(edge);
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            warnings = graph.warnings.len(),
            layer = graph.layer_filter.as_deref().unwrap_or("*"),
            "Relationship graph built"
        );
        graph
    }

    /// Builds the type-level graph from a specification's declared
    /// relationship types.
    pub fn from_specification(spec: &Specification, layer_filter: Option<&str>) -> Self {
        let declared = spec
            .layers
            .iter()
            .flat_map(|layer| layer.node_types.iter().cloned());

        let edges = spec.relationships.iter().map(|rel| {
            RelationshipEdge::new(
                &rel.id,
                &rel.source_spec_node_type,
                &rel.destination_spec_node_type,
                &rel.predicate,
            )
        });

        Self::build(declared, edges, layer_filter)
    }

    /// Builds the instance-level graph from a model's element relationships.
    ///
    /// Relationships without an explicit id are numbered per element
    /// (`{element}#{index}`). Relationships whose target element does not exist
    /// are skipped with an [`IntegrityWarningKind::UnresolvedTarget`] warning.
    pub fn from_model(model: &Model, spec: &Specification, layer_filter: Option<&str>) -> Self {
        let elements = model.element_index();
        let mut edges = Vec::new();
        let mut unresolved = Vec::new();

        for element in &model.elements {
            for (index, rel) in element.relationships.iter().enumerate() {
                let id = rel
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("{}#{}", element.id, index));

                match elements.get(rel.target.as_str()) {
                    Some(target) => edges.push(RelationshipEdge::new(
                        id,
                        &element.spec_node_type,
                        &target.spec_node_type,
                        &rel.predicate,
                    )),
                    None => unresolved.push((
                        layer_of(&element.spec_node_type).to_string(),
                        IntegrityWarning::new(
                            id,
                            IntegrityWarningKind::UnresolvedTarget,
                            format!(
                                "element '{}' references missing element '{}'",
                                element.id, rel.target
                            ),
                        ),
                    )),
                }
            }
        }

        let declared = spec
            .layers
            .iter()
            .flat_map(|layer| layer.node_types.iter().cloned());
        let mut graph = Self::build(declared, edges, layer_filter);

        for (layer, warning) in unresolved {
            if graph.in_scope(&layer) {
                graph.record(warning);
            }
        }
        graph
    }

    fn in_scope(&self, layer: &str) -> bool {
        self.layer_filter.as_deref().map_or(true, |filter| filter == layer)
    }

    fn declare(&mut self, node_type: String) {
        if !self.all_declared.insert(node_type.clone()) {
            return;
        }
        let layer = layer_of(&node_type).to_string();
        if self.in_scope(&layer) {
            self.nodes.insert(node_type.clone());
            self.declared.entry(layer).or_default().push(node_type);
        }
    }

    fn record(&mut self, warning: IntegrityWarning) {
        warn!(
            edge = %warning.edge_id,
            kind = ?warning.kind,
            "{}",
            warning.detail
        );
        self.warnings.push(warning);
    }

    fn insert_edge(&mut self, edge: RelationshipEdge) {
        if let Some(field) = edge.missing_field() {
            self.record(IntegrityWarning::new(
                edge.id.clone(),
                IntegrityWarningKind::MalformedEdge,
                format!("relationship is missing '{field}' and was skipped"),
            ));
            return;
        }

        if !self.edge_ids.insert(edge.id.clone()) {
            self.record(IntegrityWarning::new(
                edge.id.clone(),
                IntegrityWarningKind::DuplicateEdgeId,
                format!("relationship id '{}' is already used; duplicate skipped", edge.id),
            ));
            return;
        }

        for endpoint in [&edge.source_spec_node_type, &edge.destination_spec_node_type] {
            if !self.all_declared.contains(endpoint.as_str()) {
                self.record(IntegrityWarning::new(
                    edge.id.clone(),
                    IntegrityWarningKind::UndeclaredNodeType,
                    format!("node type '{endpoint}' is not declared by any layer"),
                ));
            }
        }

        let index = self.edges.len();
        let source = edge.source_spec_node_type.clone();
        let destination = edge.destination_spec_node_type.clone();

        self.nodes.insert(source.clone());
        self.nodes.insert(destination.clone());
        self.outgoing.entry(source.clone()).or_default().push(index);
        self.incoming.entry(destination.clone()).or_default().push(index);
        self.neighbors
            .entry(source.clone())
            .or_default()
            .insert(destination.clone());
        self.neighbors.entry(destination).or_default().insert(source);
        self.edges.push(edge);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// All node types in scope, sorted.
    pub fn node_types(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn contains_node(&self, node_type: &str) -> bool {
        self.nodes.contains(node_type)
    }

    /// Edges leaving a node type.
    pub fn outgoing<'a>(
        &'a self,
        node_type: &str,
    ) -> impl Iterator<Item = &'a RelationshipEdge> + 'a {
        self.outgoing
            .get(node_type)
            .into_iter()
            .flatten()
            .map(move |&index| &self.edges[index])
    }

    /// Edges arriving at a node type.
    pub fn incoming<'a>(
        &'a self,
        node_type: &str,
    ) -> impl Iterator<Item = &'a RelationshipEdge> + 'a {
        self.incoming
            .get(node_type)
            .into_iter()
            .flatten()
            .map(move |&index| &self.edges[index])
    }

    /// Node types connected to `node_type` in either direction, sorted and
    /// de-duplicated.
    pub fn neighbors<'a>(&'a self, node_type: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.neighbors
            .get(node_type)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn out_degree(&self, node_type: &str) -> usize {
        self.outgoing.get(node_type).map_or(0, Vec::len)
    }

    pub fn in_degree(&self, node_type: &str) -> usize {
        self.incoming.get(node_type).map_or(0, Vec::len)
    }

    pub fn total_degree(&self, node_type: &str) -> usize {
        self.in_degree(node_type) + self.out_degree(node_type)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    /// Declared node types of a layer that are in scope.
    pub fn declared_node_types(&self, layer: &str) -> &[String] {
        self.declared.get(layer).map(Vec::as_slice).unwrap_or_default()
    }

    /// Layers that have declared node types in scope, sorted.
    pub fn declared_layers(&self) -> impl Iterator<Item = &str> {
        self.declared.keys().map(String::as_str)
    }

    pub fn is_declared(&self, node_type: &str) -> bool {
        self.all_declared.contains(node_type)
    }

    pub fn warnings(&self) -> &[IntegrityWarning] {
        &self.warnings
    }

    pub fn layer_filter(&self) -> Option<&str> {
        self.layer_filter.as_deref()
    }
}
