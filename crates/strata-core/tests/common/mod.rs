//! Shared fixtures for integration tests.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use strata_core::catalog::{PredicateCatalog, PredicateMetadata};
use strata_core::graph::{RelationshipEdge, RelationshipGraph};
use strata_core::{AuditReport, Auditor, Model, Specification};

/// Two ArchiMate/BPMN-flavoured layers plus a one-type data layer.
///
/// Type-level edges:
/// ```text
/// application.component --depends-on--> application.service
/// application.component --uses--------> application.service
/// application.service   --serves------> application.interface   (min 1)
/// application.component --composes----> application.interface
/// application.interface --composed-of-> application.component
/// business.process      --triggers----> business.event
/// business.event        --triggers----> business.actor
/// business.process      --depends-on--> application.service
/// ```
/// `application.dataobject` and `data.schema` have no relationships.
pub const SPEC_YAML: &str = r#"
name: sample-architecture
version: "1.0.0"
predicates:
  - predicate: depends-on
    category: dependency
    semantics:
      directionality: unidirectional
      transitivity: true
  - predicate: uses
    category: dependency
  - predicate: composes
    inversePredicate: composed-of
    category: composition
  - predicate: composed-of
    inversePredicate: composes
    category: decomposition
  - predicate: serves
    category: service
    layers: [application, business]
  - predicate: triggers
    category: dynamic
    semantics:
      transitivity: true
    layers: [business]
layers:
  - id: application
    name: Application
    inspiredBy: ArchiMate 3.2
    nodeTypes: [component, service, interface, dataobject]
  - id: business
    inspiredBy: BPMN 2.0
    nodeTypes: [process, event, actor]
  - id: data
    nodeTypes: [schema]
relationships:
  - id: app-comp-depends-svc
    sourceSpecNodeType: application.component
    destinationSpecNodeType: application.service
    predicate: depends-on
  - id: app-comp-uses-svc
    sourceSpecNodeType: application.component
    destinationSpecNodeType: application.service
    predicate: uses
  - id: app-svc-serves-iface
    sourceSpecNodeType: application.service
    destinationSpecNodeType: application.interface
    predicate: serves
    cardinality:
      min: 1
  - id: app-comp-composes-iface
    sourceSpecNodeType: application.component
    destinationSpecNodeType: application.interface
    predicate: composes
  - id: app-iface-composed-of-comp
    sourceSpecNodeType: application.interface
    destinationSpecNodeType: application.component
    predicate: composed-of
  - id: biz-process-triggers-event
    sourceSpecNodeType: business.process
    destinationSpecNodeType: business.event
    predicate: triggers
  - id: biz-event-triggers-actor
    sourceSpecNodeType: business.event
    destinationSpecNodeType: business.actor
    predicate: triggers
  - id: biz-process-depends-svc
    sourceSpecNodeType: business.process
    destinationSpecNodeType: application.service
    predicate: depends-on
"#;

/// Instances of the sample specification. `c1` points at a missing element.
pub const MODEL_YAML: &str = r#"
name: webshop
version: "2.1"
elements:
  - id: c1
    specNodeType: application.component
    relationships:
      - { target: s1, predicate: depends-on }
      - { target: s2, predicate: uses }
      - { target: i1, predicate: composes }
      - { target: missing, predicate: depends-on }
  - id: s1
    specNodeType: application.service
    relationships:
      - { id: s1-serves-i1, target: i1, predicate: serves }
  - id: s2
    specNodeType: application.service
  - id: i1
    specNodeType: application.interface
    relationships:
      - { target: c1, predicate: composed-of }
  - id: p1
    specNodeType: business.process
    relationships:
      - { target: s1, predicate: depends-on }
"#;

pub fn sample_spec() -> Specification {
    Specification::from_yaml(SPEC_YAML).unwrap()
}

pub fn sample_model() -> Model {
    Model::from_yaml(MODEL_YAML).unwrap()
}

/// Loaded catalog over the sample specification's predicates.
pub fn sample_catalog() -> PredicateCatalog {
    let mut catalog = PredicateCatalog::from_specification(&sample_spec());
    catalog.load().unwrap();
    catalog
}

/// Loaded catalog over explicit declarations.
pub fn catalog(declarations: Vec<PredicateMetadata>) -> PredicateCatalog {
    let mut catalog = PredicateCatalog::new(declarations);
    catalog.load().unwrap();
    catalog
}

pub fn edge(id: &str, source: &str, destination: &str, predicate: &str) -> RelationshipEdge {
    RelationshipEdge::new(id, source, destination, predicate)
}

/// Graph over declared node types and edges, without a layer filter.
pub fn graph(declared: &[&str], edges: Vec<RelationshipEdge>) -> RelationshipGraph {
    RelationshipGraph::build(declared.iter().map(|n| n.to_string()), edges, None)
}

/// Full audit of the sample specification and model.
pub fn sample_report() -> AuditReport {
    let spec = sample_spec();
    let catalog = sample_catalog();
    let model = sample_model();
    Auditor::new(&catalog, &spec).run(Some(&model)).unwrap()
}

/// 2024-03-09 07:05:00 UTC plus `seconds`.
pub fn timestamp(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 0).unwrap() + chrono::Duration::seconds(seconds)
}

/// Sample report stamped at [`timestamp`]`(seconds)`.
pub fn report_at(seconds: i64) -> AuditReport {
    let mut report = sample_report();
    report.timestamp = timestamp(seconds);
    report
}
