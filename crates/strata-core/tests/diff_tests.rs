mod common;

use strata_core::audit::{BalanceStatus, Confidence, GapPriority};
use strata_core::{Auditor, DifferentialAnalyzer, Model, PredicateCatalog, Specification};

use common::{report_at, sample_catalog, sample_model, sample_spec, MODEL_YAML, SPEC_YAML};

/// The sample specification plus a cross-layer relationship that connects
/// the two isolated node types.
fn connected_spec() -> Specification {
    let yaml = format!(
        "{SPEC_YAML}  - id: app-dataobject-uses-schema
    sourceSpecNodeType: application.dataobject
    destinationSpecNodeType: data.schema
    predicate: uses
"
    );
    Specification::from_yaml(&yaml).unwrap()
}

#[test]
fn test_identical_reports_have_no_changes() {
    let before = report_at(0);
    let after = report_at(60);

    let diff = DifferentialAnalyzer::compare(&before, &after);
    assert!(!diff.has_changes());
    assert_eq!(diff.summary().total(), 0);
    assert_eq!(diff.before.timestamp, before.timestamp);
    assert_eq!(diff.after.timestamp, after.timestamp);
}

#[test]
fn test_order_does_not_matter() {
    let before = report_at(0);
    let mut after = before.clone();
    after.duplicates.candidates.reverse();
    after.gaps.gaps.reverse();
    after.balance.assessments.reverse();
    after.coverage.coverage.reverse();
    for candidate in &mut after.duplicates.candidates {
        candidate.relationship_ids.swap(0, 1);
    }

    let diff = DifferentialAnalyzer::compare(&before, &after);
    assert!(!diff.has_changes());
}

#[test]
fn test_connecting_isolated_node_types() {
    let catalog = sample_catalog();
    let before_spec = sample_spec();
    let after_spec = connected_spec();

    let before = Auditor::new(&catalog, &before_spec).run(None).unwrap();
    let after = Auditor::new(&catalog, &after_spec).run(None).unwrap();
    let diff = DifferentialAnalyzer::compare(&before, &after);

    // Coverage
    assert!(diff.coverage.added_layers.is_empty());
    assert!(diff.coverage.removed_layers.is_empty());
    let layers: Vec<&str> = diff
        .coverage
        .changed_layers
        .iter()
        .map(|l| l.layer_id.as_str())
        .collect();
    assert_eq!(layers, vec!["application", "data"]);

    let application = &diff.coverage.changed_layers[0];
    assert_eq!(application.relationship_count, 1);
    assert_eq!(application.node_type_count, 0);
    assert_eq!(application.isolation_percentage, -25.0);
    assert_eq!(application.no_longer_isolated, vec!["application.dataobject"]);
    assert!(application.newly_used_predicates.is_empty());

    let data = &diff.coverage.changed_layers[1];
    assert_eq!(data.relationship_count, 0);
    assert_eq!(data.isolation_percentage, -100.0);
    assert_eq!(data.no_longer_isolated, vec!["data.schema"]);

    // Gaps
    assert!(diff.gaps.added.is_empty());
    assert_eq!(diff.gaps.removed.len(), 1);
    assert_eq!(diff.gaps.removed[0].node_type, "application.dataobject");
    assert_eq!(diff.gaps.priority_changes.len(), 1);
    let change = &diff.gaps.priority_changes[0];
    assert_eq!(change.node_type, "data.schema");
    assert_eq!(change.before, GapPriority::High);
    assert_eq!(change.after, GapPriority::Low);

    // Cross-layer edges do not affect balance or duplicates
    assert!(diff.balance.transitions.is_empty());
    assert!(diff.duplicates.added.is_empty());
    assert!(diff.duplicates.removed.is_empty());

    // Connectivity
    assert_eq!(diff.connectivity.node_count, 0);
    assert_eq!(diff.connectivity.edge_count, 1);
    assert_eq!(diff.connectivity.component_count, -1);
    assert_eq!(diff.connectivity.isolated_count, -2);
    assert_eq!(diff.connectivity.largest_component_size, 0);

    let summary = diff.summary();
    assert_eq!(summary.coverage_changes, 2);
    assert_eq!(summary.gap_changes, 2);
    assert_eq!(summary.duplicate_changes, 0);
    assert_eq!(summary.balance_changes, 0);
    assert!(summary.connectivity_changed);
    assert_eq!(summary.total(), 5);
}

#[test]
fn test_reverse_direction_mirrors_changes() {
    let catalog = sample_catalog();
    let before_spec = sample_spec();
    let after_spec = connected_spec();

    let before = Auditor::new(&catalog, &before_spec).run(None).unwrap();
    let after = Auditor::new(&catalog, &after_spec).run(None).unwrap();
    let diff = DifferentialAnalyzer::compare(&after, &before);

    assert_eq!(diff.gaps.added.len(), 1);
    assert_eq!(diff.gaps.added[0].node_type, "application.dataobject");
    assert!(diff.gaps.removed.is_empty());
    assert_eq!(diff.coverage.changed_layers[1].newly_isolated, vec!["data.schema"]);
    assert_eq!(diff.connectivity.isolated_count, 2);
}

#[test]
fn test_instance_balance_transition() {
    let catalog = sample_catalog();
    let spec = sample_spec();
    // s2 gains a relationship, lifting application.service to its minimum of 2
    let s2 = "  - id: s2\n    specNodeType: application.service\n";
    let yaml = MODEL_YAML.replace(
        s2,
        &format!("{s2}    relationships:\n      - {{ target: i1, predicate: serves }}\n"),
    );
    let after_model = Model::from_yaml(&yaml).unwrap();

    let before = Auditor::new(&catalog, &spec).run(Some(&sample_model())).unwrap();
    let after = Auditor::new(&catalog, &spec).run(Some(&after_model)).unwrap();
    let diff = DifferentialAnalyzer::compare(&before, &after);

    assert_eq!(diff.instance_balance.transitions.len(), 1);
    let transition = &diff.instance_balance.transitions[0];
    assert_eq!(transition.node_type, "application.service");
    assert_eq!(transition.before, BalanceStatus::Under);
    assert_eq!(transition.after, BalanceStatus::Balanced);
    assert_eq!(transition.before_count, 1);
    assert_eq!(transition.after_count, 2);
    assert!(diff.instance_balance.added_node_types.is_empty());
    assert!(diff.instance_balance.removed_node_types.is_empty());

    // Specification-level findings are unaffected
    assert!(diff.balance.transitions.is_empty());
    let summary = diff.summary();
    assert_eq!(summary.balance_changes, 0);
    assert_eq!(summary.instance_balance_changes, 1);
    assert!(diff.has_changes());
}

#[test]
fn test_instance_balance_needs_both_sides() {
    let catalog = sample_catalog();
    let spec = sample_spec();

    let before = Auditor::new(&catalog, &spec).run(None).unwrap();
    let after = Auditor::new(&catalog, &spec).run(Some(&sample_model())).unwrap();
    let diff = DifferentialAnalyzer::compare(&before, &after);

    assert_eq!(diff.instance_balance, Default::default());
    assert_eq!(diff.summary().instance_balance_changes, 0);
}

#[test]
fn test_confidence_and_status_changes() {
    let before = report_at(0);
    let mut after = report_at(60);

    after.duplicates.candidates[0].confidence = Confidence::Low;
    let changed_pair = after.duplicates.candidates[0].pair_key();
    assert_eq!(after.duplicates.candidates.len(), 2);
    after.duplicates.candidates.pop();

    let service = after
        .balance
        .assessments
        .iter_mut()
        .find(|a| a.node_type == "application.service")
        .unwrap();
    let before_count = service.current_count;
    service.current_count = 9;
    service.status = BalanceStatus::Over;

    after.balance.assessments.retain(|a| a.node_type != "data.schema");

    let diff = DifferentialAnalyzer::compare(&before, &after);

    assert_eq!(diff.duplicates.confidence_changes.len(), 1);
    let confidence = &diff.duplicates.confidence_changes[0];
    assert_eq!(
        confidence.relationship_ids,
        [changed_pair.0.clone(), changed_pair.1.clone()]
    );
    assert_eq!(confidence.after, Confidence::Low);
    assert_eq!(diff.duplicates.removed.len(), 1);
    assert!(diff.duplicates.added.is_empty());

    assert_eq!(diff.balance.transitions.len(), 1);
    let transition = &diff.balance.transitions[0];
    assert_eq!(transition.node_type, "application.service");
    assert_eq!(transition.after, BalanceStatus::Over);
    assert_eq!(transition.before_count, before_count);
    assert_eq!(transition.after_count, 9);
    assert_eq!(diff.balance.removed_node_types, vec!["data.schema"]);
    assert!(diff.balance.added_node_types.is_empty());

    assert_eq!(diff.summary().duplicate_changes, 2);
    assert_eq!(diff.summary().balance_changes, 2);
}

#[test]
fn test_model_identity_changes_are_reported_on_endpoints() {
    let before = report_at(0);
    let mut after = report_at(60);
    after.model.version = Some("3.0".to_string());

    let diff = DifferentialAnalyzer::compare(&before, &after);
    assert_eq!(diff.before.model.version.as_deref(), Some("2.1"));
    assert_eq!(diff.after.model.version.as_deref(), Some("3.0"));
    assert!(!diff.has_changes());
}

#[test]
fn test_diff_serializes_camel_case() {
    let catalog: PredicateCatalog = sample_catalog();
    let before_spec = sample_spec();
    let after_spec = connected_spec();
    let before = Auditor::new(&catalog, &before_spec).run(None).unwrap();
    let after = Auditor::new(&catalog, &after_spec).run(None).unwrap();

    let json = serde_json::to_value(DifferentialAnalyzer::compare(&before, &after)).unwrap();
    assert_eq!(json["coverage"]["changedLayers"][0]["layerId"], "application");
    assert_eq!(json["gaps"]["priorityChanges"][0]["before"], "high");
    assert_eq!(json["connectivity"]["isolatedCount"], -2);
}
