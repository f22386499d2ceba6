mod common;

use strata_core::audit::{BalanceAssessment, BalanceAssessor, BalanceStatus, DensityCategory};
use strata_core::graph::RelationshipGraph;

use common::{sample_model, sample_spec};

#[test]
fn test_category_classification_order() {
    // Enumeration suffixes win over structural keywords
    assert_eq!(
        DensityCategory::classify("application.servicetype"),
        DensityCategory::Enumeration
    );
    assert_eq!(
        DensityCategory::classify("application.component"),
        DensityCategory::Structural
    );
    // Structural keywords win over behavioral ones
    assert_eq!(
        DensityCategory::classify("technology.event-node"),
        DensityCategory::Structural
    );
    assert_eq!(
        DensityCategory::classify("business.process"),
        DensityCategory::Behavioral
    );
    assert_eq!(
        DensityCategory::classify("motivation.goal"),
        DensityCategory::Reference
    );
    // Only the type name is classified, not the layer
    assert_eq!(
        DensityCategory::classify("service.goal"),
        DensityCategory::Reference
    );
    assert_eq!(
        DensityCategory::classify("api.ResponseFormat"),
        DensityCategory::Enumeration
    );
}

#[test]
fn test_target_ranges() {
    assert_eq!(DensityCategory::Structural.target_range(), [2, 4]);
    assert_eq!(DensityCategory::Behavioral.target_range(), [3, 5]);
    assert_eq!(DensityCategory::Enumeration.target_range(), [1, 2]);
    assert_eq!(DensityCategory::Reference.target_range(), [0, 1]);
}

#[test]
fn test_status_boundaries_are_inclusive() {
    assert_eq!(BalanceStatus::evaluate(1, [2, 4]), BalanceStatus::Under);
    assert_eq!(BalanceStatus::evaluate(2, [2, 4]), BalanceStatus::Balanced);
    assert_eq!(BalanceStatus::evaluate(4, [2, 4]), BalanceStatus::Balanced);
    assert_eq!(BalanceStatus::evaluate(5, [2, 4]), BalanceStatus::Over);
    assert_eq!(BalanceStatus::evaluate(0, [0, 1]), BalanceStatus::Balanced);
}

#[test]
fn test_recommendations() {
    let under = BalanceAssessment::new("application.service", 1);
    assert_eq!(under.status, BalanceStatus::Under);
    assert_eq!(
        under.recommendation.as_deref(),
        Some("Add 1 relationship instance(s) from application.service to reach minimum target of 2")
    );

    let over = BalanceAssessment::new("motivation.goal", 3);
    assert_eq!(over.status, BalanceStatus::Over);
    assert_eq!(
        over.recommendation.as_deref(),
        Some("Consider removing 2 instance(s) from motivation.goal or reviewing category classification (reference)")
    );

    let balanced = BalanceAssessment::new("business.process", 4);
    assert_eq!(balanced.status, BalanceStatus::Balanced);
    assert!(balanced.recommendation.is_none());
    assert_eq!(balanced.layer, "business");
}

#[test]
fn test_specification_level_counts_intra_layer_relationship_types() {
    let spec = sample_spec();
    let graph = RelationshipGraph::from_specification(&spec, None);

    let report = BalanceAssessor::new().assess_specification(&graph);
    assert_eq!(report.summary.total, 8);

    let component = report.get("application.component").unwrap();
    assert_eq!(component.current_count, 3);
    assert_eq!(component.status, BalanceStatus::Balanced);

    // The cross-layer depends-on edge does not count
    let process = report.get("business.process").unwrap();
    assert_eq!(process.category, DensityCategory::Behavioral);
    assert_eq!(process.current_count, 1);
    assert_eq!(process.status, BalanceStatus::Under);

    assert_eq!(report.summary.by_status.under, 4);
    assert_eq!(report.summary.by_status.balanced, 4);
    assert_eq!(report.summary.by_status.over, 0);
    assert_eq!(report.by_status(BalanceStatus::Under).len(), 4);
}

#[test]
fn test_instance_level_sums_element_relationships() {
    let model = sample_model();

    let report = BalanceAssessor::new().assess_model(&model);
    let node_types: Vec<&str> = report
        .assessments
        .iter()
        .map(|a| a.node_type.as_str())
        .collect();
    assert_eq!(
        node_types,
        vec![
            "application.component",
            "application.interface",
            "application.service",
            "business.process",
        ]
    );

    // Three resolvable intra-layer relationships; the missing target is not counted
    let component = report.get("application.component").unwrap();
    assert_eq!(component.current_count, 3);
    assert_eq!(component.status, BalanceStatus::Balanced);

    // s1 has one, s2 none
    let service = report.get("application.service").unwrap();
    assert_eq!(service.current_count, 1);
    assert_eq!(service.status, BalanceStatus::Under);

    let process = report.get("business.process").unwrap();
    assert_eq!(process.current_count, 0);
    assert_eq!(
        process.recommendation.as_deref(),
        Some("Add 3 relationship instance(s) from business.process to reach minimum target of 3")
    );
}

#[test]
fn test_instance_level_layer_filter() {
    let model = sample_model();

    let report = BalanceAssessor::new().for_layer("business").assess_model(&model);

    assert_eq!(report.assessments.len(), 1);
    assert_eq!(report.assessments[0].node_type, "business.process");
}
