mod common;

use strata_core::catalog::{CatalogError, PredicateCatalog, PredicateMetadata};

use common::{sample_catalog, SPEC_YAML};

#[test]
fn test_queries_before_load_fail() {
    let catalog = PredicateCatalog::new(vec![PredicateMetadata::new("uses", "dependency")]);

    assert!(!catalog.is_loaded());
    assert!(matches!(
        catalog.get_by_predicate("uses"),
        Err(CatalogError::NotLoaded)
    ));
    assert!(matches!(
        catalog.get_by_layer("application"),
        Err(CatalogError::NotLoaded)
    ));
    assert!(matches!(
        catalog.transitive_predicates(),
        Err(CatalogError::NotLoaded)
    ));
}

#[test]
fn test_load_is_idempotent() {
    let mut catalog = PredicateCatalog::new(vec![
        PredicateMetadata::new("uses", "dependency"),
        PredicateMetadata::new("depends-on", "dependency").transitive(),
    ]);

    catalog.load().unwrap();
    catalog.load().unwrap();

    assert!(catalog.is_loaded());
    assert_eq!(catalog.len().unwrap(), 2);
}

#[test]
fn test_get_by_predicate() {
    let catalog = sample_catalog();

    let composes = catalog.get_by_predicate("composes").unwrap().unwrap();
    assert_eq!(composes.category, "composition");
    assert_eq!(composes.inverse_predicate.as_deref(), Some("composed-of"));

    assert!(catalog.get_by_predicate("unknown").unwrap().is_none());
}

#[test]
fn test_get_by_layer_respects_applicability() {
    let catalog = sample_catalog();

    assert_eq!(
        catalog.get_by_layer("application").unwrap(),
        vec!["composed-of", "composes", "depends-on", "serves", "uses"]
    );
    assert_eq!(
        catalog.get_by_layer("business").unwrap(),
        vec!["composed-of", "composes", "depends-on", "serves", "triggers", "uses"]
    );
    assert_eq!(
        catalog.get_by_layer("data").unwrap(),
        vec!["composed-of", "composes", "depends-on", "uses"]
    );
}

#[test]
fn test_transitive_predicates_sorted() {
    let catalog = sample_catalog();

    let names: Vec<&str> = catalog
        .transitive_predicates()
        .unwrap()
        .iter()
        .map(|p| p.predicate.as_str())
        .collect();
    assert_eq!(names, vec!["depends-on", "triggers"]);
}

#[test]
fn test_duplicate_predicate_rejected() {
    let mut catalog = PredicateCatalog::new(vec![
        PredicateMetadata::new("uses", "dependency"),
        PredicateMetadata::new("uses", "other"),
    ]);

    let err = catalog.load().unwrap_err();
    assert!(matches!(err, CatalogError::DuplicatePredicate(ref p) if p == "uses"));
    assert!(!catalog.is_loaded());
}

#[test]
fn test_undeclared_inverse_rejected() {
    let mut catalog = PredicateCatalog::new(vec![
        PredicateMetadata::new("composes", "composition").with_inverse("composed-of"),
    ]);

    let err = catalog.load().unwrap_err();
    assert!(matches!(
        err,
        CatalogError::InvalidPredicate { ref predicate, .. } if predicate == "composes"
    ));
}

#[test]
fn test_symmetric_predicate_with_distinct_inverse_rejected() {
    let mut catalog = PredicateCatalog::new(vec![
        PredicateMetadata::new("associated-with", "association")
            .symmetric()
            .with_inverse("linked-to"),
        PredicateMetadata::new("linked-to", "association"),
    ]);

    assert!(matches!(
        catalog.load(),
        Err(CatalogError::InvalidPredicate { .. })
    ));
}

#[test]
fn test_symmetric_predicate_may_be_its_own_inverse() {
    let mut catalog = PredicateCatalog::new(vec![PredicateMetadata::new(
        "associated-with",
        "association",
    )
    .symmetric()
    .with_inverse("associated-with")]);

    catalog.load().unwrap();
    let meta = catalog.get_by_predicate("associated-with").unwrap().unwrap();
    assert!(meta.semantics.symmetry);
}

#[test]
fn test_catalog_from_path() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("spec.yaml");
    std::fs::write(&path, SPEC_YAML).unwrap();

    let mut catalog = PredicateCatalog::from_path(&path);
    assert!(!catalog.is_loaded());
    catalog.load().unwrap();

    assert_eq!(catalog.len().unwrap(), 6);
}

#[test]
fn test_catalog_from_missing_path_fails() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut catalog = PredicateCatalog::from_path(temp.path().join("missing.yaml"));

    assert!(matches!(catalog.load(), Err(CatalogError::Spec(_))));
}
