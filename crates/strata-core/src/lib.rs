pub mod audit;
pub mod catalog;
pub mod config;
pub mod diff;
pub mod graph;
pub mod snapshot;
pub mod spec;

pub use audit::{AuditOptions, AuditReport, Auditor};
pub use catalog::{CatalogError, PredicateCatalog, PredicateMetadata};
pub use config::Config;
pub use diff::{AuditDiff, DifferentialAnalyzer};
pub use graph::RelationshipGraph;
pub use snapshot::{FileSnapshotStore, SnapshotMetadata, SnapshotStore, StorageError};
pub use spec::{Model, Specification};
