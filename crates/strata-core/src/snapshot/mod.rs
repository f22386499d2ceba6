//! Persistence of audit reports as timestamped snapshots.

mod error;
mod file;

pub use error::StorageError;
pub use file::FileSnapshotStore;

use std::path::PathBuf;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::audit::AuditReport;
use crate::config::SNAPSHOT_ID_FORMAT;

const SNAPSHOT_ID_PATTERN: &str = r"^\d{8}-\d{6}$";

/// Summary of a stored snapshot, kept next to the full report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub model_name: String,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub layers: Vec<String>,
    pub snapshot_path: PathBuf,
}

/// The two most recent snapshots, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotPair {
    pub before: AuditReport,
    pub after: AuditReport,
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Saves a report and applies retention. Returns the new snapshot's metadata.
    async fn save(&self, report: &AuditReport) -> Result<SnapshotMetadata, StorageError>;

    /// Loads a report by snapshot id or timestamp.
    async fn load(&self, id_or_timestamp: &str) -> Result<AuditReport, StorageError>;

    /// Lists snapshot metadata, newest first.
    async fn list(&self) -> Result<Vec<SnapshotMetadata>, StorageError>;

    /// The second-newest and newest reports, when at least two exist.
    async fn latest_pair(&self) -> Result<Option<SnapshotPair>, StorageError>;

    /// Deletes a snapshot. Deleting a missing snapshot is not an error.
    async fn delete(&self, id_or_timestamp: &str) -> Result<(), StorageError>;

    /// Deletes every snapshot and returns how many were removed.
    async fn clear(&self) -> Result<usize, StorageError>;
}

/// Snapshot id of a timestamp (`YYYYMMDD-HHmmss`, UTC).
pub fn snapshot_id(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(SNAPSHOT_ID_FORMAT).to_string()
}

/// Resolves user input to a snapshot id.
///
/// Accepts an id as-is, an RFC 3339 timestamp or `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn resolve_id(id_or_timestamp: &str) -> Option<String> {
    let input = id_or_timestamp.trim();

    if is_snapshot_id(input) {
        return Some(input.to_string());
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Some(snapshot_id(&timestamp.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| snapshot_id(&Utc.from_utc_datetime(&naive)))
}

static SNAPSHOT_ID_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

/// Snapshot id pattern, compiled on first use.
fn snapshot_id_regex() -> Option<&'static Regex> {
    SNAPSHOT_ID_REGEX
        .get_or_init(|| Regex::new(SNAPSHOT_ID_PATTERN).ok())
        .as_ref()
}

fn is_snapshot_id(input: &str) -> bool {
    snapshot_id_regex().map_or(false, |re| re.is_match(input))
}
