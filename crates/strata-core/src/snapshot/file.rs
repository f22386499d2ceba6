use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::audit::AuditReport;
use crate::config::{
    SnapshotConfig, DEFAULT_MAX_SNAPSHOTS, SNAPSHOT_META_SUFFIX, SNAPSHOT_REPORT_SUFFIX,
};

use super::error::StorageError;
use super::{resolve_id, snapshot_id, SnapshotMetadata, SnapshotPair, SnapshotStore};

/// File-based snapshot storage.
///
/// Each snapshot is two files under one root directory:
/// ```text
/// .strata/audit-snapshots/
///   20240309-070501.json         # Full audit report
///   20240309-070501.meta.json    # SnapshotMetadata
/// ```
pub struct FileSnapshotStore {
    root: PathBuf,
    /// Retention limit applied after each save (0 keeps everything)
    max_snapshots: usize,
}

impl FileSnapshotStore {
    /// Creates a store rooted at `root` with the default retention limit.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_snapshots: DEFAULT_MAX_SNAPSHOTS,
        }
    }

    /// Creates a store from snapshot configuration.
    pub fn with_config(config: &SnapshotConfig) -> Self {
        Self {
            root: config.storage_path(),
            max_snapshots: config.max_snapshots,
        }
    }

    pub fn with_max_snapshots(mut self, max_snapshots: usize) -> Self {
        self.max_snapshots = max_snapshots;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path to a snapshot's full report.
    pub fn report_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}{SNAPSHOT_REPORT_SUFFIX}"))
    }

    /// Returns the path to a snapshot's metadata file.
    pub fn meta_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}{SNAPSHOT_META_SUFFIX}"))
    }

    async fn ensure_root(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::io(&self.root, e))
    }

    async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json)
            .await
            .map_err(|e| StorageError::io(path, e))
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
        let json = fs::read_to_string(path)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Removes a file, treating a missing file as already removed.
    async fn remove_file(path: &Path) -> Result<bool, StorageError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    /// Removes both files of a snapshot. Returns true if anything was removed.
    async fn remove_snapshot(&self, id: &str) -> Result<bool, StorageError> {
        let report = Self::remove_file(&self.report_path(id)).await?;
        let meta = Self::remove_file(&self.meta_path(id)).await?;
        Ok(report || meta)
    }

    /// Removes several snapshots concurrently. Returns how many were removed.
    async fn remove_all(&self, ids: &[String]) -> Result<usize, StorageError> {
        let results = join_all(ids.iter().map(|id| self.remove_snapshot(id))).await;

        let mut removed = 0;
        for result in results {
            if result? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Deletes everything past the newest `max_snapshots` snapshots.
    async fn apply_retention(&self) -> Result<usize, StorageError> {
        if self.max_snapshots == 0 {
            return Ok(0);
        }

        let snapshots = self.list().await?;
        if snapshots.len() <= self.max_snapshots {
            return Ok(0);
        }

        let stale: Vec<String> = snapshots[self.max_snapshots..]
            .iter()
            .map(|m| m.id.clone())
            .collect();
        let removed = self.remove_all(&stale).await?;
        info!(removed, keep = self.max_snapshots, "Applied snapshot retention");
        Ok(removed)
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, report: &AuditReport) -> Result<SnapshotMetadata, StorageError> {
        self.ensure_root().await?;

        let id = snapshot_id(&report.timestamp);
        let report_path = self.report_path(&id);
        let meta_path = self.meta_path(&id);

        if fs::try_exists(&meta_path).await.unwrap_or(false) {
            warn!(id = %id, "Snapshot id already exists; overwriting");
        }

        Self::write_json(&report_path, report).await?;

        let metadata = SnapshotMetadata {
            id: id.clone(),
            timestamp: report.timestamp,
            model_name: report.model.name.clone(),
            model_version: report.model.version.clone(),
            layers: report.layers(),
            snapshot_path: report_path,
        };
        Self::write_json(&meta_path, &metadata).await?;
        debug!(id = %id, root = %self.root.display(), "Snapshot saved");

        self.apply_retention().await?;
        Ok(metadata)
    }

    async fn load(&self, id_or_timestamp: &str) -> Result<AuditReport, StorageError> {
        let id = resolve_id(id_or_timestamp)
            .ok_or_else(|| StorageError::not_found(id_or_timestamp))?;
        let path = self.report_path(&id);

        match Self::read_json(&path).await {
            Err(StorageError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Err(StorageError::not_found(id))
            }
            result => result,
        }
    }

    async fn list(&self) -> Result<Vec<SnapshotMetadata>, StorageError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&self.root, e)),
        };

        let mut snapshots = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&self.root, e))?
        {
            let path = entry.path();
            let is_meta = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.ends_with(SNAPSHOT_META_SUFFIX));
            if !is_meta {
                continue;
            }

            match Self::read_json::<SnapshotMetadata>(&path).await {
                Ok(metadata) => snapshots.push(metadata),
                Err(e) => {
                    // Skip unreadable metadata
                    warn!(path = %path.display(), error = %e, "Skipping snapshot metadata");
                }
            }
        }

        // Most recent first
        snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));

        Ok(snapshots)
    }

    async fn latest_pair(&self) -> Result<Option<SnapshotPair>, StorageError> {
        let snapshots = self.list().await?;
        let [after, before, ..] = snapshots.as_slice() else {
            return Ok(None);
        };

        Ok(Some(SnapshotPair {
            before: self.load(&before.id).await?,
            after: self.load(&after.id).await?,
        }))
    }

    async fn delete(&self, id_or_timestamp: &str) -> Result<(), StorageError> {
        let id = resolve_id(id_or_timestamp)
            .ok_or_else(|| StorageError::not_found(id_or_timestamp))?;

        if self.remove_snapshot(&id).await? {
            debug!(id = %id, "Snapshot deleted");
        }
        Ok(())
    }

    async fn clear(&self) -> Result<usize, StorageError> {
        let ids: Vec<String> = self.list().await?.into_iter().map(|m| m.id).collect();
        let removed = self.remove_all(&ids).await?;
        info!(removed, "Cleared snapshots");
        Ok(removed)
    }
}
