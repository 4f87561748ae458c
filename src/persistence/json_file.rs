//! Versioned JSON snapshot file
//!
//! Writes go to a sibling temp file which is synced and then renamed over
//! the target, so a crash leaves either the old or the new snapshot intact.

use super::{SnapshotStore, StoreSnapshot};
use crate::error::TrackerError;
use crate::models::{Record, UserId};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    version: u32,
    saved_at: DateTime<Utc>,
    checksum: String,
    users: BTreeMap<UserId, Vec<Record>>,
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
    }
}

/// SHA256 of the serialized user map, streamed into the hasher
fn checksum(users: &BTreeMap<UserId, Vec<Record>>) -> Result<String> {
    let mut hasher = Sha256::new();
    serde_json::to_writer(&mut HashWriter(&mut hasher), users).map_err(|e| {
        TrackerError::StorageFailure(format!("Failed to hash snapshot: {}", e))
    })?;
    Ok(hex::encode(hasher.finalize()))
}

struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<StoreSnapshot> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No snapshot file yet");
                return Ok(StoreSnapshot::default());
            }
            Err(e) => {
                return Err(TrackerError::StorageFailure(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let file: SnapshotFile = serde_json::from_slice(&raw).map_err(|e| {
            TrackerError::StorageFailure(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;

        if file.version != SNAPSHOT_VERSION {
            return Err(TrackerError::StorageFailure(format!(
                "Unsupported snapshot version {} in {}",
                file.version,
                self.path.display()
            )));
        }

        if checksum(&file.users)? != file.checksum {
            return Err(TrackerError::StorageFailure(format!(
                "Checksum mismatch in {}",
                self.path.display()
            )));
        }

        Ok(StoreSnapshot { users: file.users })
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                TrackerError::StorageFailure(format!(
                    "Failed to prepare snapshot directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            checksum: checksum(&snapshot.users)?,
            users: snapshot.users.clone(),
        };
        let payload = serde_json::to_vec_pretty(&file).map_err(|e| {
            TrackerError::StorageFailure(format!("Failed to encode snapshot: {}", e))
        })?;

        let temp_path = self.temp_path();
        let written = async {
            let mut temp = tokio::fs::File::create(&temp_path).await?;
            temp.write_all(&payload).await?;
            temp.sync_all().await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(TrackerError::StorageFailure(format!(
                "Failed to write snapshot payload: {}",
                e
            )));
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(TrackerError::StorageFailure(format!(
                "Failed to finalize snapshot {}: {}",
                self.path.display(),
                e
            )));
        }

        debug!(path = %self.path.display(), users = snapshot.users.len(), "Snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, RecordKind};
    use chrono::TimeZone;

    fn sample_snapshot() -> StoreSnapshot {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let mut snapshot = StoreSnapshot::default();
        snapshot.users.insert(
            UserId(42),
            vec![
                Record::at(100, RecordKind::Income, "Office work", at),
                Record::at(40, RecordKind::Expense, "Food", at),
            ],
        );
        snapshot.users.insert(UserId(-3), vec![Record::expense(0, ExpenseCategory::Housing)]);
        snapshot.users.insert(UserId(9), vec![]);
        snapshot
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load().await.unwrap(), StoreSnapshot::default());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("ledger.json"));

        let snapshot = sample_snapshot();
        store.save(&snapshot).await.unwrap();
        assert_eq!(store.load().await.unwrap(), snapshot);

        store.save(&StoreSnapshot::default()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), StoreSnapshot::default());
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("ledger.json"));
        store.save(&sample_snapshot()).await.unwrap();
        store.save(&sample_snapshot()).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["ledger.json".to_string()]);
    }

    #[tokio::test]
    async fn test_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let store = JsonFileStore::new(&path);
        store.save(&sample_snapshot()).await.unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["users"]["42"][0]["kind"], "Income");
        assert_eq!(json["users"]["42"][0]["value"], 100);
        assert_eq!(json["users"]["42"][0]["createdAt"], "2024-01-02T03:04:05Z");
        assert_eq!(json["checksum"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_tampered_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let store = JsonFileStore::new(&path);
        store.save(&sample_snapshot()).await.unwrap();

        let mut json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        json["users"]["42"][0]["value"] = serde_json::json!(1_000_000);
        std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

        assert!(matches!(store.load().await, Err(TrackerError::StorageFailure(_))));
    }

    #[tokio::test]
    async fn test_garbage_and_unknown_version_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let store = JsonFileStore::new(&path);

        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(store.load().await, Err(TrackerError::StorageFailure(_))));

        let users: BTreeMap<UserId, Vec<Record>> = BTreeMap::new();
        let file = serde_json::json!({
            "version": 99,
            "savedAt": "2024-01-01T00:00:00Z",
            "checksum": checksum(&users).unwrap(),
            "users": {},
        });
        std::fs::write(&path, serde_json::to_vec(&file).unwrap()).unwrap();
        assert!(matches!(store.load().await, Err(TrackerError::StorageFailure(_))));
    }
}
