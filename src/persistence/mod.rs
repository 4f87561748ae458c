//! Persistence gateway
//!
//! Snapshots the whole multi-user ledger collection after every committed
//! mutation and restores it at startup.

pub mod json_file;

pub use json_file::JsonFileStore;

use crate::models::{Record, UserId};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Every user's committed records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub users: BTreeMap<UserId, Vec<Record>>,
}

impl StoreSnapshot {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Trait for snapshot persistence
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// A missing snapshot is an empty store, not an error
    async fn load(&self) -> Result<StoreSnapshot>;
    async fn save(&self, snapshot: &StoreSnapshot) -> Result<()>;
}

/// In-process snapshot store for tests and ephemeral sessions
pub struct InMemorySnapshotStore {
    snapshot: RwLock<Option<StoreSnapshot>>,
    saves: AtomicUsize,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn stored(&self) -> Option<StoreSnapshot> {
        self.snapshot.read().await.clone()
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self) -> Result<StoreSnapshot> {
        Ok(self.snapshot.read().await.clone().unwrap_or_default())
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        *self.snapshot.write().await = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// Shared handles let a caller keep inspecting the store it handed over.
#[async_trait::async_trait]
impl<T: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<T> {
    async fn load(&self) -> Result<StoreSnapshot> {
        (**self).load().await
    }

    async fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        (**self).save(snapshot).await
    }
}
