//! Per-user ledger and conversation state
//!
//! Owns one `(Ledger, ConversationState)` pair per user behind its own lock.
//! Mutations that commit are persisted through the snapshot gateway before
//! the user's lock is released.

use crate::ledger::Ledger;
use crate::models::{ConversationState, Record, UserId};
use crate::persistence::{SnapshotStore, StoreSnapshot};
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSession {
    pub ledger: Ledger,
    pub state: ConversationState,
}

/// Whether a session operation changed the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Save,
    Skip,
}

pub struct LedgerStore {
    sessions: RwLock<HashMap<UserId, Arc<Mutex<UserSession>>>>,
    // Last committed ledgers. Always locked after a session lock, never before.
    persisted: Mutex<StoreSnapshot>,
    gateway: Box<dyn SnapshotStore>,
}

impl LedgerStore {
    /// Restore from the gateway; a failed load starts with an empty store
    pub async fn open(gateway: Box<dyn SnapshotStore>) -> Self {
        let snapshot = match gateway.load().await {
            Ok(snapshot) => {
                info!(users = snapshot.users.len(), "Ledger snapshot loaded");
                snapshot
            }
            Err(e) => {
                warn!("Failed to load ledger snapshot, starting empty: {}", e);
                StoreSnapshot::default()
            }
        };

        let sessions = snapshot
            .users
            .iter()
            .map(|(user, records)| {
                let session = UserSession {
                    ledger: Ledger::from_records(records.clone()),
                    state: ConversationState::Idle,
                };
                (*user, Arc::new(Mutex::new(session)))
            })
            .collect();

        Self {
            sessions: RwLock::new(sessions),
            persisted: Mutex::new(snapshot),
            gateway,
        }
    }

    async fn existing(&self, user: UserId) -> Option<Arc<Mutex<UserSession>>> {
        self.sessions.read().await.get(&user).cloned()
    }

    async fn session(&self, user: UserId) -> Arc<Mutex<UserSession>> {
        if let Some(session) = self.existing(user).await {
            return session;
        }

        let mut sessions = self.sessions.write().await;
        sessions.entry(user).or_default().clone()
    }

    /// Run `op` on the locked session, persisting when it reports `Commit::Save`.
    ///
    /// If the save fails the in-memory change stands and the storage error
    /// is returned.
    pub async fn with_session<T, F>(&self, user: UserId, op: F) -> Result<T>
    where
        F: FnOnce(&mut UserSession) -> Result<(T, Commit)> + Send,
        T: Send,
    {
        let session = self.session(user).await;
        let mut guard = session.lock().await;
        let (value, commit) = op(&mut *guard)?;

        if commit == Commit::Save {
            self.persist(user, guard.ledger.records()).await?;
        }

        Ok(value)
    }

    /// Read-only access; unknown users see an empty session and are not created
    pub async fn view<T, F>(&self, user: UserId, op: F) -> T
    where
        F: FnOnce(&UserSession) -> T + Send,
    {
        match self.existing(user).await {
            Some(session) => {
                let guard = session.lock().await;
                op(&*guard)
            }
            None => op(&UserSession::default()),
        }
    }

    async fn persist(&self, user: UserId, records: &[Record]) -> Result<()> {
        let mut persisted = self.persisted.lock().await;
        persisted.users.insert(user, records.to_vec());

        self.gateway.save(&persisted).await.map_err(|e| {
            error!(user_id = %user, "Ledger change kept in memory but not persisted: {}", e);
            e
        })
    }

    pub async fn append(&self, user: UserId, record: Record) -> Result<usize> {
        self.with_session(user, |session| Ok((session.ledger.append(record), Commit::Save)))
            .await
    }

    pub async fn list(&self, user: UserId) -> Vec<Record> {
        self.view(user, |session| session.ledger.records().to_vec()).await
    }

    pub async fn delete_at(&self, user: UserId, position: usize) -> Result<Record> {
        self.with_session(user, |session| {
            let record = session.ledger.delete_at(position)?;
            Ok((record, Commit::Save))
        })
        .await
    }

    pub async fn state(&self, user: UserId) -> ConversationState {
        self.view(user, |session| session.state.clone()).await
    }

    pub async fn set_state(&self, user: UserId, state: ConversationState) {
        let session = self.session(user).await;
        session.lock().await.state = state;
    }

    /// The last committed collection of every user's records
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.persisted.lock().await.clone()
    }
}
