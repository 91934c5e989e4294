//! Deleted-id overlay for backends that do not really delete.
//!
//! Some collections (jsonplaceholder among them) answer `DELETE` with a
//! success status but keep serving the record. [`TombstoneOverlay`]
//! remembers every id deleted through it and hides those ids from later
//! `list` results. The set lives exactly as long as the overlay value, so
//! dropping the session drops the tombstones.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::client::{NetworkError, UserResource};
use crate::models::{NewUser, User, UserPatch};

/// Wraps a [`UserResource`] and suppresses locally deleted ids.
#[derive(Debug)]
pub struct TombstoneOverlay<R> {
    inner: R,
    deleted: Mutex<HashSet<u64>>,
}

impl<R> TombstoneOverlay<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            deleted: Mutex::new(HashSet::new()),
        }
    }

    /// Tombstoned ids in ascending order.
    pub fn tombstones(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.deleted().iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Whether `id` is currently suppressed.
    pub fn is_tombstoned(&self, id: u64) -> bool {
        self.deleted().contains(&id)
    }

    /// Stop suppressing `id`. Returns `true` if it was tombstoned.
    pub fn forget(&self, id: u64) -> bool {
        self.deleted().remove(&id)
    }

    /// Drop every tombstone.
    pub fn clear(&self) {
        self.deleted().clear();
    }

    fn deleted(&self) -> MutexGuard<'_, HashSet<u64>> {
        self.deleted.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<R: UserResource> UserResource for TombstoneOverlay<R> {
    async fn list(&self) -> Result<Vec<User>, NetworkError> {
        let mut users = self.inner.list().await?;
        let deleted = self.deleted();
        if !deleted.is_empty() {
            let before = users.len();
            users.retain(|u| !deleted.contains(&u.id));
            debug!(suppressed = before - users.len(), "applied tombstones to list");
        }
        Ok(users)
    }

    async fn create(&self, user: &NewUser) -> Result<User, NetworkError> {
        self.inner.create(user).await
    }

    async fn update(&self, id: u64, patch: &UserPatch) -> Result<User, NetworkError> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: u64) -> Result<(), NetworkError> {
        self.inner.delete(id).await?;
        self.deleted().insert(id);
        debug!(id, "recorded tombstone");
        Ok(())
    }
}
