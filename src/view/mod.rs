//! User list controller: a client-side cache of the remote collection.
//!
//! The controller sits between a [`UserResource`] and whatever renders the
//! list. It owns the cached snapshot, the derived search view, per-mutation
//! pending counters and a queue of [`Notification`]s.
//!
//! State lives behind a mutex that is never held across an `.await`. Each
//! completion handler applies its entire cache patch under one lock, so
//! overlapping calls resolve in completion order without tearing.

pub mod notification;

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::client::{NetworkError, UserResource};
use crate::models::{filter_users, NewUser, User, UserPatch};

pub use notification::{Notification, NotificationLevel};

/// How the cache is reconciled after a successful mutation.
///
/// Applied uniformly to create, update and delete.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReconcileStrategy {
    /// Patch the cache from the mutation's own response. No extra request.
    #[default]
    Merge,
    /// Discard the cache and list again after every mutation.
    Refetch,
}

/// The mutation a pending counter refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    fn index(self) -> usize {
        match self {
            MutationKind::Create => 0,
            MutationKind::Update => 1,
            MutationKind::Delete => 2,
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            MutationKind::Create => "User created successfully",
            MutationKind::Update => "User updated successfully",
            MutationKind::Delete => "User deleted successfully",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            MutationKind::Create => "Failed to create user",
            MutationKind::Update => "Failed to update user",
            MutationKind::Delete => "Failed to delete user",
        }
    }
}

const FETCH_FAILED: &str = "Failed to fetch users";

#[derive(Debug, Default)]
struct ViewState {
    /// `None` until the first list succeeds.
    users: Option<Vec<User>>,
    fetches_in_flight: usize,
    /// Ticket handed to the most recently started fetch.
    issued_ticket: u64,
    /// Ticket of the newest fetch whose result reached the cache.
    applied_ticket: u64,
    pending: [usize; 3],
    notifications: VecDeque<Notification>,
}

impl ViewState {
    fn notify(&mut self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => info!(message = %notification.message, "notification"),
            NotificationLevel::Error => warn!(message = %notification.message, "notification"),
        }
        self.notifications.push_back(notification);
    }
}

/// Client-side cache of the user collection bound to a [`UserResource`].
#[derive(Debug)]
pub struct UserListController<R> {
    resource: R,
    strategy: ReconcileStrategy,
    state: Mutex<ViewState>,
}

impl<R: UserResource> UserListController<R> {
    pub fn new(resource: R, strategy: ReconcileStrategy) -> Self {
        Self {
            resource,
            strategy,
            state: Mutex::new(ViewState::default()),
        }
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// Initial load when the view first appears.
    pub async fn mount(&self) -> Result<(), NetworkError> {
        self.refresh().await
    }

    /// The view regained focus. Always refetches; there is no staleness window.
    pub async fn on_focus(&self) -> Result<(), NetworkError> {
        self.refresh().await
    }

    /// List the collection and replace the cache wholesale.
    ///
    /// In-flight fetches are never aborted. A response is applied only if
    /// no newer fetch has already landed, so a slow, superseded response
    /// cannot overwrite fresher data. On failure the last-known-good cache
    /// is kept and an error notification is queued.
    pub async fn refresh(&self) -> Result<(), NetworkError> {
        let ticket = {
            let mut state = self.state();
            state.issued_ticket += 1;
            state.fetches_in_flight += 1;
            state.issued_ticket
        };

        let result = self.resource.list().await;

        let mut state = self.state();
        state.fetches_in_flight -= 1;
        match result {
            Ok(users) => {
                if ticket > state.applied_ticket {
                    state.applied_ticket = ticket;
                    debug!(ticket, count = users.len(), "cache replaced");
                    state.users = Some(users);
                } else {
                    debug!(ticket, applied = state.applied_ticket, "discarded stale list response");
                }
                Ok(())
            }
            Err(err) => {
                state.notify(Notification::error(FETCH_FAILED));
                Err(err)
            }
        }
    }

    /// Create a user and reconcile the cache.
    pub async fn submit_create(&self, user: NewUser) -> Result<User, NetworkError> {
        let kind = MutationKind::Create;
        let _pending = self.begin(kind);

        let created = match self.resource.create(&user).await {
            Ok(created) => created,
            Err(err) => return Err(self.fail(kind, err)),
        };

        {
            let mut state = self.state();
            if self.strategy == ReconcileStrategy::Merge {
                state.users.get_or_insert_with(Vec::new).push(created.clone());
            }
            state.notify(Notification::success(kind.success_message()));
        }
        self.reconcile().await;
        Ok(created)
    }

    /// Update user `id` and reconcile the cache.
    ///
    /// When the user is cached, the patch is completed with its current
    /// fields so the `PUT` carries a full representation.
    pub async fn submit_update(&self, id: u64, patch: UserPatch) -> Result<User, NetworkError> {
        let kind = MutationKind::Update;
        let _pending = self.begin(kind);

        let payload = match self.cached(id) {
            Some(current) => patch.completed_from(&current),
            None => patch,
        };

        let updated = match self.resource.update(id, &payload).await {
            Ok(updated) => updated,
            Err(err) => return Err(self.fail(kind, err)),
        };

        {
            let mut state = self.state();
            if self.strategy == ReconcileStrategy::Merge {
                if let Some(entry) = state
                    .users
                    .as_mut()
                    .and_then(|users| users.iter_mut().find(|u| u.id == id))
                {
                    // Some backends echo only what was sent; keep our id.
                    *entry = User { id, ..updated.clone() };
                }
            }
            state.notify(Notification::success(kind.success_message()));
        }
        self.reconcile().await;
        Ok(updated)
    }

    /// Delete user `id` and reconcile the cache.
    ///
    /// The row is removed from the cache immediately under either strategy.
    pub async fn submit_delete(&self, id: u64) -> Result<(), NetworkError> {
        let kind = MutationKind::Delete;
        let _pending = self.begin(kind);

        if let Err(err) = self.resource.delete(id).await {
            return Err(self.fail(kind, err));
        }

        {
            let mut state = self.state();
            if let Some(users) = state.users.as_mut() {
                users.retain(|u| u.id != id);
            }
            state.notify(Notification::success(kind.success_message()));
        }
        self.reconcile().await;
        Ok(())
    }

    /// Copy of the cached collection (empty before the first load).
    pub fn snapshot(&self) -> Vec<User> {
        self.state().users.clone().unwrap_or_default()
    }

    /// Users matching `query` (case-insensitive, any of name, email or
    /// department). Computed on demand; the cache is untouched.
    pub fn filtered(&self, query: &str) -> Vec<User> {
        match self.state().users.as_deref() {
            Some(users) => filter_users(users, query),
            None => Vec::new(),
        }
    }

    /// Whether a list has ever succeeded.
    pub fn is_loaded(&self) -> bool {
        self.state().users.is_some()
    }

    /// A fetch is running and there is nothing to show yet.
    pub fn is_loading(&self) -> bool {
        let state = self.state();
        state.users.is_none() && state.fetches_in_flight > 0
    }

    /// Any list request is in flight.
    pub fn is_fetching(&self) -> bool {
        self.state().fetches_in_flight > 0
    }

    /// Number of in-flight mutations of `kind`.
    pub fn pending(&self, kind: MutationKind) -> usize {
        self.state().pending[kind.index()]
    }

    /// Take every queued notification, oldest first.
    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.state().notifications.drain(..).collect()
    }

    fn cached(&self, id: u64) -> Option<User> {
        self.state()
            .users
            .as_ref()
            .and_then(|users| users.iter().find(|u| u.id == id).cloned())
    }

    /// Refetch after a mutation when the strategy asks for it.
    async fn reconcile(&self) {
        if self.strategy != ReconcileStrategy::Refetch {
            return;
        }
        if let Err(err) = self.refresh().await {
            debug!(error = %err, "refetch after mutation failed");
        }
    }

    fn fail(&self, kind: MutationKind, err: NetworkError) -> NetworkError {
        debug!(%kind, error = %err, "mutation failed");
        self.state().notify(Notification::error(kind.failure_message()));
        err
    }

    fn begin(&self, kind: MutationKind) -> PendingGuard<'_> {
        self.state().pending[kind.index()] += 1;
        PendingGuard {
            state: &self.state,
            kind,
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Decrements a pending counter when the mutation finishes, however it ends.
struct PendingGuard<'a> {
    state: &'a Mutex<ViewState>,
    kind: MutationKind,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).pending[self.kind.index()] -= 1;
    }
}
