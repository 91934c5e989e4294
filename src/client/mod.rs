//! UserResource trait and the remote collection client.
//!
//! The list controller only talks to [`UserResource`], so the HTTP
//! client, the tombstone overlay and test doubles are interchangeable.

pub mod http;
pub mod tombstone;

use async_trait::async_trait;
use strum::Display;
use thiserror::Error;

use crate::models::{NewUser, User, UserPatch};

pub use http::HttpUserClient;
pub use tombstone::TombstoneOverlay;

/// The four calls the collection supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

/// A call to the collection did not succeed.
///
/// Covers transport failures, non-2xx statuses and undecodable bodies
/// alike. Callers only distinguish success from failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to {operation} users: {detail}")]
pub struct NetworkError {
    pub operation: Operation,
    pub detail: String,
}

impl NetworkError {
    pub fn new(operation: Operation, detail: impl Into<String>) -> Self {
        Self {
            operation,
            detail: detail.into(),
        }
    }
}

/// CRUD access to a remote user collection.
///
/// Every call is a single request with no retries. A failure surfaces
/// immediately as a [`NetworkError`].
#[async_trait]
pub trait UserResource: Send + Sync {
    /// Fetch the whole collection in backend order.
    async fn list(&self) -> Result<Vec<User>, NetworkError>;

    /// Create a user; the returned record carries the server-assigned id.
    async fn create(&self, user: &NewUser) -> Result<User, NetworkError>;

    /// Replace the fields present in `patch` on user `id`.
    async fn update(&self, id: u64, patch: &UserPatch) -> Result<User, NetworkError>;

    /// Remove user `id`.
    async fn delete(&self, id: u64) -> Result<(), NetworkError>;
}

#[async_trait]
impl<R: UserResource + ?Sized> UserResource for std::sync::Arc<R> {
    async fn list(&self) -> Result<Vec<User>, NetworkError> {
        (**self).list().await
    }

    async fn create(&self, user: &NewUser) -> Result<User, NetworkError> {
        (**self).create(user).await
    }

    async fn update(&self, id: u64, patch: &UserPatch) -> Result<User, NetworkError> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: u64) -> Result<(), NetworkError> {
        (**self).delete(id).await
    }
}
