//! User records as exchanged with the remote collection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A user as returned by the collection endpoint.
///
/// Unknown fields in backend payloads are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier, immutable once created.
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// Payload for creating a user. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// Partial update payload. Only `Some` fields are sent.
///
/// `department` is three-state: `None` leaves it alone, `Some(None)` clears
/// it (sent as `null`), `Some(Some(_))` sets it. A blank department entered
/// by the user means "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Option<String>>,
}

/// Rejected form input, caught before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,

    #[error("email is required")]
    MissingEmail,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("update must change at least one field")]
    EmptyPatch,
}

impl User {
    /// Returns `true` if name, email or department contains `query`,
    /// ignoring case. An empty query matches every user.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.email.to_lowercase().contains(&needle)
            || self
                .department
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }

    /// Replace the fields present in `patch`. The id never changes.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref email) = patch.email {
            self.email = email.clone();
        }
        if let Some(ref department) = patch.department {
            self.department = department.clone();
        }
    }
}

impl NewUser {
    /// Trim the input and check the required fields.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        check_email(&email)?;
        Ok(Self {
            name,
            email,
            department: normalize_department(self.department),
        })
    }

    /// Attach a server-assigned id.
    pub fn with_id(self, id: u64) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            department: self.department,
        }
    }
}

impl UserPatch {
    /// Returns `true` if the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.department.is_none()
    }

    /// Trim the input and check any provided required fields.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        let name = match self.name {
            Some(n) if n.trim().is_empty() => return Err(ValidationError::MissingName),
            Some(n) => Some(n.trim().to_string()),
            None => None,
        };
        let email = match self.email {
            Some(e) => {
                let e = e.trim().to_string();
                check_email(&e)?;
                Some(e)
            }
            None => None,
        };
        Ok(Self {
            name,
            email,
            department: self.department.map(normalize_department),
        })
    }

    /// Fill in every field missing from this patch with the value `current`
    /// holds, producing a complete representation suitable for `PUT`.
    pub fn completed_from(&self, current: &User) -> Self {
        Self {
            name: Some(self.name.clone().unwrap_or_else(|| current.name.clone())),
            email: Some(self.email.clone().unwrap_or_else(|| current.email.clone())),
            department: self
                .department
                .clone()
                .or_else(|| current.department.clone().map(Some)),
        }
    }
}

/// Filter `users` down to those matching `query`, preserving order.
pub fn filter_users(users: &[User], query: &str) -> Vec<User> {
    users.iter().filter(|u| u.matches(query)).cloned().collect()
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail(email.to_string())),
    }
}

fn normalize_department(department: Option<String>) -> Option<String> {
    department
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}
