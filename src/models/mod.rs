//! Shared types used across all modules.
//!
//! The client, the list controller and the renderers all speak in terms
//! of these records rather than raw JSON.

pub mod user;

pub use user::{NewUser, User, UserPatch, ValidationError, filter_users};
