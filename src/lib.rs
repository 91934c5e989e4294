//! roster — user management over a remote REST collection (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod client;
pub mod config;
pub mod constants;
pub mod env;
pub mod models;
pub mod output;
pub mod session;
pub mod view;
