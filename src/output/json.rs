//! JSON output renderer.
//!
//! Outputs `{"users": [...], "total": n}` format.

use crate::models::User;
use crate::output::OutputRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

impl OutputRenderer for JsonRenderer {
    fn render(&self, users: &[User]) -> String {
        let output = serde_json::json!({
            "users": users,
            "total": users.len(),
        });

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}
