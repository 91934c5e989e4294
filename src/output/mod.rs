//! Output renderers: terminal table and JSON.

pub mod json;
pub mod table;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::models::User;

/// Trait for rendering a user listing to an output format.
pub trait OutputRenderer {
    /// Render users to a string.
    fn render(&self, users: &[User]) -> String;
}

/// Output format options.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    ValueEnum,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    /// Render users using the renderer for this format.
    pub fn render(&self, users: &[User]) -> String {
        match self {
            OutputFormat::Table => table::TableRenderer.render(users),
            OutputFormat::Json => json::JsonRenderer.render(users),
        }
    }
}
