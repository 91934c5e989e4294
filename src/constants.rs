//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and URLs so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "roster";

/// Crate version as reported by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Target triple this binary was built for (set by `build.rs`).
pub const TARGET: &str = env!("TARGET");

/// User-Agent sent with every request to the user collection.
pub const USER_AGENT: &str = concat!("roster/", env!("CARGO_PKG_VERSION"));

/// Local config filename (e.g. `.roster.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".roster.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "roster";

/// Collection endpoint used when nothing else is configured.
///
/// jsonplaceholder accepts writes but never persists them, which is why
/// tombstones are enabled by default.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com/users";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_BASE_URL: &str = "ROSTER_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "ROSTER_TIMEOUT_SECS";
pub const ENV_STRATEGY: &str = "ROSTER_STRATEGY";
pub const ENV_TOMBSTONES: &str = "ROSTER_TOMBSTONES";
pub const ENV_FORMAT: &str = "ROSTER_FORMAT";
