//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.roster.toml` in the working directory
//! 4. `~/.config/roster/config.toml` (global defaults)
//! 5. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::constants::{self, DEFAULT_BASE_URL};
use crate::env::Env;
use crate::output::OutputFormat;
use crate::view::ReconcileStrategy;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub output: OutputConfig,
}

/// Remote collection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Collection endpoint, e.g. `https://host/users`.
    pub base_url: String,
    /// Per-request timeout. Absent means no timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

/// Cache reconciliation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub strategy: ReconcileStrategy,
    /// Hide locally deleted ids from later listings.
    pub tombstones: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            strategy: ReconcileStrategy::default(),
            tombstones: true,
        }
    }
}

/// Rendering settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// One config file as written on disk.
///
/// Every field is optional so an explicit value in a later layer always
/// wins, including one that equals the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    api: ApiLayer,
    sync: SyncLayer,
    output: OutputLayer,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
struct ApiLayer {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
struct SyncLayer {
    strategy: Option<ReconcileStrategy>,
    tombstones: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
struct OutputLayer {
    format: Option<OutputFormat>,
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, then `.roster.toml` in `local_dir`, then
    /// applies environment variable overrides.
    pub fn load(local_dir: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: working-directory config
        if let Some(dir) = local_dir {
            let local_path = dir.join(constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// The configured collection URL, validated.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.api.base_url.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidBaseUrl {
                url: self.api.base_url.clone(),
                reason: format!("unsupported scheme {other:?}"),
            }),
        }
    }

    /// The configured request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load a config from a specific file.
    fn load_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge a file layer into this config. Only values the layer sets override.
    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(base_url) = layer.api.base_url {
            self.api.base_url = base_url;
        }
        if layer.api.timeout_secs.is_some() {
            self.api.timeout_secs = layer.api.timeout_secs;
        }
        if let Some(strategy) = layer.sync.strategy {
            self.sync.strategy = strategy;
        }
        if let Some(tombstones) = layer.sync.tombstones {
            self.sync.tombstones = tombstones;
        }
        if let Some(format) = layer.output.format {
            self.output.format = format;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.non_empty(constants::ENV_BASE_URL) {
            self.api.base_url = val;
        }
        if let Some(val) = env.non_empty(constants::ENV_TIMEOUT_SECS) {
            match val.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = Some(secs),
                Err(_) => warn!("ignoring invalid {} value: {val}", constants::ENV_TIMEOUT_SECS),
            }
        }
        if let Some(val) = env.non_empty(constants::ENV_STRATEGY) {
            match val.parse::<ReconcileStrategy>() {
                Ok(strategy) => self.sync.strategy = strategy,
                Err(_) => warn!("ignoring invalid {} value: {val}", constants::ENV_STRATEGY),
            }
        }
        match env.flag(constants::ENV_TOMBSTONES) {
            Some(Ok(enabled)) => self.sync.tombstones = enabled,
            Some(Err(val)) => warn!("ignoring invalid {} value: {val}", constants::ENV_TOMBSTONES),
            None => {}
        }
        if let Some(val) = env.non_empty(constants::ENV_FORMAT) {
            match val.parse::<OutputFormat>() {
                Ok(format) => self.output.format = format,
                Err(_) => warn!("ignoring invalid {} value: {val}", constants::ENV_FORMAT),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Env {
        Env::mock(Vec::<(&str, &str)>::new())
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, None);
        assert_eq!(config.sync.strategy, ReconcileStrategy::Merge);
        assert!(config.sync.tombstones);
        assert_eq!(config.output.format, OutputFormat::Table);
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[api]
base_url = "http://localhost:3000/api/users"
timeout_secs = 5

[sync]
strategy = "refetch"
tombstones = false

[output]
format = "json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:3000/api/users");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.sync.strategy, ReconcileStrategy::Refetch);
        assert!(!config.sync.tombstones);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    fn layer(toml_str: &str) -> ConfigLayer {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn merge_overrides_set_values() {
        let mut config = Config::default();
        config.merge(layer(
            r#"
[api]
base_url = "http://localhost:3000/users"
timeout_secs = 3

[sync]
strategy = "refetch"
tombstones = false

[output]
format = "json"
"#,
        ));

        assert_eq!(config.api.base_url, "http://localhost:3000/users");
        assert_eq!(config.api.timeout_secs, Some(3));
        assert_eq!(config.sync.strategy, ReconcileStrategy::Refetch);
        assert!(!config.sync.tombstones);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn merge_keeps_values_the_layer_leaves_unset() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:3000/users".to_string();
        config.sync.strategy = ReconcileStrategy::Refetch;
        config.sync.tombstones = false;

        config.merge(layer("[output]\nformat = \"json\"\n"));

        assert_eq!(config.api.base_url, "http://localhost:3000/users");
        assert_eq!(config.sync.strategy, ReconcileStrategy::Refetch);
        assert!(!config.sync.tombstones);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn local_layer_can_restore_default_values() {
        let mut config = Config::default();
        config.merge(layer(
            r#"
[api]
base_url = "http://localhost:3000/users"

[sync]
strategy = "refetch"
tombstones = false

[output]
format = "json"
"#,
        ));
        config.merge(layer(&format!(
            r#"
[api]
base_url = "{DEFAULT_BASE_URL}"

[sync]
strategy = "merge"
tombstones = true

[output]
format = "table"
"#
        )));

        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_file_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{ toml").unwrap();

        let result = Config::load_file(&path);
        assert!(result.unwrap_err().to_string().contains("parse"));
    }

    #[test]
    fn load_file_not_found() {
        let result = Config::load_file(Path::new("/tmp/roster_not_exist_config.toml"));
        assert!(result.unwrap_err().to_string().contains("read"));
    }

    #[test]
    fn load_from_local_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".roster.toml"),
            r#"
[api]
base_url = "http://127.0.0.1:8080/users"

[sync]
strategy = "refetch"
"#,
        )
        .unwrap();

        let config = Config::load(Some(dir.path()), &no_env()).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8080/users");
        assert_eq!(config.sync.strategy, ReconcileStrategy::Refetch);
    }

    #[test]
    fn env_overrides_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".roster.toml"),
            "[api]\nbase_url = \"http://127.0.0.1:8080/users\"\n",
        )
        .unwrap();
        let env = Env::mock([
            ("ROSTER_BASE_URL", "http://10.0.0.2/users"),
            ("ROSTER_TOMBSTONES", "off"),
            ("ROSTER_FORMAT", "json"),
            ("ROSTER_TIMEOUT_SECS", "7"),
        ]);

        let config = Config::load(Some(dir.path()), &env).unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.2/users");
        assert!(!config.sync.tombstones);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.api.timeout_secs, Some(7));
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let env = Env::mock([
            ("ROSTER_STRATEGY", "sometimes"),
            ("ROSTER_TIMEOUT_SECS", "soon"),
            ("ROSTER_TOMBSTONES", "maybe"),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn base_url_validation() {
        let mut config = Config::default();
        assert_eq!(config.base_url().unwrap().as_str(), DEFAULT_BASE_URL);

        config.api.base_url = "not a url".to_string();
        assert!(matches!(
            config.base_url(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        config.api.base_url = "ftp://files.example.com/users".to_string();
        let err = config.base_url().unwrap_err();
        assert!(err.to_string().contains("scheme"), "got: {err}");
    }

    #[test]
    fn to_toml_round_trips_through_parser() {
        let mut config = Config::default();
        config.sync.strategy = ReconcileStrategy::Refetch;
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("strategy = \"refetch\""), "got: {rendered}");
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn global_config_path_mentions_app_dir() {
        if let Some(p) = Config::global_config_path() {
            assert!(p.to_string_lossy().contains("roster"));
        }
    }
}
