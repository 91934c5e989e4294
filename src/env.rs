//! Environment variable abstraction for testability.
//!
//! Config loading reads `ROSTER_*` overrides through [`Env`] so tests can
//! supply them with [`Env::mock()`] instead of mutating the process
//! environment with `unsafe` [`std::env::set_var`] calls.

use std::collections::HashMap;

/// Reader for the `ROSTER_*` overrides listed in [`crate::constants`].
#[derive(Clone, Debug, Default)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Create an `Env` backed by explicit key-value pairs.
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Look up an environment variable by name.
    pub fn var(&self, name: &str) -> Result<String, std::env::VarError> {
        match &self.overrides {
            Some(map) => map.get(name).cloned().ok_or(std::env::VarError::NotPresent),
            None => std::env::var(name),
        }
    }

    /// Look up a variable, treating an empty value as unset.
    pub fn non_empty(&self, name: &str) -> Option<String> {
        self.var(name).ok().filter(|v| !v.trim().is_empty())
    }

    /// Read an on/off switch such as `ROSTER_TOMBSTONES`.
    ///
    /// Accepts `true/false`, `1/0`, `yes/no` and `on/off` in any case.
    /// `None` when unset; `Err` carries an unrecognised raw value.
    pub fn flag(&self, name: &str) -> Option<Result<bool, String>> {
        let raw = self.non_empty(name)?;
        Some(match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(raw),
        })
    }
}
