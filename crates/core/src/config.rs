// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Service configuration.
//!
//! All process-wide settings live in one immutable [`Config`] constructed at
//! startup and passed by reference into the identity provider and transport.
//! Nothing in this crate reads ambient global state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const DB_FILE_NAME: &str = "hub.db";

/// Immutable service configuration, loaded once from `hub.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite database file. Defaults to `hub.db` in the state
    /// directory when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Secret used to sign access tokens.
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    /// Access-token lifetime in minutes.
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
}

fn default_secret_key() -> String {
    // Development fallback only; deployments set their own key.
    "hub-dev-secret-change-me".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: None,
            secret_key: default_secret_key(),
            token_ttl_minutes: default_token_ttl_minutes(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Resolve the database path relative to the given state directory.
    pub fn database_path(&self, state_dir: &Path) -> PathBuf {
        match &self.database {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => state_dir.join(p),
            None => state_dir.join(DB_FILE_NAME),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
