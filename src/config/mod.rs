// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. feedstock-bot.toml (cwd, optional)
//! 3. --config FILE (repeatable)
//! 4. FEEDSTOCK_BOT_* env vars
//! 5. --set KEY=VALUE and other CLI flags
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! FEEDSTOCK_BOT_GLOBAL__DRY_RUN=true        → global.dry_run = true
//! FEEDSTOCK_BOT_GITHUB__API_URL=http://...  → github.api_url = "http://..."
//! FEEDSTOCK_BOT_BACKEND__LOCK_FILE=/tmp/l   → backend.lock_file = "/tmp/l"
//! ```
//!
//! The GitHub token is read from `github.token` or, failing that, from the
//! variable named by `github.token_env` (`BOT_TOKEN`).

pub mod loader;
pub mod types;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use types::{BackendConfig, GitHubConfig, GlobalConfig};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "feedstock-bot.toml";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub global: GlobalConfig,
    pub backend: BackendConfig,
    pub github: GitHubConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use feedstock_bot::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("feedstock-bot.toml")
    ///     .with_env_prefix("FEEDSTOCK_BOT")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Checks values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let invalid = |section: &str, key: &str, message: &str| ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.backend.default_base_branch.trim().is_empty() {
            return Err(invalid("backend", "default_base_branch", "must not be empty").into());
        }
        if !self.github.api_url.starts_with("http://")
            && !self.github.api_url.starts_with("https://")
        {
            return Err(invalid("github", "api_url", "must be an http(s) URL").into());
        }
        if self.github.token_env.is_empty() {
            return Err(invalid("github", "token_env", "must not be empty").into());
        }
        if self.github.request_timeout_secs == 0 {
            return Err(invalid("github", "request_timeout_secs", "must be at least 1").into());
        }
        if self.github.fork_visibility_attempts == 0 {
            return Err(
                invalid("github", "fork_visibility_attempts", "must be at least 1").into(),
            );
        }
        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Sensitive fields are hidden with a `[hidden]` marker. Output is
    /// deterministically ordered.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_backend_options(&mut options);
        self.format_github_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("global.dry_run".into(), self.global.dry_run.to_string());
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
        options.insert("global.json_logs".into(), self.global.json_logs.to_string());
    }

    fn format_backend_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "backend.default_base_branch".into(),
            self.backend.default_base_branch.clone(),
        );
        options.insert(
            "backend.lock_file".into(),
            self.backend
                .lock_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
    }

    fn format_github_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("github.api_url".into(), self.github.api_url.clone());
        if self
            .github
            .token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
        {
            options.insert("github.token".into(), "[hidden]".into());
        }
        options.insert("github.token_env".into(), self.github.token_env.clone());
        options.insert(
            "github.request_timeout_secs".into(),
            self.github.request_timeout_secs.to_string(),
        );
        options.insert(
            "github.fork_settle_secs".into(),
            self.github.fork_settle_secs.to_string(),
        );
        options.insert(
            "github.fork_visibility_attempts".into(),
            self.github.fork_visibility_attempts.to_string(),
        );
        options.insert(
            "github.branch_sync_secs".into(),
            self.github.branch_sync_secs.to_string(),
        );
    }
}
