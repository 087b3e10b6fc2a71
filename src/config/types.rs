// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration sections.
//!
//! ```text
//! Config
//!   [global]   dry_run, log levels, log_file, json_logs
//!   [backend]  default_base_branch, lock_file
//!   [github]   api_url, token / token_env, timeouts, fork backoff
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::logging::LogLevel;
use crate::platform::github::{DEFAULT_API_URL, ForkTiming};

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log platform calls instead of sending them.
    pub dry_run: bool,
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file. No file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Emit console logs as JSON lines.
    pub json_logs: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
            json_logs: false,
        }
    }
}

/// Settings shared by every backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Branch new work is based on when none is given.
    pub default_base_branch: String,
    /// Serializes git commands across processes when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_file: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            default_base_branch: "main".to_string(),
            lock_file: None,
        }
    }
}

/// GitHub backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubConfig {
    /// REST endpoint.
    pub api_url: String,
    /// Token given directly; takes precedence over `token_env`.
    #[serde(skip_serializing)]
    pub token: Option<SecretString>,
    /// Environment variable holding the token.
    pub token_env: String,
    pub request_timeout_secs: u64,
    /// Wait after a fork request, and between visibility checks.
    pub fork_settle_secs: u64,
    pub fork_visibility_attempts: u32,
    /// Wait after renaming a fork's default branch.
    pub branch_sync_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            token_env: "BOT_TOKEN".to_string(),
            request_timeout_secs: 30,
            fork_settle_secs: 5,
            fork_visibility_attempts: 1,
            branch_sync_secs: 5,
        }
    }
}

impl GitHubConfig {
    /// The configured token, else the value of `token_env`. Empty values
    /// count as unset.
    #[must_use]
    pub fn resolve_token(&self) -> Option<SecretString> {
        self.token
            .clone()
            .filter(|t| !t.expose_secret().is_empty())
            .or_else(|| {
                std::env::var(&self.token_env)
                    .ok()
                    .filter(|t| !t.is_empty())
                    .map(SecretString::from)
            })
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn fork_timing(&self) -> ForkTiming {
        ForkTiming {
            settle: Duration::from_secs(self.fork_settle_secs),
            visibility_attempts: self.fork_visibility_attempts,
            branch_sync: Duration::from_secs(self.branch_sync_secs),
        }
    }
}
