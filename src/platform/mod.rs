// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Hosting platform backends.
//!
//! ```text
//!                 GitPlatformBackend (trait)
//!       repository_exists  fork  push_to_repository
//!       create_pull_request  comment_on_pull_request
//!       api_requests_left  user  origin_url
//!       clone_fork_and_branch (provided, runs git::protocol)
//!                          |
//!            +-------------+-------------+
//!            v                           v
//!      GitHubBackend                DryRunBackend
//!      REST API + GitCli            logs + GitCli
//!            \                           /
//!             +--------- Backend -------+
//!                  enum, built from Config
//! ```

pub mod dry_run;
pub mod github;
pub mod pull_request;

use chrono::{DateTime, Utc};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::error::{BotResult, PlatformError};
use crate::git::GitCli;
use crate::git::protocol;
use crate::git::runner::GitRunner;
use crate::git::runner::lock::{CommandLock, FileLock, NoopLock};

pub use dry_run::DryRunBackend;
pub use github::GitHubBackend;
pub use pull_request::{PullRequestRecord, PullRequestState};

/// Host used for git remotes.
pub const GITHUB_HOST: &str = "github.com";

/// How git authenticates against a remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    /// Anonymous HTTPS.
    #[default]
    Https,
    /// HTTPS with the token embedded as user info.
    TokenHttps,
}

/// Builds the git remote URL of `owner/name`.
///
/// With [`ConnectionMode::TokenHttps`] the token becomes part of the URL; it
/// must be registered with the runner that will use the URL.
#[must_use]
pub fn remote_url(owner: &str, name: &str, mode: ConnectionMode, token: Option<&str>) -> String {
    match (mode, token) {
        (ConnectionMode::TokenHttps, Some(token)) => {
            format!("https://{token}@{GITHUB_HOST}/{owner}/{name}.git")
        }
        _ => format!("https://{GITHUB_HOST}/{owner}/{name}.git"),
    }
}

/// Remaining quota of a rate-limited backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateQuota {
    pub remaining: u64,
    /// Only looked up when nothing is left.
    pub resets_at: Option<DateTime<Utc>>,
}

/// Answer of [`GitPlatformBackend::api_requests_left`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestsLeft {
    Finite(RateQuota),
    /// The backend is not rate limited.
    Infinite,
    /// The quota could not be determined.
    Unknown,
}

impl RequestsLeft {
    /// Remaining requests, `None` when infinite or unknown.
    #[must_use]
    pub const fn remaining(&self) -> Option<u64> {
        match self {
            Self::Finite(quota) => Some(quota.remaining),
            Self::Infinite | Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for RequestsLeft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(RateQuota {
                remaining,
                resets_at: Some(at),
            }) => write!(f, "{remaining} (resets at {})", at.to_rfc3339()),
            Self::Finite(quota) => write!(f, "{}", quota.remaining),
            Self::Infinite => f.write_str("infinite"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Operations a hosting platform offers the bot.
///
/// Implementations own their git client; [`clone_fork_and_branch`] is shared.
///
/// [`clone_fork_and_branch`]: GitPlatformBackend::clone_fork_and_branch
pub trait GitPlatformBackend: Send + Sync {
    /// Git client used for local operations.
    fn git(&self) -> &GitCli;

    /// Account the backend acts as.
    fn user(&self) -> impl Future<Output = BotResult<&str>> + Send;

    /// True if `owner/name` exists and is visible.
    fn repository_exists(
        &self,
        owner: &str,
        name: &str,
    ) -> impl Future<Output = BotResult<bool>> + Send;

    /// Forks `upstream_owner/name` into the bot account if needed, then
    /// aligns the fork's default branch with upstream's.
    fn fork(&self, upstream_owner: &str, name: &str) -> impl Future<Output = BotResult<()>> + Send;

    /// Pushes `branch` of `local_dir` to `owner/name`.
    fn push_to_repository(
        &self,
        owner: &str,
        name: &str,
        local_dir: &Path,
        branch: &str,
    ) -> impl Future<Output = BotResult<()>> + Send;

    /// Opens a pull request from `<user>:<head_branch>` into `base_branch`.
    fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        base_branch: &str,
        head_branch: &str,
        title: &str,
        body: &str,
    ) -> impl Future<Output = BotResult<PullRequestRecord>> + Send;

    /// Adds a comment to pull request `number`.
    fn comment_on_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        body: &str,
    ) -> impl Future<Output = BotResult<()>> + Send;

    /// Remaining API quota. Never fails.
    fn api_requests_left(&self) -> impl Future<Output = RequestsLeft> + Send;

    /// URL cloned as `origin`: the bot's fork.
    fn origin_url(
        &self,
        _upstream_owner: &str,
        name: &str,
    ) -> impl Future<Output = BotResult<String>> + Send {
        async move {
            let user = self.user().await?;
            Ok(remote_url(user, name, ConnectionMode::Https, None))
        }
    }

    /// Clones the fork into `target_dir` and checks out `new_branch` on top
    /// of upstream's `base_branch`.
    fn clone_fork_and_branch(
        &self,
        upstream_owner: &str,
        name: &str,
        target_dir: &Path,
        new_branch: &str,
        base_branch: &str,
    ) -> impl Future<Output = BotResult<()>> + Send {
        async move {
            let origin_url = self.origin_url(upstream_owner, name).await?;
            let upstream_url = remote_url(upstream_owner, name, ConnectionMode::Https, None);
            protocol::clone_fork_and_branch(
                self.git(),
                &origin_url,
                target_dir,
                &upstream_url,
                new_branch,
                base_branch,
            )
        }
    }
}

/// Backend selected at runtime.
#[derive(Debug)]
pub enum Backend {
    Live(GitHubBackend),
    DryRun(DryRunBackend),
}

impl Backend {
    /// Builds the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::MissingToken` if the live backend has no token,
    /// or a request error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> BotResult<Self> {
        let lock: Arc<dyn CommandLock> = match &config.backend.lock_file {
            Some(path) => Arc::new(FileLock::new(path)),
            None => Arc::new(NoopLock),
        };
        let runner = GitRunner::new().with_lock(lock);

        if config.global.dry_run {
            info!("using dry-run backend");
            return Ok(Self::DryRun(DryRunBackend::with_git(GitCli::new(runner))));
        }

        let token = config
            .github
            .resolve_token()
            .ok_or_else(|| PlatformError::MissingToken {
                env: config.github.token_env.clone(),
            })?;
        info!(api_url = %config.github.api_url, "using GitHub backend");
        Ok(Self::Live(GitHubBackend::from_config(
            &config.github,
            &token,
            runner,
        )?))
    }

    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun(_))
    }
}

impl GitPlatformBackend for Backend {
    fn git(&self) -> &GitCli {
        match self {
            Self::Live(b) => b.git(),
            Self::DryRun(b) => b.git(),
        }
    }

    async fn user(&self) -> BotResult<&str> {
        match self {
            Self::Live(b) => b.user().await,
            Self::DryRun(b) => b.user().await,
        }
    }

    async fn repository_exists(&self, owner: &str, name: &str) -> BotResult<bool> {
        match self {
            Self::Live(b) => b.repository_exists(owner, name).await,
            Self::DryRun(b) => b.repository_exists(owner, name).await,
        }
    }

    async fn fork(&self, upstream_owner: &str, name: &str) -> BotResult<()> {
        match self {
            Self::Live(b) => b.fork(upstream_owner, name).await,
            Self::DryRun(b) => b.fork(upstream_owner, name).await,
        }
    }

    async fn push_to_repository(
        &self,
        owner: &str,
        name: &str,
        local_dir: &Path,
        branch: &str,
    ) -> BotResult<()> {
        match self {
            Self::Live(b) => b.push_to_repository(owner, name, local_dir, branch).await,
            Self::DryRun(b) => b.push_to_repository(owner, name, local_dir, branch).await,
        }
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        name: &str,
        base_branch: &str,
        head_branch: &str,
        title: &str,
        body: &str,
    ) -> BotResult<PullRequestRecord> {
        match self {
            Self::Live(b) => {
                b.create_pull_request(owner, name, base_branch, head_branch, title, body)
                    .await
            }
            Self::DryRun(b) => {
                b.create_pull_request(owner, name, base_branch, head_branch, title, body)
                    .await
            }
        }
    }

    async fn comment_on_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        body: &str,
    ) -> BotResult<()> {
        match self {
            Self::Live(b) => b.comment_on_pull_request(owner, name, number, body).await,
            Self::DryRun(b) => b.comment_on_pull_request(owner, name, number, body).await,
        }
    }

    async fn api_requests_left(&self) -> RequestsLeft {
        match self {
            Self::Live(b) => b.api_requests_left().await,
            Self::DryRun(b) => b.api_requests_left().await,
        }
    }

    async fn origin_url(&self, upstream_owner: &str, name: &str) -> BotResult<String> {
        match self {
            Self::Live(b) => b.origin_url(upstream_owner, name).await,
            Self::DryRun(b) => b.origin_url(upstream_owner, name).await,
        }
    }
}

#[cfg(test)]
mod tests;
