// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! GitHub backend: REST API for platform calls, [`GitCli`] for pushes.
//!
//! ```text
//! repository_exists    GET  /repos/{o}/{n}             200 / 404
//! user                 GET  /user                      cached
//! fork                 GET  /repos/{user}/{n}          skip if present
//!                      GET  /repos/{o}/{n}             404 -> RepositoryNotFound
//!                      POST /repos/{o}/{n}/forks       settle + poll
//!                      POST /repos/{user}/{n}/branches/{fork default}/rename
//! create_pull_request  GET  /repos/{o}/{n}
//!                      POST /repos/{o}/{n}/pulls       201, trimmed
//! comment              GET  /repos/{o}/{n}
//!                      GET  /repos/{o}/{n}/pulls/{k}   404 -> PullRequestNotFound
//!                      POST /repos/{o}/{n}/issues/{k}/comments
//! api_requests_left    GET  /rate_limit                failures -> Unknown
//! ```

use chrono::{DateTime, SecondsFormat};
use reqwest::header::{ACCEPT, ETAG, HeaderMap, LAST_MODIFIED, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::types::GitHubConfig;
use crate::error::{BotResult, PlatformError};
use crate::git::runner::GitRunner;
use crate::git::{GitCli, RepositoryOps};

use super::pull_request::{PullRequestRecord, trim_pr_json};
use super::{ConnectionMode, GitPlatformBackend, RateQuota, RequestsLeft, remote_url};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Waits that let GitHub's asynchronous fork handling catch up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkTiming {
    /// Wait after requesting a fork, and between visibility checks.
    pub settle: Duration,
    /// How often to check that a new fork is visible.
    pub visibility_attempts: u32,
    /// Wait after renaming the fork's default branch.
    pub branch_sync: Duration,
}

impl Default for ForkTiming {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(5),
            visibility_attempts: 1,
            branch_sync: Duration::from_secs(5),
        }
    }
}

impl ForkTiming {
    /// No waiting at all; for tests against a local server.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            visibility_attempts: 1,
            branch_sync: Duration::ZERO,
        }
    }
}

/// Live backend talking to the GitHub REST API.
#[derive(Debug)]
pub struct GitHubBackend {
    client: Client,
    api_url: String,
    token: SecretString,
    git: GitCli,
    timing: ForkTiming,
    user: OnceCell<String>,
}

impl GitHubBackend {
    /// Creates a backend with default settings.
    ///
    /// The token is registered with the git runner before anything runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_token(token: &str) -> BotResult<Self> {
        Self::new(token, GitRunner::new(), Duration::from_secs(30))
    }

    /// Creates a backend from the `[github]` config section.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(
        config: &GitHubConfig,
        token: &SecretString,
        runner: GitRunner,
    ) -> BotResult<Self> {
        Ok(Self::new(token.expose_secret(), runner, config.request_timeout())?
            .with_api_url(&config.api_url)
            .with_timing(config.fork_timing()))
    }

    fn new(token: &str, mut runner: GitRunner, timeout: Duration) -> BotResult<Self> {
        runner.add_hidden_token(token);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PlatformError::from)?;
        Ok(Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            token: SecretString::from(token),
            git: GitCli::new(runner),
            timing: ForkTiming::default(),
            user: OnceCell::new(),
        })
    }

    /// Points the backend at another REST endpoint.
    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub const fn with_timing(mut self, timing: ForkTiming) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.api_url))
            .bearer_auth(self.token.expose_secret())
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(
                USER_AGENT,
                format!("feedstock-bot/{}", env!("CARGO_PKG_VERSION")),
            )
    }

    async fn send(&self, request: RequestBuilder) -> BotResult<Response> {
        Ok(request.send().await.map_err(PlatformError::from)?)
    }

    async fn json(response: Response, action: &str) -> BotResult<Value> {
        response.json::<Value>().await.map_err(|e| {
            PlatformError::UnexpectedResponse {
                action: action.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Repository metadata; 404 becomes `RepositoryNotFound`.
    async fn repository(&self, owner: &str, name: &str) -> BotResult<Value> {
        let response = self
            .send(self.request(Method::GET, &format!("/repos/{owner}/{name}")))
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(PlatformError::RepositoryNotFound {
                owner: owner.to_string(),
                repo: name.to_string(),
            }
            .into()),
            status if status.is_success() => {
                Self::json(response, "Could not read repository").await
            }
            status => Err(failed("Could not read repository", &format!("{owner}/{name}"), status)),
        }
    }

    async fn default_branch(&self, owner: &str, name: &str) -> BotResult<String> {
        let repo = self.repository(owner, name).await?;
        repo.get("default_branch")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| {
                PlatformError::UnexpectedResponse {
                    action: format!("Could not read default branch of {owner}/{name}"),
                    message: "missing default_branch".to_string(),
                }
                .into()
            })
    }

    async fn create_fork(&self, upstream_owner: &str, name: &str, user: &str) -> BotResult<()> {
        // Distinguishes a missing upstream from a failed fork request.
        self.repository(upstream_owner, name).await?;

        info!("Creating fork of {upstream_owner}/{name} for user {user}");
        let response = self
            .send(self.request(Method::POST, &format!("/repos/{upstream_owner}/{name}/forks")))
            .await?;
        if !response.status().is_success() {
            return Err(failed(
                "Could not create fork",
                &format!("{upstream_owner}/{name}"),
                response.status(),
            ));
        }

        tokio::time::sleep(self.timing.settle).await;
        for attempt in 1..=self.timing.visibility_attempts {
            if self.repository_exists(user, name).await? {
                debug!(attempt, "fork is visible");
                return Ok(());
            }
            if attempt < self.timing.visibility_attempts {
                tokio::time::sleep(self.timing.settle).await;
            }
        }
        warn!(
            attempts = self.timing.visibility_attempts,
            "fork {user}/{name} not visible yet"
        );
        Ok(())
    }

    async fn sync_default_branch(
        &self,
        upstream_owner: &str,
        name: &str,
        user: &str,
    ) -> BotResult<()> {
        let upstream_default = self.default_branch(upstream_owner, name).await?;
        let fork_default = self.default_branch(user, name).await?;
        if upstream_default == fork_default {
            debug!(branch = %fork_default, "default branch already in sync");
            return Ok(());
        }

        info!(
            "Syncing default branch of {user}/{name} from {fork_default} to {upstream_default}"
        );
        let response = self
            .send(
                self.request(
                    Method::POST,
                    &format!("/repos/{user}/{name}/branches/{fork_default}/rename"),
                )
                .json(&json!({ "new_name": upstream_default })),
            )
            .await?;
        if !response.status().is_success() {
            return Err(failed(
                "Could not sync default branch",
                &format!("{user}/{name}"),
                response.status(),
            ));
        }
        tokio::time::sleep(self.timing.branch_sync).await;
        Ok(())
    }

    async fn fetch_user(&self) -> BotResult<String> {
        const ACTION: &str = "Could not fetch authenticated user";
        let response = self.send(self.request(Method::GET, "/user")).await?;
        if !response.status().is_success() {
            return Err(failed(ACTION, "/user", response.status()));
        }
        let body = Self::json(response, ACTION).await?;
        let login = body
            .get("login")
            .and_then(Value::as_str)
            .ok_or_else(|| PlatformError::UnexpectedResponse {
                action: ACTION.to_string(),
                message: "missing login".to_string(),
            })?;
        debug!(user = login, "resolved authenticated user");
        Ok(login.to_string())
    }

    async fn fetch_rate_limit(&self) -> Result<Value, reqwest::Error> {
        self.request(Method::GET, "/rate_limit")
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
}

fn failed(action: &str, target: &str, status: StatusCode) -> crate::error::BotError {
    warn!(status = status.as_u16(), "{action}: {target}");
    PlatformError::Failed {
        action: action.to_string(),
        target: target.to_string(),
        status: status.as_u16(),
    }
    .into()
}

fn header_value(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Extracts the quota from a `/rate_limit` body, logging how it degrades.
pub(crate) fn parse_rate_limit(value: &Value) -> RequestsLeft {
    let Some(remaining) = value
        .pointer("/resources/core/remaining")
        .and_then(Value::as_u64)
    else {
        warn!("API error while parsing rate limit: unexpected response schema");
        return RequestsLeft::Unknown;
    };

    let resets_at = if remaining == 0 {
        let reset = value
            .pointer("/resources/core/reset")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        match reset {
            Some(at) => {
                info!(
                    "GitHub API requests exhausted, will reset at {}",
                    at.to_rfc3339_opts(SecondsFormat::Secs, true)
                );
                Some(at)
            }
            None => {
                warn!("GitHub API error while fetching rate limit reset time");
                None
            }
        }
    } else {
        None
    };

    RequestsLeft::Finite(RateQuota {
        remaining,
        resets_at,
    })
}

impl GitPlatformBackend for GitHubBackend {
    fn git(&self) -> &GitCli {
        &self.git
    }

    async fn user(&self) -> BotResult<&str> {
        let user = self.user.get_or_try_init(|| self.fetch_user()).await?;
        Ok(user.as_str())
    }

    async fn repository_exists(&self, owner: &str, name: &str) -> BotResult<bool> {
        let response = self
            .send(self.request(Method::GET, &format!("/repos/{owner}/{name}")))
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(failed(
                "Could not check repository",
                &format!("{owner}/{name}"),
                status,
            )),
        }
    }

    async fn fork(&self, upstream_owner: &str, name: &str) -> BotResult<()> {
        let user = self.user().await?;
        if self.repository_exists(user, name).await? {
            debug!("fork {user}/{name} already exists");
        } else {
            self.create_fork(upstream_owner, name, user).await?;
        }
        self.sync_default_branch(upstream_owner, name, user).await
    }

    async fn push_to_repository(
        &self,
        owner: &str,
        name: &str,
        local_dir: &Path,
        branch: &str,
    ) -> BotResult<()> {
        let url = remote_url(
            owner,
            name,
            ConnectionMode::TokenHttps,
            Some(self.token.expose_secret()),
        );
        self.git.push(local_dir, &url, branch)?;
        info!(repository = %format!("{owner}/{name}"), branch, "pushed");
        Ok(())
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
        self.repository(owner, name).await?;
        let user = self.user().await?;
        let head = format!("{user}:{head_branch}");

        let response = self
            .send(
                self.request(Method::POST, &format!("/repos/{owner}/{name}/pulls"))
                    .json(&json!({
                        "title": title,
                        "body": body,
                        "base": base_branch,
                        "head": head,
                    })),
            )
            .await?;
        if response.status() != StatusCode::CREATED {
            return Err(failed(
                "Could not create pull request",
                &format!("{owner}/{name}"),
                response.status(),
            ));
        }

        let e_tag = header_value(response.headers(), ETAG);
        let last_modified = header_value(response.headers(), LAST_MODIFIED);
        let mut value = Self::json(response, "Could not create pull request").await?;
        if let Some(map) = value.as_object_mut() {
            if let Some(e_tag) = e_tag {
                map.insert("ETag".to_string(), Value::String(e_tag));
            }
            if let Some(last_modified) = last_modified {
                map.insert("Last-Modified".to_string(), Value::String(last_modified));
            }
        }
        trim_pr_json(&mut value);

        let record = PullRequestRecord::from_trimmed(value)
            .map_err(|e| PlatformError::UnexpectedResponse {
                action: "Could not create pull request".to_string(),
                message: e.to_string(),
            })?
            .in_repository(owner, name)
            .with_text(title, body);
        info!(
            number = record.number,
            url = %record.html_url,
            "created pull request {head} -> {owner}:{base_branch}"
        );
        Ok(record)
    }

    async fn comment_on_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        body: &str,
    ) -> BotResult<()> {
        self.repository(owner, name).await?;

        let target = format!("{owner}/{name}#{number}");
        let response = self
            .send(self.request(Method::GET, &format!("/repos/{owner}/{name}/pulls/{number}")))
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(PlatformError::PullRequestNotFound {
                    owner: owner.to_string(),
                    repo: name.to_string(),
                    number,
                }
                .into());
            }
            status if !status.is_success() => {
                return Err(failed("Could not read pull request", &target, status));
            }
            _ => {}
        }

        let response = self
            .send(
                self.request(
                    Method::POST,
                    &format!("/repos/{owner}/{name}/issues/{number}/comments"),
                )
                .json(&json!({ "body": body })),
            )
            .await?;
        if response.status() != StatusCode::CREATED {
            return Err(failed(
                "Could not comment on pull request",
                &target,
                response.status(),
            ));
        }
        info!("commented on pull request {target}");
        Ok(())
    }

    async fn api_requests_left(&self) -> RequestsLeft {
        match self.fetch_rate_limit().await {
            Ok(value) => parse_rate_limit(&value),
            Err(e) if e.is_decode() => {
                warn!(error = %e, "API error while parsing rate limit");
                RequestsLeft::Unknown
            }
            Err(e) => {
                warn!(error = %e, "API error while fetching rate limit");
                RequestsLeft::Unknown
            }
        }
    }
}
