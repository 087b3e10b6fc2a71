// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Offline backend.
//!
//! Platform calls are logged instead of sent; git still runs for real so the
//! clone-fork-and-branch protocol leaves a usable checkout behind. Forks are
//! remembered per instance.

use chrono::Utc;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

use crate::error::BotResult;
use crate::git::GitCli;

use super::pull_request::{PullRequestRecord, PullRequestRef, PullRequestState, RepoName};
use super::{ConnectionMode, GitPlatformBackend, RequestsLeft, remote_url};

/// Account the dry-run backend pretends to be.
pub const DRY_RUN_USER: &str = "auto-tick-bot-dry-run";

/// Repositories of other owners that are known to exist.
pub const KNOWN_REPOSITORIES: &[&str] = &[
    "conda-forge/pytest-feedstock",
    "conda-forge/duckdb-feedstock",
    "conda-forge/polars-feedstock",
    "regro/cf-scripts",
    "regro/cf-graph-countyfair",
];

const DRY_RUN_PR_ID: u64 = 13_371_337;
const DRY_RUN_PR_NUMBER: u64 = 1337;
const DRY_RUN_PR_ETAG: &str = "GITHUB_PR_ETAG";

#[derive(Debug)]
pub struct DryRunBackend {
    git: GitCli,
    known: BTreeSet<String>,
    forks: Mutex<BTreeSet<String>>,
}

impl Default for DryRunBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DryRunBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::with_git(GitCli::default())
    }

    /// Uses `git` for local operations.
    #[must_use]
    pub fn with_git(git: GitCli) -> Self {
        Self {
            git,
            known: KNOWN_REPOSITORIES.iter().map(ToString::to_string).collect(),
            forks: Mutex::new(BTreeSet::new()),
        }
    }

    /// Marks `owner/name` as existing.
    #[must_use]
    pub fn with_known_repository(mut self, owner: &str, name: &str) -> Self {
        self.known.insert(format!("{owner}/{name}"));
        self
    }

    fn forks(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        // The set stays consistent even if a holder panicked.
        self.forks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// HTTP date as GitHub sends it in `Last-Modified`.
fn http_date_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

impl GitPlatformBackend for DryRunBackend {
    fn git(&self) -> &GitCli {
        &self.git
    }

    async fn user(&self) -> BotResult<&str> {
        Ok(DRY_RUN_USER)
    }

    async fn repository_exists(&self, owner: &str, name: &str) -> BotResult<bool> {
        if owner == DRY_RUN_USER {
            return Ok(self.forks().contains(name));
        }
        Ok(self.known.contains(&format!("{owner}/{name}")))
    }

    async fn fork(&self, upstream_owner: &str, name: &str) -> BotResult<()> {
        {
            let mut forks = self.forks();
            if forks.contains(name) {
                debug!("Fork of {name} already exists");
            } else {
                info!("Dry Run: Creating fork of {upstream_owner}/{name} for user {DRY_RUN_USER}");
                forks.insert(name.to_string());
            }
        }
        info!("Dry Run: Syncing default branch of {upstream_owner}/{name}");
        Ok(())
    }

    async fn push_to_repository(
        &self,
        owner: &str,
        name: &str,
        local_dir: &Path,
        branch: &str,
    ) -> BotResult<()> {
        info!(
            "Dry Run: Pushing changes from {} to {owner}/{name} on branch {branch}",
            local_dir.display()
        );
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
        info!(
            "Dry Run: Create Pull Request\n\
             Title: \"{title}\"\n\
             Target Repository: {owner}/{name}\n\
             Branches: {DRY_RUN_USER}:{head_branch} -> {owner}:{base_branch}\n\
             Body:\n{body}"
        );

        let now = Utc::now();
        let record = PullRequestRecord {
            owner: owner.to_string(),
            repo: name.to_string(),
            e_tag: Some(DRY_RUN_PR_ETAG.to_string()),
            last_modified: Some(http_date_now()),
            id: DRY_RUN_PR_ID,
            number: DRY_RUN_PR_NUMBER,
            html_url: format!("https://github.com/{owner}/{name}/pulls/{DRY_RUN_PR_NUMBER}"),
            state: PullRequestState::Open,
            title: title.to_string(),
            body: Some(body.to_string()),
            created_at: Some(now),
            updated_at: Some(now),
            closed_at: None,
            merged_at: None,
            merged: false,
            mergeable: Some(true),
            mergeable_state: None,
            labels: Vec::new(),
            head: PullRequestRef {
                ref_name: head_branch.to_string(),
                label: Some(format!("{DRY_RUN_USER}:{head_branch}")),
                repo: Some(RepoName {
                    name: name.to_string(),
                }),
            },
            base: PullRequestRef {
                ref_name: base_branch.to_string(),
                label: None,
                repo: Some(RepoName {
                    name: name.to_string(),
                }),
            },
        };
        Ok(record)
    }

    async fn comment_on_pull_request(
        &self,
        owner: &str,
        name: &str,
        number: u64,
        body: &str,
    ) -> BotResult<()> {
        info!(
            "Dry Run: Comment on Pull Request\n\
             Pull Request: {owner}/{name}#{number}\n\
             Comment:\n{body}"
        );
        Ok(())
    }

    async fn api_requests_left(&self) -> RequestsLeft {
        RequestsLeft::Infinite
    }

    // The simulated fork has no remote; clone upstream instead.
    async fn origin_url(&self, upstream_owner: &str, name: &str) -> BotResult<String> {
        Ok(remote_url(upstream_owner, name, ConnectionMode::Https, None))
    }
}
