// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Clone-fork-and-branch protocol.
//!
//! Prepares a working directory checked out on a new branch that starts
//! from upstream's tip of the base branch, with the fork as `origin` and
//! the upstream repository as `upstream`.
//!
//! ```text
//!  Clone ----TargetNotEmpty----> ResetExisting
//!    |                                |
//!    v                                |
//!  AddUpstream <----------------------+
//!    |  (RemoteExists: log, continue)
//!    v
//!  Fetch
//!    |
//!    v
//!  ResolveBase --Local------------> CheckoutBase ----------+
//!    |                                                     |
//!    +--RemoteTracking/Absent----> TrackBase --------------+
//!                                     | (any git error)    |
//!                                     v                    |
//!                                  CreateBase -------------+
//!                                                          v
//!                                                   ResetToUpstream
//!                                                          |
//!                                                          v
//!                      CreateNewBranch <--BranchNotFound-- CheckoutNewBranch
//!                            |                             |
//!                            +-----------> Done <----------+
//! ```
//!
//! Each step either advances, takes its fallback on the one recoverable
//! failure it knows about, or propagates the error unchanged.

use std::path::Path;
use tracing::{debug, info};

use crate::error::{BotError, BotResult, GitError};
use crate::git::cli::RepositoryOps;

/// Name of the remote pointing at the upstream repository.
pub const UPSTREAM_REMOTE: &str = "upstream";

/// Where the base branch can be found before it is checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    /// A local branch with that name exists.
    Local,
    /// Only `upstream/<branch>` exists.
    RemoteTracking,
    /// Neither exists.
    Absent,
}

/// One protocol step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Clone,
    ResetExisting,
    AddUpstream,
    Fetch,
    ResolveBase,
    CheckoutBase,
    TrackBase,
    CreateBase,
    ResetToUpstream,
    CheckoutNewBranch,
    CreateNewBranch,
    Done,
}

/// Inputs of one protocol run.
#[derive(Debug, Clone, Copy)]
pub struct CloneForkAndBranch<'a> {
    pub origin_url: &'a str,
    pub target_dir: &'a Path,
    pub upstream_url: &'a str,
    pub new_branch: &'a str,
    pub base_branch: &'a str,
}

impl CloneForkAndBranch<'_> {
    fn upstream_base(&self) -> String {
        format!("{UPSTREAM_REMOTE}/{}", self.base_branch)
    }

    /// Classifies the base branch in the fetched checkout.
    pub fn base_branch_state(&self, ops: &impl RepositoryOps) -> BranchState {
        if ops.branch_exists(self.target_dir, self.base_branch) {
            BranchState::Local
        } else if ops.ref_exists(
            self.target_dir,
            &format!("refs/remotes/{}", self.upstream_base()),
        ) {
            BranchState::RemoteTracking
        } else {
            BranchState::Absent
        }
    }

    /// Executes `step` and returns the next one.
    ///
    /// # Errors
    ///
    /// Returns the failing operation's error when the step has no fallback
    /// for it.
    pub fn advance(&self, ops: &impl RepositoryOps, step: Step) -> BotResult<Step> {
        let dir = self.target_dir;
        let next = match step {
            Step::Clone => match ops.clone_repo(self.origin_url, dir) {
                Ok(()) => Step::AddUpstream,
                Err(e) if matches!(e.as_git(), Some(GitError::TargetNotEmpty { .. })) => {
                    info!(
                        target_dir = %dir.display(),
                        "target directory is not empty, trying to reset hard"
                    );
                    Step::ResetExisting
                }
                Err(e) => return Err(e),
            },
            Step::ResetExisting => {
                ops.hard_reset(dir, "HEAD")?;
                Step::AddUpstream
            }
            Step::AddUpstream => match ops.add_remote(dir, UPSTREAM_REMOTE, self.upstream_url) {
                Ok(()) => Step::Fetch,
                Err(e) if matches!(e.as_git(), Some(GitError::RemoteExists { .. })) => {
                    debug!("remote '{UPSTREAM_REMOTE}' already exists");
                    Step::Fetch
                }
                Err(e) => return Err(e),
            },
            Step::Fetch => {
                ops.fetch_all(dir)?;
                Step::ResolveBase
            }
            Step::ResolveBase => {
                let state = self.base_branch_state(ops);
                debug!(branch = self.base_branch, ?state, "resolved base branch");
                match state {
                    BranchState::Local => Step::CheckoutBase,
                    BranchState::RemoteTracking | BranchState::Absent => Step::TrackBase,
                }
            }
            Step::CheckoutBase => {
                ops.checkout(dir, self.base_branch, false)?;
                Step::ResetToUpstream
            }
            Step::TrackBase => match ops.checkout(dir, &self.upstream_base(), true) {
                Ok(()) => Step::ResetToUpstream,
                Err(BotError::Git(e)) => {
                    info!(
                        error = %e,
                        "Could not check out with git checkout --track, trying git checkout -b"
                    );
                    Step::CreateBase
                }
                Err(e) => return Err(e),
            },
            Step::CreateBase => {
                ops.checkout_new(dir, self.base_branch, &self.upstream_base())?;
                Step::ResetToUpstream
            }
            Step::ResetToUpstream => {
                ops.hard_reset(dir, &self.upstream_base())?;
                Step::CheckoutNewBranch
            }
            Step::CheckoutNewBranch => match ops.checkout(dir, self.new_branch, false) {
                Ok(()) => Step::Done,
                Err(e) if matches!(e.as_git(), Some(GitError::BranchNotFound { .. })) => {
                    info!("branch {} does not exist, creating it", self.new_branch);
                    Step::CreateNewBranch
                }
                Err(e) => return Err(e),
            },
            Step::CreateNewBranch => {
                ops.checkout_new(dir, self.new_branch, self.base_branch)?;
                Step::Done
            }
            Step::Done => Step::Done,
        };
        Ok(next)
    }

    /// Runs every step and returns the path taken (excluding `Done`).
    ///
    /// # Errors
    ///
    /// See [`CloneForkAndBranch::advance`].
    pub fn run(&self, ops: &impl RepositoryOps) -> BotResult<Vec<Step>> {
        let mut taken = Vec::new();
        let mut step = Step::Clone;
        while step != Step::Done {
            taken.push(step);
            step = self.advance(ops, step)?;
        }
        debug!(
            target_dir = %self.target_dir.display(),
            branch = self.new_branch,
            steps = taken.len(),
            "clone-fork-and-branch complete"
        );
        Ok(taken)
    }
}

/// Clones `origin_url` into `target_dir`, wires up `upstream_url` and checks
/// out `new_branch` on top of `upstream/<base_branch>`.
///
/// # Errors
///
/// Propagates any git failure the protocol has no fallback for.
pub fn clone_fork_and_branch(
    ops: &impl RepositoryOps,
    origin_url: &str,
    target_dir: &Path,
    upstream_url: &str,
    new_branch: &str,
    base_branch: &str,
) -> BotResult<()> {
    CloneForkAndBranch {
        origin_url,
        target_dir,
        upstream_url,
        new_branch,
        base_branch,
    }
    .run(ops)?;
    Ok(())
}

#[cfg(test)]
mod tests;
