// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository operations on top of [`GitRunner`].
//!
//! ```text
//! RepositoryOps (trait)
//!      |
//!      +-- GitCli           real git through GitRunner
//!      +-- (test fakes)     scripted results for protocol tests
//!
//! op              argv
//! --------------  ------------------------------------------------
//! stage           add [--all] <paths>
//! commit          commit [-a] [--allow-empty] -m <msg>
//! hard_reset      reset --quiet --hard <target>
//! clone_repo      clone --quiet <url> <target>
//! add_remote      remote add <name> <url>
//! push            push <remote> <branch>
//! fetch_all       fetch --all --quiet
//! branch_exists   show-ref --verify --quiet refs/heads/<name>
//! remote_exists   ls-remote <url>
//! checkout        checkout --quiet [--track] <branch>
//! checkout_new    checkout --quiet -b <branch> <start>
//! diffed_files    diff --name-only -z --relative <since> HEAD
//! rev_parse_head  rev-parse HEAD
//! ```

use regex::Regex;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::{BotResult, GitError};
use crate::git::runner::{CommandOutput, GitRunner, RunFlags};

static COMMIT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{40}$").expect("valid commit id pattern"));

/// Fixed set of git actions used by the clone-fork-and-branch protocol and
/// the platform backends.
///
/// All directory arguments name the working tree the command runs in.
pub trait RepositoryOps {
    /// Stages `paths`, or everything when `all` is set.
    ///
    /// # Errors
    ///
    /// `GitError::InvalidArgument` when `paths` is empty and `all` is false
    /// (no command runs); `GitError::CommandFailed` if git fails.
    fn stage(&self, dir: &Path, paths: &[&Path], all: bool) -> BotResult<()>;

    /// Records a commit.
    ///
    /// # Errors
    ///
    /// Fails when there is nothing to commit and `allow_empty` is false.
    fn commit(&self, dir: &Path, message: &str, all: bool, allow_empty: bool) -> BotResult<()>;

    /// Discards index and working-tree changes back to `target`.
    ///
    /// # Errors
    ///
    /// Fails if `target` does not resolve or `dir` is not a repository.
    fn hard_reset(&self, dir: &Path, target: &str) -> BotResult<()>;

    /// Clones `url` into `target`.
    ///
    /// # Errors
    ///
    /// `GitError::TargetNotEmpty` if `target` exists and is not an empty
    /// directory, `GitError::CloneFailed` for any other failure.
    fn clone_repo(&self, url: &str, target: &Path) -> BotResult<()>;

    /// Adds a remote.
    ///
    /// # Errors
    ///
    /// `GitError::RemoteExists` if `name` is already configured.
    fn add_remote(&self, dir: &Path, name: &str, url: &str) -> BotResult<()>;

    /// Pushes local `branch` to the same-named ref on `remote`.
    ///
    /// # Errors
    ///
    /// Fails on any non-zero exit.
    fn push(&self, dir: &Path, remote: &str, branch: &str) -> BotResult<()>;

    /// Fetches every remote.
    ///
    /// # Errors
    ///
    /// Fails if any remote cannot be fetched.
    fn fetch_all(&self, dir: &Path) -> BotResult<()>;

    /// True if the fully qualified `reference` exists. Never fails.
    fn ref_exists(&self, dir: &Path, reference: &str) -> bool;

    /// True if local branch `name` exists. Never fails.
    fn branch_exists(&self, dir: &Path, name: &str) -> bool {
        self.ref_exists(dir, &format!("refs/heads/{name}"))
    }

    /// True if `url` answers a remote listing. Never fails.
    fn remote_exists(&self, url: &str) -> bool;

    /// Checks out `branch`; with `track`, creates a local branch tracking the
    /// remote-tracking ref `branch` (e.g. `upstream/main`).
    ///
    /// # Errors
    ///
    /// `GitError::TrackingRefMissing` (track) or `GitError::BranchNotFound`
    /// (no track) when the ref is absent, `GitError::CommandFailed` otherwise.
    fn checkout(&self, dir: &Path, branch: &str, track: bool) -> BotResult<()>;

    /// Creates `branch` at `start_point` and checks it out.
    ///
    /// # Errors
    ///
    /// Fails if `branch` already exists or `start_point` does not resolve.
    fn checkout_new(&self, dir: &Path, branch: &str, start_point: &str) -> BotResult<()>;

    /// Paths changed between `since` and `HEAD`, relative to the repository root.
    ///
    /// # Errors
    ///
    /// Fails if `since` does not resolve.
    fn diffed_files(&self, dir: &Path, since: &str) -> BotResult<DiffedFiles>;

    /// Current commit id (40 lowercase hex characters).
    ///
    /// # Errors
    ///
    /// Fails outside a repository, on an unborn branch, or if git answers
    /// with something that is not a commit id.
    fn rev_parse_head(&self, dir: &Path) -> BotResult<String>;
}

/// Single-pass iterator over the paths reported by `git diff --name-only -z`.
///
/// Entries are NUL-separated, so paths come through verbatim without git's
/// quoting. They are split off the captured output as the iterator advances.
#[derive(Debug)]
pub struct DiffedFiles {
    output: String,
    pos: usize,
}

impl DiffedFiles {
    pub(crate) const fn new(output: String) -> Self {
        Self { output, pos: 0 }
    }
}

impl Iterator for DiffedFiles {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.output.len() {
            let rest = &self.output[self.pos..];
            let (entry, advance) = rest
                .find('\0')
                .map_or((rest, rest.len()), |idx| (&rest[..idx], idx + 1));
            self.pos += advance;
            if !entry.is_empty() {
                return Some(PathBuf::from(entry));
            }
        }
        None
    }
}

impl std::iter::FusedIterator for DiffedFiles {}

/// [`RepositoryOps`] backed by the git executable.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    runner: GitRunner,
}

impl GitCli {
    #[must_use]
    pub const fn new(runner: GitRunner) -> Self {
        Self { runner }
    }

    #[must_use]
    pub const fn runner(&self) -> &GitRunner {
        &self.runner
    }

    /// Registers a secret with the underlying runner.
    pub fn add_hidden_token(&mut self, token: impl Into<String>) {
        self.runner.add_hidden_token(token);
    }

    fn run<S: AsRef<OsStr>>(&self, dir: Option<&Path>, args: &[S]) -> BotResult<CommandOutput> {
        self.runner.run(args, dir, RunFlags::empty())
    }

    fn probe<S: AsRef<OsStr>>(&self, dir: Option<&Path>, args: &[S]) -> bool {
        if dir.is_some_and(|d| !d.is_dir()) {
            return false;
        }
        self.runner
            .run(args, dir, RunFlags::ALLOW_FAILURE | RunFlags::CAPTURE_STDERR)
            .is_ok_and(|output| output.success())
    }

    fn failed(&self, args: &[&str], exit_code: i32) -> GitError {
        let line = self.runner.redactor().redact_args("git", args);
        let message = self.runner.redact(&format!("Command '{line}' failed."));
        warn!(exit_code, "{message}");
        GitError::CommandFailed {
            message,
            exit_code: Some(exit_code),
        }
    }
}

fn is_non_empty_target(target: &Path) -> bool {
    if !target.exists() {
        return false;
    }
    if !target.is_dir() {
        return true;
    }
    std::fs::read_dir(target).map_or(true, |mut entries| entries.next().is_some())
}

impl RepositoryOps for GitCli {
    fn stage(&self, dir: &Path, paths: &[&Path], all: bool) -> BotResult<()> {
        if paths.is_empty() && !all {
            return Err(
                GitError::InvalidArgument("either paths or all must be set".to_string()).into(),
            );
        }

        let mut args: Vec<OsString> = vec!["add".into()];
        if all {
            args.push("--all".into());
        }
        args.extend(paths.iter().map(|p| p.as_os_str().to_os_string()));
        self.run(Some(dir), &args)?;
        Ok(())
    }

    fn commit(&self, dir: &Path, message: &str, all: bool, allow_empty: bool) -> BotResult<()> {
        let mut args = vec!["commit"];
        if all {
            args.push("-a");
        }
        if allow_empty {
            args.push("--allow-empty");
        }
        args.extend(["-m", message]);
        self.run(Some(dir), &args)?;
        Ok(())
    }

    fn hard_reset(&self, dir: &Path, target: &str) -> BotResult<()> {
        self.run(Some(dir), &["reset", "--quiet", "--hard", target])?;
        Ok(())
    }

    fn clone_repo(&self, url: &str, target: &Path) -> BotResult<()> {
        if is_non_empty_target(target) {
            return Err(GitError::TargetNotEmpty {
                path: target.display().to_string(),
            }
            .into());
        }

        let args: [&OsStr; 4] = [
            "clone".as_ref(),
            "--quiet".as_ref(),
            url.as_ref(),
            target.as_os_str(),
        ];
        let output = self.runner.run(&args, None, RunFlags::ALLOW_FAILURE)?;
        if !output.success() {
            let url = self.runner.redact(url);
            warn!(url = %url, exit_code = output.exit_code(), "clone failed");
            return Err(GitError::CloneFailed { url }.into());
        }
        Ok(())
    }

    fn add_remote(&self, dir: &Path, name: &str, url: &str) -> BotResult<()> {
        let remotes = self
            .runner
            .run(&["remote"], Some(dir), RunFlags::ALLOW_FAILURE)?;
        if remotes.success() && remotes.stdout().lines().any(|r| r.trim() == name) {
            return Err(GitError::RemoteExists {
                name: name.to_string(),
            }
            .into());
        }
        self.run(Some(dir), &["remote", "add", name, url])?;
        Ok(())
    }

    fn push(&self, dir: &Path, remote: &str, branch: &str) -> BotResult<()> {
        self.run(Some(dir), &["push", remote, branch])?;
        Ok(())
    }

    fn fetch_all(&self, dir: &Path) -> BotResult<()> {
        self.run(Some(dir), &["fetch", "--all", "--quiet"])?;
        Ok(())
    }

    fn ref_exists(&self, dir: &Path, reference: &str) -> bool {
        self.probe(Some(dir), &["show-ref", "--verify", "--quiet", reference])
    }

    fn remote_exists(&self, url: &str) -> bool {
        self.probe(None, &["ls-remote", url])
    }

    fn checkout(&self, dir: &Path, branch: &str, track: bool) -> BotResult<()> {
        let mut args = vec!["checkout", "--quiet"];
        if track {
            args.push("--track");
        }
        args.push(branch);

        let output = self
            .runner
            .run(&args, Some(dir), RunFlags::ALLOW_FAILURE)?;
        if output.success() {
            return Ok(());
        }

        if track && !self.ref_exists(dir, &format!("refs/remotes/{branch}")) {
            return Err(GitError::TrackingRefMissing {
                reference: self.runner.redact(&format!("refs/remotes/{branch}")),
            }
            .into());
        }
        if !track && !self.branch_exists(dir, branch) {
            return Err(GitError::BranchNotFound {
                branch: self.runner.redact(branch),
            }
            .into());
        }
        Err(self.failed(&args, output.exit_code()).into())
    }

    fn checkout_new(&self, dir: &Path, branch: &str, start_point: &str) -> BotResult<()> {
        self.run(Some(dir), &["checkout", "--quiet", "-b", branch, start_point])?;
        Ok(())
    }

    fn diffed_files(&self, dir: &Path, since: &str) -> BotResult<DiffedFiles> {
        let output = self.run(
            Some(dir),
            &["diff", "--name-only", "-z", "--relative", since, "HEAD"],
        )?;
        Ok(DiffedFiles::new(output.stdout().to_string()))
    }

    fn rev_parse_head(&self, dir: &Path) -> BotResult<String> {
        let output = self.run(Some(dir), &["rev-parse", "HEAD"])?;
        let id = output.stdout().trim();
        if !COMMIT_ID.is_match(id) {
            return Err(GitError::UnexpectedOutput {
                command: "git rev-parse HEAD".to_string(),
                output: id.to_string(),
            }
            .into());
        }
        debug!(head = id, "resolved HEAD");
        Ok(id.to_string())
    }
}

#[cfg(test)]
mod tests;
