// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository arguments.
//!
//! ```text
//! feedstock-bot prepare conda-forge/pytest-feedstock -d ./pytest-feedstock -b bump-8.2
//!   → fork (unless --no-fork) + clone-fork-and-branch
//! feedstock-bot push conda-forge/pytest-feedstock -d ./pytest-feedstock -b bump-8.2 --fork
//!   → push branch to the bot's fork (or to OWNER/NAME without --fork)
//! ```

use clap::Args;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// `OWNER/NAME` on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSpec {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(format!("expected OWNER/NAME, got '{s}'")),
        }
    }
}

impl fmt::Display for RepoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Arguments for the `prepare` command.
#[derive(Debug, Clone, Args)]
pub struct PrepareArgs {
    /// Upstream repository.
    #[arg(value_name = "OWNER/NAME")]
    pub repo: RepoSpec,

    /// Checkout directory; reused if it already holds a clone.
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: PathBuf,

    /// Branch to create or reuse for the new work.
    #[arg(short = 'b', long = "branch", value_name = "BRANCH")]
    pub branch: String,

    /// Upstream branch to start from [default: backend.default_base_branch].
    #[arg(long = "base", value_name = "BRANCH")]
    pub base: Option<String>,

    /// Skip the fork step; the fork must already exist.
    #[arg(long = "no-fork")]
    pub no_fork: bool,
}

/// Arguments for the `push` command.
#[derive(Debug, Clone, Args)]
pub struct PushArgs {
    /// Target repository; with --fork only NAME is used.
    #[arg(value_name = "OWNER/NAME")]
    pub repo: RepoSpec,

    /// Local checkout to push from.
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: PathBuf,

    /// Branch to push.
    #[arg(short = 'b', long = "branch", value_name = "BRANCH")]
    pub branch: String,

    /// Push to the bot's fork instead of OWNER/NAME.
    #[arg(long)]
    pub fork: bool,
}
