// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI arguments for the pull request commands.
//!
//! ```text
//! feedstock-bot open-pr conda-forge/pytest-feedstock --head bump-8.2 -t "pytest v8.2" --body-file body.md
//! feedstock-bot comment conda-forge/pytest-feedstock 1337 -m "@conda-forge-admin, please rerender"
//! ```

use clap::Args;
use std::path::PathBuf;

use super::repo::RepoSpec;

/// Arguments for the `open-pr` command.
#[derive(Debug, Clone, Args)]
pub struct OpenPrArgs {
    /// Upstream repository receiving the pull request.
    #[arg(value_name = "OWNER/NAME")]
    pub repo: RepoSpec,

    /// Branch of the bot's fork holding the changes.
    #[arg(long = "head", value_name = "BRANCH")]
    pub head: String,

    /// Upstream branch to merge into [default: backend.default_base_branch].
    #[arg(long = "base", value_name = "BRANCH")]
    pub base: Option<String>,

    #[arg(short = 't', long = "title")]
    pub title: String,

    /// Pull request description.
    #[arg(short = 'm', long = "body", conflicts_with = "body_file", default_value = "")]
    pub body: String,

    /// Reads the description from a file.
    #[arg(long = "body-file", value_name = "FILE")]
    pub body_file: Option<PathBuf>,
}

/// Arguments for the `comment` command.
#[derive(Debug, Clone, Args)]
pub struct CommentArgs {
    #[arg(value_name = "OWNER/NAME")]
    pub repo: RepoSpec,

    /// Pull request number.
    #[arg(value_name = "NUMBER")]
    pub number: u64,

    /// Comment text.
    #[arg(short = 'm', long = "body", required = true)]
    pub body: String,
}
