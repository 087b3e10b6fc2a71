// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! feedstock-bot [global options] <command>
//! prepare OWNER/NAME -d DIR -b BRANCH [--base B] [--no-fork]
//! push OWNER/NAME -d DIR -b BRANCH [--fork]
//! open-pr OWNER/NAME --head BRANCH -t TITLE [-m BODY | --body-file F]
//! comment OWNER/NAME NUMBER -m BODY
//! rate-limit
//! options
//! version
//! ```

pub mod global;
pub mod pr;
pub mod repo;

use crate::cli::global::GlobalOptions;
use crate::cli::pr::{CommentArgs, OpenPrArgs};
use crate::cli::repo::{PrepareArgs, PushArgs};
use clap::{Parser, Subcommand};

/// Git and pull request automation for feedstock maintenance bots.
#[derive(Debug, Parser)]
#[command(
    name = "feedstock-bot",
    author,
    version,
    about = "Git and pull request automation for feedstock maintenance bots",
    long_about = "feedstock-bot Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Forks feedstock repositories into the bot account, prepares\n\
                  branches, pushes them and opens pull requests upstream.\n\
                  With --dry-run no platform call is made and git still runs\n\
                  locally.",
    after_help = "CONFIGURATION:\n\n\
                  feedstock-bot reads feedstock-bot.toml from the current directory\n\
                  unless --no-default-config is given, then every --config file in order.\n\
                  FEEDSTOCK_BOT_<SECTION>__<KEY> environment variables and --set\n\
                  override file values. The GitHub token is read from github.token\n\
                  or from the variable named by github.token_env (BOT_TOKEN)."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their values.
    Options,

    /// Forks a repository and prepares a branch in a local checkout.
    Prepare(PrepareArgs),

    /// Pushes a branch of a local checkout.
    Push(PushArgs),

    /// Opens a pull request from the bot's fork.
    #[command(name = "open-pr")]
    OpenPr(OpenPrArgs),

    /// Comments on a pull request.
    Comment(CommentArgs),

    /// Shows the remaining API quota.
    #[command(name = "rate-limit")]
    RateLimit,
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
