// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `open-pr` and `comment`.

use anyhow::Context;

use crate::cli::pr::{CommentArgs, OpenPrArgs};
use crate::config::Config;
use crate::error::Result;
use crate::platform::GitPlatformBackend;

/// Description given with `--body`, or read from `--body-file`.
pub(crate) fn read_body(args: &OpenPrArgs) -> Result<String> {
    match &args.body_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read pull request body {}", path.display())),
        None => Ok(args.body.clone()),
    }
}

/// Opens a pull request and prints the persisted record as JSON.
///
/// # Errors
///
/// Returns an error if the body file cannot be read or the platform rejects
/// the pull request.
pub async fn run_open_pr_command<B: GitPlatformBackend>(
    args: &OpenPrArgs,
    backend: &B,
    config: &Config,
) -> Result<()> {
    let body = read_body(args)?;
    let base = args
        .base
        .as_deref()
        .unwrap_or(&config.backend.default_base_branch);

    let record = backend
        .create_pull_request(
            &args.repo.owner,
            &args.repo.name,
            base,
            &args.head,
            &args.title,
            &body,
        )
        .await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Comments on a pull request.
///
/// # Errors
///
/// Returns an error if the repository or pull request does not exist or the
/// comment is rejected.
pub async fn run_comment_command<B: GitPlatformBackend>(
    args: &CommentArgs,
    backend: &B,
) -> Result<()> {
    backend
        .comment_on_pull_request(&args.repo.owner, &args.repo.name, args.number, &args.body)
        .await?;
    Ok(())
}

/// Prints the remaining API quota.
pub async fn run_rate_limit_command<B: GitPlatformBackend>(backend: &B) {
    println!("{}", backend.api_requests_left().await);
}
