// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `prepare` and `push`.

use tracing::info;

use crate::cli::repo::{PrepareArgs, PushArgs};
use crate::config::Config;
use crate::error::Result;
use crate::git::RepositoryOps;
use crate::platform::GitPlatformBackend;

/// Forks the repository unless told not to, then runs clone-fork-and-branch.
///
/// Prints the checkout directory, branch and `HEAD` commit.
///
/// # Errors
///
/// Returns an error if forking, cloning or any checkout step fails.
pub async fn run_prepare_command<B: GitPlatformBackend>(
    args: &PrepareArgs,
    backend: &B,
    config: &Config,
) -> Result<()> {
    let base = args
        .base
        .as_deref()
        .unwrap_or(&config.backend.default_base_branch);
    let (owner, name) = (args.repo.owner.as_str(), args.repo.name.as_str());

    if args.no_fork {
        info!("skipping fork of {}", args.repo);
    } else {
        backend.fork(owner, name).await?;
    }
    backend
        .clone_fork_and_branch(owner, name, &args.dir, &args.branch, base)
        .await?;

    let head = backend.git().rev_parse_head(&args.dir)?;
    info!(dir = %args.dir.display(), branch = %args.branch, %head, "checkout ready");
    println!("{}\t{}\t{head}", args.dir.display(), args.branch);
    Ok(())
}

/// Account the branch is pushed to.
pub(crate) async fn push_owner<B: GitPlatformBackend>(
    args: &PushArgs,
    backend: &B,
) -> Result<String> {
    if args.fork {
        Ok(backend.user().await?.to_string())
    } else {
        Ok(args.repo.owner.clone())
    }
}

/// Pushes a branch to the target repository or the bot's fork.
///
/// # Errors
///
/// Returns an error if the user cannot be resolved or the push fails.
pub async fn run_push_command<B: GitPlatformBackend>(args: &PushArgs, backend: &B) -> Result<()> {
    let owner = push_owner(args, backend).await?;
    backend
        .push_to_repository(&owner, &args.repo.name, &args.dir, &args.branch)
        .await?;
    println!("{owner}/{}\t{}", args.repo.name, args.branch);
    Ok(())
}
