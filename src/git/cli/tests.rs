// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{DiffedFiles, GitCli, RepositoryOps};
use crate::error::GitError;
use crate::test_utils::{git, init_repo_with_commit};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Repository with identity configured but no commits.
fn init_empty_repo(path: &Path) {
    git(path, &["init", "--quiet", "--initial-branch=main"]);
    git(path, &["config", "user.email", "bot@example.com"]);
    git(path, &["config", "user.name", "Bot"]);
    git(path, &["config", "commit.gpgsign", "false"]);
}

fn current_branch(path: &Path) -> String {
    git(path, &["branch", "--show-current"])
}

// =============================================================================
// Outside a repository
// =============================================================================

#[test]
fn test_operations_outside_repository() {
    let temp = temp_dir();
    let dir = temp.path();
    std::fs::write(dir.join("test.txt"), "Hello, World!").expect("write");
    let cli = GitCli::default();

    assert!(cli.hard_reset(dir, "HEAD").is_err());
    assert!(
        cli.add_remote(dir, "origin", "https://github.com/torvalds/linux.git")
            .is_err()
    );
    assert!(cli.fetch_all(dir).is_err());
    assert!(!cli.branch_exists(dir, "main"));
    assert!(cli.checkout(dir, "main", false).is_err());
    assert!(cli.rev_parse_head(dir).is_err());
}

#[test]
fn test_existence_checks_never_fail() {
    let cli = GitCli::default();
    assert!(!cli.branch_exists(Path::new("/nonexistent/feedstock"), "main"));
    assert!(!cli.ref_exists(Path::new(""), "refs/heads/main"));
    assert!(!cli.remote_exists("/nonexistent/remote.git"));
}

// =============================================================================
// stage / commit
// =============================================================================

#[test]
fn test_stage_requires_paths_or_all() {
    let temp = temp_dir();
    let cli = GitCli::default();
    // Not a repository: the validation error comes before any command.
    let err = cli.stage(temp.path(), &[], false).expect_err("no paths");
    assert!(matches!(err.as_git(), Some(GitError::InvalidArgument(_))));
}

#[test]
fn test_stage_paths_and_all() {
    let temp = temp_dir();
    let dir = temp.path();
    init_empty_repo(dir);
    let cli = GitCli::default();

    std::fs::write(dir.join("a.txt"), "a").expect("write");
    std::fs::write(dir.join("b.txt"), "b").expect("write");
    std::fs::write(dir.join("all_tracker.txt"), "c").expect("write");

    cli.stage(dir, &[Path::new("a.txt"), Path::new("b.txt")], false)
        .expect("stage paths");
    let tracked = git(dir, &["ls-files", "-s"]);
    assert!(tracked.contains("a.txt"));
    assert!(tracked.contains("b.txt"));
    assert!(!tracked.contains("all_tracker.txt"));

    cli.stage(dir, &[], true).expect("stage all");
    assert!(git(dir, &["ls-files", "-s"]).contains("all_tracker.txt"));
}

#[test]
fn test_commit_nothing_to_commit() {
    let temp = temp_dir();
    let dir = temp.path();
    init_empty_repo(dir);
    let cli = GitCli::default();

    assert!(cli.commit(dir, "Empty", false, false).is_err());
    cli.commit(dir, "Add Test", false, true)
        .expect("allow_empty commit");
    assert!(git(dir, &["log"]).contains("Add Test"));
}

#[test]
fn test_commit_all_picks_up_tracked_changes() {
    let temp = temp_dir();
    let dir = temp.path();
    init_empty_repo(dir);
    let cli = GitCli::default();

    std::fs::write(dir.join("test.txt"), "one").expect("write");
    cli.stage(dir, &[Path::new("test.txt")], false).expect("stage");
    cli.commit(dir, "First commit", false, false).expect("commit");

    std::fs::write(dir.join("test.txt"), "two").expect("write");
    cli.commit(dir, "Second commit", true, false)
        .expect("commit -a");
    let log = git(dir, &["log"]);
    assert!(log.contains("First commit"));
    assert!(log.contains("Second commit"));
}

// =============================================================================
// hard_reset / rev_parse_head
// =============================================================================

#[test]
fn test_hard_reset_discards_changes_and_is_idempotent() {
    let temp = temp_dir();
    let dir = temp.path();
    init_empty_repo(dir);
    let cli = GitCli::default();

    std::fs::write(dir.join("test.txt"), "Hello").expect("write");
    cli.stage(dir, &[Path::new("test.txt")], false).expect("stage");
    cli.commit(dir, "First commit", false, false).expect("commit");

    std::fs::write(dir.join("test.txt"), "changed").expect("write");
    cli.hard_reset(dir, "HEAD").expect("reset");
    assert_eq!(
        std::fs::read_to_string(dir.join("test.txt")).expect("read"),
        "Hello"
    );
    cli.hard_reset(dir, "HEAD").expect("second reset");
}

#[test]
fn test_rev_parse_head() {
    let temp = temp_dir();
    let dir = temp.path();
    init_repo_with_commit(dir);
    let cli = GitCli::default();

    let head = cli.rev_parse_head(dir).expect("rev-parse");
    assert_eq!(head.len(), 40);
    assert!(head.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    assert_eq!(head, git(dir, &["rev-parse", "HEAD"]));
}

// =============================================================================
// clone / remotes
// =============================================================================

#[test]
fn test_clone_into_non_empty_target() {
    let temp = temp_dir();
    let target = temp.path().join("feedstock");
    std::fs::create_dir(&target).expect("mkdir");
    std::fs::write(target.join("README.md"), "x").expect("write");

    let cli = GitCli::default();
    let err = cli
        .clone_repo("/nonexistent/remote.git", &target)
        .expect_err("non-empty target");
    assert!(matches!(err.as_git(), Some(GitError::TargetNotEmpty { .. })));
}

#[test]
fn test_clone_missing_remote() {
    let temp = temp_dir();
    let cli = GitCli::default();
    let err = cli
        .clone_repo(
            &temp.path().join("missing.git").display().to_string(),
            &temp.path().join("feedstock"),
        )
        .expect_err("missing remote");
    assert!(matches!(err.as_git(), Some(GitError::CloneFailed { .. })));
    assert!(err.to_string().contains("does the remote exist?"));
}

#[test]
fn test_clone_into_empty_existing_target() {
    let temp = temp_dir();
    let origin = temp.path().join("origin");
    std::fs::create_dir(&origin).expect("mkdir");
    init_repo_with_commit(&origin);

    let target = temp.path().join("checkout");
    std::fs::create_dir(&target).expect("mkdir");

    let cli = GitCli::default();
    cli.clone_repo(&origin.display().to_string(), &target)
        .expect("clone into empty dir");
    assert!(cli.branch_exists(&target, "main"));
    assert!(cli.remote_exists(&origin.display().to_string()));
}

#[test]
fn test_add_remote_twice() {
    let temp = temp_dir();
    let dir = temp.path();
    init_repo_with_commit(dir);
    let cli = GitCli::default();

    cli.add_remote(dir, "upstream", "https://github.com/conda-forge/pytest-feedstock.git")
        .expect("first add");
    let err = cli
        .add_remote(dir, "upstream", "https://github.com/conda-forge/pytest-feedstock.git")
        .expect_err("second add");
    assert!(matches!(err.as_git(), Some(GitError::RemoteExists { name }) if name == "upstream"));
}

#[test]
fn test_push_and_fetch_with_local_remote() {
    let temp = temp_dir();
    let remote = temp.path().join("remote.git");
    std::fs::create_dir(&remote).expect("mkdir");
    git(&remote, &["init", "--quiet", "--bare", "--initial-branch=main"]);

    let work = temp.path().join("work");
    std::fs::create_dir(&work).expect("mkdir");
    init_repo_with_commit(&work);

    let cli = GitCli::default();
    let remote_url = remote.display().to_string();
    cli.add_remote(&work, "origin", &remote_url).expect("add remote");
    cli.push(&work, "origin", "main").expect("push");
    cli.fetch_all(&work).expect("fetch");

    assert!(cli.ref_exists(&work, "refs/remotes/origin/main"));
    assert_eq!(
        git(&remote, &["rev-parse", "main"]),
        cli.rev_parse_head(&work).expect("head")
    );
}

// =============================================================================
// checkout
// =============================================================================

#[test]
fn test_checkout_existing_branch() {
    let temp = temp_dir();
    let dir = temp.path();
    init_repo_with_commit(dir);
    git(dir, &["branch", "new-branch-name"]);

    let cli = GitCli::default();
    cli.checkout(dir, "new-branch-name", false).expect("checkout");
    assert_eq!(current_branch(dir), "new-branch-name");
}

#[test]
fn test_checkout_missing_branch() {
    let temp = temp_dir();
    let dir = temp.path();
    init_repo_with_commit(dir);

    let cli = GitCli::default();
    let err = cli
        .checkout(dir, "new_branch_name", false)
        .expect_err("missing branch");
    assert!(matches!(err.as_git(), Some(GitError::BranchNotFound { .. })));
    assert_eq!(
        err.as_git().map(ToString::to_string).as_deref(),
        Some("branch new_branch_name does not exist")
    );
}

#[test]
fn test_checkout_track_missing_then_checkout_new() {
    let temp = temp_dir();
    let dir = temp.path();
    init_repo_with_commit(dir);

    let cli = GitCli::default();
    let err = cli
        .checkout(dir, "upstream/feature", true)
        .expect_err("no tracking ref");
    assert!(matches!(
        err.as_git(),
        Some(GitError::TrackingRefMissing { .. })
    ));

    cli.checkout_new(dir, "feature", "main").expect("fallback");
    assert_eq!(current_branch(dir), "feature");
}

#[test]
fn test_checkout_new_existing_branch_fails() {
    let temp = temp_dir();
    let dir = temp.path();
    init_repo_with_commit(dir);

    let cli = GitCli::default();
    assert!(cli.checkout_new(dir, "main", "HEAD").is_err());
}

// =============================================================================
// diffed_files
// =============================================================================

#[test]
fn test_diffed_files_single_file() {
    let temp = temp_dir();
    let dir = temp.path();
    init_repo_with_commit(dir);
    let cli = GitCli::default();

    std::fs::write(dir.join("test.txt"), "").expect("write");
    cli.stage(dir, &[dir.join("test.txt").as_path()], false).expect("stage");
    cli.commit(dir, "Add test.txt", false, false).expect("commit");

    let files: Vec<PathBuf> = cli.diffed_files(dir, "HEAD~1").expect("diff").collect();
    assert_eq!(files, vec![PathBuf::from("test.txt")]);
}

#[test]
fn test_diffed_files_keeps_unusual_names_verbatim() {
    let temp = temp_dir();
    let dir = temp.path();
    init_repo_with_commit(dir);
    let cli = GitCli::default();

    std::fs::create_dir(dir.join("recipe")).expect("mkdir");
    for name in ["café.txt", "recipe/build script.sh"] {
        std::fs::write(dir.join(name), "").expect("write");
    }
    cli.stage(dir, &[], true).expect("stage");
    cli.commit(dir, "Add files", false, false).expect("commit");

    let mut files: Vec<PathBuf> = cli.diffed_files(dir, "HEAD~1").expect("diff").collect();
    files.sort();
    assert_eq!(
        files,
        vec![
            PathBuf::from("café.txt"),
            PathBuf::from("recipe/build script.sh"),
        ]
    );
}

#[test]
fn test_diffed_files_no_diff() {
    let temp = temp_dir();
    let dir = temp.path();
    init_repo_with_commit(dir);
    let cli = GitCli::default();

    assert_eq!(cli.diffed_files(dir, "HEAD").expect("diff").count(), 0);
}

#[test]
fn test_diffed_files_iterator_is_single_pass() {
    let mut files = DiffedFiles::new("recipe/meta.yaml\0\0README.md\0".to_string());
    assert_eq!(files.next(), Some(PathBuf::from("recipe/meta.yaml")));
    assert_eq!(files.next(), Some(PathBuf::from("README.md")));
    assert_eq!(files.next(), None);
    assert_eq!(files.next(), None);
}
