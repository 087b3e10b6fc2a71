// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{BranchState, CloneForkAndBranch, Step, clone_fork_and_branch};
use crate::error::{BotResult, GitError};
use crate::git::cli::{DiffedFiles, RepositoryOps};
use crate::test_utils::capture_logs;
use std::cell::RefCell;
use std::path::Path;

const FORK_URL: &str = "https://github.com/regro-cf-autotick-bot/pytest-feedstock.git";
const UPSTREAM_URL: &str = "https://github.com/conda-forge/pytest-feedstock.git";

/// Scripted repository operations recording every call.
#[derive(Default)]
struct FakeOps {
    target_exists: bool,
    remote_exists: bool,
    base_local: bool,
    base_tracking: bool,
    track_fails: bool,
    new_branch_exists: bool,
    calls: RefCell<Vec<String>>,
}

impl FakeOps {
    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn called(&self, call: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == call)
    }
}

impl RepositoryOps for FakeOps {
    fn stage(&self, _dir: &Path, _paths: &[&Path], _all: bool) -> BotResult<()> {
        unreachable!("not used by the protocol")
    }

    fn commit(&self, _dir: &Path, _message: &str, _all: bool, _allow_empty: bool) -> BotResult<()> {
        unreachable!("not used by the protocol")
    }

    fn hard_reset(&self, _dir: &Path, target: &str) -> BotResult<()> {
        self.record(format!("reset {target}"));
        Ok(())
    }

    fn clone_repo(&self, url: &str, target: &Path) -> BotResult<()> {
        self.record(format!("clone {url}"));
        if self.target_exists {
            return Err(GitError::TargetNotEmpty {
                path: target.display().to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn add_remote(&self, _dir: &Path, name: &str, url: &str) -> BotResult<()> {
        self.record(format!("remote add {name} {url}"));
        if self.remote_exists {
            return Err(GitError::RemoteExists {
                name: name.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn push(&self, _dir: &Path, _remote: &str, _branch: &str) -> BotResult<()> {
        unreachable!("not used by the protocol")
    }

    fn fetch_all(&self, _dir: &Path) -> BotResult<()> {
        self.record("fetch".to_string());
        Ok(())
    }

    fn ref_exists(&self, _dir: &Path, reference: &str) -> bool {
        match reference {
            "refs/heads/base_branch" => self.base_local,
            "refs/remotes/upstream/base_branch" => self.base_tracking,
            _ => false,
        }
    }

    fn remote_exists(&self, _url: &str) -> bool {
        true
    }

    fn checkout(&self, _dir: &Path, branch: &str, track: bool) -> BotResult<()> {
        self.record(format!("checkout {}{branch}", if track { "--track " } else { "" }));
        if track && self.track_fails {
            return Err(GitError::TrackingRefMissing {
                reference: format!("refs/remotes/{branch}"),
            }
            .into());
        }
        if branch == "new_branch_name" && !self.new_branch_exists {
            return Err(GitError::BranchNotFound {
                branch: branch.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn checkout_new(&self, _dir: &Path, branch: &str, start_point: &str) -> BotResult<()> {
        self.record(format!("checkout -b {branch} {start_point}"));
        Ok(())
    }

    fn diffed_files(&self, _dir: &Path, _since: &str) -> BotResult<DiffedFiles> {
        unreachable!("not used by the protocol")
    }

    fn rev_parse_head(&self, _dir: &Path) -> BotResult<String> {
        unreachable!("not used by the protocol")
    }
}

fn protocol(target: &Path) -> CloneForkAndBranch<'_> {
    CloneForkAndBranch {
        origin_url: FORK_URL,
        target_dir: target,
        upstream_url: UPSTREAM_URL,
        new_branch: "new_branch_name",
        base_branch: "base_branch",
    }
}

#[test]
fn test_fresh_clone_path() {
    let ops = FakeOps {
        base_local: true,
        new_branch_exists: true,
        ..FakeOps::default()
    };
    let target = Path::new("pytest-feedstock");
    let steps = protocol(target).run(&ops).expect("protocol");

    assert_eq!(
        steps,
        vec![
            Step::Clone,
            Step::AddUpstream,
            Step::Fetch,
            Step::ResolveBase,
            Step::CheckoutBase,
            Step::ResetToUpstream,
            Step::CheckoutNewBranch,
        ]
    );
    assert_eq!(
        ops.calls(),
        vec![
            format!("clone {FORK_URL}"),
            format!("remote add upstream {UPSTREAM_URL}"),
            "fetch".to_string(),
            "checkout base_branch".to_string(),
            "reset upstream/base_branch".to_string(),
            "checkout new_branch_name".to_string(),
        ]
    );
}

#[test]
fn test_existing_target_resets_hard() {
    let ops = FakeOps {
        target_exists: true,
        base_local: true,
        new_branch_exists: true,
        ..FakeOps::default()
    };
    let logs = capture_logs(|| {
        protocol(Path::new("pytest-feedstock")).run(&ops)?;
        Ok(())
    })
    .expect("protocol");

    assert!(logs.contains("trying to reset hard"));
    assert!(ops.called("reset HEAD"));
    assert!(ops.called("reset upstream/base_branch"));
}

#[test]
fn test_existing_remote_is_not_fatal() {
    let ops = FakeOps {
        remote_exists: true,
        base_local: true,
        new_branch_exists: true,
        ..FakeOps::default()
    };
    let logs = capture_logs(|| {
        protocol(Path::new("pytest-feedstock")).run(&ops)?;
        Ok(())
    })
    .expect("protocol");

    assert!(logs.contains("remote 'upstream' already exists"));
    assert!(ops.called("fetch"));
}

#[test]
fn test_base_branch_tracked_from_upstream() {
    let ops = FakeOps {
        base_tracking: true,
        new_branch_exists: true,
        ..FakeOps::default()
    };
    let steps = protocol(Path::new("pytest-feedstock"))
        .run(&ops)
        .expect("protocol");

    assert!(steps.contains(&Step::TrackBase));
    assert!(!steps.contains(&Step::CreateBase));
    assert!(ops.called("checkout --track upstream/base_branch"));
}

#[test]
fn test_track_failure_falls_back_to_checkout_new() {
    let ops = FakeOps {
        track_fails: true,
        new_branch_exists: true,
        ..FakeOps::default()
    };
    let logs = capture_logs(|| {
        protocol(Path::new("pytest-feedstock")).run(&ops)?;
        Ok(())
    })
    .expect("protocol");

    assert!(logs.contains("Could not check out with git checkout --track"));
    assert!(ops.called("checkout -b base_branch upstream/base_branch"));
    assert!(ops.called("reset upstream/base_branch"));
}

#[test]
fn test_missing_new_branch_is_created_from_base() {
    let ops = FakeOps {
        base_local: true,
        ..FakeOps::default()
    };
    let logs = capture_logs(|| {
        protocol(Path::new("pytest-feedstock")).run(&ops)?;
        Ok(())
    })
    .expect("protocol");

    assert!(logs.contains("branch new_branch_name does not exist"));
    assert_eq!(
        ops.calls().last().map(String::as_str),
        Some("checkout -b new_branch_name base_branch")
    );
}

#[test]
fn test_all_fallback_combinations_end_on_new_branch() {
    for target_exists in [true, false] {
        for remote_exists in [true, false] {
            for (base_local, track_fails) in [(true, false), (false, false), (false, true)] {
                for new_branch_exists in [true, false] {
                    let ops = FakeOps {
                        target_exists,
                        remote_exists,
                        base_local,
                        base_tracking: !track_fails,
                        track_fails,
                        new_branch_exists,
                        ..FakeOps::default()
                    };
                    let steps = protocol(Path::new("pytest-feedstock"))
                        .run(&ops)
                        .expect("protocol");

                    assert_eq!(steps.first(), Some(&Step::Clone));
                    assert!(ops.called("fetch"));
                    assert!(ops.called("reset upstream/base_branch"));
                    assert!(ops.called("checkout new_branch_name"));
                    assert_eq!(target_exists, ops.called("reset HEAD"));
                }
            }
        }
    }
}

#[test]
fn test_clone_failure_propagates() {
    struct FailingClone;
    impl RepositoryOps for FailingClone {
        fn stage(&self, _: &Path, _: &[&Path], _: bool) -> BotResult<()> {
            Ok(())
        }
        fn commit(&self, _: &Path, _: &str, _: bool, _: bool) -> BotResult<()> {
            Ok(())
        }
        fn hard_reset(&self, _: &Path, _: &str) -> BotResult<()> {
            panic!("must not reset after a failed clone")
        }
        fn clone_repo(&self, url: &str, _: &Path) -> BotResult<()> {
            Err(GitError::CloneFailed {
                url: url.to_string(),
            }
            .into())
        }
        fn add_remote(&self, _: &Path, _: &str, _: &str) -> BotResult<()> {
            panic!("must stop after a failed clone")
        }
        fn push(&self, _: &Path, _: &str, _: &str) -> BotResult<()> {
            Ok(())
        }
        fn fetch_all(&self, _: &Path) -> BotResult<()> {
            Ok(())
        }
        fn ref_exists(&self, _: &Path, _: &str) -> bool {
            false
        }
        fn remote_exists(&self, _: &str) -> bool {
            false
        }
        fn checkout(&self, _: &Path, _: &str, _: bool) -> BotResult<()> {
            Ok(())
        }
        fn checkout_new(&self, _: &Path, _: &str, _: &str) -> BotResult<()> {
            Ok(())
        }
        fn diffed_files(&self, _: &Path, _: &str) -> BotResult<DiffedFiles> {
            Ok(DiffedFiles::new(String::new()))
        }
        fn rev_parse_head(&self, _: &Path) -> BotResult<String> {
            Ok(String::new())
        }
    }

    let err = clone_fork_and_branch(
        &FailingClone,
        "https://github.com/conda-forge/this-repo-does-not-exist.git",
        Path::new("duckdb-feedstock"),
        UPSTREAM_URL,
        "NEW_BRANCH",
        "main",
    )
    .expect_err("clone failure");
    assert!(err.to_string().contains("does the remote exist?"));
}

#[test]
fn test_base_branch_state() {
    let target = Path::new("pytest-feedstock");
    let local = FakeOps {
        base_local: true,
        ..FakeOps::default()
    };
    let tracking = FakeOps {
        base_tracking: true,
        ..FakeOps::default()
    };
    let absent = FakeOps::default();

    assert_eq!(protocol(target).base_branch_state(&local), BranchState::Local);
    assert_eq!(
        protocol(target).base_branch_state(&tracking),
        BranchState::RemoteTracking
    );
    assert_eq!(protocol(target).base_branch_state(&absent), BranchState::Absent);
}
