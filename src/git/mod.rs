// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!             platform backends
//!                    |
//!                    v
//!        ,------------------------,
//!        | protocol               |
//!        | clone-fork-and-branch  |
//!        '-----------+------------'
//!                    |
//!                    v
//!        ,------------------------,
//!        | cli: RepositoryOps     |
//!        | GitCli                 |
//!        '-----------+------------'
//!                    |
//!                    v
//!        ,------------------------,
//!        | runner: GitRunner      |
//!        | redact + CommandLock   |
//!        '-----------+------------'
//!                    |
//!                    v
//!               git (subprocess)
//! ```
//!
//! **`GitRunner`** spawns git and masks registered secrets.
//! **`GitCli`** maps each repository operation to one argv.
//! **`protocol`** sequences those operations with explicit fallbacks.

pub mod cli;
pub mod protocol;
pub mod runner;

pub use cli::{DiffedFiles, GitCli, RepositoryOps};
pub use protocol::{BranchState, Step, clone_fork_and_branch};
pub use runner::{CommandOutput, GitRunner, RunFlags};
