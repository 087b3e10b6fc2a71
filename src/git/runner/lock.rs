// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Synchronization handles injected into the command runner.
//!
//! ```text
//! GitRunner::with_lock(Arc<dyn CommandLock>)
//!        |
//!        +-- NoopLock   single process, thread pools (default)
//!        +-- FileLock   worker processes sharing one lock file
//! ```

use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{BotResult, GitError};

/// Held for the duration of one git invocation; releases on drop.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard {
    _file: Option<File>,
}

impl LockGuard {
    const fn unlocked() -> Self {
        Self { _file: None }
    }
}

/// Serializes runner invocations.
pub trait CommandLock: Send + Sync + fmt::Debug {
    /// Blocks until the lock is held.
    ///
    /// # Errors
    ///
    /// Returns a `GitError::Lock` if the underlying lock cannot be acquired.
    fn acquire(&self) -> BotResult<LockGuard>;
}

/// Lock that never blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLock;

impl CommandLock for NoopLock {
    fn acquire(&self) -> BotResult<LockGuard> {
        Ok(LockGuard::unlocked())
    }
}

/// Advisory lock on a file, shared by every process that opens the same path.
///
/// Each `acquire` opens its own handle, so threads of one process exclude
/// each other as well.
#[derive(Debug, Clone)]
pub struct FileLock {
    path: PathBuf,
}

impl FileLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_error(&self, source: std::io::Error) -> GitError {
        GitError::Lock {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl CommandLock for FileLock {
    fn acquire(&self) -> BotResult<LockGuard> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.lock_error(e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.path)
            .map_err(|e| self.lock_error(e))?;
        file.lock().map_err(|e| self.lock_error(e))?;

        Ok(LockGuard { _file: Some(file) })
    }
}
