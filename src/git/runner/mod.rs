// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git command runner with secret redaction.
//!
//! ```text
//! GitRunner::run(args, cwd, flags)
//!        |
//!   lock.acquire()            (NoopLock | FileLock)
//!        |
//!   std::process::Command [git, ...args]
//!     stdout: piped (always)
//!     stderr: piped if tokens registered or CAPTURE_STDERR,
//!             inherited otherwise
//!        |
//!   Redactor::redact(stdout / stderr / command line)
//!        |
//!   exit != 0 && !ALLOW_FAILURE --> GitError::CommandFailed
//!        |                          "Command '<redacted>' failed."
//!        v
//!   CommandOutput { exit_code, stdout, stderr }
//! ```

pub mod lock;
pub mod redact;

use bitflags::bitflags;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{debug, error, trace};

use crate::error::{BotResult, GitError};

use lock::{CommandLock, NoopLock};
use redact::Redactor;

/// Name used for the git executable in messages and for `PATH` lookup.
pub const GIT: &str = "git";

bitflags! {
    /// Flags controlling a single runner invocation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RunFlags: u32 {
        /// Don't fail if git exits with a non-zero status
        const ALLOW_FAILURE = 0x01;
        /// Capture stderr even when no secret is registered
        const CAPTURE_STDERR = 0x02;
    }
}

/// Output from a completed git invocation. All text is already redacted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    exit_code: i32,
    stdout: String,
    stderr: Option<String>,
}

impl CommandOutput {
    /// Returns the exit code (-1 if git was terminated by a signal).
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns captured stdout.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Returns captured stderr, `None` when it went to the parent's stderr.
    #[must_use]
    pub fn stderr(&self) -> Option<&str> {
        self.stderr.as_deref()
    }
}

/// Runs git as a subprocess and keeps registered secrets out of everything
/// it returns or logs.
///
/// Token sets belong to one runner; cloning a runner copies the set.
#[derive(Debug, Clone)]
pub struct GitRunner {
    program: PathBuf,
    redactor: Redactor,
    lock: Arc<dyn CommandLock>,
}

impl Default for GitRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl GitRunner {
    /// Creates a runner for the `git` found in `PATH`, with a [`NoopLock`].
    #[must_use]
    pub fn new() -> Self {
        let program = which::which(GIT).unwrap_or_else(|e| {
            debug!(error = %e, "git not resolved via PATH lookup, deferring to spawn");
            PathBuf::from(GIT)
        });
        Self::with_program(program)
    }

    /// Creates a runner for a specific git executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            redactor: Redactor::new(),
            lock: Arc::new(NoopLock),
        }
    }

    /// Replaces the synchronization handle.
    #[must_use]
    pub fn with_lock(mut self, lock: Arc<dyn CommandLock>) -> Self {
        self.lock = lock;
        self
    }

    /// Registers a secret that must never appear in output, logs or errors.
    pub fn add_hidden_token(&mut self, token: impl Into<String>) {
        self.redactor.add(token);
    }

    #[must_use]
    pub const fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    /// Masks registered secrets in arbitrary text.
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        self.redactor.redact(text)
    }

    fn command_line<S: AsRef<OsStr>>(&self, args: &[S]) -> String {
        let args: Vec<String> = args
            .iter()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .collect();
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.redactor.redact_args(GIT, &refs)
    }

    /// Runs `git <args>` in `cwd` (or the current directory).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The command lock cannot be acquired.
    /// - git cannot be spawned.
    /// - git exits with a non-zero status and `ALLOW_FAILURE` is not set.
    pub fn run<S: AsRef<OsStr>>(
        &self,
        args: &[S],
        cwd: Option<&Path>,
        flags: RunFlags,
    ) -> BotResult<CommandOutput> {
        let cmd_line = self.command_line(args);
        let capture_stderr = self.redactor.is_active() || flags.contains(RunFlags::CAPTURE_STDERR);

        if let Some(cwd) = cwd {
            trace!(cwd = %self.redact(&cwd.display().to_string()), "cd");
        }
        debug!(cmd = %cmd_line, "exec");

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(if capture_stderr {
                Stdio::piped()
            } else {
                Stdio::inherit()
            });
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }

        let output = {
            let _guard = self.lock.acquire()?;
            command.output().map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound && cwd.is_none_or(Path::exists) {
                    GitError::ExecutableNotFound {
                        name: self.program.display().to_string(),
                    }
                } else {
                    GitError::Spawn {
                        command: cmd_line.clone(),
                        source,
                    }
                }
            })?
        };

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = self.redact(&String::from_utf8_lossy(&output.stdout));
        let stderr =
            capture_stderr.then(|| self.redact(&String::from_utf8_lossy(&output.stderr)));

        if exit_code != 0 && !flags.contains(RunFlags::ALLOW_FAILURE) {
            // Format first, then redact the whole message: a secret may
            // coincide with a word of the template itself.
            let message = self.redact(&format!("Command '{cmd_line}' failed."));
            error!(exit_code, "{message}");
            if let Some(stderr) = stderr.as_deref().filter(|s| !s.trim().is_empty()) {
                error!(stderr = %stderr.trim_end(), "git error output");
            }
            return Err(GitError::CommandFailed {
                message,
                exit_code: Some(exit_code),
            }
            .into());
        }

        if let Some(stderr) = stderr.as_deref().filter(|s| !s.trim().is_empty()) {
            debug!(stderr = %stderr.trim_end(), "git stderr");
        }
        trace!(exit_code, "completed");

        Ok(CommandOutput {
            exit_code,
            stdout,
            stderr,
        })
    }

    /// Runs with errors checked and default capture.
    ///
    /// # Errors
    ///
    /// See [`GitRunner::run`].
    pub fn run_checked<S: AsRef<OsStr>>(
        &self,
        args: &[S],
        cwd: Option<&Path>,
    ) -> BotResult<CommandOutput> {
        self.run(args, cwd, RunFlags::empty())
    }
}
