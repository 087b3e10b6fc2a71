// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!            BotError (~24 bytes)
//!                   |
//!   +-------+-------+-------+-------+
//!   |       |       |       |       |
//!   v       v       v       v       v
//!  Git  Platform  Config   Io    Other
//!  Box    Box      Box    Box   Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Git      CommandFailed, InvalidArgument, TargetNotEmpty,
//!            CloneFailed, RemoteExists, BranchNotFound,
//!            TrackingRefMissing, UnexpectedOutput,
//!            ExecutableNotFound, Spawn, Lock
//!   Platform RepositoryNotFound, PullRequestNotFound,
//!            Failed, UnexpectedResponse, Request, MissingToken
//!   Config   ParseError, InvalidValue
//! ```
//!
//! Messages carried by git errors are redacted by the runner that produced
//! them; nothing here ever sees a raw secret.

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`BotError`].
pub type BotResult<T> = std::result::Result<T, BotError>;

/// Top-level error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum BotError {
    /// Git invocation failed or was attempted in an invalid context.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Hosting platform call failed.
    #[error("platform error: {0}")]
    Platform(#[from] Box<PlatformError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

impl BotError {
    /// Returns the git error, if this is one.
    #[must_use]
    pub fn as_git(&self) -> Option<&GitError> {
        match self {
            Self::Git(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the platform error, if this is one.
    #[must_use]
    pub fn as_platform(&self) -> Option<&PlatformError> {
        match self {
            Self::Platform(err) => Some(err),
            _ => None,
        }
    }
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for BotError {
                fn from(err: $error) -> Self {
                    BotError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GitError => Git,
    PlatformError => Platform,
    ConfigError => Config,
    std::io::Error => Io,
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git exited with a non-zero status. `message` is already redacted.
    #[error("{message}")]
    CommandFailed { message: String, exit_code: Option<i32> },

    /// Arguments were rejected before any command ran.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Clone target exists and is not empty.
    #[error("target directory {path} is not an empty directory")]
    TargetNotEmpty { path: String },

    /// Clone failed for a reason other than a non-empty target.
    #[error("Error cloning repository from {url}: does the remote exist?")]
    CloneFailed { url: String },

    /// A remote with this name is already configured.
    #[error("remote '{name}' already exists")]
    RemoteExists { name: String },

    /// Local branch not found.
    #[error("branch {branch} does not exist")]
    BranchNotFound { branch: String },

    /// `checkout --track` target has no remote-tracking ref.
    #[error("remote tracking ref {reference} does not exist")]
    TrackingRefMissing { reference: String },

    /// Git produced output we could not interpret.
    #[error("unexpected output from '{command}': {output}")]
    UnexpectedOutput { command: String, output: String },

    /// The git executable is not available.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn git.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to acquire the command lock.
    #[error("failed to acquire command lock {path}: {source}")]
    Lock {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Platform Errors ---

/// Hosting platform errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Repository does not exist (or is not visible to the bot).
    #[error("Repository {owner}/{repo} not found")]
    RepositoryNotFound { owner: String, repo: String },

    /// Pull request does not exist in an existing repository.
    #[error("Pull request {owner}/{repo}#{number} not found")]
    PullRequestNotFound {
        owner: String,
        repo: String,
        number: u64,
    },

    /// Non-success response on a platform call. `action` reads as a
    /// sentence ("Could not create pull request").
    #[error("{action}: {target} (HTTP status {status})")]
    Failed {
        action: String,
        target: String,
        status: u16,
    },

    /// Response did not match the expected schema.
    #[error("{action}: unexpected response: {message}")]
    UnexpectedResponse { action: String, message: String },

    /// Transport error from reqwest.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// No token was configured for the live backend.
    #[error("no GitHub token configured (set github.token or ${env})")]
    MissingToken { env: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Merged sources do not deserialize into `Config`.
    #[error("failed to parse config '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}
