// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared test utilities.
//!
//! Provides log-capturing infrastructure for testing dry-run output and
//! redaction of log lines, plus scratch git repositories.

use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone)]
struct BufferWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| std::io::Error::other("buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
struct BufferMakeWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for BufferMakeWriter {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter {
            buffer: self.buffer.clone(),
        }
    }
}

fn buffer_subscriber(buffer: &Arc<Mutex<Vec<u8>>>) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(BufferMakeWriter {
            buffer: buffer.clone(),
        })
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(false)
        .finish()
}

fn drain(buffer: &Arc<Mutex<Vec<u8>>>) -> Result<String> {
    let guard = buffer
        .lock()
        .map_err(|_| anyhow::anyhow!("log buffer poisoned"))?;
    Ok(String::from_utf8_lossy(&guard).to_string())
}

/// Runs an async closure while capturing tracing output.
///
/// Returns the captured log output as a string. Must be awaited on a
/// current-thread runtime so every event lands on this thread's subscriber.
pub(crate) async fn run_with_logs<F, Fut>(f: F) -> Result<String>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let _guard = tracing::subscriber::set_default(buffer_subscriber(&buffer));
    f().await?;
    drain(&buffer)
}

/// Synchronous variant of [`run_with_logs`].
pub(crate) fn capture_logs<F>(f: F) -> Result<String>
where
    F: FnOnce() -> Result<()>,
{
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let _guard = tracing::subscriber::set_default(buffer_subscriber(&buffer));
    f()?;
    drain(&buffer)
}

/// Runs raw git in `dir`, panicking on failure.
pub(crate) fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Initializes a repository on branch `main` with one empty commit.
pub(crate) fn init_repo_with_commit(dir: &Path) {
    git(dir, &["init", "--quiet", "--initial-branch=main"]);
    git(dir, &["config", "user.email", "bot@example.com"]);
    git(dir, &["config", "user.name", "Bot"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
    git(dir, &["commit", "--allow-empty", "--quiet", "-m", "Initial commit"]);
}
