// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |         prepare / push / open-pr
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |  TOML + env, layered      |
//!              '-------------+-------------'
//!                            v
//!              ,---------------------------,
//!              |         platform          |
//!              |  GitPlatformBackend       |
//!              |  GitHub (REST) | DryRun   |
//!              '-------------+-------------'
//!                            v
//!              ,---------------------------,
//!              |            git            |
//!              | protocol -> cli -> runner |
//!              '---------------------------'
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging            |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod platform;

#[cfg(test)]
pub(crate) mod test_utils;
