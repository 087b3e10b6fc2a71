// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers --> GitPlatformBackend (live or dry run)
//!   config: options
//!   repo:   prepare, push
//!   pr:     open-pr, comment, rate-limit
//! ```
//!
//! Handlers are generic over the backend; `main` passes a [`Backend`].
//!
//! [`Backend`]: crate::platform::Backend

pub mod config;
pub mod pr;
pub mod repo;
