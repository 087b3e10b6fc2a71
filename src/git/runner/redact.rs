// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Secret masking for runner output.
//!
//! ```text
//! "push https://TOKEN@github.com/o/r.git"
//!          |
//!   mark every match of every token (union of byte ranges)
//!          |
//!   one MASK_CHAR per masked char
//!          v
//! "push https://*****@github.com/o/r.git"
//! ```
//!
//! Ranges are computed on the input before anything is replaced, so two
//! tokens whose matches overlap are both masked completely.

use std::fmt;

/// Character used for masking.
pub const MASK_CHAR: char = '*';

/// Set of secrets to be masked out of any text that leaves the runner.
#[derive(Clone, Default)]
pub struct Redactor {
    tokens: Vec<String>,
}

// Never print the tokens themselves.
impl fmt::Debug for Redactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Redactor")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl Redactor {
    #[must_use]
    pub const fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Registers a secret. Empty strings and duplicates are ignored.
    pub fn add(&mut self, token: impl Into<String>) {
        let token = token.into();
        if token.is_empty() || self.tokens.contains(&token) {
            return;
        }
        self.tokens.push(token);
    }

    /// True when at least one secret is registered.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Number of registered secrets.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when no secret is registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Masks every occurrence of every registered secret in `text`.
    ///
    /// Idempotent: redacting already-redacted text returns it unchanged.
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        if self.tokens.is_empty() || text.is_empty() {
            return text.to_string();
        }

        let mut masked = vec![false; text.len()];
        let mut any = false;
        for token in &self.tokens {
            // Restart one byte after each match start so overlapping
            // occurrences of the same token are found too.
            let mut from = 0;
            while let Some(pos) = text[from..].find(token.as_str()) {
                let start = from + pos;
                masked[start..start + token.len()].fill(true);
                any = true;
                from = start + text[start..].chars().next().map_or(1, char::len_utf8);
            }
        }

        if !any {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        for (idx, ch) in text.char_indices() {
            if masked[idx] {
                out.push(MASK_CHAR);
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Redacts a command line given as separate arguments.
    #[must_use]
    pub fn redact_args(&self, program: &str, args: &[&str]) -> String {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.redact(&line)
    }
}
