// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Options shared by every subcommand.
//!
//! ```text
//! feedstock-bot.toml  (skipped with --no-default-config)
//!        v
//! --config FILE ...   (in order, later wins)
//!        v
//! FEEDSTOCK_BOT_<SECTION>__<KEY>
//!        v
//! --set KEY=VALUE, then --dry-run / --log-level / --file-log-level / --log-file
//! ```

use clap::{ArgAction, Args};
use std::path::PathBuf;

/// Global options available for all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Extra TOML configuration file; repeatable.
    #[arg(
        short = 'c',
        long = "config",
        visible_alias = "ini",
        value_name = "FILE",
        action = ArgAction::Append,
        global = true
    )]
    pub config_files: Vec<PathBuf>,

    /// Skips feedstock-bot.toml in the working directory.
    #[arg(long = "no-default-config", global = true)]
    pub no_default_config: bool,

    /// Logs platform calls instead of sending them. Git still runs.
    #[arg(long = "dry-run", global = true)]
    pub dry_run: bool,

    /// Console verbosity: 0 silent, 3 info, 5 trace, 6 trace including HTTP internals.
    #[arg(
        short = 'l',
        long = "log-level",
        value_name = "LEVEL",
        value_parser = clap::value_parser!(u8).range(0..=6),
        global = true
    )]
    pub log_level: Option<u8>,

    /// Log file verbosity; follows --log-level when omitted.
    #[arg(
        long = "file-log-level",
        value_name = "LEVEL",
        value_parser = clap::value_parser!(u8).range(0..=6),
        global = true
    )]
    pub file_log_level: Option<u8>,

    /// Also writes logs to FILE (appending).
    #[arg(long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Overrides one option, e.g. `github/api_url=http://localhost:8080`; repeatable.
    #[arg(
        short = 's',
        long = "set",
        value_name = "KEY=VALUE",
        action = ArgAction::Append,
        global = true
    )]
    pub options: Vec<String>,
}

impl GlobalOptions {
    /// `section/key=value` overrides in application order.
    ///
    /// `--set` entries come first so the dedicated flags win over them.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<String> {
        let file_level = self.file_log_level.or(self.log_level);
        let flags = [
            self.log_level
                .map(|level| format!("global/output_log_level={level}")),
            file_level.map(|level| format!("global/file_log_level={level}")),
            self.log_file
                .as_ref()
                .map(|path| format!("global/log_file={}", path.display())),
            self.dry_run.then(|| "global/dry_run=true".to_string()),
        ];

        self.options
            .iter()
            .cloned()
            .chain(flags.into_iter().flatten())
            .collect()
    }
}
