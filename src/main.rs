// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Backend --> Command Dispatch
//!   Prepare | Push | OpenPr | Comment | RateLimit | Options | Version
//! ```

use std::process::ExitCode;

use feedstock_bot::cli::global::GlobalOptions;
use feedstock_bot::cli::{self, Command};
use feedstock_bot::cmd::config::run_options_command;
use feedstock_bot::cmd::pr::{run_comment_command, run_open_pr_command, run_rate_limit_command};
use feedstock_bot::cmd::repo::{run_prepare_command, run_push_command};
use feedstock_bot::config::loader::{ConfigLoader, ENV_PREFIX};
use feedstock_bot::config::{Config, DEFAULT_CONFIG_FILE};
use feedstock_bot::logging::{LogConfig, init_logging};
use feedstock_bot::platform::Backend;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    if matches!(cli.command, Some(Command::Version)) {
        handle_version_command();
        return ExitCode::SUCCESS;
    }

    let loader = build_config_loader(&cli.global);
    let loaded_files = loader.format_loaded_files();
    let config = match loader
        .apply_overrides(&cli.global.to_config_overrides())
        .and_then(ConfigLoader::build)
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match init_logging(&build_log_config(&config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match dispatch_command(&cli, &config, &loaded_files).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn build_log_config(config: &Config) -> LogConfig {
    LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(config.global.log_file.clone())
        .with_json(config.global.json_logs)
        .build()
}

async fn dispatch_command(
    cli: &cli::Cli,
    config: &Config,
    loaded_files: &[String],
) -> anyhow::Result<()> {
    let Some(command) = &cli.command else {
        anyhow::bail!("No command specified. Use --help for usage information.");
    };

    match command {
        Command::Version => {
            handle_version_command();
            Ok(())
        }
        Command::Options => {
            run_options_command(config, loaded_files);
            Ok(())
        }
        Command::Prepare(args) => {
            let backend = Backend::from_config(config)?;
            run_prepare_command(args, &backend, config).await
        }
        Command::Push(args) => {
            let backend = Backend::from_config(config)?;
            run_push_command(args, &backend).await
        }
        Command::OpenPr(args) => {
            let backend = Backend::from_config(config)?;
            run_open_pr_command(args, &backend, config).await
        }
        Command::Comment(args) => {
            let backend = Backend::from_config(config)?;
            run_comment_command(args, &backend).await
        }
        Command::RateLimit => {
            let backend = Backend::from_config(config)?;
            run_rate_limit_command(&backend).await;
            Ok(())
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> ConfigLoader {
    let mut loader = ConfigLoader::new();
    if !global.no_default_config {
        loader = loader.add_toml_file_optional(DEFAULT_CONFIG_FILE);
    }
    for path in &global.config_files {
        loader = loader.add_toml_file(path);
    }
    loader.with_env_prefix(ENV_PREFIX)
}
