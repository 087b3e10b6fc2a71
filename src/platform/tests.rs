// feedstock-bot: Git/Platform Automation Backend
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{Backend, ConnectionMode, GitPlatformBackend, RateQuota, RequestsLeft, remote_url};
use crate::config::Config;
use crate::error::PlatformError;
use chrono::DateTime;

#[test]
fn test_remote_url() {
    assert_eq!(
        remote_url("conda-forge", "pytest-feedstock", ConnectionMode::Https, None),
        "https://github.com/conda-forge/pytest-feedstock.git"
    );
    assert_eq!(
        remote_url(
            "regro-cf-autotick-bot",
            "pytest-feedstock",
            ConnectionMode::TokenHttps,
            Some("TOKEN")
        ),
        "https://TOKEN@github.com/regro-cf-autotick-bot/pytest-feedstock.git"
    );
    // Without a token the mode cannot embed anything.
    assert_eq!(
        remote_url("o", "n", ConnectionMode::TokenHttps, None),
        "https://github.com/o/n.git"
    );
}

#[test]
fn test_requests_left_display() {
    let reset = DateTime::from_timestamp(1_716_303_697, 0);
    let lines = [
        RequestsLeft::Finite(RateQuota {
            remaining: 5,
            resets_at: None,
        }),
        RequestsLeft::Finite(RateQuota {
            remaining: 0,
            resets_at: reset,
        }),
        RequestsLeft::Infinite,
        RequestsLeft::Unknown,
    ]
    .map(|left| left.to_string());

    insta::assert_snapshot!(lines.join("\n"), @r"
    5
    0 (resets at 2024-05-21T15:01:37+00:00)
    infinite
    unknown
    ");
}

#[test]
fn test_requests_left_remaining() {
    assert_eq!(RequestsLeft::Infinite.remaining(), None);
    assert_eq!(RequestsLeft::Unknown.remaining(), None);
    assert_eq!(
        RequestsLeft::Finite(RateQuota {
            remaining: 42,
            resets_at: None
        })
        .remaining(),
        Some(42)
    );
}

#[tokio::test]
async fn test_backend_from_config_dry_run() {
    let mut config = Config::default();
    config.global.dry_run = true;

    let backend = Backend::from_config(&config).expect("dry-run backend");
    assert!(backend.is_dry_run());
    assert_eq!(backend.user().await.expect("user"), "auto-tick-bot-dry-run");
    assert_eq!(backend.api_requests_left().await, RequestsLeft::Infinite);
}

#[test]
fn test_backend_from_config_missing_token() {
    let mut config = Config::default();
    config.github.token_env = "BOT_TEST_TOKEN_THAT_IS_NEVER_SET".to_string();

    let err = Backend::from_config(&config).expect_err("no token");
    assert!(matches!(
        err.as_platform(),
        Some(PlatformError::MissingToken { env }) if env == "BOT_TEST_TOKEN_THAT_IS_NEVER_SET"
    ));
}

#[test]
fn test_backend_from_config_live() {
    let mut config = Config::default();
    config.github.token = Some("TOKEN".into());
    config.github.api_url = "http://127.0.0.1:9".to_string();

    let backend = Backend::from_config(&config).expect("live backend");
    assert!(!backend.is_dry_run());
    match &backend {
        Backend::Live(github) => assert_eq!(github.api_url(), "http://127.0.0.1:9"),
        Backend::DryRun(_) => panic!("expected live backend"),
    }
    assert!(!format!("{backend:?}").contains("TOKEN"));
}

#[test]
fn test_backend_registers_token_with_runner() {
    let mut config = Config::default();
    config.github.token = Some("SECRET_TOKEN".into());

    let backend = Backend::from_config(&config).expect("live backend");
    assert_eq!(
        backend.git().runner().redact("push https://SECRET_TOKEN@github.com/o/n.git"),
        "push https://************@github.com/o/n.git"
    );
}
