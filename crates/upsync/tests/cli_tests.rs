// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! CLI parsing tests
//!
//! These tests verify flag names, defaults and the interaction between
//! `--prompt-only` and the API key requirement.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use upsync::config::{Config, ConfigError};
use upsync::sync::SyncOptions;

// ============================================================================
// Branch and remote flags
// ============================================================================

#[test]
fn test_branch_defaults() {
    let config = Config::try_parse_from(["upsync"]).expect("parse should succeed");
    assert_eq!(config.downstream, "main");
    assert_eq!(config.upstream_remote, "upstream");
    assert_eq!(config.upstream_branch, "main");
    assert_eq!(config.upstream_ref(), "upstream/main");
}

#[test]
fn test_custom_branches() {
    let config = Config::try_parse_from([
        "upsync",
        "--downstream",
        "fork-main",
        "--upstream-remote",
        "origin",
        "--upstream-branch",
        "develop",
    ])
    .expect("parse should succeed");
    assert_eq!(config.downstream, "fork-main");
    assert_eq!(config.upstream_ref(), "origin/develop");
}

#[test]
fn test_upstream_url_flag() {
    let config = Config::try_parse_from([
        "upsync",
        "--upstream-url",
        "https://github.com/example/project.git",
    ])
    .expect("parse should succeed");
    assert_eq!(
        config.upstream_url.as_deref(),
        Some("https://github.com/example/project.git")
    );
}

#[test]
fn test_no_fetch_maps_to_offline_options() {
    let config = Config::try_parse_from(["upsync", "--no-fetch"]).expect("parse should succeed");
    assert!(config.no_fetch);
    assert!(!SyncOptions::from(&config).fetch);
}

#[test]
fn test_repo_short_flag() {
    let config =
        Config::try_parse_from(["upsync", "-C", "/tmp/fork"]).expect("parse should succeed");
    assert_eq!(config.repo, Some(PathBuf::from("/tmp/fork")));
}

// ============================================================================
// Output flags
// ============================================================================

#[test]
fn test_output_short_flag() {
    let config =
        Config::try_parse_from(["upsync", "-o", "/tmp/sync.md"]).expect("parse should succeed");
    assert_eq!(
        config.output_path(std::path::Path::new("/repo")),
        PathBuf::from("/tmp/sync.md")
    );
}

#[test]
fn test_max_tokens_parses_number() {
    let config = Config::try_parse_from(["upsync", "--max-tokens", "8000"])
        .expect("parse should succeed");
    assert_eq!(config.max_tokens, 8000);
}

#[test]
fn test_max_tokens_rejects_text() {
    let result = Config::try_parse_from(["upsync", "--max-tokens", "lots"]);
    assert!(result.is_err());
}

// ============================================================================
// API key and --prompt-only
// ============================================================================

#[test]
fn test_prompt_only_validates_without_key() {
    let mut config =
        Config::try_parse_from(["upsync", "--prompt-only"]).expect("parse should succeed");
    config.api_key = None;
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_key_fails_validation() {
    let mut config = Config::try_parse_from(["upsync"]).expect("parse should succeed");
    config.api_key = None;
    assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey)));
}

#[test]
fn test_api_key_flag() {
    let config = Config::try_parse_from(["upsync", "--api-key", "sk-test"])
        .expect("parse should succeed");
    assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    assert!(config.validate().is_ok());
}

// ============================================================================
// Logging flags
// ============================================================================

#[test]
fn test_verbose_short_flag_v() {
    let config = Config::try_parse_from(["upsync", "-v"]).expect("parse should succeed");
    assert!(config.verbose);
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_quiet_short_flag_q() {
    let config = Config::try_parse_from(["upsync", "-q"]).expect("parse should succeed");
    assert!(config.quiet);
    assert_eq!(config.log_level(), Level::WARN);
}

#[test]
fn test_verbose_wins_over_quiet() {
    let config = Config::try_parse_from(["upsync", "-v", "-q"]).expect("parse should succeed");
    assert_eq!(config.log_level(), Level::DEBUG);
}

#[test]
fn test_flag_value_syntax_not_supported() {
    // Boolean flags are toggled by presence only
    let result = Config::try_parse_from(["upsync", "--no-fetch=true"]);
    assert!(result.is_err());
}

#[test]
fn test_unknown_flag_rejected() {
    let result = Config::try_parse_from(["upsync", "--since", "v1.0"]);
    assert!(result.is_err());
}
