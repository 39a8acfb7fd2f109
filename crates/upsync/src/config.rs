// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the upsync command
//!
//! Every option can be given on the command line or through an environment
//! variable, which makes the tool easy to drive from CI.

use std::path::{Path, PathBuf};

use clap::Parser;
use upsync_report::AnthropicClient;
use upsync_report::client::{DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

/// File written at the repository root unless `--output` is given
pub const REPORT_FILE_NAME: &str = "UPSTREAM_SYNC_REPORT.md";

/// Upsync - report which upstream commits a fork still needs to backport
#[derive(Parser, Debug, Clone)]
#[command(name = "upsync")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Path inside the repository to analyze
    ///
    /// The repository is discovered by walking up from this path.
    /// Defaults to the current working directory.
    #[arg(short = 'C', long, env = "UPSYNC_REPO")]
    pub repo: Option<PathBuf>,

    /// Branch holding the fork's own history
    #[arg(long, env = "UPSYNC_DOWNSTREAM", default_value = "main")]
    pub downstream: String,

    /// Name of the remote tracking the original project
    #[arg(long, env = "UPSYNC_UPSTREAM_REMOTE", default_value = "upstream")]
    pub upstream_remote: String,

    /// Branch of the upstream remote to compare against
    #[arg(long, env = "UPSYNC_UPSTREAM_BRANCH", default_value = "main")]
    pub upstream_branch: String,

    /// URL used to register the upstream remote when it is missing
    #[arg(long, env = "UPSYNC_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// Where to write the report
    ///
    /// Defaults to UPSTREAM_SYNC_REPORT.md at the repository root.
    /// An existing file is overwritten.
    #[arg(short, long, env = "UPSYNC_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Model used to write the report
    #[arg(long, env = "UPSYNC_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Output token budget for the report
    #[arg(long, env = "UPSYNC_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// API key for the report generator
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the report generator API
    #[arg(long, env = "ANTHROPIC_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub api_base_url: String,

    /// Do not fetch the upstream branch before comparing
    #[arg(long, default_value = "false")]
    pub no_fetch: bool,

    /// Write the generated prompt instead of calling the report generator
    #[arg(long, default_value = "false")]
    pub prompt_only: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress progress output and info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo: None,
            downstream: "main".to_string(),
            upstream_remote: "upstream".to_string(),
            upstream_branch: "main".to_string(),
            upstream_url: None,
            output: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_key: None,
            api_base_url: DEFAULT_BASE_URL.to_string(),
            no_fetch: false,
            prompt_only: false,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Path the repository is discovered from
    #[must_use]
    pub fn repo_path(&self) -> PathBuf {
        self.repo
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Remote-tracking ref of the upstream branch, e.g. `upstream/main`
    #[must_use]
    pub fn upstream_ref(&self) -> String {
        format!("{}/{}", self.upstream_remote, self.upstream_branch)
    }

    /// Report destination, defaulting to a file at the repository root
    #[must_use]
    pub fn output_path(&self, repo_root: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| repo_root.join(REPORT_FILE_NAME))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The repository path is specified but doesn't exist or isn't a directory
    /// - A branch or remote name is empty
    /// - The token budget is zero
    /// - No API key is available and `--prompt-only` is not set
    /// - The output file's parent directory doesn't exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref repo) = self.repo {
            if !repo.exists() {
                return Err(ConfigError::RepoNotFound(repo.clone()));
            }
            if !repo.is_dir() {
                return Err(ConfigError::RepoNotDirectory(repo.clone()));
            }
        }

        for (option, value) in [
            ("--downstream", &self.downstream),
            ("--upstream-remote", &self.upstream_remote),
            ("--upstream-branch", &self.upstream_branch),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyName(option));
            }
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ZeroMaxTokens);
        }

        if !self.prompt_only && self.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingApiKey);
        }

        if let Some(parent) = self.output.as_deref().and_then(Path::parent)
            && !parent.as_os_str().is_empty()
            && !parent.is_dir()
        {
            return Err(ConfigError::OutputDirectoryNotFound(parent.to_path_buf()));
        }

        Ok(())
    }

    /// Build the report generator client
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingApiKey` if no key is configured.
    pub fn report_client(&self) -> Result<AnthropicClient, ConfigError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        Ok(AnthropicClient::new(api_key)
            .with_base_url(&self.api_base_url)
            .with_model(&self.model)
            .with_max_tokens(self.max_tokens))
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Repository path not found
    #[error("Repository path not found: {0}")]
    RepoNotFound(PathBuf),

    /// Repository path is not a directory
    #[error("Repository path is not a directory: {0}")]
    RepoNotDirectory(PathBuf),

    /// A branch or remote option is empty
    #[error("{0} must not be empty")]
    EmptyName(&'static str),

    /// Token budget of zero
    #[error("--max-tokens must be greater than zero")]
    ZeroMaxTokens,

    /// No API key for the report generator
    #[error("No API key: set ANTHROPIC_API_KEY, pass --api-key, or use --prompt-only")]
    MissingApiKey,

    /// Output directory does not exist
    #[error("Output directory not found: {0}")]
    OutputDirectoryNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed() -> Config {
        Config {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.repo.is_none());
        assert_eq!(config.downstream, "main");
        assert_eq!(config.upstream_ref(), "upstream/main");
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(!config.no_fetch);
        assert!(!config.prompt_only);
    }

    #[test]
    fn test_output_path_default() {
        let config = Config::default();
        assert_eq!(
            config.output_path(Path::new("/work/fork")),
            PathBuf::from("/work/fork/UPSTREAM_SYNC_REPORT.md")
        );
    }

    #[test]
    fn test_output_path_custom() {
        let config = Config {
            output: Some(PathBuf::from("/tmp/report.md")),
            ..Default::default()
        };
        assert_eq!(
            config.output_path(Path::new("/work/fork")),
            PathBuf::from("/tmp/report.md")
        );
    }

    #[test]
    fn test_repo_path_defaults_to_cwd() {
        let config = Config::default();
        assert_eq!(
            config.repo_path(),
            std::env::current_dir().expect("cwd")
        );
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(Config::default().log_level(), tracing::Level::INFO);
        let verbose = Config {
            verbose: true,
            quiet: true,
            ..Default::default()
        };
        assert_eq!(verbose.log_level(), tracing::Level::DEBUG);
        let quiet = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(quiet.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_validate_ok_with_key() {
        assert!(keyed().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_key() {
        let result = Config::default().validate();
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_validate_prompt_only_needs_no_key() {
        let config = Config {
            prompt_only: true,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_key_rejected() {
        let config = Config {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_validate_nonexistent_repo() {
        let config = Config {
            repo: Some(PathBuf::from("/nonexistent/path/12345")),
            ..keyed()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RepoNotFound(_))
        ));
    }

    #[test]
    fn test_validate_empty_branch() {
        let config = Config {
            upstream_branch: " ".to_string(),
            ..keyed()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyName("--upstream-branch"))
        ));
    }

    #[test]
    fn test_validate_zero_tokens() {
        let config = Config {
            max_tokens: 0,
            ..keyed()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroMaxTokens)));
    }

    #[test]
    fn test_validate_missing_output_dir() {
        let config = Config {
            output: Some(PathBuf::from("/nonexistent/dir/12345/report.md")),
            ..keyed()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutputDirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_validate_bare_output_file_name() {
        let config = Config {
            output: Some(PathBuf::from("report.md")),
            ..keyed()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_report_client_uses_settings() {
        let config = Config {
            model: "test-model".to_string(),
            api_base_url: "http://localhost:9999".to_string(),
            ..keyed()
        };
        let client = config.report_client().expect("client");
        assert_eq!(client.model(), "test-model");
        assert_eq!(client.endpoint(), "http://localhost:9999/v1/messages");
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
