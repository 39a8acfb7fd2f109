// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! upsync: report which upstream commits a fork still needs to backport
//!
//! Compares the fork's branch with the upstream branch, skips every upstream
//! commit named in a `Backport:` footer, and asks a text-generation service
//! for a markdown report on the rest.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use upsync::config::Config;
use upsync::progress::ConsoleProgress;
use upsync::sync::{SyncOptions, SyncOutcome, Synchronizer};
use upsync_git::GitRepo;
use upsync_report::{PromptOnly, ReportGenerator};

fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize tracing subscriber with configured log level
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("\x1b[1;31m✗ {e:#}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;

    let start = config.repo_path();
    let repo = GitRepo::discover(&start)
        .with_context(|| format!("Not inside a git repository: {}", start.display()))?;
    info!(root = %repo.root().display(), "Using repository");

    let output = config.output_path(repo.root());

    let generator: Box<dyn ReportGenerator> = if config.prompt_only {
        info!("Prompt-only mode: the report generator will not be called");
        Box::new(PromptOnly)
    } else {
        Box::new(config.report_client()?)
    };

    let mut synchronizer = Synchronizer::new(&repo, SyncOptions::from(config));
    if !config.quiet {
        synchronizer = synchronizer.with_progress(ConsoleProgress::new().into_callback());
    }

    let outcome = synchronizer
        .run(generator.as_ref(), &output)
        .context("Upstream sync failed")?;

    if !config.quiet {
        print_summary(&outcome);
    }
    Ok(())
}

fn print_summary(outcome: &SyncOutcome) {
    let stats = &outcome.stats;
    println!("Report written to {}", outcome.path.display());
    println!(
        "  {} upstream commits since divergence, {} already backported, {} to review",
        stats.upstream_commits, stats.already_backported, stats.unhandled
    );
    if stats.warnings > 0 {
        println!("  {} backport entries skipped (see warnings above)", stats.warnings);
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("{}", outcome.preview());
    if outcome.preview().len() < outcome.report.len() {
        println!("...");
    }
    println!("{}", "=".repeat(60));
}
