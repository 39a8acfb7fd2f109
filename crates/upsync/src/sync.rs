// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Upstream sync pipeline
//!
//! Runs the whole reconciliation against one repository, strictly in order:
//! refresh the upstream branch, find the divergence point, collect the fork's
//! `Backport:` footers, drop the upstream commits they cover, and hand the
//! rest to a [`ReportGenerator`]. The report is written once at the end, so
//! a failed run never leaves a partial file behind.
//!
//! # Example
//!
//! ```no_run
//! use upsync::sync::{SyncOptions, Synchronizer};
//! use upsync_git::GitRepo;
//! use upsync_report::PromptOnly;
//!
//! let repo = GitRepo::discover(".").expect("open repo");
//! let options = SyncOptions::default().offline();
//! let outcome = Synchronizer::new(&repo, options)
//!     .run(&PromptOnly, &repo.root().join("UPSTREAM_SYNC_REPORT.md"))
//!     .expect("sync");
//! println!("{} upstream commits to review", outcome.stats.unhandled);
//! ```

use std::cell::Cell;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use upsync_backport::{HandledSet, ReconcileWarning, filter_unhandled, scan_handled};
use upsync_git::{CommitInfo, CommitSource, GitError, GitRepo};
use upsync_report::{ReportError, ReportGenerator, ReportRequest, render_prompt};

use crate::config::Config;

/// Characters of the report shown after a successful run
pub const PREVIEW_CHARS: usize = 1000;

// ============================================================================
// Error Types
// ============================================================================

/// Fatal sync errors
#[derive(Debug, Error)]
pub enum SyncError {
    /// Git error
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// The upstream branch cannot be reached or is not configured
    #[error("Upstream {upstream} is not available: {hint}")]
    UpstreamUnavailable {
        /// Remote-tracking ref that was needed
        upstream: String,
        /// What the user can do about it
        hint: String,
    },

    /// The report could not be produced
    #[error("Report generation failed: {0}")]
    Generation(#[from] ReportError),

    /// The report could not be written
    #[error("Failed to write report to {}: {source}", .path.display())]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Progress Reporting
// ============================================================================

/// Progress callback signature
pub type ProgressCallback = Box<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Pipeline stage a progress event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Registering and fetching the upstream remote
    Fetch,
    /// Reading the fork's own commits
    Downstream,
    /// Reading upstream commits still to review
    Upstream,
    /// Waiting for the report generator
    Generate,
}

impl Stage {
    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Fetch => "Fetching upstream",
            Self::Downstream => "Reading fork commits",
            Self::Upstream => "Reading upstream commits",
            Self::Generate => "Generating report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Progress event during a sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A stage started
    Started {
        /// Stage being entered
        stage: Stage,
        /// Total number of items to process, if known
        total: Option<usize>,
    },
    /// Item processed
    Progress {
        /// Current stage
        stage: Stage,
        /// Number of items processed so far
        processed: usize,
        /// Total number of items, if known
        total: Option<usize>,
    },
    /// Non-fatal condition that was skipped
    Warning {
        /// Stage where the warning occurred
        stage: Stage,
        /// Description of the warning
        message: String,
    },
    /// A stage finished
    Completed {
        /// Stage that completed
        stage: Stage,
        /// Items produced by the stage
        count: usize,
    },
}

// ============================================================================
// Options and Statistics
// ============================================================================

/// Which branches to compare and how to reach upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Branch holding the fork's history
    pub downstream: String,
    /// Remote tracking the original project
    pub upstream_remote: String,
    /// Branch on that remote
    pub upstream_branch: String,
    /// URL used to register the remote when it is missing
    pub upstream_url: Option<String>,
    /// Fetch the upstream branch before comparing
    pub fetch: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            downstream: "main".to_string(),
            upstream_remote: "upstream".to_string(),
            upstream_branch: "main".to_string(),
            upstream_url: None,
            fetch: true,
        }
    }
}

impl SyncOptions {
    /// Compare against whatever is already fetched
    #[must_use]
    pub fn offline(mut self) -> Self {
        self.fetch = false;
        self
    }

    /// Register the upstream remote from this URL if it is missing
    #[must_use]
    pub fn with_upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = Some(url.into());
        self
    }

    /// Remote-tracking ref of the upstream branch, e.g. `upstream/main`
    #[must_use]
    pub fn upstream_ref(&self) -> String {
        format!("{}/{}", self.upstream_remote, self.upstream_branch)
    }
}

impl From<&Config> for SyncOptions {
    fn from(config: &Config) -> Self {
        Self {
            downstream: config.downstream.clone(),
            upstream_remote: config.upstream_remote.clone(),
            upstream_branch: config.upstream_branch.clone(),
            upstream_url: config.upstream_url.clone(),
            fetch: !config.no_fetch,
        }
    }
}

/// Statistics from a sync
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Fork commits since the divergence point
    pub downstream_commits: usize,
    /// Upstream commits since the divergence point
    pub upstream_commits: usize,
    /// Distinct upstream commits named by footers
    pub handled: usize,
    /// Upstream commits left out of the report
    pub already_backported: usize,
    /// Upstream commits in the report
    pub unhandled: usize,
    /// Footer entries or upstream commits that were skipped
    pub warnings: usize,
}

/// Everything learned from the repository before generating a report
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// Divergence point of the two branches
    pub merge_base: String,
    /// Fork commits since the divergence point, newest first
    pub downstream: Vec<CommitInfo>,
    /// Upstream commits still to review, newest first
    pub upstream: Vec<CommitInfo>,
    /// Upstream commits covered by footers
    pub handled: HandledSet,
    /// Upstream commits since the divergence point, before filtering
    pub upstream_total: usize,
    /// Everything that was skipped along the way
    pub warnings: Vec<ReconcileWarning>,
}

impl SyncPlan {
    /// Upstream commits dropped because a footer covers them
    #[must_use]
    pub fn already_backported(&self) -> usize {
        self.upstream_total.saturating_sub(self.upstream.len())
    }

    /// Whether the fork already carries every upstream commit
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.upstream.is_empty()
    }

    /// Summary counts
    #[must_use]
    pub fn stats(&self) -> SyncStats {
        SyncStats {
            downstream_commits: self.downstream.len(),
            upstream_commits: self.upstream_total,
            handled: self.handled.len(),
            already_backported: self.already_backported(),
            unhandled: self.upstream.len(),
            warnings: self.warnings.len(),
        }
    }

    /// Turn the plan into the input of the report generator
    #[must_use]
    pub fn into_request(self) -> ReportRequest {
        let already_backported = self.already_backported();
        ReportRequest {
            merge_base: self.merge_base,
            upstream: self.upstream,
            downstream: self.downstream,
            already_backported,
        }
    }
}

/// Result of a completed sync
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// Where the report was written
    pub path: PathBuf,
    /// Full report text
    pub report: String,
    /// Summary counts
    pub stats: SyncStats,
}

impl SyncOutcome {
    /// The first [`PREVIEW_CHARS`] characters of the report
    #[must_use]
    pub fn preview(&self) -> &str {
        preview(&self.report, PREVIEW_CHARS)
    }
}

/// Leading `max_chars` characters of `text`
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

// ============================================================================
// Synchronizer
// ============================================================================

/// Runs the sync pipeline against one repository
pub struct Synchronizer<'a> {
    repo: &'a GitRepo,
    options: SyncOptions,
    progress: Option<ProgressCallback>,
    refreshed: Cell<bool>,
}

impl<'a> Synchronizer<'a> {
    /// Create a synchronizer for a repository
    #[must_use]
    pub fn new(repo: &'a GitRepo, options: SyncOptions) -> Self {
        Self {
            repo,
            options,
            progress: None,
            refreshed: Cell::new(false),
        }
    }

    /// Set a progress callback
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Options in effect
    #[must_use]
    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Report progress event
    fn report(&self, event: ProgressEvent) {
        if let Some(ref callback) = self.progress {
            callback(&event);
        }
    }

    // ========================================================================
    // Upstream Access
    // ========================================================================

    /// Make sure the upstream remote exists and fetch its branch
    ///
    /// A missing remote is registered from the configured URL.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::UpstreamUnavailable` if the remote is missing and
    /// no URL is configured, or if the fetch fails because the remote cannot
    /// be reached or has no such branch. Returns `SyncError::Git` if the
    /// remote cannot be registered.
    pub fn refresh_upstream(&self) -> Result<(), SyncError> {
        let remote = &self.options.upstream_remote;
        let branch = &self.options.upstream_branch;

        self.report(ProgressEvent::Started {
            stage: Stage::Fetch,
            total: None,
        });

        if !self.repo.has_remote(remote) {
            let Some(url) = self.options.upstream_url.as_deref() else {
                return Err(self.unavailable(format!(
                    "remote '{remote}' is not configured; add it with \
                     `git remote add {remote} <url>` or pass --upstream-url"
                )));
            };
            self.repo.add_remote(remote, url)?;
        }

        if let Err(e) = self.repo.fetch(remote, branch) {
            warn!(remote = %remote, branch = %branch, error = %e, "Fetch failed");
            let url = self
                .repo
                .remote_url(remote)
                .unwrap_or_else(|| "<no url>".to_string());
            return Err(self.unavailable(format!(
                "could not fetch branch '{branch}' from remote '{remote}' ({url}): {e}; \
                 check the branch name and --upstream-url, or pass --no-fetch \
                 to use what is already fetched"
            )));
        }
        self.refreshed.set(true);

        self.report(ProgressEvent::Completed {
            stage: Stage::Fetch,
            count: 1,
        });
        Ok(())
    }

    /// Find where the fork diverged from upstream
    ///
    /// If the upstream branch is missing and fetching is allowed, the remote
    /// is registered and fetched and the lookup is retried once. [`Self::plan`]
    /// always refreshes first, so there the retry never triggers; it applies
    /// to callers that look up the divergence point without a prior refresh.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::UpstreamUnavailable` if the upstream branch cannot
    /// be found, or `SyncError::Git` for any other failure, including
    /// branches that share no history.
    pub fn divergence_point(&self) -> Result<String, SyncError> {
        match self.try_divergence_point() {
            Err(SyncError::UpstreamUnavailable { .. })
                if self.options.fetch && !self.refreshed.get() =>
            {
                warn!(
                    upstream = %self.options.upstream_ref(),
                    "Upstream branch missing; fetching and retrying once"
                );
                self.refresh_upstream()?;
                self.try_divergence_point()
            }
            result => result,
        }
    }

    fn try_divergence_point(&self) -> Result<String, SyncError> {
        let upstream = self.options.upstream_ref();
        self.repo
            .divergence_point(&self.options.downstream, &upstream)
            .map_err(|e| match e {
                GitError::ReferenceNotFound(missing) if missing.reference == upstream => {
                    let hint = if self.options.fetch {
                        format!(
                            "branch '{}' was not found on remote '{}'",
                            self.options.upstream_branch, self.options.upstream_remote
                        )
                    } else {
                        format!(
                            "run `git fetch {} {}` or drop --no-fetch",
                            self.options.upstream_remote, self.options.upstream_branch
                        )
                    };
                    self.unavailable(hint)
                }
                other => other.into(),
            })
    }

    fn unavailable(&self, hint: String) -> SyncError {
        SyncError::UpstreamUnavailable {
            upstream: self.options.upstream_ref(),
            hint,
        }
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Collect everything the report is built from
    ///
    /// # Errors
    ///
    /// Returns an error if upstream is unavailable, the branches share no
    /// history, or a listed commit cannot be read.
    pub fn plan(&self) -> Result<SyncPlan, SyncError> {
        if self.options.fetch {
            self.refresh_upstream()?;
        } else {
            debug!("Skipping upstream fetch");
        }

        let merge_base = self.divergence_point()?;
        info!(merge_base = %merge_base, "Found divergence point");

        let downstream_shas = self
            .repo
            .list_range(&merge_base, &self.options.downstream)?;
        let downstream = self.describe_all(Stage::Downstream, &downstream_shas)?;

        let scan = scan_handled(self.repo, downstream.iter().map(|c| c.message.as_str()));
        self.report_warnings(Stage::Downstream, &scan.warnings);

        let upstream_shas = self
            .repo
            .list_range(&merge_base, &self.options.upstream_ref())?;
        let filtered = filter_unhandled(self.repo, &upstream_shas, &scan.handled);
        self.report_warnings(Stage::Upstream, &filtered.warnings);

        let upstream = self.describe_all(Stage::Upstream, &filtered.unhandled)?;

        let mut warnings = scan.warnings;
        warnings.extend(filtered.warnings);

        let plan = SyncPlan {
            merge_base,
            downstream,
            upstream,
            handled: scan.handled,
            upstream_total: upstream_shas.len(),
            warnings,
        };

        info!(
            downstream = plan.downstream.len(),
            upstream = plan.upstream_total,
            already_backported = plan.already_backported(),
            unhandled = plan.upstream.len(),
            "Reconciled upstream history"
        );
        Ok(plan)
    }

    fn describe_all(&self, stage: Stage, shas: &[String]) -> Result<Vec<CommitInfo>, SyncError> {
        let total = shas.len();
        self.report(ProgressEvent::Started {
            stage,
            total: Some(total),
        });

        let mut commits = Vec::with_capacity(total);
        for (idx, sha) in shas.iter().enumerate() {
            commits.push(self.repo.describe(sha)?);
            self.report(ProgressEvent::Progress {
                stage,
                processed: idx + 1,
                total: Some(total),
            });
        }

        self.report(ProgressEvent::Completed {
            stage,
            count: total,
        });
        Ok(commits)
    }

    fn report_warnings(&self, stage: Stage, warnings: &[ReconcileWarning]) {
        for warning in warnings {
            self.report(ProgressEvent::Warning {
                stage,
                message: warning.to_string(),
            });
        }
    }

    // ========================================================================
    // Report
    // ========================================================================

    /// Run the full pipeline and write the report to `output`
    ///
    /// The generator is called even when no upstream commit is left to
    /// review; its response is written verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if planning fails, the generator fails, or the file
    /// cannot be written. Nothing is written unless every earlier step
    /// succeeded.
    pub fn run(
        &self,
        generator: &dyn ReportGenerator,
        output: &Path,
    ) -> Result<SyncOutcome, SyncError> {
        let plan = self.plan()?;
        let stats = plan.stats();

        if plan.is_up_to_date() {
            info!("No upstream commits left to review");
        }

        let prompt = render_prompt(&plan.into_request())?;
        debug!(prompt_bytes = prompt.len(), "Rendered prompt");

        self.report(ProgressEvent::Started {
            stage: Stage::Generate,
            total: None,
        });
        let report = generator.generate(&prompt)?;
        self.report(ProgressEvent::Completed {
            stage: Stage::Generate,
            count: report.len(),
        });

        write_report(output, &report)?;
        info!(path = %output.display(), bytes = report.len(), "Report written");

        Ok(SyncOutcome {
            path: output.to_path_buf(),
            report,
            stats,
        })
    }
}

/// Write the report, replacing any existing file
///
/// # Errors
///
/// Returns `SyncError::Write` if the file cannot be written.
pub fn write_report(path: &Path, report: &str) -> Result<(), SyncError> {
    fs::write(path, report).map_err(|source| SyncError::Write {
        path: path.to_path_buf(),
        source,
    })
}
