// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Prompt assembly
//!
//! Upstream commits are sent in full (diff capped per commit); downstream
//! commits are only summarized, newest first, so the service can spot
//! overlapping files without the payload growing with fork age.

use serde::Serialize;
use upsync_git::{CommitInfo, truncate_bytes};

/// Most downstream commits included in the summary
pub const MAX_DOWNSTREAM_SUMMARY: usize = 50;

/// Per-commit cap on the diff text sent for an upstream commit
pub const PER_COMMIT_DIFF_BYTES: usize = 10_000;

/// Everything the report is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    /// Divergence point of the fork
    pub merge_base: String,
    /// Upstream commits still to review, newest first
    pub upstream: Vec<CommitInfo>,
    /// Fork commits since the divergence point, newest first
    pub downstream: Vec<CommitInfo>,
    /// Upstream commits left out because a footer already covers them
    pub already_backported: usize,
}

#[derive(Serialize)]
struct UpstreamEntry<'a> {
    sha: &'a str,
    short_sha: &'a str,
    message: &'a str,
    author: String,
    date: String,
    files_changed: &'a [String],
    diff_stat: &'a str,
    diff: &'a str,
}

impl<'a> From<&'a CommitInfo> for UpstreamEntry<'a> {
    fn from(commit: &'a CommitInfo) -> Self {
        Self {
            sha: &commit.sha,
            short_sha: &commit.short_sha,
            message: &commit.summary,
            author: commit.author_line(),
            date: commit.timestamp.to_rfc3339(),
            files_changed: &commit.files_changed,
            diff_stat: &commit.diff_stat,
            diff: truncate_bytes(&commit.diff, PER_COMMIT_DIFF_BYTES),
        }
    }
}

#[derive(Serialize)]
struct DownstreamEntry<'a> {
    sha: &'a str,
    message: &'a str,
    files_changed: &'a [String],
}

impl<'a> From<&'a CommitInfo> for DownstreamEntry<'a> {
    fn from(commit: &'a CommitInfo) -> Self {
        Self {
            sha: &commit.short_sha,
            message: &commit.summary,
            files_changed: &commit.files_changed,
        }
    }
}

/// Render the single prompt sent to the report generator
///
/// # Errors
///
/// Returns `ReportError::Json` if the commit payload cannot be serialized.
pub fn render_prompt(request: &ReportRequest) -> Result<String, crate::ReportError> {
    let downstream: Vec<DownstreamEntry<'_>> = request
        .downstream
        .iter()
        .take(MAX_DOWNSTREAM_SUMMARY)
        .map(DownstreamEntry::from)
        .collect();
    let upstream: Vec<UpstreamEntry<'_>> =
        request.upstream.iter().map(UpstreamEntry::from).collect();

    let downstream_json = serde_json::to_string_pretty(&downstream)?;
    let upstream_json = serde_json::to_string_pretty(&upstream)?;

    Ok(format!(
        "You are reviewing upstream commits that a forked repository has not yet \
incorporated. Write a backport report in markdown.

# Context

**Divergence point**: `{merge_base}`
**Upstream commits to review**: {upstream_count}
**Upstream commits already backported (omitted)**: {backported}
**Fork commits since divergence**: {downstream_count}

# Recent fork commits (for conflict detection)

{downstream_json}

# Upstream commits to review

{upstream_json}

# Report structure

## 1. Summary table

One row per group of related commits (a feature together with its fixes, a \
series of related refactors) with the columns: Group, Commits (count and short \
SHAs), Strategy (Cherry-pick / Reimplement / Skip / Partial), Conflict risk \
(High / Medium / Low), Priority, Estimated effort in hours.

## 2. Group analysis

For every group:
- **Commits**: SHAs and subjects
- **What it does**: two or three sentences
- **Files**: the key paths touched
- **Compatibility**: which fork commits touch the same areas and where they \
would conflict
- **Strategy**: the recommended approach and why; expected conflicts for a \
cherry-pick, what to port and what to leave out for a reimplementation, the \
justification for a skip
- **Plan**: numbered steps, files to modify, how to test and validate
- **Risk and effort**: a risk level with explanation and an hour range
- **Dependencies**: groups that must land first

## 3. Checklist

A markdown checklist in phases: quick wins (low risk, high value), important \
features (medium risk), later (high risk or low value), and skipped groups \
with the reason struck through.

Name exact files and fork commits when describing conflicts, keep plans \
actionable, and estimate effort with the fork's divergence in mind. Produce \
the complete report now.",
        merge_base = request.merge_base,
        upstream_count = request.upstream.len(),
        backported = request.already_backported,
        downstream_count = request.downstream.len(),
    ))
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn upstream_commit(diff: String) -> CommitInfo {
        CommitInfo {
            sha: "c".repeat(40),
            short_sha: "c".repeat(7),
            summary: "Upstream change".to_string(),
            message: "Upstream change\n".to_string(),
            author: "Test Author".to_string(),
            author_email: "test@example.com".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            files_changed: Vec::new(),
            diff_stat: String::new(),
            diff,
        }
    }

    proptest! {
        /// Property: the embedded diff is the capped prefix of the original
        #[test]
        fn prop_embedded_diff_is_capped(len in 0usize..(PER_COMMIT_DIFF_BYTES * 2)) {
            let diff = "x".repeat(len);
            let request = ReportRequest {
                merge_base: "d".repeat(40),
                upstream: vec![upstream_commit(diff)],
                downstream: Vec::new(),
                already_backported: 0,
            };
            let prompt = render_prompt(&request).expect("render");
            let expected = format!("\"diff\": \"{}\"", "x".repeat(len.min(PER_COMMIT_DIFF_BYTES)));
            prop_assert!(prompt.contains(&expected));
        }
    }
}
