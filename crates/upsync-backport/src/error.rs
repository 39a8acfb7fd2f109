// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Non-fatal conditions raised during reconciliation
//!
//! None of these abort a scan. Each one is logged where it happens and
//! handed back to the caller alongside the result.

use thiserror::Error;

/// A footer entry or upstream commit that had to be skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileWarning {
    /// A bare footer reference did not resolve
    #[error("Backport entry {reference} does not resolve to a commit; ignoring it")]
    UnresolvedReference {
        /// Reference as written in the footer
        reference: String,
    },

    /// One endpoint of a footer range did not resolve
    #[error("Backport range {entry}: {reference} does not resolve to a commit; ignoring the range")]
    UnresolvedRange {
        /// The full range entry
        entry: String,
        /// The endpoint that failed
        reference: String,
    },

    /// Both endpoints resolved but the range could not be expanded
    #[error("Backport range {entry} cannot be expanded: {reason}; ignoring the range")]
    InvalidRange {
        /// The full range entry
        entry: String,
        /// Why expansion failed
        reason: String,
    },

    /// An upstream commit could not be resolved while filtering; it is kept
    #[error("Upstream commit {reference} does not resolve; keeping it as unhandled")]
    UnresolvedUpstream {
        /// Reference as listed
        reference: String,
    },
}
