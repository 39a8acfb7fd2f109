// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The read-only history interface consumed by reconciliation
//!
//! [`crate::GitRepo`] is the production implementation. Anything else that can
//! answer these five questions (an in-memory graph in tests, for instance) can
//! stand in for it.

use crate::commit::CommitInfo;
use crate::error::{GitError, ReferenceNotFound};

/// Read-only queries over a commit history
pub trait CommitSource {
    /// Most recent common ancestor of two named branches
    ///
    /// # Errors
    ///
    /// Returns `GitError::NoCommonAncestor` if the branches share no history,
    /// or `GitError::ReferenceNotFound` if either branch is missing.
    fn divergence_point(&self, left: &str, right: &str) -> Result<String, GitError>;

    /// Non-merge commits reachable from `to` but not from `from`, newest first
    ///
    /// # Errors
    ///
    /// Returns `GitError` if either endpoint cannot be resolved or walked.
    fn list_range(&self, from: &str, to: &str) -> Result<Vec<String>, GitError>;

    /// Resolve an abbreviated or canonical reference to its canonical SHA
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceNotFound`] for unknown, ambiguous or non-commit input.
    fn resolve(&self, reference: &str) -> Result<String, ReferenceNotFound>;

    /// Full metadata for one commit
    ///
    /// # Errors
    ///
    /// Returns `GitError` if the commit cannot be read.
    fn describe(&self, reference: &str) -> Result<CommitInfo, GitError>;

    /// Every commit reachable from `new` down to and including `old`
    ///
    /// # Errors
    ///
    /// Returns `GitError::NotAncestor` when `old` is neither `new` nor one of
    /// its ancestors.
    fn inclusive_range(&self, old: &str, new: &str) -> Result<Vec<String>, GitError>;
}
