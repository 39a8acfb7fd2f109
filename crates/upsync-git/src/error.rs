// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for upsync-git

use thiserror::Error;

/// A commit reference that could not be resolved to exactly one commit
///
/// Returned as a plain value by [`crate::CommitSource::resolve`] so callers
/// can treat it as a skippable event rather than a fatal error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Reference not found: {reference}")]
pub struct ReferenceNotFound {
    /// The reference string as it was given
    pub reference: String,
}

impl ReferenceNotFound {
    /// Create a new not-found marker for a reference
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }
}

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    /// Error from git2 library
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// Repository not found at the specified path
    #[error("Repository not found: {path}")]
    RepositoryNotFound {
        /// The path that was searched for a repository
        path: String,
    },

    /// Commit reference (branch, tag, or SHA) could not be resolved
    #[error(transparent)]
    ReferenceNotFound(#[from] ReferenceNotFound),

    /// The two branches share no history
    #[error("No common ancestor between {left} and {right}")]
    NoCommonAncestor {
        /// First branch
        left: String,
        /// Second branch
        right: String,
    },

    /// The older end of a range is not an ancestor of the newer end
    #[error("{old} is not an ancestor of {new}")]
    NotAncestor {
        /// Claimed older endpoint
        old: String,
        /// Claimed newer endpoint
        new: String,
    },

    /// A named remote is not configured
    #[error("Remote not found: {name}")]
    RemoteNotFound {
        /// The remote name that was looked up
        name: String,
    },
}

impl GitError {
    /// Whether this error only reports an unresolvable reference
    #[must_use]
    pub fn is_reference_not_found(&self) -> bool {
        matches!(self, Self::ReferenceNotFound(_))
    }
}
