// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Handled-set construction and upstream filtering
//!
//! The handled set is a pure function of the downstream message text and the
//! (read-only) history it refers to: re-running a scan over unchanged input
//! yields the same set.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};
use upsync_git::CommitSource;

use crate::error::ReconcileWarning;
use crate::footer::{FooterEntry, parse_message};

/// Canonical SHAs of upstream commits already covered by a footer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HandledSet {
    shas: BTreeSet<String>,
}

impl HandledSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one canonical SHA; returns false if it was already present
    pub fn insert(&mut self, sha: impl Into<String>) -> bool {
        self.shas.insert(sha.into())
    }

    /// Check membership of a canonical SHA
    #[must_use]
    pub fn contains(&self, sha: &str) -> bool {
        self.shas.contains(sha)
    }

    /// Number of distinct SHAs
    #[must_use]
    pub fn len(&self) -> usize {
        self.shas.len()
    }

    /// Whether nothing is handled
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shas.is_empty()
    }

    /// SHAs in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.shas.iter().map(String::as_str)
    }
}

impl<S: Into<String>> Extend<S> for HandledSet {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.shas.extend(iter.into_iter().map(Into::into));
    }
}

impl<S: Into<String>> FromIterator<S> for HandledSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Result of [`scan_handled`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Every upstream commit declared as backported
    pub handled: HandledSet,
    /// Entries that were skipped
    pub warnings: Vec<ReconcileWarning>,
}

/// Result of [`filter_unhandled`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Upstream commits still needing review, in input order
    pub unhandled: Vec<String>,
    /// Upstream entries that could not be resolved (still in `unhandled`)
    pub warnings: Vec<ReconcileWarning>,
}

/// Build the handled set from downstream commit messages.
///
/// Every `Backport:` footer in every body is parsed. Bare references are
/// resolved and added; ranges are resolved at both ends and expanded with
/// [`CommitSource::inclusive_range`]. Anything that fails is skipped with a
/// warning, and a failing range adds nothing at all.
pub fn scan_handled<S, I, B>(source: &S, bodies: I) -> ScanOutcome
where
    S: CommitSource + ?Sized,
    I: IntoIterator<Item = B>,
    B: AsRef<str>,
{
    let mut outcome = ScanOutcome::default();

    for body in bodies {
        for entry in parse_message(body.as_ref()) {
            match apply_entry(source, &entry, &mut outcome.handled) {
                Ok(added) => debug!(%entry, added, "Applied backport entry"),
                Err(warning) => {
                    warn!("{warning}");
                    outcome.warnings.push(warning);
                }
            }
        }
    }

    debug!(
        handled = outcome.handled.len(),
        skipped = outcome.warnings.len(),
        "Scanned downstream footers"
    );
    outcome
}

fn apply_entry<S: CommitSource + ?Sized>(
    source: &S,
    entry: &FooterEntry,
    handled: &mut HandledSet,
) -> Result<usize, ReconcileWarning> {
    match entry {
        FooterEntry::Single { reference } => {
            let sha = source
                .resolve(reference)
                .map_err(|_| ReconcileWarning::UnresolvedReference {
                    reference: reference.clone(),
                })?;
            Ok(usize::from(handled.insert(sha)))
        }
        FooterEntry::Range { old, new } => {
            let unresolved = |reference: &str| ReconcileWarning::UnresolvedRange {
                entry: entry.to_string(),
                reference: reference.to_string(),
            };
            let old_sha = source.resolve(old).map_err(|_| unresolved(old.as_str()))?;
            let new_sha = source.resolve(new).map_err(|_| unresolved(new.as_str()))?;

            let range = source.inclusive_range(&old_sha, &new_sha).map_err(|e| {
                ReconcileWarning::InvalidRange {
                    entry: entry.to_string(),
                    reason: e.to_string(),
                }
            })?;
            Ok(range.into_iter().filter(|sha| handled.insert(sha.as_str())).count())
        }
    }
}

/// Drop handled commits from an upstream list, preserving order.
///
/// Entries that cannot be resolved are kept: reporting a commit twice is
/// harmless, silently omitting one is not.
pub fn filter_unhandled<S, R>(source: &S, refs: &[R], handled: &HandledSet) -> FilterOutcome
where
    S: CommitSource + ?Sized,
    R: AsRef<str>,
{
    let mut outcome = FilterOutcome::default();

    for reference in refs {
        let reference = reference.as_ref();
        match source.resolve(reference) {
            Ok(sha) if handled.contains(&sha) => {
                debug!(reference, "Already backported");
            }
            Ok(_) => outcome.unhandled.push(reference.to_string()),
            Err(_) => {
                let warning = ReconcileWarning::UnresolvedUpstream {
                    reference: reference.to_string(),
                };
                warn!("{warning}");
                outcome.warnings.push(warning);
                outcome.unhandled.push(reference.to_string());
            }
        }
    }

    outcome
}
