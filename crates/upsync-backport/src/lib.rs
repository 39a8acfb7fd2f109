// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! upsync-backport: decide which upstream commits a fork already carries
//!
//! Downstream commits record what they reproduce with a footer line:
//!
//! ```text
//! Backport: 1a2b3c4, 9f8e7d6...0a1b2c3
//! ```
//!
//! Each entry is a single commit reference or an inclusive `old...new` range.
//! [`scan_handled`] collects every footer in the downstream history into a
//! [`HandledSet`], and [`filter_unhandled`] drops those commits from the list
//! of upstream-only commits.
//!
//! # Example
//!
//! ```no_run
//! use upsync_backport::{filter_unhandled, scan_handled};
//! use upsync_git::{CommitSource, GitRepo};
//!
//! let repo = GitRepo::discover(".").expect("open repo");
//! let base = repo.divergence_point("main", "upstream/main").expect("merge base");
//!
//! let bodies: Vec<String> = repo
//!     .list_range(&base, "main")
//!     .expect("downstream")
//!     .iter()
//!     .map(|sha| repo.describe(sha).expect("describe").message)
//!     .collect();
//! let scan = scan_handled(&repo, &bodies);
//!
//! let upstream = repo.list_range(&base, "upstream/main").expect("upstream");
//! let remaining = filter_unhandled(&repo, &upstream, &scan.handled);
//! println!("{} commits still to review", remaining.unhandled.len());
//! ```

pub mod error;
pub mod footer;
pub mod reconcile;

pub use error::ReconcileWarning;
pub use footer::{FOOTER_PREFIX, FooterEntry, parse_footer_line, parse_message};
pub use reconcile::{FilterOutcome, HandledSet, ScanOutcome, filter_unhandled, scan_handled};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::ReconcileWarning;
    pub use crate::footer::FooterEntry;
    pub use crate::reconcile::{HandledSet, filter_unhandled, scan_handled};
}
