// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! upsync-git: read-only commit source for upstream sync reports
//!
//! This library crate answers the handful of history questions the sync
//! pipeline asks of a forked repository: where the fork diverged, which
//! commits lie in a range, what an abbreviated reference resolves to, and the
//! full metadata of a single commit.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use upsync_git::{CommitSource, GitRepo};
//!
//! let repo = GitRepo::discover(".").expect("open repo");
//! let base = repo.divergence_point("main", "upstream/main").expect("merge base");
//! for sha in repo.list_range(&base, "upstream/main").expect("list range") {
//!     let info = repo.describe(&sha).expect("describe");
//!     println!("{} - {}", info.short_sha, info.summary);
//! }
//! ```

pub mod commit;
pub mod error;
pub mod repo;
pub mod source;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use commit::{CommitInfo, MAX_DIFF_BYTES, is_valid_sha, truncate_bytes};
pub use error::{GitError, ReferenceNotFound};
pub use repo::GitRepo;
pub use source::CommitSource;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::CommitInfo;
    pub use crate::error::{GitError, ReferenceNotFound};
    pub use crate::repo::GitRepo;
    pub use crate::source::CommitSource;
}
