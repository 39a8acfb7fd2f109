// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit source backed by a local repository
//!
//! This module answers history queries using the `git2` crate. Nothing here
//! writes to the object store; the only mutations are registering a remote
//! and fetching into remote-tracking refs.

use crate::commit::{CommitInfo, MAX_DIFF_BYTES, truncate_bytes};
use crate::error::{GitError, ReferenceNotFound};
use crate::source::CommitSource;
use chrono::{DateTime, Utc};
use git2::{DiffFormat, DiffOptions, DiffStatsFormat, ErrorCode, Repository, Sort};
use std::path::Path;
use tracing::{debug, info};

/// Width used when rendering the diffstat
const DIFF_STAT_WIDTH: usize = 80;

/// A git repository wrapper answering [`CommitSource`] queries
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if the path is not a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Discover and open a git repository containing the given path
    ///
    /// This walks up the directory tree to find a `.git` directory.
    ///
    /// # Errors
    ///
    /// Returns `GitError::RepositoryNotFound` if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|_| GitError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Get the repository path (the `.git` directory)
    #[must_use]
    pub fn path(&self) -> &Path {
        self.repo.path()
    }

    /// Get the working directory path (None for bare repos)
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Working directory, or the repository directory itself when bare
    #[must_use]
    pub fn root(&self) -> &Path {
        self.repo.workdir().unwrap_or_else(|| self.repo.path())
    }

    /// Check whether a remote with this name is configured
    #[must_use]
    pub fn has_remote(&self, name: &str) -> bool {
        self.repo.find_remote(name).is_ok()
    }

    /// URL a remote fetches from, if the remote exists and has one
    #[must_use]
    pub fn remote_url(&self, name: &str) -> Option<String> {
        let remote = self.repo.find_remote(name).ok()?;
        remote.url().map(str::to_string)
    }

    /// Register a new remote
    ///
    /// # Errors
    ///
    /// Returns `GitError::Git2` if the name is taken or the URL is invalid.
    pub fn add_remote(&self, name: &str, url: &str) -> Result<(), GitError> {
        info!(remote = name, url, "Adding remote");
        self.repo.remote(name, url)?;
        Ok(())
    }

    /// Fetch a single branch into `refs/remotes/<remote>/<branch>`
    ///
    /// # Errors
    ///
    /// Returns `GitError::RemoteNotFound` if the remote is not configured, or
    /// `GitError::Git2` if the fetch itself fails.
    pub fn fetch(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        let mut handle = self
            .repo
            .find_remote(remote)
            .map_err(|_| GitError::RemoteNotFound {
                name: remote.to_string(),
            })?;
        let refspec = format!("+refs/heads/{branch}:refs/remotes/{remote}/{branch}");
        info!(remote, branch, "Fetching");
        handle.fetch(&[refspec.as_str()], None, None)?;
        Ok(())
    }

    fn find_commit(&self, reference: &str) -> Result<git2::Commit<'_>, ReferenceNotFound> {
        if reference.trim().is_empty() {
            return Err(ReferenceNotFound::new(reference));
        }
        self.repo
            .revparse_single(reference)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| {
                debug!(reference, error = %e, "Reference did not resolve");
                ReferenceNotFound::new(reference)
            })
    }

    fn short_sha(&self, git_commit: &git2::Commit<'_>) -> Result<String, GitError> {
        let buf = git_commit.as_object().short_id()?;
        Ok(buf
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| git_commit.id().to_string()[..7].to_string()))
    }

    /// Collect changed paths, the diffstat and the patch text of a commit
    fn extract_diff(
        &self,
        git_commit: &git2::Commit<'_>,
    ) -> Result<(Vec<String>, String, String), GitError> {
        let tree = git_commit.tree()?;

        // Root commits diff against the empty tree
        let parent_tree = if git_commit.parent_count() > 0 {
            Some(git_commit.parent(0)?.tree()?)
        } else {
            None
        };

        let mut opts = DiffOptions::new();
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

        let files = diff
            .deltas()
            .map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string())
            })
            .collect();

        let stat_buf = diff
            .stats()?
            .to_buf(DiffStatsFormat::FULL, DIFF_STAT_WIDTH)?;
        let diff_stat = String::from_utf8_lossy(&stat_buf).trim_end().to_string();

        let mut patch = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if patch.len() <= MAX_DIFF_BYTES {
                if matches!(line.origin(), '+' | '-' | ' ') {
                    patch.push(line.origin());
                }
                patch.push_str(&String::from_utf8_lossy(line.content()));
            }
            true
        })?;

        Ok((files, diff_stat, patch))
    }
}

impl CommitSource for GitRepo {
    fn divergence_point(&self, left: &str, right: &str) -> Result<String, GitError> {
        let left_id = self.find_commit(left)?.id();
        let right_id = self.find_commit(right)?.id();

        match self.repo.merge_base(left_id, right_id) {
            Ok(oid) => Ok(oid.to_string()),
            Err(e) if e.code() == ErrorCode::NotFound => Err(GitError::NoCommonAncestor {
                left: left.to_string(),
                right: right.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn list_range(&self, from: &str, to: &str) -> Result<Vec<String>, GitError> {
        let from_id = self.find_commit(from)?.id();
        let to_id = self.find_commit(to)?.id();

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;
        revwalk.push(to_id)?;
        revwalk.hide(from_id)?;

        let mut shas = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let git_commit = self.repo.find_commit(oid)?;
            if git_commit.parent_count() > 1 {
                continue;
            }
            shas.push(oid.to_string());
        }

        debug!(from, to, count = shas.len(), "Listed range");
        Ok(shas)
    }

    fn resolve(&self, reference: &str) -> Result<String, ReferenceNotFound> {
        self.find_commit(reference).map(|c| c.id().to_string())
    }

    fn describe(&self, reference: &str) -> Result<CommitInfo, GitError> {
        let git_commit = self.find_commit(reference)?;

        let author = git_commit.author();
        let timestamp = DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or_else(Utc::now);
        let message = String::from_utf8_lossy(git_commit.message_bytes()).into_owned();
        let summary = message.lines().next().unwrap_or("").to_string();

        let (files_changed, diff_stat, patch) = self.extract_diff(&git_commit)?;
        let full = format!("{}\n{}", message.trim_end(), patch);

        Ok(CommitInfo {
            sha: git_commit.id().to_string(),
            short_sha: self.short_sha(&git_commit)?,
            summary,
            author: author.name().unwrap_or("Unknown").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            timestamp,
            files_changed,
            diff_stat,
            diff: truncate_bytes(&full, MAX_DIFF_BYTES).to_string(),
            message,
        })
    }

    fn inclusive_range(&self, old: &str, new: &str) -> Result<Vec<String>, GitError> {
        let old_commit = self.find_commit(old)?;
        let new_id = self.find_commit(new)?.id();
        let old_id = old_commit.id();

        if old_id != new_id && !self.repo.graph_descendant_of(new_id, old_id)? {
            return Err(GitError::NotAncestor {
                old: old.to_string(),
                new: new.to_string(),
            });
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;
        revwalk.push(new_id)?;
        for parent in old_commit.parent_ids() {
            revwalk.hide(parent)?;
        }

        let shas = revwalk
            .map(|oid| oid.map(|o| o.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(old, new, count = shas.len(), "Expanded inclusive range");
        Ok(shas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestRepo;
    use similar_asserts::assert_eq;

    #[test]
    fn test_open_nonexistent_repository() {
        let result = GitRepo::open("/nonexistent/path");
        match result {
            Err(GitError::RepositoryNotFound { path }) => {
                assert!(path.contains("nonexistent"));
            }
            _ => panic!("Expected RepositoryNotFound error"),
        }
    }

    #[test]
    fn test_root_is_workdir() {
        let fixture = TestRepo::new("root_is_workdir");
        fixture.commit("main", "Initial commit");
        let repo = GitRepo::open(fixture.path()).expect("open");
        assert_eq!(
            repo.root().canonicalize().expect("canonical root"),
            fixture.path().canonicalize().expect("canonical fixture"),
        );
    }

    #[test]
    fn test_resolve_rejects_empty_reference() {
        let fixture = TestRepo::new("resolve_empty");
        fixture.commit("main", "Initial commit");
        let repo = GitRepo::open(fixture.path()).expect("open");
        assert_eq!(repo.resolve("  "), Err(ReferenceNotFound::new("  ")));
    }

    #[test]
    fn test_resolve_abbreviated_sha() {
        let fixture = TestRepo::new("resolve_short");
        let sha = fixture.commit("main", "Initial commit");
        let repo = GitRepo::open(fixture.path()).expect("open");
        assert_eq!(repo.resolve(&sha[..10]), Ok(sha));
    }

    #[test]
    fn test_missing_remote() {
        let fixture = TestRepo::new("missing_remote");
        fixture.commit("main", "Initial commit");
        let repo = GitRepo::open(fixture.path()).expect("open");
        assert!(!repo.has_remote("upstream"));
        assert!(matches!(
            repo.fetch("upstream", "main"),
            Err(GitError::RemoteNotFound { .. })
        ));
    }

    #[test]
    fn test_add_remote() {
        let fixture = TestRepo::new("add_remote");
        fixture.commit("main", "Initial commit");
        let repo = GitRepo::open(fixture.path()).expect("open");
        repo.add_remote("upstream", "https://example.com/upstream.git")
            .expect("add remote");
        assert!(repo.has_remote("upstream"));
        assert_eq!(
            repo.remote_url("upstream").as_deref(),
            Some("https://example.com/upstream.git")
        );
        assert_eq!(repo.remote_url("origin"), None);
    }
}
