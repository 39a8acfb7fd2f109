// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Throwaway repositories for tests
//!
//! Enabled for this crate's own tests and, through the `test-support`
//! feature, for dependent crates. Commits are written straight into the
//! object store with `git2`, so no `git` binary or user configuration is
//! needed. Each commit gets a distinct, increasing timestamp, which keeps
//! newest-first ordering deterministic.

use git2::{Oid, Repository, Signature, Time};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

static TEST_DIR_COUNTER: AtomicU32 = AtomicU32::new(0);

const EPOCH: i64 = 1_767_225_600;

/// A temporary repository removed on drop
pub struct TestRepo {
    path: PathBuf,
    repo: Repository,
    clock: Cell<i64>,
}

impl TestRepo {
    /// Create and initialise an empty repository under the system temp dir
    pub fn new(test_name: &str) -> Self {
        let counter = TEST_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "upsync-test-{}-{}-{}",
            test_name,
            std::process::id(),
            counter
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("Failed to create temp test directory");
        let repo = Repository::init(&path).expect("Failed to init repository");
        Self {
            path,
            repo,
            clock: Cell::new(EPOCH),
        }
    }

    /// Path to the working directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Underlying `git2` handle
    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Commit on top of `branch`, touching a file derived from the message
    pub fn commit(&self, branch: &str, message: &str) -> String {
        let n = self.clock.get() - EPOCH;
        self.commit_file(branch, &format!("file_{n}.txt"), message, message)
    }

    /// Commit on top of `branch`, writing `content` to the top-level `file`
    ///
    /// `branch` is either a full ref name or a local branch name. A branch
    /// that does not exist yet starts a new root commit.
    pub fn commit_file(&self, branch: &str, file: &str, content: &str, message: &str) -> String {
        let refname = full_ref(branch);
        let parent = self.tip(&refname);
        let parents: Vec<Oid> = parent.into_iter().collect();
        self.write_commit(&refname, &parents, file, content, message)
    }

    /// Create a merge commit on `branch` whose second parent is `other`
    pub fn merge(&self, branch: &str, other: &str, message: &str) -> String {
        let refname = full_ref(branch);
        let first = self.tip(&refname).expect("Merge target branch has no commits");
        let second = Oid::from_str(other).expect("Invalid merge parent SHA");
        let n = self.clock.get() - EPOCH;
        self.write_commit(
            &refname,
            &[first, second],
            &format!("merge_{n}.txt"),
            message,
            message,
        )
    }

    /// Point `branch` at an existing commit, creating or moving it
    pub fn set_branch(&self, branch: &str, sha: &str) {
        let oid = Oid::from_str(sha).expect("Invalid SHA");
        self.repo
            .reference(&full_ref(branch), oid, true, "test: set branch")
            .expect("Failed to set branch");
    }

    fn tip(&self, refname: &str) -> Option<Oid> {
        self.repo
            .find_reference(refname)
            .ok()
            .and_then(|r| r.target())
    }

    fn write_commit(
        &self,
        refname: &str,
        parents: &[Oid],
        file: &str,
        content: &str,
        message: &str,
    ) -> String {
        assert!(!file.contains('/'), "Only top-level files are supported");

        let parent_commits: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).expect("Missing parent commit"))
            .collect();
        let base_tree = parent_commits
            .first()
            .map(|c| c.tree().expect("Parent has no tree"));

        let blob = self
            .repo
            .blob(content.as_bytes())
            .expect("Failed to write blob");
        let mut builder = self
            .repo
            .treebuilder(base_tree.as_ref())
            .expect("Failed to create tree builder");
        builder
            .insert(file, blob, 0o100_644)
            .expect("Failed to insert blob");
        let tree_oid = builder.write().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_oid).expect("Missing tree");

        let time = self.clock.get();
        self.clock.set(time + 60);
        let sig = Signature::new("Test Author", "test@example.com", &Time::new(time, 0))
            .expect("Failed to build signature");

        let parent_refs: Vec<&git2::Commit<'_>> = parent_commits.iter().collect();
        let oid = self
            .repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .expect("Failed to create commit");
        self.repo
            .reference(refname, oid, true, "test: commit")
            .expect("Failed to update branch");
        oid.to_string()
    }
}

impl Drop for TestRepo {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn full_ref(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_string()
    } else {
        format!("refs/heads/{branch}")
    }
}
