// NoteGit - Atomic Note Publishing for Git Hosts
// Copyright (C) 2026 NoteGit Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! In-memory mock git host for testing
//!
//! Implements [`GitDataApi`](crate::GitDataApi) against a thread-safe,
//! content-addressed object map plus a branch table, with injectable
//! failures so tests can probe the engine's atomicity and its single-retry
//! race handling without a network.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::error::{ProtocolError, ProtocolResult};
use crate::types::{BlobEncoding, BranchHead, NewTreeEntry, RemoteTreeEntry, EMPTY_TREE_SHA};
use crate::GitDataApi;

#[derive(Debug, Clone)]
enum MockObject {
    Blob {
        content: String,
        #[allow(dead_code)]
        encoding: BlobEncoding,
    },
    Tree {
        entries: Vec<RemoteTreeEntry>,
    },
    Commit {
        tree_sha: String,
        parent_sha: Option<String>,
        #[allow(dead_code)]
        message: String,
    },
}

#[derive(Default)]
struct MockState {
    objects: HashMap<String, MockObject>,
    branches: HashMap<String, String>,
    calls: Vec<String>,
    fail_next_op: Option<String>,
    pending_ref_conflicts: u32,
    auth_accepted: bool,
    repo_reachable: bool,
}

/// In-memory git host for tests
///
/// Thread-safe (`Arc<RwLock<..>>`) and cloneable; clones share state so a
/// test can hold the host while an engine owns a trait object over it.
#[derive(Clone)]
pub struct MockGitHost {
    state: Arc<RwLock<MockState>>,
}

impl MockGitHost {
    /// Create an empty host with no branches
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState {
                auth_accepted: true,
                repo_reachable: true,
                ..MockState::default()
            })),
        }
    }

    /// Create a host with `branch` pointing at a root commit over an empty tree
    pub async fn with_branch(branch: &str) -> Self {
        let host = Self::new();
        {
            let mut state = host.state.write().await;
            let tree_sha = store(&mut state.objects, MockObject::Tree { entries: Vec::new() });
            let commit_sha = store(
                &mut state.objects,
                MockObject::Commit {
                    tree_sha,
                    parent_sha: None,
                    message: "init".to_string(),
                },
            );
            state.branches.insert(branch.to_string(), commit_sha);
        }
        host
    }

    /// Commit the branch currently points at, if the branch exists
    pub async fn branch_commit(&self, branch: &str) -> Option<String> {
        self.state.read().await.branches.get(branch).cloned()
    }

    /// Parent of a commit object
    pub async fn commit_parent(&self, commit_sha: &str) -> Option<String> {
        match self.state.read().await.objects.get(commit_sha) {
            Some(MockObject::Commit { parent_sha, .. }) => parent_sha.clone(),
            _ => None,
        }
    }

    /// Sorted blob paths reachable from the branch head
    pub async fn paths_at_head(&self, branch: &str) -> Vec<String> {
        let state = self.state.read().await;
        let Some(commit_sha) = state.branches.get(branch) else {
            return Vec::new();
        };
        let Some(MockObject::Commit { tree_sha, .. }) = state.objects.get(commit_sha) else {
            return Vec::new();
        };
        let Some(MockObject::Tree { entries }) = state.objects.get(tree_sha) else {
            return Vec::new();
        };
        let mut paths: Vec<String> = entries.iter().map(|e| e.path.clone()).collect();
        paths.sort();
        paths
    }

    /// Content of the blob at `path` on the branch head, as stored
    pub async fn blob_at_head(&self, branch: &str, path: &str) -> Option<String> {
        let state = self.state.read().await;
        let commit_sha = state.branches.get(branch)?;
        let MockObject::Commit { tree_sha, .. } = state.objects.get(commit_sha)? else {
            return None;
        };
        let MockObject::Tree { entries } = state.objects.get(tree_sha)? else {
            return None;
        };
        let entry = entries.iter().find(|e| e.path == path)?;
        match state.objects.get(&entry.sha)? {
            MockObject::Blob { content, .. } => Some(content.clone()),
            _ => None,
        }
    }

    /// Ordered log of every API call made against this host
    pub async fn call_log(&self) -> Vec<String> {
        self.state.read().await.calls.clone()
    }

    /// Make the next call to `op` fail with a transport error
    pub async fn fail_next(&self, op: &str) {
        self.state.write().await.fail_next_op = Some(op.to_string());
    }

    /// Make the next `n` ref updates report a compare-and-swap conflict
    pub async fn conflict_next_ref_updates(&self, n: u32) {
        self.state.write().await.pending_ref_conflicts = n;
    }

    /// Reject every credential check from now on
    pub async fn deny_auth(&self) {
        self.state.write().await.auth_accepted = false;
    }

    /// Report the repository unreachable from now on
    pub async fn deny_repo(&self) {
        self.state.write().await.repo_reachable = false;
    }
}

impl Default for MockGitHost {
    fn default() -> Self {
        Self::new()
    }
}

fn store(objects: &mut HashMap<String, MockObject>, object: MockObject) -> String {
    let mut hasher = Sha256::new();
    match &object {
        MockObject::Blob { content, .. } => {
            hasher.update(b"blob");
            hasher.update(content.as_bytes());
        }
        MockObject::Tree { entries } => {
            hasher.update(b"tree");
            for entry in entries {
                hasher.update(entry.path.as_bytes());
                hasher.update(entry.sha.as_bytes());
            }
        }
        MockObject::Commit {
            tree_sha,
            parent_sha,
            message,
        } => {
            hasher.update(b"commit");
            hasher.update(tree_sha.as_bytes());
            if let Some(parent) = parent_sha {
                hasher.update(parent.as_bytes());
            }
            hasher.update(message.as_bytes());
        }
    }
    let sha = hex::encode(hasher.finalize());
    objects.insert(sha.clone(), object);
    sha
}

impl MockGitHost {
    async fn record(&self, op: &str) -> ProtocolResult<()> {
        let mut state = self.state.write().await;
        state.calls.push(op.to_string());
        if state.fail_next_op.as_deref() == Some(op) {
            state.fail_next_op = None;
            return Err(ProtocolError::transport(format!("injected failure in {op}")));
        }
        Ok(())
    }
}

#[async_trait]
impl GitDataApi for MockGitHost {
    async fn branch_head(&self, branch: &str) -> ProtocolResult<BranchHead> {
        self.record("branch_head").await?;
        let state = self.state.read().await;
        let commit_sha = state
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| ProtocolError::branch_not_found(branch.to_string()))?;
        match state.objects.get(&commit_sha) {
            Some(MockObject::Commit { tree_sha, .. }) => Ok(BranchHead {
                commit_sha,
                tree_sha: tree_sha.clone(),
            }),
            _ => Err(ProtocolError::transport(format!(
                "branch {branch} points at a non-commit object"
            ))),
        }
    }

    async fn tree_entries(&self, tree_sha: &str) -> ProtocolResult<Vec<RemoteTreeEntry>> {
        self.record("tree_entries").await?;
        if tree_sha == EMPTY_TREE_SHA {
            return Ok(Vec::new());
        }
        let state = self.state.read().await;
        match state.objects.get(tree_sha) {
            Some(MockObject::Tree { entries }) => Ok(entries.clone()),
            _ => Err(ProtocolError::transport(format!("unknown tree {tree_sha}"))),
        }
    }

    async fn create_blob(&self, content: &str, encoding: BlobEncoding) -> ProtocolResult<String> {
        self.record("create_blob").await?;
        let mut state = self.state.write().await;
        Ok(store(
            &mut state.objects,
            MockObject::Blob {
                content: content.to_string(),
                encoding,
            },
        ))
    }

    async fn create_tree(&self, entries: &[NewTreeEntry]) -> ProtocolResult<String> {
        self.record("create_tree").await?;
        let mut state = self.state.write().await;
        let entries = entries
            .iter()
            .map(|e| RemoteTreeEntry {
                path: e.path.clone(),
                mode: e.mode.clone(),
                entry_type: e.entry_type.clone(),
                sha: e.sha.clone(),
            })
            .collect();
        Ok(store(&mut state.objects, MockObject::Tree { entries }))
    }

    async fn create_commit(
        &self,
        tree_sha: &str,
        parent_sha: &str,
        message: &str,
    ) -> ProtocolResult<String> {
        self.record("create_commit").await?;
        let mut state = self.state.write().await;
        Ok(store(
            &mut state.objects,
            MockObject::Commit {
                tree_sha: tree_sha.to_string(),
                parent_sha: Some(parent_sha.to_string()),
                message: message.to_string(),
            },
        ))
    }

    async fn update_ref(
        &self,
        branch: &str,
        commit_sha: &str,
        expected_prior: &str,
    ) -> ProtocolResult<()> {
        self.record("update_ref").await?;
        let mut state = self.state.write().await;

        if state.pending_ref_conflicts > 0 {
            state.pending_ref_conflicts -= 1;
            return Err(ProtocolError::concurrent_modification(format!(
                "injected conflict on {branch}"
            )));
        }

        let current = state
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| ProtocolError::branch_not_found(branch.to_string()))?;
        if current != expected_prior {
            return Err(ProtocolError::concurrent_modification(format!(
                "branch {branch} is at {current}, expected {expected_prior}"
            )));
        }
        state.branches.insert(branch.to_string(), commit_sha.to_string());
        Ok(())
    }

    async fn verify_auth(&self) -> ProtocolResult<()> {
        self.record("verify_auth").await?;
        if self.state.read().await.auth_accepted {
            Ok(())
        } else {
            Err(ProtocolError::auth_rejected("bad credentials"))
        }
    }

    async fn verify_repo(&self) -> ProtocolResult<()> {
        self.record("verify_repo").await?;
        if self.state.read().await.repo_reachable {
            Ok(())
        } else {
            Err(ProtocolError::repo_not_found("repository unreachable"))
        }
    }

    async fn verify_branch(&self, branch: &str) -> ProtocolResult<()> {
        self.record("verify_branch").await?;
        if self.state.read().await.branches.contains_key(branch) {
            Ok(())
        } else {
            Err(ProtocolError::branch_not_found(branch.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_branch_seeds_root_commit() {
        let host = MockGitHost::with_branch("main").await;
        let head = host.branch_head("main").await.unwrap();
        assert!(host.commit_parent(&head.commit_sha).await.is_none());
        assert!(host.tree_entries(&head.tree_sha).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_ref_checks_expected_prior() {
        let host = MockGitHost::with_branch("main").await;
        let head = host.branch_head("main").await.unwrap();

        let tree = host.create_tree(&[]).await.unwrap();
        let commit = host
            .create_commit(&tree, &head.commit_sha, "msg")
            .await
            .unwrap();

        let err = host
            .update_ref("main", &commit, "not-the-current-sha")
            .await
            .unwrap_err();
        assert!(err.is_concurrent_modification());

        host.update_ref("main", &commit, &head.commit_sha)
            .await
            .unwrap();
        assert_eq!(host.branch_commit("main").await.unwrap(), commit);
    }

    #[tokio::test]
    async fn test_fail_next_fires_once() {
        let host = MockGitHost::with_branch("main").await;
        host.fail_next("create_blob").await;

        let err = host
            .create_blob("data", BlobEncoding::Utf8)
            .await
            .unwrap_err();
        assert!(err.is_transport_failure());

        host.create_blob("data", BlobEncoding::Utf8).await.unwrap();
    }

    #[tokio::test]
    async fn test_call_log_records_order() {
        let host = MockGitHost::with_branch("main").await;
        host.verify_auth().await.unwrap();
        host.verify_repo().await.unwrap();
        assert_eq!(host.call_log().await, vec!["verify_auth", "verify_repo"]);
    }

    #[tokio::test]
    async fn test_content_addressing_is_stable() {
        let host = MockGitHost::new();
        let a = host.create_blob("same", BlobEncoding::Utf8).await.unwrap();
        let b = host.create_blob("same", BlobEncoding::Utf8).await.unwrap();
        assert_eq!(a, b);
    }
}
