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

//! Atomic multi-file commit construction
//!
//! The git-data API writes one object per call and has no "commit N files"
//! or "delete folder" primitive. The engine gets atomicity from layering:
//! blobs and trees are created first as unreachable objects, and nothing is
//! observable on the branch until the final compare-and-swap ref advance.
//! A failure anywhere before that leaves the branch untouched; orphaned
//! objects are harmless in a content-addressed store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::ProtocolResult;
use crate::types::{remove_path_prefix, CommitFile, NewTreeEntry, EMPTY_TREE_SHA};
use crate::GitDataApi;

/// Result of a folder deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// A new commit without the folder's entries was created
    Removed {
        /// The commit the branch now points at
        commit_sha: String,
    },
    /// The folder was not present; the branch reference was left unchanged
    FolderAbsent,
}

/// Turns a set of files into exactly one new revision on a branch
///
/// Publish and delete share one shape: read the branch head, list its tree,
/// drop everything under the target folder, optionally add new blob entries,
/// then create tree → commit → ref advance. The ref advance carries the
/// expected prior commit; if the branch moved in between, the whole sequence
/// is retried once from the fresh head before surfacing
/// [`ProtocolError::ConcurrentModification`].
pub struct CommitEngine {
    api: Arc<dyn GitDataApi>,
    branch: String,
}

impl CommitEngine {
    /// Create an engine bound to one branch of the transport's repository
    pub fn new(api: Arc<dyn GitDataApi>, branch: impl Into<String>) -> Self {
        Self {
            api,
            branch: branch.into(),
        }
    }

    /// Branch this engine advances
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Publish `files` under `target_folder` as a single new revision
    ///
    /// Any previously published entries under `target_folder` are replaced
    /// wholesale; sibling paths are preserved untouched. Returns the sha of
    /// the new commit.
    pub async fn publish(
        &self,
        target_folder: &str,
        files: &[CommitFile],
        message: &str,
    ) -> ProtocolResult<String> {
        let mut retried = false;
        loop {
            match self.publish_once(target_folder, files, message).await {
                Err(err) if err.is_concurrent_modification() && !retried => {
                    warn!(branch = %self.branch, "branch moved during publish, retrying once");
                    retried = true;
                }
                other => return other,
            }
        }
    }

    /// Remove every entry under `target_folder` as a single new revision
    ///
    /// Deleting a folder that does not exist on the branch is an idempotent
    /// no-op: no objects are created and the reference is left unchanged.
    /// Removing the branch's last content commits git's well-known empty
    /// tree; the remote host rejects creating a tree from zero entries.
    pub async fn delete_folder(
        &self,
        target_folder: &str,
        message: &str,
    ) -> ProtocolResult<DeleteOutcome> {
        let mut retried = false;
        loop {
            match self.delete_once(target_folder, message).await {
                Err(err) if err.is_concurrent_modification() && !retried => {
                    warn!(branch = %self.branch, "branch moved during delete, retrying once");
                    retried = true;
                }
                other => return other,
            }
        }
    }

    async fn publish_once(
        &self,
        target_folder: &str,
        files: &[CommitFile],
        message: &str,
    ) -> ProtocolResult<String> {
        let head = self.api.branch_head(&self.branch).await?;
        debug!(branch = %self.branch, commit = %head.commit_sha, "publishing from head");

        let mut entries: Vec<NewTreeEntry> = {
            let base = self.api.tree_entries(&head.tree_sha).await?;
            remove_path_prefix(base, target_folder)
                .into_iter()
                .map(NewTreeEntry::from)
                .collect()
        };

        for file in files {
            let blob_sha = self.api.create_blob(&file.content, file.encoding).await?;
            entries.push(NewTreeEntry::blob(file.path.clone(), blob_sha));
        }

        let tree_sha = self.api.create_tree(&entries).await?;
        let commit_sha = self
            .api
            .create_commit(&tree_sha, &head.commit_sha, message)
            .await?;
        self.api
            .update_ref(&self.branch, &commit_sha, &head.commit_sha)
            .await?;

        info!(
            branch = %self.branch,
            folder = target_folder,
            files = files.len(),
            commit = %commit_sha,
            "published bundle"
        );
        Ok(commit_sha)
    }

    async fn delete_once(
        &self,
        target_folder: &str,
        message: &str,
    ) -> ProtocolResult<DeleteOutcome> {
        let head = self.api.branch_head(&self.branch).await?;
        let base = self.api.tree_entries(&head.tree_sha).await?;
        let base_len = base.len();

        let kept = remove_path_prefix(base, target_folder);
        if kept.len() == base_len {
            debug!(branch = %self.branch, folder = target_folder, "folder absent, nothing to delete");
            return Ok(DeleteOutcome::FolderAbsent);
        }

        let entries: Vec<NewTreeEntry> = kept.into_iter().map(NewTreeEntry::from).collect();
        let tree_sha = if entries.is_empty() {
            EMPTY_TREE_SHA.to_string()
        } else {
            self.api.create_tree(&entries).await?
        };
        let commit_sha = self
            .api
            .create_commit(&tree_sha, &head.commit_sha, message)
            .await?;
        self.api
            .update_ref(&self.branch, &commit_sha, &head.commit_sha)
            .await?;

        info!(
            branch = %self.branch,
            folder = target_folder,
            commit = %commit_sha,
            "deleted folder"
        );
        Ok(DeleteOutcome::Removed { commit_sha })
    }
}
