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

//! GitHub git-data API surface for NoteGit
//!
//! The remote object graph (blobs, trees, commits, refs) is an append-only,
//! content-addressed structure. This crate does not hold a local copy of
//! that graph; it only sequences request/response calls against it:
//!
//! - [`GitDataApi`] is the minimal transport trait: read a branch head, list
//!   a tree, create blob/tree/commit objects, compare-and-swap the branch
//!   reference, and three read-only verification probes.
//! - [`GitHubClient`] implements the trait over the GitHub REST v3 git-data
//!   endpoints.
//! - [`CommitEngine`] turns a set of files into exactly one new revision,
//!   and deletes whole folders by rebuilding a sibling-preserving tree.
//! - [`mock::MockGitHost`] is an in-memory implementation for tests.
//!
//! # Examples
//!
//! ```no_run
//! use notegit_github::{BlobEncoding, CommitEngine, CommitFile, GitHubClient, ProtocolResult};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> ProtocolResult<()> {
//!     let api = Arc::new(GitHubClient::new("alice", "notes", "ghp_secret")?);
//!     let engine = CommitEngine::new(api, "main");
//!
//!     let files = vec![CommitFile {
//!         path: "content/posts/hello/index.md".to_string(),
//!         content: "# Hello".to_string(),
//!         encoding: BlobEncoding::Utf8,
//!     }];
//!     let commit = engine
//!         .publish("content/posts/hello", &files, "docs: publish hello")
//!         .await?;
//!     println!("published as {commit}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod engine;
pub mod error;
pub mod mock;
pub mod types;

pub use client::GitHubClient;
pub use engine::{CommitEngine, DeleteOutcome};
pub use error::{ProtocolError, ProtocolResult};
pub use types::{
    remove_path_prefix, BlobEncoding, BranchHead, CommitFile, NewTreeEntry, RemoteTreeEntry,
    EMPTY_TREE_SHA,
};

use async_trait::async_trait;

/// Low-level git-data transport
///
/// One implementation is bound to one `owner/repo` pair; the engine never
/// passes repository coordinates per call. Every method is a blocking
/// request/response exchange and none of them mutate the branch reference
/// except [`update_ref`](GitDataApi::update_ref).
#[async_trait]
pub trait GitDataApi: Send + Sync {
    /// Read the branch reference and resolve its commit's root tree
    async fn branch_head(&self, branch: &str) -> ProtocolResult<BranchHead>;

    /// List every blob reachable from a tree, recursively, with full paths
    async fn tree_entries(&self, tree_sha: &str) -> ProtocolResult<Vec<RemoteTreeEntry>>;

    /// Create a blob object; returns its content-addressed handle
    async fn create_blob(&self, content: &str, encoding: BlobEncoding) -> ProtocolResult<String>;

    /// Create a tree object from flat path-based entries; returns its handle
    async fn create_tree(&self, entries: &[NewTreeEntry]) -> ProtocolResult<String>;

    /// Create a commit object with a single parent; returns its handle
    async fn create_commit(
        &self,
        tree_sha: &str,
        parent_sha: &str,
        message: &str,
    ) -> ProtocolResult<String>;

    /// Fast-forward the branch reference to `commit_sha`
    ///
    /// Fails with [`ProtocolError::ConcurrentModification`] if the reference
    /// no longer points at `expected_prior`.
    async fn update_ref(
        &self,
        branch: &str,
        commit_sha: &str,
        expected_prior: &str,
    ) -> ProtocolResult<()>;

    /// Confirm the access credential is accepted
    async fn verify_auth(&self) -> ProtocolResult<()>;

    /// Confirm the repository exists and is reachable with the credential
    async fn verify_repo(&self) -> ProtocolResult<()>;

    /// Confirm the branch reference exists
    async fn verify_branch(&self, branch: &str) -> ProtocolResult<()>;
}
