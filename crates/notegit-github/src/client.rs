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

//! GitHub REST v3 implementation of the git-data transport

use serde::Deserialize;
use serde_json::json;

use crate::error::{ProtocolError, ProtocolResult};
use crate::types::{BlobEncoding, BranchHead, NewTreeEntry, RemoteTreeEntry};
use crate::GitDataApi;

const API_ROOT: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("notegit/", env!("CARGO_PKG_VERSION"));

/// What a 404 on a given endpoint means
#[derive(Debug, Clone, Copy)]
enum NotFound {
    Repo,
    Branch,
}

#[derive(Deserialize)]
struct ShaResponse {
    sha: String,
}

#[derive(Deserialize)]
struct RefResponse {
    object: ShaResponse,
}

#[derive(Deserialize)]
struct CommitResponse {
    tree: ShaResponse,
}

#[derive(Deserialize)]
struct TreeItem {
    path: String,
    mode: String,
    #[serde(rename = "type")]
    item_type: String,
    sha: String,
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

/// HTTP client for the GitHub REST v3 git-data endpoints
///
/// One client is bound to one `owner/repo` pair. All calls are plain
/// request/response exchanges; the only mutating call that is observable
/// from outside the object store is the ref update.
pub struct GitHubClient {
    owner: String,
    repo: String,
    token: String,
    client: reqwest::Client,
}

impl GitHubClient {
    /// Create a new client for `owner/repo` authenticated with `token`
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> ProtocolResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProtocolError::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            client,
        })
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!("{API_ROOT}/repos/{}/{}{suffix}", self.owner, self.repo)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Map a non-success status to the protocol error taxonomy
    async fn check(
        response: reqwest::Response,
        not_found: NotFound,
        context: &str,
    ) -> ProtocolResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let rate_limit_exhausted = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "0");
        let body = response.text().await.unwrap_or_default();
        let detail = format!("{context}: HTTP {status}: {body}");

        Err(match status.as_u16() {
            401 => ProtocolError::auth_rejected(detail),
            403 if rate_limit_exhausted => ProtocolError::rate_limited(detail),
            403 => ProtocolError::auth_rejected(detail),
            404 | 409 => match not_found {
                NotFound::Repo => ProtocolError::repo_not_found(detail),
                // 409 on a ref read means the repository has no commits yet,
                // which the caller observes as the branch not existing.
                NotFound::Branch => ProtocolError::branch_not_found(detail),
            },
            429 => ProtocolError::rate_limited(detail),
            _ => ProtocolError::transport(detail),
        })
    }
}

#[async_trait::async_trait]
impl GitDataApi for GitHubClient {
    async fn branch_head(&self, branch: &str) -> ProtocolResult<BranchHead> {
        let url = self.repo_url(&format!("/git/ref/heads/{branch}"));
        tracing::debug!("GET {}", url);

        let response = self.request(reqwest::Method::GET, &url).send().await?;
        let reference: RefResponse = Self::check(response, NotFound::Branch, "read branch ref")
            .await?
            .json()
            .await?;
        let commit_sha = reference.object.sha;

        let url = self.repo_url(&format!("/git/commits/{commit_sha}"));
        tracing::debug!("GET {}", url);
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        let commit: CommitResponse = Self::check(response, NotFound::Repo, "read head commit")
            .await?
            .json()
            .await?;

        Ok(BranchHead {
            commit_sha,
            tree_sha: commit.tree.sha,
        })
    }

    async fn tree_entries(&self, tree_sha: &str) -> ProtocolResult<Vec<RemoteTreeEntry>> {
        let url = self.repo_url(&format!("/git/trees/{tree_sha}?recursive=1"));
        tracing::debug!("GET {}", url);

        let response = self.request(reqwest::Method::GET, &url).send().await?;
        let tree: TreeResponse = Self::check(response, NotFound::Repo, "list base tree")
            .await?
            .json()
            .await?;

        if tree.truncated {
            return Err(ProtocolError::transport(format!(
                "tree listing for {tree_sha} was truncated by the remote host"
            )));
        }

        // Sub-trees are re-derived from the flat paths on the next create;
        // every other entry type (blobs, gitlinks) must be carried through.
        Ok(tree
            .tree
            .into_iter()
            .filter(|item| item.item_type != "tree")
            .map(|item| RemoteTreeEntry {
                path: item.path,
                mode: item.mode,
                entry_type: item.item_type,
                sha: item.sha,
            })
            .collect())
    }

    async fn create_blob(&self, content: &str, encoding: BlobEncoding) -> ProtocolResult<String> {
        let url = self.repo_url("/git/blobs");
        tracing::debug!("POST {}", url);

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&json!({ "content": content, "encoding": encoding.as_str() }))
            .send()
            .await?;
        let blob: ShaResponse = Self::check(response, NotFound::Repo, "create blob")
            .await?
            .json()
            .await?;
        Ok(blob.sha)
    }

    async fn create_tree(&self, entries: &[NewTreeEntry]) -> ProtocolResult<String> {
        let url = self.repo_url("/git/trees");
        tracing::debug!("POST {} ({} entries)", url, entries.len());

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&json!({ "tree": entries }))
            .send()
            .await?;
        let tree: ShaResponse = Self::check(response, NotFound::Repo, "create tree")
            .await?
            .json()
            .await?;
        Ok(tree.sha)
    }

    async fn create_commit(
        &self,
        tree_sha: &str,
        parent_sha: &str,
        message: &str,
    ) -> ProtocolResult<String> {
        let url = self.repo_url("/git/commits");
        tracing::debug!("POST {}", url);

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&json!({
                "message": message,
                "tree": tree_sha,
                "parents": [parent_sha],
            }))
            .send()
            .await?;
        let commit: ShaResponse = Self::check(response, NotFound::Repo, "create commit")
            .await?
            .json()
            .await?;
        Ok(commit.sha)
    }

    async fn update_ref(
        &self,
        branch: &str,
        commit_sha: &str,
        expected_prior: &str,
    ) -> ProtocolResult<()> {
        let url = self.repo_url(&format!("/git/refs/heads/{branch}"));
        tracing::debug!("PATCH {}", url);

        let response = self
            .request(reqwest::Method::PATCH, &url)
            .json(&json!({ "sha": commit_sha, "force": false }))
            .send()
            .await?;

        // With force=false the host only fast-forwards. The new commit's sole
        // parent is `expected_prior`, so the update succeeds exactly when the
        // reference still points there; any move in between is rejected.
        let status = response.status();
        if status.as_u16() == 422 || status.as_u16() == 409 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProtocolError::concurrent_modification(format!(
                "branch {branch} no longer at {expected_prior}: {body}"
            )));
        }
        Self::check(response, NotFound::Branch, "advance branch ref").await?;
        Ok(())
    }

    async fn verify_auth(&self) -> ProtocolResult<()> {
        let url = format!("{API_ROOT}/user");
        tracing::debug!("GET {}", url);
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        Self::check(response, NotFound::Repo, "verify credential").await?;
        Ok(())
    }

    async fn verify_repo(&self) -> ProtocolResult<()> {
        let url = self.repo_url("");
        tracing::debug!("GET {}", url);
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        Self::check(response, NotFound::Repo, "verify repository").await?;
        Ok(())
    }

    async fn verify_branch(&self, branch: &str) -> ProtocolResult<()> {
        let url = self.repo_url(&format!("/branches/{branch}"));
        tracing::debug!("GET {}", url);
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        Self::check(response, NotFound::Branch, "verify branch").await?;
        Ok(())
    }
}
