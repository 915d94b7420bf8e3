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

//! Publish and delete orchestration
//!
//! Drives the full pipeline: validate configuration, export the document,
//! extract assets, compose front matter, build the bundle, commit it as one
//! revision, then persist the publish record. Deletion is the symmetric
//! path driven by the stored record. Operations for the same document id
//! are serialized by a per-document async lock held for the whole duration;
//! cross-document publishes may run concurrently and rely on the engine's
//! compare-and-swap ref advance for correctness on the shared branch.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::bundle;
use crate::error::{PublishError, PublishResult};
use crate::extract::AssetExtractor;
use crate::front_matter;
use crate::host::{BlobResolver, DocumentHost, Severity};
use crate::records::{PublishRecord, PublishRecordStore, RepositorySnapshot};
use notegit_config::{RepositoryConfig, Validator};
use notegit_github::{CommitEngine, DeleteOutcome, GitDataApi};

/// What a successful publish produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// The commit the branch now points at
    pub commit_sha: String,
    /// Folder the bundle landed under (relative to the base path)
    pub folder_name: String,
    /// Browsable URL of the published `index.md`
    pub remote_document_url: String,
    /// Rendered-site URL, when a custom domain is configured
    pub remote_published_url: Option<String>,
}

/// Per-document mutual exclusion
///
/// The lock is held for the full publish-or-delete duration so two
/// sequences for the same document never race on the same folder. The
/// registry evicts a document's slot once the last guard drops, so the
/// map stays bounded by the number of in-flight operations.
#[derive(Default)]
struct LockRegistry {
    locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    async fn acquire(&self, document_id: &str) -> DocumentGuard<'_> {
        let lock = {
            let mut map = self.lock_map();
            Arc::clone(map.entry(document_id.to_string()).or_default())
        };
        let guard = lock.lock_owned().await;
        DocumentGuard {
            registry: self,
            document_id: document_id.to_string(),
            guard: Some(guard),
        }
    }

    fn lock_map(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        match self.locks.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Holds a document's lock; evicts the registry slot when the last
/// holder drops.
struct DocumentGuard<'a> {
    registry: &'a LockRegistry,
    document_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DocumentGuard<'_> {
    fn drop(&mut self) {
        // Release before inspecting the refcount; the map mutex serializes
        // this against a concurrent acquire cloning the Arc.
        self.guard = None;
        let mut map = self.registry.lock_map();
        if map
            .get(&self.document_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.document_id);
        }
    }
}

/// Entry point for publish, delete, and connection testing
///
/// Constructed once by the host boundary with the current configuration and
/// the four collaborators; the core never owns global state.
pub struct Publisher {
    config: RepositoryConfig,
    host: Arc<dyn DocumentHost>,
    api: Arc<dyn GitDataApi>,
    extractor: AssetExtractor,
    store: Arc<PublishRecordStore>,
    locks: LockRegistry,
}

impl Publisher {
    /// Create a publisher over the given collaborators
    pub fn new(
        config: RepositoryConfig,
        host: Arc<dyn DocumentHost>,
        resolver: Arc<dyn BlobResolver>,
        api: Arc<dyn GitDataApi>,
        store: Arc<PublishRecordStore>,
    ) -> Self {
        Self {
            config,
            host,
            api,
            extractor: AssetExtractor::new(resolver),
            store,
            locks: LockRegistry::default(),
        }
    }

    /// Publish a document as one atomic revision
    ///
    /// `folder_name` defaults to the document title; `front_matter_override`
    /// replaces the configured template for this publish only (the host's
    /// publish dialog lets the user edit it per publish).
    pub async fn publish(
        &self,
        document_id: &str,
        folder_name: Option<&str>,
        front_matter_override: Option<&str>,
    ) -> PublishResult<PublishOutcome> {
        if let Err(err) = self.config.validate() {
            self.host
                .notify(&format!("Publish failed: {err}"), Severity::Error, 5000);
            return Err(err.into());
        }
        let _guard = self.locks.acquire(document_id).await;

        match self
            .publish_locked(document_id, folder_name, front_matter_override)
            .await
        {
            Ok(outcome) => {
                self.host.notify("Published to GitHub", Severity::Success, 3000);
                Ok(outcome)
            }
            Err(err) => {
                self.host
                    .notify(&format!("Publish failed: {err}"), Severity::Error, 5000);
                Err(err)
            }
        }
    }

    /// Delete everything previously published for a document
    ///
    /// Uses the stored record's repository snapshot, so the remote layout is
    /// never re-derived from the current configuration.
    pub async fn delete(&self, document_id: &str) -> PublishResult<DeleteOutcome> {
        if let Err(err) = self.config.validate() {
            self.host
                .notify(&format!("Delete failed: {err}"), Severity::Error, 5000);
            return Err(err.into());
        }
        let _guard = self.locks.acquire(document_id).await;

        match self.delete_locked(document_id).await {
            Ok(outcome) => {
                self.host.notify("Publication removed", Severity::Success, 3000);
                Ok(outcome)
            }
            Err(err) => {
                if !err.is_not_published() {
                    self.host
                        .notify(&format!("Delete failed: {err}"), Severity::Error, 5000);
                }
                Err(err)
            }
        }
    }

    /// Probe credential, repository, and branch without mutating anything
    pub async fn test_connection(&self) -> PublishResult<()> {
        self.config.validate()?;
        self.api.verify_auth().await?;
        self.api.verify_repo().await?;
        self.api.verify_branch(&self.config.branch).await?;
        Ok(())
    }

    async fn publish_locked(
        &self,
        document_id: &str,
        folder_name: Option<&str>,
        front_matter_override: Option<&str>,
    ) -> PublishResult<PublishOutcome> {
        self.host.notify("Exporting note...", Severity::Info, 3000);
        let title = self
            .host
            .document_title(document_id)
            .await
            .map_err(|e| PublishError::host(e.to_string()))?;
        let text = self
            .host
            .document_text(document_id)
            .await
            .map_err(|e| PublishError::host(e.to_string()))?;

        let folder = folder_name
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| title.clone());

        self.host.notify("Processing images...", Severity::Info, 3000);
        let (rewritten, assets) = self.extractor.extract(&text, document_id).await;

        let template = front_matter_override.unwrap_or(&self.config.front_matter_template);
        let final_text = front_matter::compose(&rewritten, template, &title);

        let target_folder = join_path(&self.config.base_path, &folder);
        let bundle = bundle::build(&final_text, &assets, &target_folder)?;
        let index_path = bundle.index_path();
        let target_folder = bundle.target_folder.clone();
        let files = bundle.into_commit_files();

        self.host.notify("Uploading note...", Severity::Info, 3000);
        let engine = CommitEngine::new(Arc::clone(&self.api), &self.config.branch);
        let commit_sha = engine
            .publish(&target_folder, &files, &format!("docs: publish {folder}"))
            .await?;

        let remote_document_url = format!(
            "https://github.com/{}/blob/{}/{index_path}",
            self.config.repository, self.config.branch,
        );
        let remote_published_url = match self.config.custom_domain.trim() {
            "" => None,
            domain => Some(format!("{}/{folder}", domain.trim_end_matches('/'))),
        };

        let record = PublishRecord {
            document_id: document_id.to_string(),
            document_title: title,
            folder_name: folder.clone(),
            published_at_epoch_ms: chrono::Utc::now().timestamp_millis(),
            remote_document_url: remote_document_url.clone(),
            remote_published_url: remote_published_url.clone(),
            repository_snapshot: RepositorySnapshot {
                repository: self.config.repository.clone(),
                base_path: self.config.base_path.clone(),
                custom_domain: remote_published_url
                    .is_some()
                    .then(|| self.config.custom_domain.clone()),
            },
        };
        // The remote commit is the source of truth; losing the record only
        // costs the view/delete shortcuts.
        if let Err(err) = self.store.upsert(record).await {
            warn!(document_id, error = %err, "publish record could not be persisted");
            self.host.notify(
                "Published, but the publish record could not be saved",
                Severity::Info,
                5000,
            );
        }

        info!(document_id, folder = %folder, commit = %commit_sha, "document published");
        Ok(PublishOutcome {
            commit_sha,
            folder_name: folder,
            remote_document_url,
            remote_published_url,
        })
    }

    async fn delete_locked(&self, document_id: &str) -> PublishResult<DeleteOutcome> {
        let record = self
            .store
            .lookup(document_id)
            .await
            .ok_or_else(|| PublishError::NotPublished(document_id.to_string()))?;

        let target_folder = join_path(&record.repository_snapshot.base_path, &record.folder_name);
        let engine = CommitEngine::new(Arc::clone(&self.api), &self.config.branch);
        let outcome = engine
            .delete_folder(
                &target_folder,
                &format!("docs: remove {}", record.folder_name),
            )
            .await?;

        if let Err(err) = self.store.remove(document_id).await {
            warn!(document_id, error = %err, "publish record could not be removed");
        }

        info!(document_id, folder = %record.folder_name, "publication deleted");
        Ok(outcome)
    }
}

/// Join a base path and a folder, tolerating empty and slash-padded bases
fn join_path(base: &str, folder: &str) -> String {
    let base = base.trim_matches('/');
    let folder = folder.trim_matches('/');
    if base.is_empty() {
        folder.to_string()
    } else {
        format!("{base}/{folder}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("content/posts", "My Note"), "content/posts/My Note");
        assert_eq!(join_path("", "My Note"), "My Note");
        assert_eq!(join_path("/content/posts/", "My Note"), "content/posts/My Note");
    }

    #[tokio::test]
    async fn test_lock_registry_evicts_idle_documents() {
        let registry = LockRegistry::default();

        let guard = registry.acquire("doc-1").await;
        assert_eq!(registry.lock_map().len(), 1);

        drop(guard);
        assert!(registry.lock_map().is_empty());
    }

    #[tokio::test]
    async fn test_lock_registry_keeps_held_documents() {
        let registry = LockRegistry::default();

        let held = registry.acquire("doc-1").await;
        let released = registry.acquire("doc-2").await;
        assert_eq!(registry.lock_map().len(), 2);

        drop(released);
        assert_eq!(registry.lock_map().len(), 1);
        assert!(registry.lock_map().contains_key("doc-1"));

        drop(held);
        assert!(registry.lock_map().is_empty());
    }
}
