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

//! Durable publish records
//!
//! Maps document identity to its last-known publish location so "view" and
//! "delete" never have to re-derive the remote layout. One record per
//! document id, overwritten on republish, no history. The remote repository
//! is the source of truth: storage failures degrade to an empty in-memory
//! set (on load) or a logged warning (on save), never to a publish failure.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

/// Repository coordinates captured at publish time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    /// `owner/name` the document was published to
    pub repository: String,
    /// Base path in effect at publish time
    pub base_path: String,
    /// Custom domain in effect at publish time, if any
    pub custom_domain: Option<String>,
}

/// Last-known publish location of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRecord {
    /// Stable document identity, owned by the host editor
    pub document_id: String,
    /// Title at publish time
    pub document_title: String,
    /// Folder the bundle landed under (relative to the base path)
    pub folder_name: String,
    /// Publish time, milliseconds since the epoch
    pub published_at_epoch_ms: i64,
    /// Browsable URL of the published `index.md`
    pub remote_document_url: String,
    /// Rendered-site URL, when a custom domain is configured
    pub remote_published_url: Option<String>,
    /// Repository coordinates used for later deletion
    pub repository_snapshot: RepositorySnapshot,
}

/// Backing persistence for the record map
///
/// The store owns the serialization contract (a JSON object keyed by
/// document id); implementations only move opaque strings.
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Load the serialized record map, `None` if nothing was ever saved
    async fn load(&self) -> anyhow::Result<Option<String>>;

    /// Persist the serialized record map
    async fn save(&self, serialized: &str) -> anyhow::Result<()>;
}

/// File-backed record storage
pub struct FileRecordStorage {
    path: PathBuf,
}

impl FileRecordStorage {
    /// Store records at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordStorage for FileRecordStorage {
    async fn load(&self) -> anyhow::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(tokio::fs::read_to_string(&self.path).await?))
    }

    async fn save(&self, serialized: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serialized).await?;
        Ok(())
    }
}

/// In-memory record map with write-through persistence
pub struct PublishRecordStore {
    storage: Arc<dyn RecordStorage>,
    records: RwLock<HashMap<String, PublishRecord>>,
}

impl PublishRecordStore {
    /// Open the store, loading whatever the storage holds
    ///
    /// Malformed or non-object serialized input is treated as empty with a
    /// warning; it is never a fatal error.
    pub async fn open(storage: Arc<dyn RecordStorage>) -> Self {
        let records = match storage.load().await {
            Ok(Some(raw)) => match serde_json::from_str::<HashMap<String, PublishRecord>>(&raw) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!(error = %err, "publish records malformed, starting empty");
                    HashMap::new()
                }
            },
            Ok(None) => HashMap::new(),
            Err(err) => {
                warn!(error = %err, "publish records unreadable, starting empty");
                HashMap::new()
            }
        };
        Self {
            storage,
            records: RwLock::new(records),
        }
    }

    /// Insert or overwrite the record for its document id
    pub async fn upsert(&self, record: PublishRecord) -> anyhow::Result<()> {
        {
            let mut records = self.records.write().await;
            records.insert(record.document_id.clone(), record);
        }
        self.persist().await
    }

    /// Record for a document id, if it was ever published
    pub async fn lookup(&self, document_id: &str) -> Option<PublishRecord> {
        self.records.read().await.get(document_id).cloned()
    }

    /// Remove the record for a document id
    pub async fn remove(&self, document_id: &str) -> anyhow::Result<()> {
        let removed = self.records.write().await.remove(document_id);
        if removed.is_some() {
            self.persist().await?;
        }
        Ok(())
    }

    /// Snapshot of every record, keyed by document id
    pub async fn all(&self) -> HashMap<String, PublishRecord> {
        self.records.read().await.clone()
    }

    /// Drop every record, used on plugin teardown
    pub async fn clear(&self) -> anyhow::Result<()> {
        self.records.write().await.clear();
        self.persist().await
    }

    async fn persist(&self) -> anyhow::Result<()> {
        let serialized = {
            let records = self.records.read().await;
            serde_json::to_string(&*records)?
        };
        self.storage.save(&serialized).await
    }
}
