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

//! Repository configuration schema
//!
//! The configuration is persisted as a single flat JSON object. The access
//! token is stored in plaintext at rest; that is a known limitation of the
//! storage layout, not something this crate papers over.

use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_branch() -> String {
    "main".to_string()
}

fn default_base_path() -> String {
    "content/posts".to_string()
}

/// Connection and layout settings for the target repository
///
/// # Examples
///
/// ```
/// use notegit_config::RepositoryConfig;
///
/// let config = RepositoryConfig {
///     username: "alice".to_string(),
///     access_token: "ghp_secret".to_string(),
///     repository: "alice/notes".to_string(),
///     ..RepositoryConfig::default()
/// };
/// assert_eq!(config.branch, "main");
/// assert_eq!(config.owner_and_name(), Some(("alice", "notes")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Account name on the Git host
    pub username: String,

    /// Personal access token (plaintext at rest)
    pub access_token: String,

    /// Target repository in `owner/name` form
    pub repository: String,

    /// Branch whose reference is advanced on publish
    pub branch: String,

    /// Repository-relative directory that publish folders are created under
    pub base_path: String,

    /// Optional site domain used to derive the published URL
    pub custom_domain: String,

    /// Optional front-matter template with `<TITLE>` / `<DATE>` placeholders
    pub front_matter_template: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            access_token: String::new(),
            repository: String::new(),
            branch: default_branch(),
            base_path: default_base_path(),
            custom_domain: String::new(),
            front_matter_template: String::new(),
        }
    }
}

impl RepositoryConfig {
    /// Split `repository` into `(owner, name)`, if it contains a separator
    pub fn owner_and_name(&self) -> Option<(&str, &str)> {
        self.repository.split_once('/')
    }

    /// Load configuration from a JSON file
    ///
    /// A missing file yields the default configuration rather than an error,
    /// matching first-run behavior.
    pub async fn load(path: impl AsRef<Path>) -> crate::ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Save configuration as pretty-printed JSON
    pub async fn save(&self, path: impl AsRef<Path>) -> crate::ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }
}
