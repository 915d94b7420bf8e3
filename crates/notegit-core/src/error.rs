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

//! Publish/delete error types

use notegit_config::ConfigError;
use notegit_github::ProtocolError;
use thiserror::Error;

/// Result type alias for publish and delete operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Terminal errors of a publish or delete attempt
///
/// Only remote-protocol and configuration problems abort an attempt. A
/// single unresolvable image or a record-store hiccup is absorbed with a
/// logged warning and the flow continues; neither appears here.
#[derive(Error, Debug)]
pub enum PublishError {
    /// Configuration is missing or malformed; reported before any network call
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The remote git-data protocol failed; surfaced verbatim
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The target folder name was blank
    #[error("bundle target folder name is empty")]
    EmptyFolderName,

    /// Delete was requested for a document that has no publish record
    #[error("document {0} has no publish record")]
    NotPublished(String),

    /// The host editor could not supply the document
    #[error("document host error: {0}")]
    Host(String),
}

impl PublishError {
    /// Create a Host error with context
    pub fn host<S: Into<String>>(msg: S) -> Self {
        PublishError::Host(msg.into())
    }

    /// Check if this is a NotPublished error
    pub fn is_not_published(&self) -> bool {
        matches!(self, PublishError::NotPublished(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_passes_through() {
        let err = PublishError::from(ConfigError::missing("branch"));
        assert_eq!(err.to_string(), "missing required configuration field: branch");
    }

    #[test]
    fn test_not_published_display() {
        let err = PublishError::NotPublished("doc-1".to_string());
        assert!(err.is_not_published());
        assert_eq!(err.to_string(), "document doc-1 has no publish record");
    }
}
