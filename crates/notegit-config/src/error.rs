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

//! Configuration error types

use thiserror::Error;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or validating configuration
///
/// Validation failures are reported before any network call is made and
/// are never retried. Each missing required field surfaces as its own
/// `MissingRequired` value so callers can report them independently.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration field is empty or absent
    #[error("missing required configuration field: {0}")]
    MissingRequired(&'static str),

    /// Repository is present but does not match the `owner/name` pattern
    #[error("invalid repository format: {0:?} (expected \"owner/name\")")]
    InvalidRepositoryFormat(String),

    /// I/O error reading or writing the configuration file
    #[error("I/O error accessing configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted configuration is not valid JSON
    #[error("failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create a MissingRequired error for the given field name
    pub fn missing(field: &'static str) -> Self {
        ConfigError::MissingRequired(field)
    }

    /// Check if this is a validation error (as opposed to an I/O or parse error)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConfigError::MissingRequired(_) | ConfigError::InvalidRepositoryFormat(_)
        )
    }
}
