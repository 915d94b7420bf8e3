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

//! Configuration validation
//!
//! Validation runs in full before any network operation. `validate` stops at
//! the first failure; `validate_all` collects every failure so a settings
//! surface can report them together.

use crate::error::{ConfigError, ConfigResult};
use crate::schema::RepositoryConfig;

/// Validator for configuration settings
pub trait Validator {
    /// Check the value, stopping at the first failure
    fn validate(&self) -> ConfigResult<()>;

    /// Collect every validation failure instead of stopping at the first
    fn validate_all(&self) -> Vec<ConfigError>;
}

impl Validator for RepositoryConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.validate_all().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn validate_all(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.username.trim().is_empty() {
            errors.push(ConfigError::missing("username"));
        }

        if self.access_token.trim().is_empty() {
            errors.push(ConfigError::missing("access_token"));
        }

        if self.repository.trim().is_empty() {
            errors.push(ConfigError::missing("repository"));
        } else if !is_valid_repository_format(&self.repository) {
            errors.push(ConfigError::InvalidRepositoryFormat(
                self.repository.clone(),
            ));
        }

        if self.branch.trim().is_empty() {
            errors.push(ConfigError::missing("branch"));
        }

        errors
    }
}

/// Check that a repository string matches `owner/name`
///
/// Both segments are limited to alphanumerics plus `_`, `.` and `-`.
fn is_valid_repository_format(repository: &str) -> bool {
    let Some((owner, name)) = repository.split_once('/') else {
        return false;
    };
    let segment_ok = |segment: &str| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    };
    segment_ok(owner) && segment_ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> RepositoryConfig {
        RepositoryConfig {
            username: "alice".to_string(),
            access_token: "ghp_secret".to_string(),
            repository: "alice/notes".to_string(),
            ..RepositoryConfig::default()
        }
    }

    #[test]
    fn test_complete_config_is_valid() {
        assert!(complete_config().validate().is_ok());
        assert!(complete_config().validate_all().is_empty());
    }

    #[test]
    fn test_each_missing_field_is_distinct() {
        let config = RepositoryConfig {
            branch: String::new(),
            ..RepositoryConfig::default()
        };
        let errors = config.validate_all();
        let fields: Vec<String> = errors.iter().map(|e| e.to_string()).collect();

        assert_eq!(errors.len(), 4);
        assert!(fields.iter().any(|f| f.contains("username")));
        assert!(fields.iter().any(|f| f.contains("access_token")));
        assert!(fields.iter().any(|f| f.contains("repository")));
        assert!(fields.iter().any(|f| f.contains("branch")));
    }

    #[test]
    fn test_repository_format_is_independent_error() {
        let config = RepositoryConfig {
            repository: "no-slash-here".to_string(),
            ..complete_config()
        };
        let errors = config.validate_all();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ConfigError::InvalidRepositoryFormat(_)
        ));
    }

    #[test]
    fn test_repository_format_patterns() {
        assert!(is_valid_repository_format("alice/notes"));
        assert!(is_valid_repository_format("a-b.c_d/repo.name"));
        assert!(!is_valid_repository_format("alice"));
        assert!(!is_valid_repository_format("alice/"));
        assert!(!is_valid_repository_format("/notes"));
        assert!(!is_valid_repository_format("alice/notes/extra"));
        assert!(!is_valid_repository_format("alice/no tes"));
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let config = RepositoryConfig {
            access_token: "   ".to_string(),
            ..complete_config()
        };
        let errors = config.validate_all();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("access_token"));
    }
}
