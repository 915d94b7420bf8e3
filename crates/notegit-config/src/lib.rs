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

//! Repository configuration for NoteGit
//!
//! This crate owns the [`RepositoryConfig`] schema, its flat-JSON
//! persistence, and field-level validation. Validation is the gate in front
//! of every publish and delete: all required fields are checked before a
//! single network call is issued, and each failure is reported as a distinct
//! [`ConfigError`].

pub mod error;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use schema::RepositoryConfig;
pub use validation::Validator;
