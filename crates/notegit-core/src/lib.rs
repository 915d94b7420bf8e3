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

//! Document bundling and publish/delete orchestration for NoteGit
//!
//! Takes a markdown document with embedded local images and publishes it to
//! a Git-hosted repository as a single atomic revision, with a symmetric
//! atomic deletion path. The pipeline:
//!
//! document → [`extract`] → [`front_matter`] → [`bundle`] →
//! `notegit_github::CommitEngine` → [`records`]
//!
//! The host editor sits behind the [`host`] traits so no UI toolkit type
//! ever reaches the core; it owns the lifecycle of the [`Publisher`] and
//! supplies document identity, markdown export, local-blob resolution, and
//! notification surfaces.

pub mod bundle;
pub mod error;
pub mod extract;
pub mod front_matter;
pub mod host;
pub mod publisher;
pub mod records;

pub use bundle::{Bundle, BundleEntry};
pub use error::{PublishError, PublishResult};
pub use extract::{extract_title_from_markdown, sanitize_folder_name, Asset, AssetExtractor};
pub use host::{BlobResolver, DocumentHost, HttpBlobResolver, Severity};
pub use publisher::{PublishOutcome, Publisher};
pub use records::{
    FileRecordStorage, PublishRecord, PublishRecordStore, RecordStorage, RepositorySnapshot,
};
