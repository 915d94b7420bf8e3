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

//! Bundle construction
//!
//! A bundle is the complete, self-contained set of files one publish
//! produces: exactly one `index.md` under the target folder plus one
//! base64-encoded binary entry per collected asset. Built fresh per publish
//! and handed to the commit engine as one unit; never persisted.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{PublishError, PublishResult};
use crate::extract::Asset;
use notegit_github::{BlobEncoding, CommitFile};

/// Name of the primary document file inside every publish folder
pub const INDEX_FILE: &str = "index.md";

/// One file of a bundle, already encoded for the git-data transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// Full repository-relative path
    pub path: String,
    /// Content, UTF-8 text or base64 depending on `encoding`
    pub content: String,
    /// Transport encoding of `content`
    pub encoding: BlobEncoding,
}

/// The complete set of files for one publish operation
///
/// Invariants: all paths are unique and prefixed by `target_folder`, and the
/// first entry is always the primary `index.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Repository-relative folder all entries live under
    pub target_folder: String,
    /// Ordered entries; `index.md` first, then assets in collection order
    pub entries: Vec<BundleEntry>,
}

impl Bundle {
    /// Path of the primary document entry
    pub fn index_path(&self) -> String {
        format!("{}/{INDEX_FILE}", self.target_folder)
    }

    /// Convert into the commit engine's file representation
    pub fn into_commit_files(self) -> Vec<CommitFile> {
        self.entries
            .into_iter()
            .map(|entry| CommitFile {
                path: entry.path,
                content: entry.content,
                encoding: entry.encoding,
            })
            .collect()
    }
}

/// Build the bundle for one publish
///
/// `target_folder` is the full repository-relative folder (base path already
/// joined in). Fails with [`PublishError::EmptyFolderName`] if it is blank.
pub fn build(final_text: &str, assets: &[Asset], target_folder: &str) -> PublishResult<Bundle> {
    let target_folder = target_folder.trim().trim_matches('/');
    if target_folder.is_empty() {
        return Err(PublishError::EmptyFolderName);
    }

    let mut entries = Vec::with_capacity(assets.len() + 1);
    entries.push(BundleEntry {
        path: format!("{target_folder}/{INDEX_FILE}"),
        content: final_text.to_string(),
        encoding: BlobEncoding::Utf8,
    });
    for asset in assets {
        entries.push(BundleEntry {
            path: format!("{target_folder}/{}", asset.bundle_filename),
            content: BASE64.encode(&asset.bytes),
            encoding: BlobEncoding::Base64,
        });
    }

    Ok(Bundle {
        target_folder: target_folder.to_string(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(filename: &str, bytes: &[u8]) -> Asset {
        Asset {
            original_reference: format!("orig/{filename}"),
            bundle_filename: filename.to_string(),
            bytes: bytes.to_vec(),
            size_known_at_collect_time: true,
        }
    }

    #[test]
    fn test_text_only_bundle_has_single_index_entry() {
        let bundle = build("# Hi", &[], "content/posts/My Note").unwrap();
        assert_eq!(bundle.entries.len(), 1);
        assert_eq!(bundle.entries[0].path, "content/posts/My Note/index.md");
        assert_eq!(bundle.entries[0].encoding, BlobEncoding::Utf8);
        assert_eq!(bundle.index_path(), "content/posts/My Note/index.md");
    }

    #[test]
    fn test_assets_become_base64_entries() {
        let assets = vec![asset("image1.png", &[1, 2, 3, 4]), asset("image2.jpg", b"jj")];
        let bundle = build("body", &assets, "posts/n").unwrap();

        assert_eq!(bundle.entries.len(), 3);
        assert_eq!(bundle.entries[1].path, "posts/n/image1.png");
        assert_eq!(bundle.entries[1].content, BASE64.encode([1, 2, 3, 4]));
        assert_eq!(bundle.entries[1].encoding, BlobEncoding::Base64);
        assert_eq!(bundle.entries[2].path, "posts/n/image2.jpg");
    }

    #[test]
    fn test_blank_folder_is_rejected() {
        assert!(matches!(
            build("body", &[], "  "),
            Err(PublishError::EmptyFolderName)
        ));
        assert!(matches!(
            build("body", &[], "/"),
            Err(PublishError::EmptyFolderName)
        ));
    }

    #[test]
    fn test_paths_are_unique_and_prefixed() {
        let assets = vec![asset("image1.png", b"a"), asset("image2.png", b"b")];
        let bundle = build("body", &assets, "/posts/n/").unwrap();

        let mut paths: Vec<&str> = bundle.entries.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.iter().all(|p| p.starts_with("posts/n/")));
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), bundle.entries.len());
    }

    #[test]
    fn test_into_commit_files_preserves_order() {
        let bundle = build("body", &[asset("image1.png", b"a")], "posts/n").unwrap();
        let files = bundle.into_commit_files();
        assert_eq!(files[0].path, "posts/n/index.md");
        assert_eq!(files[1].path, "posts/n/image1.png");
    }
}
