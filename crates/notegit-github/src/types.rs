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

//! Wire-level types shared by the client, engine, and mock

use serde::{Deserialize, Serialize};

/// Git mode string for a regular (non-executable) file
pub const MODE_REGULAR_FILE: &str = "100644";

/// Sha of git's empty tree, implicitly present in every object store
///
/// Committing it is the only way to express "no files left" through the
/// git-data API, which rejects creating a tree from zero entries.
pub const EMPTY_TREE_SHA: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Head of a branch: the commit the reference points at and its root tree
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BranchHead {
    /// Commit the branch reference currently points at
    pub commit_sha: String,
    /// Root tree of that commit
    pub tree_sha: String,
}

/// Transport encoding of blob content
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlobEncoding {
    /// Plain UTF-8 text
    #[serde(rename = "utf-8")]
    Utf8,
    /// Base64-encoded binary
    Base64,
}

impl BlobEncoding {
    /// Wire representation expected by the git-data API
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobEncoding::Utf8 => "utf-8",
            BlobEncoding::Base64 => "base64",
        }
    }
}

/// One file that must land in the repository as part of a single revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFile {
    /// Full repository-relative path
    pub path: String,
    /// File content, encoded per `encoding`
    pub content: String,
    /// Transport encoding of `content`
    pub encoding: BlobEncoding,
}

/// Leaf entry of an existing tree, as returned by a recursive tree listing
///
/// Sub-tree entries are not represented: the engine works on the flat set of
/// leaf paths and lets the remote host re-derive the tree hierarchy. Blobs
/// and gitlinks (submodule pointers, type "commit") are both leaves and both
/// must survive a rebuild.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoteTreeEntry {
    /// Full repository-relative path
    pub path: String,
    /// Git mode string (e.g. "100644", "160000" for a gitlink)
    pub mode: String,
    /// Entry type: "blob" or "commit"
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Content-addressed handle of the entry
    pub sha: String,
}

/// Entry of a tree about to be created
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewTreeEntry {
    /// Full repository-relative path
    pub path: String,
    /// Git mode string
    pub mode: String,
    /// Entry type: "blob", or "commit" for a carried-over gitlink
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Content-addressed handle the entry points at
    pub sha: String,
}

impl NewTreeEntry {
    /// Create a regular-file blob entry
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: MODE_REGULAR_FILE.to_string(),
            entry_type: "blob".to_string(),
            sha: sha.into(),
        }
    }
}

impl From<RemoteTreeEntry> for NewTreeEntry {
    fn from(entry: RemoteTreeEntry) -> Self {
        Self {
            path: entry.path,
            mode: entry.mode,
            entry_type: entry.entry_type,
            sha: entry.sha,
        }
    }
}

/// Drop every entry whose path sits under `prefix`
///
/// This is the whole-folder deletion primitive: the git-data API has no
/// delete-directory endpoint, so a sibling-preserving tree is rebuilt from
/// the surviving entries. Pure so it can be tested without a transport.
pub fn remove_path_prefix(entries: Vec<RemoteTreeEntry>, prefix: &str) -> Vec<RemoteTreeEntry> {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|entry| {
            entry.path != prefix && !entry.path.starts_with(&format!("{}/", prefix))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> RemoteTreeEntry {
        RemoteTreeEntry {
            path: path.to_string(),
            mode: MODE_REGULAR_FILE.to_string(),
            entry_type: "blob".to_string(),
            sha: format!("sha-of-{path}"),
        }
    }

    #[test]
    fn test_remove_path_prefix_drops_folder_contents() {
        let entries = vec![
            entry("README.md"),
            entry("content/posts/My Note/index.md"),
            entry("content/posts/My Note/image1.png"),
            entry("content/posts/Other Note/index.md"),
        ];

        let kept = remove_path_prefix(entries, "content/posts/My Note");
        let paths: Vec<&str> = kept.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["README.md", "content/posts/Other Note/index.md"]);
    }

    #[test]
    fn test_remove_path_prefix_does_not_match_sibling_prefix() {
        // "notes" must not swallow "notes-archive"
        let entries = vec![entry("notes/a.md"), entry("notes-archive/b.md")];
        let kept = remove_path_prefix(entries, "notes");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].path, "notes-archive/b.md");
    }

    #[test]
    fn test_remove_path_prefix_absent_folder_is_identity() {
        let entries = vec![entry("a.md"), entry("b/c.md")];
        let kept = remove_path_prefix(entries.clone(), "nonexistent");
        assert_eq!(kept, entries);
    }

    #[test]
    fn test_remove_path_prefix_tolerates_surrounding_slashes() {
        let entries = vec![entry("posts/x/index.md"), entry("posts/y/index.md")];
        let kept = remove_path_prefix(entries, "/posts/x/");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].path, "posts/y/index.md");
    }

    #[test]
    fn test_remove_path_prefix_exact_file_match() {
        let entries = vec![entry("posts/x"), entry("posts/xy")];
        let kept = remove_path_prefix(entries, "posts/x");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].path, "posts/xy");
    }

    #[test]
    fn test_blob_encoding_wire_strings() {
        assert_eq!(BlobEncoding::Utf8.as_str(), "utf-8");
        assert_eq!(BlobEncoding::Base64.as_str(), "base64");
    }

    #[test]
    fn test_new_tree_entry_serialization_uses_type_key() {
        let entry = NewTreeEntry::blob("a/b.md", "abc123");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "blob");
        assert_eq!(json["mode"], "100644");
    }

    #[test]
    fn test_remote_entry_conversion_preserves_mode_and_type() {
        let executable = RemoteTreeEntry {
            path: "bin/tool".to_string(),
            mode: "100755".to_string(),
            entry_type: "blob".to_string(),
            sha: "abc".to_string(),
        };
        let new: NewTreeEntry = executable.into();
        assert_eq!(new.mode, "100755");
        assert_eq!(new.entry_type, "blob");

        let gitlink = RemoteTreeEntry {
            path: "vendor/theme".to_string(),
            mode: "160000".to_string(),
            entry_type: "commit".to_string(),
            sha: "def".to_string(),
        };
        let new: NewTreeEntry = gitlink.into();
        assert_eq!(new.mode, "160000");
        assert_eq!(new.entry_type, "commit");
    }
}
