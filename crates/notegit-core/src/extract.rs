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

//! Local image extraction and link rewriting
//!
//! Scans a markdown document for embedded image references in both inline
//! markdown and raw HTML form, resolves the local ones into bytes through a
//! [`BlobResolver`], and rewrites each resolved occurrence to a bare
//! sequential filename. Remote references pass through verbatim; references
//! that cannot be resolved are dropped from the asset list with a warning
//! and their original text is left alone. One bad image never aborts a
//! publish.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::warn;

use crate::host::BlobResolver;

static MARKDOWN_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap()
});

static HTML_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r#"<img[^>]+src="([^">]+)"[^>]*>"#).unwrap()
});

/// One collected image, ownership passes to the bundle builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Reference text as it appeared in the document
    pub original_reference: String,
    /// Assigned bundle-relative filename (`image<N>.<ext>`)
    pub bundle_filename: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// Whether the byte length was known when the asset was collected
    pub size_known_at_collect_time: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReferenceShape {
    Markdown,
    Html,
}

struct ImageReference {
    start: usize,
    shape: ReferenceShape,
    full_match: String,
    alt_text: String,
    url: String,
}

/// Scans documents and collects their local images
pub struct AssetExtractor {
    resolver: Arc<dyn BlobResolver>,
}

impl AssetExtractor {
    /// Create an extractor that resolves local references through `resolver`
    pub fn new(resolver: Arc<dyn BlobResolver>) -> Self {
        Self { resolver }
    }

    /// Extract local images from `text` and rewrite their references
    ///
    /// Returns the rewritten document and the collected assets in
    /// first-occurrence order. Filenames are `image1.<ext>`, `image2.<ext>`,
    /// … with one counter shared across both reference shapes, so collisions
    /// within a single extraction cannot occur.
    pub async fn extract(&self, text: &str, document_id: &str) -> (String, Vec<Asset>) {
        let mut references = scan_references(text);
        references.sort_by_key(|r| r.start);

        let mut rewritten = text.to_string();
        let mut assets = Vec::new();
        let mut counter = 1usize;

        for reference in references {
            if !is_local_reference(&reference.url) {
                continue;
            }

            let bytes = match self.resolver.resolve(&reference.url, document_id).await {
                Ok(Some(bytes)) => bytes,
                Ok(None) => {
                    warn!(reference = %reference.url, "local image could not be resolved, skipping");
                    continue;
                }
                Err(err) => {
                    warn!(reference = %reference.url, error = %err, "local image fetch failed, skipping");
                    continue;
                }
            };

            let filename = format!("image{counter}.{}", extension_of(&reference.url));
            counter += 1;

            let replacement = match reference.shape {
                ReferenceShape::Markdown => {
                    let new = format!("![{}]({filename})", reference.alt_text);
                    rewritten.replacen(&reference.full_match, &new, 1)
                }
                ReferenceShape::Html => {
                    let old = format!("src=\"{}\"", reference.url);
                    let new = format!("src=\"{filename}\"");
                    rewritten.replacen(&old, &new, 1)
                }
            };
            rewritten = replacement;

            assets.push(Asset {
                original_reference: reference.url,
                bundle_filename: filename,
                bytes,
                size_known_at_collect_time: true,
            });
        }

        (rewritten, assets)
    }
}

fn scan_references(text: &str) -> Vec<ImageReference> {
    let mut references = Vec::new();

    for captures in MARKDOWN_IMAGE.captures_iter(text) {
        let full = captures.get(0).map(|m| (m.start(), m.as_str())).unwrap_or((0, ""));
        references.push(ImageReference {
            start: full.0,
            shape: ReferenceShape::Markdown,
            full_match: full.1.to_string(),
            alt_text: captures.get(1).map_or_else(String::new, |m| m.as_str().to_string()),
            url: captures.get(2).map_or_else(String::new, |m| m.as_str().to_string()),
        });
    }

    for captures in HTML_IMAGE.captures_iter(text) {
        let full = captures.get(0).map(|m| (m.start(), m.as_str())).unwrap_or((0, ""));
        references.push(ImageReference {
            start: full.0,
            shape: ReferenceShape::Html,
            full_match: full.1.to_string(),
            alt_text: String::new(),
            url: captures.get(1).map_or_else(String::new, |m| m.as_str().to_string()),
        });
    }

    references
}

/// A reference is local iff it is not already remote or inlined
fn is_local_reference(url: &str) -> bool {
    !url.starts_with("http://")
        && !url.starts_with("https://")
        && !url.starts_with("//")
        && !url.starts_with("data:")
}

/// Extension taken from the reference's suffix after the last `.`
///
/// Query strings are stripped first; an opaque reference without a dot in
/// its final path segment defaults to `png`.
fn extension_of(reference: &str) -> String {
    let without_query = reference.split('?').next().unwrap_or(reference);
    let last_segment = without_query.rsplit('/').next().unwrap_or(without_query);
    match last_segment.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_string(),
        _ => "png".to_string(),
    }
}

/// First `#` or `##` heading of the document, else a timestamped fallback
pub fn extract_title_from_markdown(markdown: &str) -> String {
    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if let Some(title) = trimmed.strip_prefix("# ").or_else(|| trimmed.strip_prefix("## ")) {
            let title = title.trim();
            if !title.is_empty() {
                return sanitize_folder_name(title);
            }
        }
    }
    format!("note_{}", chrono::Utc::now().timestamp_millis())
}

/// Make a document title safe to use as a repository folder name
///
/// Path separators and characters illegal on common filesystems become `_`,
/// whitespace runs collapse to a single `_`, leading dots are stripped, and
/// the result is capped at 100 characters.
pub fn sanitize_folder_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut last_was_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                sanitized.push('_');
            }
            last_was_space = true;
        } else {
            last_was_space = false;
            match c {
                '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => sanitized.push('_'),
                other => sanitized.push(other),
            }
        }
    }
    let trimmed = sanitized.trim_start_matches('.');
    trimmed.chars().take(100).collect()
}
