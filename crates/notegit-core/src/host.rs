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

//! Host editor boundary
//!
//! The core never touches UI toolkit types. Everything it needs from the
//! surrounding editor application arrives through these traits: raw markdown
//! export, document titles, progress/error surfacing, and the capability to
//! resolve editor-local asset references into bytes.

use async_trait::async_trait;

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Progress information
    Info,
    /// Operation completed
    Success,
    /// Operation failed
    Error,
}

/// The surrounding editor application
#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Export the document as raw markdown
    async fn document_text(&self, document_id: &str) -> anyhow::Result<String>;

    /// Current title of the document
    async fn document_title(&self, document_id: &str) -> anyhow::Result<String>;

    /// Surface a progress or error message to the user
    fn notify(&self, message: &str, severity: Severity, duration_ms: u64);
}

/// Capability to turn a local asset reference into bytes
///
/// A reference reaches a resolver only after being classified local (it does
/// not start with `http://`, `https://`, `//` or `data:`). `Ok(None)` means
/// the reference could not be resolved; the extractor drops the asset and
/// leaves the original text unrewritten rather than failing the publish.
#[async_trait]
pub trait BlobResolver: Send + Sync {
    /// Resolve `reference` (as it appeared in the document) into raw bytes
    async fn resolve(&self, reference: &str, document_id: &str)
        -> anyhow::Result<Option<Vec<u8>>>;
}

/// Resolver for hosts that serve their workspace assets over HTTP
///
/// Fetches the reference relative to a base URL (typically the editor's own
/// origin). Opaque editor-internal identifiers need a host-specific
/// [`BlobResolver`] instead.
pub struct HttpBlobResolver {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBlobResolver {
    /// Create a resolver rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl BlobResolver for HttpBlobResolver {
    async fn resolve(
        &self,
        reference: &str,
        _document_id: &str,
    ) -> anyhow::Result<Option<Vec<u8>>> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            reference.trim_start_matches('/')
        );
        tracing::debug!("GET {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(reference, error = %err, "asset fetch failed");
                return Ok(None);
            }
        };
        if !response.status().is_success() {
            tracing::warn!(reference, status = %response.status(), "asset fetch rejected");
            return Ok(None);
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_resolver_url_join() {
        // Construction only; the join logic is what matters here.
        let resolver = HttpBlobResolver::new("http://127.0.0.1:6806/");
        assert_eq!(resolver.base_url, "http://127.0.0.1:6806/");
    }

    #[test]
    fn test_severity_is_copy() {
        let severity = Severity::Info;
        let copied = severity;
        assert_eq!(severity, copied);
    }
}
