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

//! Protocol error types and utilities

use thiserror::Error;

/// Result type alias for git-data protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors surfaced by the remote git-data protocol
///
/// Every variant is terminal for the current publish or delete attempt; the
/// engine never retries automatically except the single branch-advance race
/// retry, after which the second collision surfaces as
/// `ConcurrentModification`.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Access credential was rejected by the remote host
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// Repository does not exist or is not reachable with the credential
    #[error("repository not found: {0}")]
    RepoNotFound(String),

    /// Branch reference does not exist
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// Branch reference moved between reading it and advancing it
    #[error("branch moved during commit: {0}")]
    ConcurrentModification(String),

    /// Remote host is throttling requests
    #[error("rate limited by remote host: {0}")]
    RateLimited(String),

    /// Network failure, timeout, or remote 5xx
    #[error("transport failure: {0}")]
    TransportFailure(String),
}

impl ProtocolError {
    /// Create an AuthRejected error with context
    pub fn auth_rejected<S: Into<String>>(msg: S) -> Self {
        ProtocolError::AuthRejected(msg.into())
    }

    /// Create a RepoNotFound error with context
    pub fn repo_not_found<S: Into<String>>(msg: S) -> Self {
        ProtocolError::RepoNotFound(msg.into())
    }

    /// Create a BranchNotFound error with context
    pub fn branch_not_found<S: Into<String>>(msg: S) -> Self {
        ProtocolError::BranchNotFound(msg.into())
    }

    /// Create a ConcurrentModification error with context
    pub fn concurrent_modification<S: Into<String>>(msg: S) -> Self {
        ProtocolError::ConcurrentModification(msg.into())
    }

    /// Create a RateLimited error with context
    pub fn rate_limited<S: Into<String>>(msg: S) -> Self {
        ProtocolError::RateLimited(msg.into())
    }

    /// Create a TransportFailure error with context
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        ProtocolError::TransportFailure(msg.into())
    }

    /// Check if this is a ConcurrentModification error
    pub fn is_concurrent_modification(&self) -> bool {
        matches!(self, ProtocolError::ConcurrentModification(_))
    }

    /// Check if this is a BranchNotFound error
    pub fn is_branch_not_found(&self) -> bool {
        matches!(self, ProtocolError::BranchNotFound(_))
    }

    /// Check if this is a TransportFailure error
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, ProtocolError::TransportFailure(_))
    }
}

impl From<reqwest::Error> for ProtocolError {
    fn from(err: reqwest::Error) -> Self {
        ProtocolError::TransportFailure(err.to_string())
    }
}
