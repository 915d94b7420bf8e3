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

//! Logging configuration types

use std::str::FromStr;

use thiserror::Error;

/// Errors raised while configuring the logging stack
#[derive(Error, Debug)]
pub enum LogError {
    /// The format string did not name a known output format
    #[error("unknown log format: {0} (expected pretty, compact, or json)")]
    UnknownFormat(String),

    /// The level filter could not be parsed
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    /// A subscriber was already installed for this process
    #[error("tracing subscriber already initialized")]
    AlreadyInitialized,
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line human-readable output with colors
    #[default]
    Pretty,

    /// Single-line output, suitable for terminals and CI logs
    Compact,

    /// Machine-readable JSON, one event per line
    Json,
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(LogError::UnknownFormat(other.to_string())),
        }
    }
}

/// Log output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// Write to standard error
    #[default]
    Stderr,

    /// Write to standard output
    Stdout,
}

/// Configuration for the tracing subscriber
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format for log lines
    pub format: LogFormat,

    /// Level filter directive (e.g. "info", "notegit_core=debug").
    /// `None` defers to the `RUST_LOG` environment variable.
    pub level: Option<String>,

    /// ANSI colors (pretty and compact formats only)
    pub use_color: bool,

    /// Include a timestamp on every line
    pub use_timestamps: bool,

    /// Include the emitting module path
    pub include_targets: bool,

    /// Output destination
    pub output: LogOutput,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Pretty,
            level: None,
            use_color: true,
            use_timestamps: true,
            include_targets: true,
            output: LogOutput::Stderr,
        }
    }
}

impl LogConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the level filter directive
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Enable or disable ANSI colors
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Enable or disable timestamps
    pub fn with_timestamps(mut self, use_timestamps: bool) -> Self {
        self.use_timestamps = use_timestamps;
        self
    }

    /// Enable or disable the emitting module path
    pub fn with_targets(mut self, include_targets: bool) -> Self {
        self.include_targets = include_targets;
        self
    }

    /// Set the output destination
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Effective filter directive: config, then `RUST_LOG`, then "info"
    pub fn effective_filter(&self) -> String {
        self.level
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| "info".to_string())
    }
}
