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

//! Tracing subscriber installation
//!
//! Installs the process-wide subscriber once; a second call fails with
//! [`LogError::AlreadyInitialized`] instead of silently replacing it.

use std::io;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::{LogConfig, LogError, LogFormat, LogOutput};

/// Initialize tracing with a format and an optional level filter
///
/// Convenience wrapper over [`init_tracing_with_config`] for the common
/// case; `level` falls back to `RUST_LOG`, then "info".
pub fn init_tracing(format: LogFormat, level: Option<&str>) -> Result<(), LogError> {
    let mut config = LogConfig::new().with_format(format);
    if let Some(level) = level {
        config = config.with_level(level);
    }
    init_tracing_with_config(config)
}

/// Initialize tracing from a full [`LogConfig`]
pub fn init_tracing_with_config(config: LogConfig) -> Result<(), LogError> {
    let filter = build_env_filter(&config)?;
    let registry = Registry::default().with(filter);
    let writer = make_writer(config.output);

    let installed = match config.format {
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_writer(writer)
                .with_target(config.include_targets)
                .with_ansi(config.use_color);
            if config.use_timestamps {
                registry.with(layer).try_init()
            } else {
                registry.with(layer.without_time()).try_init()
            }
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(writer)
                .with_target(config.include_targets)
                .with_ansi(config.use_color);
            if config.use_timestamps {
                registry.with(layer).try_init()
            } else {
                registry.with(layer.without_time()).try_init()
            }
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_target(config.include_targets);
            if config.use_timestamps {
                registry.with(layer).try_init()
            } else {
                registry.with(layer.without_time()).try_init()
            }
        }
    };

    installed.map_err(|_| LogError::AlreadyInitialized)
}

fn make_writer(output: LogOutput) -> fn() -> Box<dyn io::Write + Send> {
    match output {
        LogOutput::Stderr => || Box::new(io::stderr()),
        LogOutput::Stdout => || Box::new(io::stdout()),
    }
}

fn build_env_filter(config: &LogConfig) -> Result<EnvFilter, LogError> {
    let directive = config.effective_filter();
    EnvFilter::try_new(&directive)
        .map_err(|e| LogError::InvalidFilter(format!("{directive}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Installing the global subscriber is a one-shot per process, so these
    // only exercise the filter construction.

    #[test]
    fn test_filter_accepts_plain_level() {
        assert!(build_env_filter(&LogConfig::new().with_level("debug")).is_ok());
    }

    #[test]
    fn test_filter_accepts_per_crate_directive() {
        let config = LogConfig::new().with_level("info,notegit_github=trace");
        assert!(build_env_filter(&config).is_ok());
    }

    #[test]
    fn test_filter_rejects_garbage() {
        assert!(build_env_filter(&LogConfig::new().with_level("not==a=filter")).is_err());
    }
}
