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

//! Structured logging setup for NoteGit
//!
//! Thin wrapper around `tracing-subscriber` so every embedding host (CLI
//! harness, editor plugin shim, tests) configures logging the same way:
//! pick a [`LogFormat`], optionally a level filter, and call
//! [`init_tracing`] once at startup.
//!
//! ```no_run
//! use notegit_observability::{init_tracing, LogError, LogFormat};
//!
//! fn main() -> Result<(), LogError> {
//!     init_tracing(LogFormat::Compact, Some("info"))?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod initialization;

pub use config::{LogConfig, LogError, LogFormat, LogOutput};
pub use initialization::{init_tracing, init_tracing_with_config};
