// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # notekeep-bin
//!
//! Server binary and command-line interface for NoteKeep.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │               main.rs                │
//! └──────────────────┬───────────────────┘
//!                    │
//!             ┌──────▼──────┐
//!             │   cli.rs    │
//!             └──────┬──────┘
//!                    │
//!        ┌───────────┼───────────┐
//!        ▼           ▼           ▼
//!  ┌──────────┐ ┌──────────┐ ┌──────────┐
//!  │ commands │ │ runtime  │ │ logging  │
//!  └──────────┘ └────┬─────┘ └──────────┘
//!                    │
//!             ┌──────▼──────┐
//!             │  shutdown   │
//!             └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! notekeep
//!
//! # Start with a config file
//! notekeep -c /etc/notekeep/config.yaml
//!
//! # Validate configuration, failing on warnings
//! notekeep validate --strict
//!
//! # Hash a password for a seeded account
//! notekeep hash-password --stdin
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{NoteKeepRuntime, RuntimeBuilder};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
