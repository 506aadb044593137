// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Common Test Utilities
//!
//! - `fixtures`: Fixed accounts, notes and configuration documents
//! - `builders`: Request builder
//! - `assertions`: Response and result assertions
//! - `mocks`: Store implementations with injected behavior
//! - `harness`: The in-process application

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use harness::*;
pub use mocks::*;

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initializes test logging once per test binary.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,notekeep=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Creates a temporary directory for configuration files.
pub fn temp_test_dir(prefix: &str) -> tempfile::TempDir {
    match tempfile::Builder::new().prefix(prefix).tempdir() {
        Ok(dir) => dir,
        Err(e) => panic!("failed to create temp directory: {e}"),
    }
}

/// Returns an environment variable prefix no other test uses.
pub fn unique_env_prefix(name: &str) -> String {
    format!(
        "NKTEST_{}_{}",
        name.to_uppercase(),
        uuid::Uuid::now_v7().simple()
    )
}
