// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # NoteKeep Integration Tests
//!
//! Integration tests and shared utilities for the NoteKeep workspace.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p notekeep-tests
//!
//! cargo test -p notekeep-tests --test integration_core
//! cargo test -p notekeep-tests --test integration_config
//! cargo test -p notekeep-tests --test integration_api
//! ```
//!
//! ## Test Categories
//!
//! ### Core Tests (`integration_core.rs`)
//! - Ownership and admin rules through the services
//! - First-admin promotion
//! - Registration role policy and duplicate emails
//! - Authentication failures
//!
//! ### Config Tests (`integration_config.rs`)
//! - YAML, TOML and JSON documents
//! - Placeholders and environment overrides
//! - Validation failures
//!
//! ### API Tests (`integration_api.rs`)
//! - End-to-end scenarios through the router
//! - Token location, expiry and role source
//! - Status codes and error bodies
//!
//! ## Using the Harness
//!
//! ```rust,ignore
//! use notekeep_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new_default();
//!     let token = app.signup_token(&UserFixtures::alice()).await;
//!     let id = app.create_note(&token).await;
//!     app.request(RequestBuilder::get(format!("/api/notes/{id}")).bearer(&token))
//!         .await
//!         .assert_status(StatusCode::OK);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::builders::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use axum::http::StatusCode;
}
