// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: liveness
//! - [`auth`]: signup, login, logout, verify
//! - [`notes`]: the caller's own notes
//! - [`admin`]: listings across all identities and promotion

mod admin;
mod auth;
mod health;
mod notes;

pub use admin::*;
pub use auth::*;
pub use health::*;
pub use notes::*;
