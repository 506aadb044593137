// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! - [`AuthMiddleware`]: token authentication and role resolution
//! - [`attach_diagnostics`]: exposes internal error detail in development

mod auth;
mod diagnostics;

pub use auth::{AuthLayer, AuthMiddleware, DEFAULT_PUBLIC_PATHS};
pub use diagnostics::attach_diagnostics;
