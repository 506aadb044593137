// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # notekeep-api
//!
//! HTTP API for the NoteKeep note service.
//!
//! This crate provides the axum router with token authentication (session
//! cookie or bearer header), per-request role resolution and the mapping of
//! domain errors to HTTP responses. Authorization itself is decided by the
//! access policy in `notekeep-core`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use notekeep_api::prelude::*;
//!
//! let server = ApiServerBuilder::new()
//!     .config(ApiConfig::default())
//!     .jwt_config(JwtConfig::new(secret))
//!     .build()?;
//! server.run_with_shutdown(shutdown).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{AuthContext, Claims, JwtConfig, JwtManager, TokenError};
pub use config::{ApiConfig, CookieConfig, CorsConfig};
pub use error::{ApiError, ApiResult, AuthFailure};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::auth::{AuthContext, Claims, JwtConfig, JwtManager, TokenError};
    pub use crate::config::{ApiConfig, CookieConfig, CorsConfig};
    pub use crate::error::{ApiError, ApiResult, AuthFailure};
    pub use crate::server::{ApiServer, ApiServerBuilder};
    pub use crate::state::{AppState, AppStateBuilder};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
