// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token authentication.
//!
//! This module provides:
//! - JWT issuing and verification ([`JwtManager`])
//! - The claims carried by a token ([`Claims`])
//! - The per-request authentication context ([`AuthContext`])

mod claims;
mod context;
mod jwt;

pub use claims::Claims;
pub use context::AuthContext;
pub use jwt::{JwtConfig, JwtManager, TokenError, DEFAULT_EXPIRATION_SECS, MIN_SECRET_LEN};
