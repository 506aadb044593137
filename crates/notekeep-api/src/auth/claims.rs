// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structure.

use chrono::Utc;
use notekeep_core::{Actor, Identity, Role, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for authentication.
///
/// The role is the closed [`Role`] enum; a token carrying any other role
/// string fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject: the identity id.
    pub sub: UserId,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Issuer.
    pub iss: String,

    /// JWT ID.
    pub jti: String,

    // =========================================================================
    // Custom Claims
    // =========================================================================
    /// Role at issue time.
    pub role: Role,
}

impl Claims {
    /// Creates new claims for a subject.
    pub fn new(sub: UserId, role: Role, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub,
            exp: now + expires_in_secs,
            iat: now,
            iss: String::new(),
            jti: Uuid::now_v7().to_string(),
            role,
        }
    }

    /// Creates claims for an identity's current role.
    pub fn for_identity(identity: &Identity, expires_in_secs: i64) -> Self {
        Self::new(identity.id, identity.role, expires_in_secs)
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = issuer.into();
        self
    }

    /// Returns the actor these claims describe.
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub, self.role)
    }
}

// =============================================================================
// Tests
// =============================================================================
