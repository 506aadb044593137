// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identity records and their password-free summary view.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// Normalizes an email address for storage and lookup (trimmed, lowercased).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Identity
// =============================================================================

/// A registered account.
///
/// Created on registration, mutated only by promotion, never deleted.
/// Deliberately not `Serialize`: responses use [`IdentitySummary`].
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// Unique, stable id.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Normalized email, unique across the store.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Current role.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// Creates a new identity with a fresh id and the current timestamp.
    pub fn new(
        username: impl Into<String>,
        email: &str,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
            role,
            created_at: Utc::now(),
        }
    }

    /// Returns `true` if the identity holds the admin role.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Returns the password-free view of this identity.
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

// =============================================================================
// IdentitySummary
// =============================================================================

/// An identity without its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySummary {
    /// Identity id.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Normalized email.
    pub email: String,
    /// Current role.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for IdentitySummary {
    fn from(identity: &Identity) -> Self {
        identity.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_new_identity_normalizes_email() {
        let identity = Identity::new("alice", "Alice@Example.com", "$argon2id$stub", Role::User);
        assert_eq!(identity.email, "alice@example.com");
        assert!(!identity.is_admin());
    }

    #[test]
    fn test_debug_redacts_hash() {
        let identity = Identity::new("alice", "a@example.com", "$argon2id$secret", Role::User);
        let debug = format!("{identity:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_summary_has_no_hash() {
        let identity = Identity::new("alice", "a@example.com", "$argon2id$secret", Role::Admin);
        let json = serde_json::to_value(identity.summary()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
        assert_eq!(json["email"], "a@example.com");
    }
}
