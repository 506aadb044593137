// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request role resolution.
//!
//! A token carries the role its subject held when it was issued. The
//! [`RoleResolver`] decides which role is in effect for the request:
//!
//! - [`TokenRoleResolver`] trusts the token. A promotion only takes effect
//!   after the subject obtains a new token.
//! - [`StoreRoleResolver`] re-reads the identity on every request. A token
//!   whose subject no longer exists is rejected.
//!
//! The policy engine only ever sees the resolved [`Actor`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::store::IdentityStore;
use crate::types::Actor;

/// Where the role in effect for a request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSource {
    /// The role claim of the token.
    #[default]
    Token,
    /// The identity store, read per request.
    Store,
}

impl RoleSource {
    /// Returns the configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Store => "store",
        }
    }
}

impl fmt::Display for RoleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" => Ok(Self::Token),
            "store" => Ok(Self::Store),
            other => Err(CoreError::validation(format!(
                "Unknown role source '{other}', expected 'token' or 'store'"
            ))),
        }
    }
}

/// Resolves the actor in effect from the actor claimed by a token.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    /// Returns the effective actor.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` when the claimed subject cannot be accepted.
    async fn resolve(&self, claimed: Actor) -> CoreResult<Actor>;

    /// Returns the strategy this resolver implements.
    fn source(&self) -> RoleSource;
}

/// Trusts the token's role claim.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenRoleResolver;

#[async_trait]
impl RoleResolver for TokenRoleResolver {
    async fn resolve(&self, claimed: Actor) -> CoreResult<Actor> {
        Ok(claimed)
    }

    fn source(&self) -> RoleSource {
        RoleSource::Token
    }
}

/// Re-reads the subject's role from the identity store.
#[derive(Clone)]
pub struct StoreRoleResolver {
    identities: Arc<dyn IdentityStore>,
}

impl StoreRoleResolver {
    /// Creates a resolver over an identity store.
    pub fn new(identities: Arc<dyn IdentityStore>) -> Self {
        Self { identities }
    }
}

impl fmt::Debug for StoreRoleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreRoleResolver").finish_non_exhaustive()
    }
}

#[async_trait]
impl RoleResolver for StoreRoleResolver {
    async fn resolve(&self, claimed: Actor) -> CoreResult<Actor> {
        let identity = self
            .identities
            .find_by_id(claimed.id)
            .await?
            .ok_or_else(|| {
                debug!(user_id = %claimed.id, "Token subject no longer exists");
                CoreError::unauthenticated("Token subject does not exist")
            })?;

        if identity.role != claimed.role {
            debug!(
                user_id = %claimed.id,
                claimed = %claimed.role,
                stored = %identity.role,
                "Role refreshed from store"
            );
        }
        Ok(Actor::new(identity.id, identity.role))
    }

    fn source(&self) -> RoleSource {
        RoleSource::Store
    }
}

/// Builds the resolver for a configured role source.
pub fn resolver_for(source: RoleSource, identities: Arc<dyn IdentityStore>) -> Arc<dyn RoleResolver> {
    match source {
        RoleSource::Token => Arc::new(TokenRoleResolver),
        RoleSource::Store => Arc::new(StoreRoleResolver::new(identities)),
    }
}
