// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::net::IpAddr;

use notekeep_core::{Actor, UserId};
use serde::Serialize;
use uuid::Uuid;

/// Authentication context for a request.
///
/// Attached to every request by the auth middleware. Public routes carry an
/// anonymous context; protected routes only run with a resolved actor.
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    /// The effective actor, after role resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<Actor>,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
    /// Request ID for tracing.
    pub request_id: Uuid,
}

impl AuthContext {
    /// Creates a context for a verified actor.
    pub fn authenticated(actor: Actor) -> Self {
        Self {
            actor: Some(actor),
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Creates an anonymous context (for unauthenticated requests).
    pub fn anonymous() -> Self {
        Self {
            actor: None,
            client_ip: None,
            request_id: Uuid::now_v7(),
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the actor, if any.
    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    /// Returns the actor's id, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.actor.map(|a| a.id)
    }

    /// Returns `true` if this is an anonymous context.
    pub fn is_anonymous(&self) -> bool {
        self.actor.is_none()
    }

    /// Returns `true` if the actor holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.actor.is_some_and(|a| a.is_admin())
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use notekeep_core::Role;

    use super::*;

    #[test]
    fn test_authenticated_context() {
        let actor = Actor::new(UserId::new(), Role::Admin);
        let ctx = AuthContext::authenticated(actor);

        assert!(!ctx.is_anonymous());
        assert!(ctx.is_admin());
        assert_eq!(ctx.user_id(), Some(actor.id));
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = AuthContext::anonymous();

        assert!(ctx.is_anonymous());
        assert!(!ctx.is_admin());
        assert!(ctx.actor().is_none());
    }

    #[test]
    fn test_builder_fields() {
        let request_id = Uuid::now_v7();
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        let ctx = AuthContext::anonymous()
            .with_request_id(request_id)
            .with_client_ip(ip);

        assert_eq!(ctx.request_id, request_id);
        assert_eq!(ctx.client_ip, Some(ip));
    }
}
