// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token authentication middleware.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use notekeep_core::roles::RoleResolver;
use tower::{Layer, Service};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::auth::{AuthContext, JwtManager};
use crate::config::DEFAULT_COOKIE_NAME;
use crate::error::{ApiError, AuthFailure};

/// Paths served without a token.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/api/auth/signup",
    "/api/auth/login",
    "/api/auth/logout",
];

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for token authentication.
///
/// Protected requests must present a token in the session cookie or an
/// `Authorization: Bearer` header; the cookie wins when both are present.
/// The verified actor is passed through the [`RoleResolver`] before it is
/// attached as an [`AuthContext`].
#[derive(Clone)]
pub struct AuthLayer {
    jwt_manager: Arc<JwtManager>,
    role_resolver: Arc<dyn RoleResolver>,
    cookie_name: Arc<str>,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(jwt_manager: Arc<JwtManager>, role_resolver: Arc<dyn RoleResolver>) -> Self {
        Self {
            jwt_manager,
            role_resolver,
            cookie_name: Arc::from(DEFAULT_COOKIE_NAME),
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Sets the cookie the token is read from.
    pub fn with_cookie_name(mut self, name: impl AsRef<str>) -> Self {
        self.cookie_name = Arc::from(name.as_ref());
        self
    }

    /// Adds public paths that don't require authentication.
    ///
    /// A trailing `*` matches any path with that prefix.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }

    /// Creates with default public paths.
    pub fn with_default_public_paths(self) -> Self {
        self.with_public_paths(DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect())
    }
}

impl fmt::Debug for AuthLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthLayer")
            .field("cookie_name", &self.cookie_name)
            .field("role_source", &self.role_resolver.source())
            .field("public_paths", &self.public_paths)
            .finish()
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt_manager: self.jwt_manager.clone(),
            role_resolver: self.role_resolver.clone(),
            cookie_name: self.cookie_name.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for token authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt_manager: Arc<JwtManager>,
    role_resolver: Arc<dyn RoleResolver>,
    cookie_name: Arc<str>,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    /// Checks if a path is public.
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        self.public_paths.iter().any(|public_path| {
            public_path
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix))
        })
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let jwt_manager = self.jwt_manager.clone();
        let role_resolver = self.role_resolver.clone();
        let is_public = self.is_public_path(req.uri().path());
        let token = extract_token(&req, &self.cookie_name);

        // Take the service that was driven to readiness and leave a clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let request_id = Uuid::now_v7();
            let client_ip = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());

            let auth_ctx = if is_public {
                AuthContext::anonymous()
            } else {
                let claimed = match jwt_manager.verify_presented(token.as_deref()) {
                    Ok(actor) => actor,
                    Err(e) => {
                        tracing::debug!(
                            request_id = %request_id,
                            reason = e.reason(),
                            path = %req.uri().path(),
                            "Token rejected"
                        );
                        return Ok(ApiError::from(e).into_response());
                    }
                };

                match role_resolver.resolve(claimed).await {
                    Ok(actor) => AuthContext::authenticated(actor),
                    Err(e) if e.is_internal() => {
                        return Ok(ApiError::from(e).into_response());
                    }
                    Err(e) => {
                        tracing::debug!(
                            error = %e,
                            user_id = %claimed.id,
                            role_source = %role_resolver.source(),
                            "Token subject rejected"
                        );
                        return Ok(ApiError::unauthenticated(AuthFailure::TokenMalformed)
                            .into_response());
                    }
                }
            };

            let auth_ctx = auth_ctx.with_request_id(request_id);
            let auth_ctx = match client_ip {
                Some(ip) => auth_ctx.with_client_ip(ip),
                None => auth_ctx,
            };

            req.extensions_mut().insert(auth_ctx);
            inner.call(req).await
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Extracts the token, preferring the session cookie over the bearer header.
fn extract_token<B>(req: &Request<B>, cookie_name: &str) -> Option<String> {
    extract_cookie_token(req, cookie_name).or_else(|| extract_bearer_token(req))
}

/// Reads a named cookie through the cookie manager's jar.
///
/// Quoted values are unquoted. Requires `CookieManagerLayer` outside this
/// middleware.
fn extract_cookie_token<B>(req: &Request<B>, cookie_name: &str) -> Option<String> {
    req.extensions()
        .get::<Cookies>()
        .and_then(|cookies| cookies.get(cookie_name))
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|token| !token.is_empty())
}

/// Extracts the bearer token from the Authorization header.
///
/// The scheme is matched case-insensitively.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(char::is_whitespace)?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use notekeep_core::roles::TokenRoleResolver;

    use super::*;
    use crate::auth::JwtConfig;

    fn request() -> Request<Body> {
        Request::builder().uri("/test").body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut req = request();
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert!(extract_bearer_token(&req).is_none());

        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer mytoken123"),
        );
        assert_eq!(extract_bearer_token(&req), Some("mytoken123".to_string()));

        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("bearer mytoken123"),
        );
        assert_eq!(extract_bearer_token(&req), Some("mytoken123".to_string()));

        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("BEARER   mytoken123 "),
        );
        assert_eq!(extract_bearer_token(&req), Some("mytoken123".to_string()));
    }

    #[test]
    fn test_cookie_requires_cookie_manager() {
        let mut req = request();
        req.headers_mut()
            .insert(header::COOKIE, HeaderValue::from_static("token=from-cookie"));
        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );

        assert_eq!(extract_cookie_token(&req, "token"), None);
        assert_eq!(extract_token(&req, "token"), Some("from-header".to_string()));
    }

    #[test]
    fn test_public_paths() {
        let jwt_manager = Arc::new(
            JwtManager::new(JwtConfig::new("test-secret-key-for-testing-purposes")).unwrap(),
        );
        let layer = AuthLayer::new(jwt_manager, Arc::new(TokenRoleResolver))
            .with_public_paths(vec!["/health".to_string(), "/public/*".to_string()]);

        let middleware = layer.layer(tower::service_fn(|_req: Request<Body>| async {
            Ok::<_, std::convert::Infallible>(Response::new(Body::empty()))
        }));

        assert!(middleware.is_public_path("/health"));
        assert!(middleware.is_public_path("/public/anything"));
        assert!(!middleware.is_public_path("/api/notes"));
    }

    #[test]
    fn test_default_public_paths() {
        assert!(DEFAULT_PUBLIC_PATHS.contains(&"/api/auth/login"));
        assert!(!DEFAULT_PUBLIC_PATHS.contains(&"/api/auth/verify"));
    }
}
