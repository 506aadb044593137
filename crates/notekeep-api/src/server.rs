// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post, put},
    Router,
};
use notekeep_core::credentials::RegistrationPolicy;
use notekeep_core::roles::RoleSource;
use notekeep_core::store::{IdentityStore, NoteStore};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::auth::{JwtConfig, JwtManager};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{attach_diagnostics, AuthLayer};
use crate::state::{AppState, AppStateBuilder};

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Returns the shared application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let cors = create_cors_layer(&self.config);
        let auth = AuthLayer::new(
            self.state.jwt_manager.clone(),
            self.state.role_resolver.clone(),
        )
        .with_cookie_name(&self.config.cookie.name)
        .with_default_public_paths();

        // Build the middleware stack
        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .layer(cors)
            .layer(DefaultBodyLimit::max(self.config.max_body_size))
            .layer(CookieManagerLayer::new())
            .layer(auth);

        let router = Router::new()
            // Health (public)
            .route("/health", get(handlers::health))
            // Auth
            .route("/api/auth/signup", post(handlers::signup))
            .route("/api/auth/login", post(handlers::login))
            .route("/api/auth/logout", post(handlers::logout))
            .route("/api/auth/verify", get(handlers::verify))
            // Notes
            .route(
                "/api/notes",
                get(handlers::list_notes).post(handlers::create_note),
            )
            .route(
                "/api/notes/{id}",
                get(handlers::get_note)
                    .put(handlers::update_note)
                    .delete(handlers::delete_note),
            )
            // Admin
            .route("/api/admin/notes", get(handlers::list_all_notes))
            .route("/api/admin/users", get(handlers::list_users))
            .route("/api/admin/promote/{user_id}", put(handlers::promote_user))
            .fallback(route_not_found)
            // Apply middleware and state
            .layer(middleware_stack)
            .with_state(self.state.clone());

        if self.config.expose_internal_errors {
            router.layer(axum::middleware::map_response(attach_diagnostics))
        } else {
            router
        }
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {addr}: {e}")))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {e}")))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
///
/// Browsers reject a wildcard origin on credentialed requests, so `*` with
/// credentials mirrors the request origin instead.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = &config.cors;

    let origin = if cors.allows_any_origin() {
        if cors.allow_credentials {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::from(Any)
        }
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(cors.allow_credentials)
        .max_age(Duration::from_secs(cors.max_age))
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
#[derive(Default)]
pub struct ApiServerBuilder {
    state_builder: AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self {
            state_builder: AppState::builder(),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the JWT manager.
    pub fn jwt_manager(mut self, manager: Arc<JwtManager>) -> Self {
        self.state_builder = self.state_builder.jwt_manager(manager);
        self
    }

    /// Sets the JWT configuration.
    pub fn jwt_config(mut self, config: JwtConfig) -> Self {
        self.state_builder = self.state_builder.jwt_config(config);
        self
    }

    /// Sets the identity store.
    pub fn identity_store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.state_builder = self.state_builder.identity_store(store);
        self
    }

    /// Sets the note store.
    pub fn note_store(mut self, store: Arc<dyn NoteStore>) -> Self {
        self.state_builder = self.state_builder.note_store(store);
        self
    }

    /// Sets the registration policy.
    pub fn registration_policy(mut self, policy: RegistrationPolicy) -> Self {
        self.state_builder = self.state_builder.registration_policy(policy);
        self
    }

    /// Sets the role source.
    pub fn role_source(mut self, source: RoleSource) -> Self {
        self.state_builder = self.state_builder.role_source(source);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::config::CorsConfig;

    fn server() -> ApiServer {
        ApiServerBuilder::new()
            .jwt_config(JwtConfig::new("test-secret-key-that-is-long-enough"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_server_builder() {
        assert_eq!(server().addr().port(), 8080);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = server()
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = server()
            .router()
            .oneshot(Request::get("/api/notes").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["details"]["reason"], "token_missing");
    }

    #[test]
    fn test_cors_layer_variants() {
        let mut config = ApiConfig::default();
        let _ = create_cors_layer(&config);

        config.cors.allow_credentials = true;
        let _ = create_cors_layer(&config);

        config.cors = CorsConfig {
            allowed_origins: vec!["https://notes.example.com".into(), "\n".into()],
            allow_credentials: true,
            max_age: 600,
        };
        let _ = create_cors_layer(&config);
    }
}
