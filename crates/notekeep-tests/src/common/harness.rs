// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! An in-process application: the full router with middleware, fresh
//! in-memory stores and a fixed signing secret. Requests go through
//! `tower::ServiceExt::oneshot`, no socket is bound.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use notekeep_api::{ApiConfig, ApiServer, ApiServerBuilder, AppState, JwtConfig};
use notekeep_core::credentials::{RegistrationPolicy, RegistrationTrust};
use notekeep_core::roles::RoleSource;
use notekeep_core::store::{IdentityStore, NoteStore};
use notekeep_core::{Identity, Role};

use super::assertions::TestResponse;
use super::builders::RequestBuilder;
use super::fixtures::{NoteFixtures, UserFixture, UserFixtures, TEST_JWT_SECRET};

// =============================================================================
// TestAppBuilder
// =============================================================================

/// Builder for [`TestApp`].
pub struct TestAppBuilder {
    api_config: ApiConfig,
    jwt_config: JwtConfig,
    admin_emails: Vec<String>,
    role_source: RoleSource,
    identity_store: Option<Arc<dyn IdentityStore>>,
    note_store: Option<Arc<dyn NoteStore>>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            api_config: ApiConfig::default(),
            jwt_config: JwtConfig::new(TEST_JWT_SECRET),
            admin_emails: UserFixtures::admin_emails(),
            role_source: RoleSource::Token,
            identity_store: None,
            note_store: None,
        }
    }
}

impl TestAppBuilder {
    /// Sets where each request's role comes from.
    pub fn role_source(mut self, source: RoleSource) -> Self {
        self.role_source = source;
        self
    }

    /// Replaces the admin allow-list.
    pub fn admin_emails(mut self, emails: Vec<String>) -> Self {
        self.admin_emails = emails;
        self
    }

    /// Returns internal error details to clients.
    pub fn expose_internal_errors(mut self) -> Self {
        self.api_config = self.api_config.with_internal_errors_exposed(true);
        self
    }

    /// Sets the token lifetime.
    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.jwt_config = self.jwt_config.with_expiration(lifetime);
        self
    }

    /// Sets the session cookie name.
    pub fn cookie_name(mut self, name: &str) -> Self {
        self.api_config.cookie.name = name.to_string();
        self
    }

    /// Uses the given identity store.
    pub fn identity_store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.identity_store = Some(store);
        self
    }

    /// Uses the given note store.
    pub fn note_store(mut self, store: Arc<dyn NoteStore>) -> Self {
        self.note_store = Some(store);
        self
    }

    /// Builds the application.
    pub fn build(self) -> TestApp {
        let mut builder = ApiServerBuilder::new()
            .config(self.api_config)
            .jwt_config(self.jwt_config)
            .registration_policy(RegistrationPolicy::new(&self.admin_emails))
            .role_source(self.role_source);
        if let Some(store) = self.identity_store {
            builder = builder.identity_store(store);
        }
        if let Some(store) = self.note_store {
            builder = builder.note_store(store);
        }

        let server = match builder.build() {
            Ok(server) => server,
            Err(e) => panic!("failed to build test server: {e}"),
        };
        TestApp::new(server)
    }
}

// =============================================================================
// TestApp
// =============================================================================

/// The application under test.
pub struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    /// Starts a builder with default settings.
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    /// Creates an application with default settings.
    pub fn new_default() -> Self {
        Self::builder().build()
    }

    fn new(server: ApiServer) -> Self {
        Self {
            router: server.router(),
            state: server.state().clone(),
        }
    }

    /// Returns the shared state behind the router.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Sends a request through the full middleware stack.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(e) => match e {},
        };
        TestResponse::from_response(response).await
    }

    /// Sends a built request.
    pub async fn request(&self, builder: RequestBuilder) -> TestResponse {
        self.send(builder.build()).await
    }

    // =========================================================================
    // Auth shortcuts
    // =========================================================================

    /// Signs up through the API and returns the response.
    pub async fn signup(&self, user: &UserFixture) -> TestResponse {
        self.request(RequestBuilder::post("/api/auth/signup").json(user.signup_body()))
            .await
    }

    /// Signs up through the API and returns the token.
    pub async fn signup_token(&self, user: &UserFixture) -> String {
        let response = self.signup(user).await;
        response.assert_status(StatusCode::CREATED);
        response.token()
    }

    /// Logs in through the API.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        let body = serde_json::json!({ "email": email, "password": password });
        self.request(RequestBuilder::post("/api/auth/login").json(body))
            .await
    }

    /// Registers an admin directly, as startup bootstrap does, and returns a
    /// token for it.
    pub async fn bootstrap_admin(&self, user: &UserFixture) -> (Identity, String) {
        let identity = match self
            .state
            .credentials()
            .register(user.registration_as(Role::Admin), RegistrationTrust::Trusted)
            .await
        {
            Ok(identity) => identity,
            Err(e) => panic!("failed to bootstrap {}: {e}", user.email),
        };
        let token = self.issue(&identity);
        (identity, token)
    }

    /// Issues a token for an identity.
    pub fn issue(&self, identity: &Identity) -> String {
        match self.state.jwt().issue(identity) {
            Ok(token) => token,
            Err(e) => panic!("failed to issue token: {e}"),
        }
    }

    // =========================================================================
    // Note shortcuts
    // =========================================================================

    /// Creates the standard note and returns its id.
    pub async fn create_note(&self, token: &str) -> String {
        let response = self
            .request(
                RequestBuilder::post("/api/notes")
                    .bearer(token)
                    .json(NoteFixtures::create_body()),
            )
            .await;
        response.assert_status(StatusCode::CREATED);
        response.str_field("/id")
    }
}
