// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use std::fmt;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notekeep_core::credentials::{Registration, RegistrationTrust};
use notekeep_core::{IdentitySummary, Role};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::error::ApiResult;
use crate::extractors::{Auth, ClientIp, ValidatedJson};
use crate::response::{AuthResponse, MessageResponse};
use crate::state::AppState;

// =============================================================================
// Signup
// =============================================================================

/// Signup request body.
#[derive(Deserialize)]
pub struct SignupRequest {
    /// Display name.
    #[serde(default)]
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Password.
    #[serde(default)]
    pub password: String,
    /// Requested role. Admin is only granted to allow-listed emails.
    #[serde(default)]
    pub role: Option<Role>,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .field("role", &self.role)
            .finish()
    }
}

/// POST /api/auth/signup
///
/// Registers an identity and starts a session for it.
pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> ApiResult<Response> {
    let mut registration = Registration::new(request.username, request.email, request.password);
    if let Some(role) = request.role {
        registration = registration.with_role(role);
    }

    let identity = state
        .credentials()
        .register(registration, RegistrationTrust::Public)
        .await?;
    let token = state.jwt().issue(&identity)?;

    tracing::info!(
        user_id = %identity.id,
        role = %identity.role,
        client_ip = ?client_ip,
        "User signed up"
    );

    Ok(start_session(
        &state,
        &cookies,
        StatusCode::CREATED,
        token,
        identity.summary(),
    ))
}

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// POST /api/auth/login
///
/// Authenticates by email and password and returns a token.
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Response> {
    let identity = state
        .credentials()
        .authenticate(&request.email, &request.password)
        .await?;
    let token = state.jwt().issue(&identity)?;

    tracing::info!(user_id = %identity.id, client_ip = ?client_ip, "User logged in");

    Ok(start_session(
        &state,
        &cookies,
        StatusCode::OK,
        token,
        identity.summary(),
    ))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/auth/logout
///
/// Clears the session cookie. Tokens are stateless, so a copy held elsewhere
/// stays valid until it expires.
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> impl IntoResponse {
    cookies.add(state.config.cookie.cleared());
    Json(MessageResponse::ok("Logged out successfully"))
}

// =============================================================================
// Verify
// =============================================================================

/// GET /api/auth/verify
///
/// Returns the caller's current identity.
pub async fn verify(
    State(state): State<AppState>,
    Auth(actor): Auth,
) -> ApiResult<Json<IdentitySummary>> {
    let summary = state.identities().current(Some(&actor)).await?;
    Ok(Json(summary))
}

// =============================================================================
// Helpers
// =============================================================================

fn start_session(
    state: &AppState,
    cookies: &Cookies,
    status: StatusCode,
    token: String,
    user: IdentitySummary,
) -> Response {
    let expires_in = state.jwt().expiration_secs();
    cookies.add(state.config.cookie.session(token.clone(), expires_in));

    (status, Json(AuthResponse::new(token, expires_in, user))).into_response()
}

// =============================================================================
// Tests
// =============================================================================
