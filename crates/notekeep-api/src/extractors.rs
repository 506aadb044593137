// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Custom extractors for API handlers.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts, Path},
    http::request::Parts,
    Json,
};
use notekeep_core::{Actor, NoteId, UserId};
use serde::de::DeserializeOwned;

use crate::auth::AuthContext;
use crate::error::{ApiError, AuthFailure};

// =============================================================================
// Auth Extractor
// =============================================================================

/// Extractor for authenticated requests.
///
/// Yields the effective [`Actor`] attached by the auth middleware. Returns
/// 401 if the request is anonymous.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Auth(actor): Auth) -> impl IntoResponse {
///     format!("Hello, {}", actor.id)
/// }
/// ```
pub struct Auth(pub Actor);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.actor)
            .map(Auth)
            .ok_or_else(|| ApiError::unauthenticated(AuthFailure::TokenMissing))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// Extractor for validated JSON payloads.
///
/// Malformed bodies and missing fields are reported as 400.
pub struct ValidatedJson<T>(pub T);

impl<S, T> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        Ok(ValidatedJson(value))
    }
}

// =============================================================================
// Id Path Extractors
// =============================================================================

async fn single_path_segment<S>(parts: &mut Parts, state: &S, label: &str) -> Result<String, ApiError>
where
    S: Send + Sync,
{
    let Path(raw) = Path::<String>::from_request_parts(parts, state)
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid {label} id: {}", e.body_text())))?;
    Ok(raw)
}

/// Extractor for a note id from the path.
pub struct NoteIdPath(pub NoteId);

impl<S> FromRequestParts<S> for NoteIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = single_path_segment(parts, state, "note").await?;
        Ok(NoteIdPath(NoteId::parse(&raw)?))
    }
}

/// Extractor for a user id from the path.
pub struct UserIdPath(pub UserId);

impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = single_path_segment(parts, state, "user").await?;
        Ok(UserIdPath(UserId::parse(&raw)?))
    }
}

// =============================================================================
// Client IP Extractor
// =============================================================================

/// Extractor for the client IP address.
///
/// This is the connection's peer address. Forwarding headers such as
/// `X-Forwarded-For` are caller-controlled and never consulted.
pub struct ClientIp(pub Option<std::net::IpAddr>);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.client_ip)
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ci| ci.0.ip())
            });

        Ok(ClientIp(peer))
    }
}

// =============================================================================
// Tests
// =============================================================================
