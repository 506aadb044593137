// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every handler returns [`ApiResult`]. Errors map to an HTTP status and a
//! JSON body of the form `{"error": {"code", "message", "details"?}}`.
//! Internal diagnostics never reach the body directly; they ride along as an
//! [`ErrorDiagnostic`] response extension that the diagnostics middleware
//! exposes only when configured to.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notekeep_core::credentials::CredentialError;
use notekeep_core::CoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// AuthFailure
// =============================================================================

/// Why a request was not authenticated.
///
/// Clients use this to choose between "log in" and "log in again".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailure {
    /// No token was presented.
    TokenMissing,
    /// The token failed signature, issuer or claim validation.
    TokenMalformed,
    /// The token was valid but has expired.
    TokenExpired,
    /// Login credentials did not match an account.
    BadCredentials,
}

impl AuthFailure {
    /// Returns the wire name of this failure.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFailure::TokenMissing => "token_missing",
            AuthFailure::TokenMalformed => "token_malformed",
            AuthFailure::TokenExpired => "token_expired",
            AuthFailure::BadCredentials => "bad_credentials",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
///
/// This error type is designed to be returned from handlers and automatically
/// converted to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Validation error (400).
    #[error("Validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },

    /// Unauthorized (401).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message.
        message: String,
        /// Machine-readable cause, when known.
        reason: Option<AuthFailure>,
    },

    /// Forbidden (403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message.
        message: String,
    },

    /// Conflict (409).
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error without a specific cause.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            reason: None,
        }
    }

    /// Creates an unauthorized error tagged with its cause.
    pub fn unauthenticated(reason: AuthFailure) -> Self {
        let message = match reason {
            AuthFailure::TokenMissing => "Authentication required",
            AuthFailure::TokenMalformed => "Invalid authentication token",
            AuthFailure::TokenExpired => "Authentication token has expired",
            AuthFailure::BadCredentials => "Invalid email or password",
        };
        Self::Unauthorized {
            message: message.to_string(),
            reason: Some(reason),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns the authentication failure cause, if any.
    pub fn auth_failure(&self) -> Option<AuthFailure> {
        match self {
            ApiError::Unauthorized { reason, .. } => *reason,
            _ => None,
        }
    }

    /// Returns a user-friendly error message.
    ///
    /// This message is safe to show to end users and does not expose
    /// internal implementation details.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { resource } => format!("{resource} not found"),
            ApiError::BadRequest { message } => message.clone(),
            ApiError::Validation { message } => message.clone(),
            ApiError::Unauthorized { message, .. } => message.clone(),
            ApiError::Forbidden { message } => message.clone(),
            ApiError::Conflict { message } => message.clone(),
            ApiError::Internal { .. } => "An internal error occurred".to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ApiError::Internal { .. })
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Unauthorized {
                reason: Some(reason),
                ..
            } => Some(serde_json::json!({ "reason": reason.as_str() })),
            _ => None,
        }
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.user_message();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
                details: self.error_details(),
            },
        };

        let diagnostic = match &self {
            ApiError::Internal { message } => Some(ErrorDiagnostic {
                body: body.clone(),
                detail: message.clone(),
            }),
            _ => None,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(diagnostic) = diagnostic {
            response.extensions_mut().insert(diagnostic);
        }
        response
    }
}

/// Internal error detail carried on a response as an extension.
///
/// The body has already been rendered without it; the diagnostics middleware
/// re-renders the body with `details.diagnostic` when enabled.
#[derive(Debug, Clone)]
pub struct ErrorDiagnostic {
    /// The body as rendered for clients.
    pub body: ErrorResponseBody,
    /// The internal message.
    pub detail: String,
}

impl ErrorDiagnostic {
    /// Returns the body with the diagnostic attached.
    pub fn exposed_body(&self) -> ErrorResponseBody {
        let mut body = self.body.clone();
        let mut details = match body.error.details.take() {
            Some(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        details.insert(
            "diagnostic".to_string(),
            serde_json::Value::String(self.detail.clone()),
        );
        body.error.details = Some(serde_json::Value::Object(details));
        body
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => ApiError::validation(message),
            CoreError::Unauthenticated { message } => ApiError::unauthorized(message),
            CoreError::Forbidden { message } => ApiError::forbidden(message),
            CoreError::NotFound { resource } => ApiError::not_found(resource),
            CoreError::Conflict { message } => ApiError::conflict(message),
            CoreError::Internal { message } => ApiError::internal(message),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::UnknownAccount | CredentialError::BadCredential => {
                ApiError::unauthenticated(AuthFailure::BadCredentials)
            }
            other => CoreError::from(other).into(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
