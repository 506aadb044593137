// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions
//!
//! Assertion helpers for HTTP responses and core results.
//!
//! Response assertions return `&Self` so they chain:
//!
//! ```rust,ignore
//! response
//!     .assert_status(StatusCode::UNAUTHORIZED)
//!     .assert_error_code("UNAUTHORIZED")
//!     .assert_auth_reason("token_expired");
//! ```

use axum::body::to_bytes;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use notekeep_core::CoreResult;
use serde_json::Value;

// =============================================================================
// TestResponse
// =============================================================================

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Parsed JSON body, `Value::Null` when the body is empty.
    pub body: Value,
}

impl TestResponse {
    /// Buffers a router response.
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = match to_bytes(response.into_body(), usize::MAX).await {
            Ok(bytes) => bytes,
            Err(e) => panic!("failed to read response body: {e}"),
        };
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(e) => panic!(
                    "response body is not JSON ({e}): {}",
                    String::from_utf8_lossy(&bytes)
                ),
            }
        };

        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the `Set-Cookie` header, if any.
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }

    /// Returns the issued token from an auth response body.
    pub fn token(&self) -> String {
        match self.body["token"].as_str() {
            Some(token) => token.to_string(),
            None => panic!("response has no token: {}", self.body),
        }
    }

    /// Returns a string field of the body.
    pub fn str_field(&self, pointer: &str) -> String {
        match self.body.pointer(pointer).and_then(Value::as_str) {
            Some(value) => value.to_string(),
            None => panic!("response has no string at {pointer}: {}", self.body),
        }
    }

    /// Returns the `error.details.reason` of an error body, if any.
    pub fn auth_reason(&self) -> Option<&str> {
        self.body.pointer("/error/details/reason").and_then(Value::as_str)
    }

    /// Asserts the status code.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {} with body {}",
            expected, self.status, self.body
        );
        self
    }

    /// Asserts the `error.code` of an error body.
    #[track_caller]
    pub fn assert_error_code(&self, expected: &str) -> &Self {
        assert_eq!(
            self.body["error"]["code"].as_str(),
            Some(expected),
            "Expected error code {}, got body {}",
            expected,
            self.body
        );
        self
    }

    /// Asserts the unauthenticated reason detail.
    #[track_caller]
    pub fn assert_auth_reason(&self, expected: &str) -> &Self {
        assert_eq!(
            self.auth_reason(),
            Some(expected),
            "Expected auth reason {}, got body {}",
            expected,
            self.body
        );
        self
    }
}

// =============================================================================
// CoreResult Assertions
// =============================================================================

/// Assertions on `CoreResult` outcome kinds.
pub trait CoreResultAssertions {
    /// Asserts the result failed with the given kind (`forbidden`,
    /// `not_found`, ...).
    fn assert_kind(&self, expected: &str);
}

impl<T: std::fmt::Debug> CoreResultAssertions for CoreResult<T> {
    #[track_caller]
    fn assert_kind(&self, expected: &str) {
        match self {
            Err(e) => assert_eq!(e.kind(), expected, "Expected {expected}, got {e:?}"),
            Ok(value) => panic!("Expected {expected} error, got Ok({value:?})"),
        }
    }
}
