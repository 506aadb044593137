// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Builders for HTTP requests sent through the router.
//!
//! ```rust,ignore
//! let request = RequestBuilder::post("/api/notes")
//!     .bearer(&token)
//!     .json(NoteFixtures::create_body())
//!     .build();
//! ```

use axum::body::Body;
use axum::http::{header, Method, Request};
use serde_json::Value;

// =============================================================================
// RequestBuilder
// =============================================================================

/// Builds a `Request<Body>` for `tower::ServiceExt::oneshot`.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl RequestBuilder {
    /// Starts a request.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Starts a GET request.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(uri: impl Into<String>) -> Self {
        Self::new(Method::PUT, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new(Method::DELETE, uri)
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Presents a token in the `Authorization` header.
    pub fn bearer(self, token: &str) -> Self {
        self.header(header::AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    /// Presents a token in the `token` cookie.
    pub fn cookie(self, token: &str) -> Self {
        self.named_cookie(notekeep_api::config::DEFAULT_COOKIE_NAME, token)
    }

    /// Presents a token in a cookie with a custom name.
    pub fn named_cookie(self, name: &str, token: &str) -> Self {
        self.header(header::COOKIE.as_str(), format!("{name}={token}"))
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body.to_string());
        self.header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    /// Sets a raw body sent as JSON.
    pub fn raw_json(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    /// Builds the request.
    pub fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let body = self.body.map(Body::from).unwrap_or_else(Body::empty);

        match builder.body(body) {
            Ok(request) => request,
            Err(e) => panic!("invalid test request {}: {e}", self.uri),
        }
    }
}
