// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Internal error diagnostics.

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ErrorDiagnostic;

/// Re-renders 500 bodies with their internal diagnostic.
///
/// Installed with `axum::middleware::map_response` only when
/// `expose_internal_errors` is on. Other responses pass through untouched.
pub async fn attach_diagnostics(response: Response) -> Response {
    let Some(diagnostic) = response.extensions().get::<ErrorDiagnostic>().cloned() else {
        return response;
    };

    let status = response.status();
    (status, Json(diagnostic.exposed_body())).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::StatusCode;

    use super::*;
    use crate::error::ApiError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_internal_error_gains_diagnostic() {
        let response = attach_diagnostics(ApiError::internal("disk on fire").into_response()).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["details"]["diagnostic"], "disk on fire");
    }

    #[tokio::test]
    async fn test_client_error_untouched() {
        let response = attach_diagnostics(ApiError::not_found("Note").into_response()).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert!(body["error"].get("details").is_none());
    }
}
