// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Admin handlers.

use axum::{extract::State, Json};
use notekeep_core::{IdentitySummary, OwnedNote};

use crate::error::ApiResult;
use crate::extractors::{Auth, UserIdPath};
use crate::state::AppState;

/// GET /api/admin/notes
///
/// Lists every note with its owner's summary, newest first. Admin only.
pub async fn list_all_notes(
    State(state): State<AppState>,
    Auth(actor): Auth,
) -> ApiResult<Json<Vec<OwnedNote>>> {
    let notes = state.notes().list_all(Some(&actor)).await?;
    Ok(Json(notes))
}

/// GET /api/admin/users
///
/// Lists every identity, newest first. Admin only.
pub async fn list_users(
    State(state): State<AppState>,
    Auth(actor): Auth,
) -> ApiResult<Json<Vec<IdentitySummary>>> {
    let users = state.identities().list(Some(&actor)).await?;
    Ok(Json(users))
}

/// PUT /api/admin/promote/{user_id}
///
/// Grants the admin role. Only the first admin may call this.
pub async fn promote_user(
    State(state): State<AppState>,
    Auth(actor): Auth,
    UserIdPath(target): UserIdPath,
) -> ApiResult<Json<IdentitySummary>> {
    let promoted = state.identities().promote(Some(&actor), target).await?;
    Ok(Json(promoted))
}
