// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Note handlers.
//!
//! Every handler passes the caller's actor to [`NoteService`], which decides
//! ownership through the access policy.
//!
//! [`NoteService`]: notekeep_core::service::NoteService

use axum::{extract::State, Json};
use notekeep_core::{Note, NoteDraft, NotePatch};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{Auth, NoteIdPath, ValidatedJson};
use crate::response::{Created, MessageResponse};
use crate::state::AppState;

/// Create note request body.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Body.
    #[serde(default)]
    pub content: String,
}

/// Update note request body. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New body.
    #[serde(default)]
    pub content: Option<String>,
}

/// GET /api/notes
///
/// Lists the caller's notes, newest first.
pub async fn list_notes(
    State(state): State<AppState>,
    Auth(actor): Auth,
) -> ApiResult<Json<Vec<Note>>> {
    let notes = state.notes().list_own(Some(&actor)).await?;
    Ok(Json(notes))
}

/// POST /api/notes
pub async fn create_note(
    State(state): State<AppState>,
    Auth(actor): Auth,
    ValidatedJson(request): ValidatedJson<CreateNoteRequest>,
) -> ApiResult<Created<Note>> {
    let draft = NoteDraft::new(request.title, request.content)?;
    let note = state.notes().create(Some(&actor), draft).await?;
    Ok(Created(note))
}

/// GET /api/notes/{id}
pub async fn get_note(
    State(state): State<AppState>,
    Auth(actor): Auth,
    NoteIdPath(id): NoteIdPath,
) -> ApiResult<Json<Note>> {
    let note = state.notes().get(Some(&actor), id).await?;
    Ok(Json(note))
}

/// PUT /api/notes/{id}
pub async fn update_note(
    State(state): State<AppState>,
    Auth(actor): Auth,
    NoteIdPath(id): NoteIdPath,
    ValidatedJson(request): ValidatedJson<UpdateNoteRequest>,
) -> ApiResult<Json<Note>> {
    let patch = NotePatch::new(request.title, request.content)?;
    let note = state.notes().update(Some(&actor), id, patch).await?;
    Ok(Json(note))
}

/// DELETE /api/notes/{id}
pub async fn delete_note(
    State(state): State<AppState>,
    Auth(actor): Auth,
    NoteIdPath(id): NoteIdPath,
) -> ApiResult<Json<MessageResponse>> {
    state.notes().delete(Some(&actor), id).await?;
    Ok(Json(MessageResponse::ok("Note deleted successfully")))
}
