// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Note records and validated inputs for creating and editing them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::identity::IdentitySummary;
use crate::types::{NoteId, UserId};

// =============================================================================
// Note
// =============================================================================

/// A text note owned by exactly one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note id.
    pub id: NoteId,
    /// Non-blank title.
    pub title: String,
    /// Non-blank body.
    pub content: String,
    /// Owning identity. Immutable after creation.
    pub owner: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a note owned by `owner` from a validated draft.
    pub fn new(owner: UserId, draft: NoteDraft) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::new(),
            title: draft.title,
            content: draft.content,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` if `user` owns this note.
    #[inline]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Applies a validated patch and bumps `updated_at`.
    pub fn apply(&mut self, patch: NotePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        self.updated_at = Utc::now();
    }
}

/// A note joined with its owner's summary, as returned by the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedNote {
    /// The note itself.
    #[serde(flatten)]
    pub note: Note,
    /// The owner's summary, when the owner record is present.
    pub author: Option<IdentitySummary>,
}

// =============================================================================
// Inputs
// =============================================================================

fn required(field: &str, value: impl Into<String>) -> CoreResult<String> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(CoreError::validation(format!("{field} must not be empty")));
    }
    Ok(value)
}

/// Validated input for creating a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    title: String,
    content: String,
}

impl NoteDraft {
    /// Validates that both title and content are non-blank.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> CoreResult<Self> {
        Ok(Self {
            title: required("title", title)?.trim().to_string(),
            content: required("content", content)?,
        })
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the content.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Validated partial update of a note.
///
/// At least one field is present and every present field is non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePatch {
    title: Option<String>,
    content: Option<String>,
}

impl NotePatch {
    /// Validates a partial update.
    pub fn new(title: Option<String>, content: Option<String>) -> CoreResult<Self> {
        if title.is_none() && content.is_none() {
            return Err(CoreError::validation(
                "At least one of title or content must be provided",
            ));
        }
        Ok(Self {
            title: title
                .map(|t| required("title", t).map(|t| t.trim().to_string()))
                .transpose()?,
            content: content.map(|c| required("content", c)).transpose()?,
        })
    }
}
