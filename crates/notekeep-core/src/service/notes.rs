// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{CoreError, CoreResult};
use crate::note::{Note, NoteDraft, NotePatch, OwnedNote};
use crate::policy::{AccessPolicy, Operation, Resource};
use crate::store::{IdentityStore, NoteStore};
use crate::types::{Actor, NoteId};

/// Note operations gated by the access policy.
#[derive(Clone)]
pub struct NoteService {
    notes: Arc<dyn NoteStore>,
    identities: Arc<dyn IdentityStore>,
    policy: AccessPolicy,
}

impl NoteService {
    /// Creates a note service.
    pub fn new(notes: Arc<dyn NoteStore>, identities: Arc<dyn IdentityStore>) -> Self {
        Self {
            notes,
            identities,
            policy: AccessPolicy::new(),
        }
    }

    fn authorize(
        &self,
        actor: Option<&Actor>,
        operation: Operation,
        resource: Resource<'_>,
    ) -> CoreResult<()> {
        self.policy
            .check(actor, operation, resource)
            .inspect_err(|e| {
                if let CoreError::Forbidden { .. } = e {
                    warn!(
                        user_id = ?actor.map(|a| a.id),
                        operation = %operation,
                        "Operation denied"
                    );
                }
            })
    }

    /// Creates a note owned by the actor.
    pub async fn create(&self, actor: Option<&Actor>, draft: NoteDraft) -> CoreResult<Note> {
        self.authorize(actor, Operation::CreateNote, Resource::None)?;
        let actor = actor.ok_or_else(|| CoreError::unauthenticated("Authentication required"))?;

        let note = self.notes.insert(Note::new(actor.id, draft)).await?;
        info!(note_id = %note.id, user_id = %actor.id, "Note created");
        Ok(note)
    }

    /// Lists the actor's own notes, newest first.
    pub async fn list_own(&self, actor: Option<&Actor>) -> CoreResult<Vec<Note>> {
        self.authorize(actor, Operation::ListOwnNotes, Resource::None)?;
        let actor = actor.ok_or_else(|| CoreError::unauthenticated("Authentication required"))?;
        Ok(self.notes.find_by_owner(actor.id).await?)
    }

    /// Lists every note with its owner's summary, newest first.
    pub async fn list_all(&self, actor: Option<&Actor>) -> CoreResult<Vec<OwnedNote>> {
        self.authorize(actor, Operation::ListAllNotes, Resource::None)?;

        let owners: HashMap<_, _> = self
            .identities
            .list_all()
            .await?
            .into_iter()
            .map(|summary| (summary.id, summary))
            .collect();

        Ok(self
            .notes
            .list_all()
            .await?
            .into_iter()
            .map(|note| OwnedNote {
                author: owners.get(&note.owner).cloned(),
                note,
            })
            .collect())
    }

    /// Reads a single note.
    pub async fn get(&self, actor: Option<&Actor>, id: NoteId) -> CoreResult<Note> {
        let note = self.load(actor, Operation::ReadNote, id).await?;
        Ok(note)
    }

    /// Applies a partial update to a note.
    pub async fn update(
        &self,
        actor: Option<&Actor>,
        id: NoteId,
        patch: NotePatch,
    ) -> CoreResult<Note> {
        let mut note = self.load(actor, Operation::UpdateNote, id).await?;
        note.apply(patch);

        let note = self
            .notes
            .update(note)
            .await?
            .ok_or_else(|| CoreError::not_found("Note"))?;
        info!(note_id = %note.id, user_id = ?actor.map(|a| a.id), "Note updated");
        Ok(note)
    }

    /// Deletes a note, returning the removed record.
    pub async fn delete(&self, actor: Option<&Actor>, id: NoteId) -> CoreResult<Note> {
        self.load(actor, Operation::DeleteNote, id).await?;

        let note = self
            .notes
            .delete(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Note"))?;
        info!(note_id = %note.id, user_id = ?actor.map(|a| a.id), "Note deleted");
        Ok(note)
    }

    /// Authenticates, looks up and authorizes a single-note operation.
    async fn load(
        &self,
        actor: Option<&Actor>,
        operation: Operation,
        id: NoteId,
    ) -> CoreResult<Note> {
        if actor.is_none() {
            self.authorize(actor, operation, Resource::None)?;
        }

        let note = self.notes.find_by_id(id).await?;
        self.authorize(actor, operation, Resource::Note(note.as_ref()))?;
        note.ok_or_else(|| CoreError::not_found("Note"))
    }
}

impl fmt::Debug for NoteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteService").finish_non_exhaustive()
    }
}
