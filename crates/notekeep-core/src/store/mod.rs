// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Persistence contracts for identities and notes.
//!
//! Stores are `Send + Sync` trait objects shared behind `Arc`. Each operation
//! is atomic at the single-record level; concurrent read-modify-write cycles
//! on the same note are last-write-wins.
//!
//! # Ordering
//!
//! Every listing is newest first: descending creation timestamp, ties broken
//! by descending insertion order.

mod memory;

pub use memory::{MemoryIdentityStore, MemoryNoteStore};

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::identity::{Identity, IdentitySummary};
use crate::note::Note;
use crate::types::{NoteId, Role, UserId};

// =============================================================================
// IdentityStore
// =============================================================================

/// Persisted identity records.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Looks up an identity by email. The argument is normalized by the caller.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>>;

    /// Looks up an identity by id.
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>>;

    /// Inserts a new identity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateEmail` when the email is already taken.
    /// No record is written in that case.
    async fn insert(&self, identity: Identity) -> StoreResult<Identity>;

    /// Sets the role of an identity, returning the updated record or `None`
    /// when the id is unknown.
    async fn update_role(&self, id: UserId, role: Role) -> StoreResult<Option<Identity>>;

    /// Lists every identity without password hashes, newest first.
    async fn list_all(&self) -> StoreResult<Vec<IdentitySummary>>;

    /// Returns the admin with the earliest creation timestamp (the first admin).
    async fn earliest_admin(&self) -> StoreResult<Option<Identity>>;
}

// =============================================================================
// NoteStore
// =============================================================================

/// Persisted note records.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Looks up a note by id.
    async fn find_by_id(&self, id: NoteId) -> StoreResult<Option<Note>>;

    /// Lists the notes owned by `owner`, newest first.
    async fn find_by_owner(&self, owner: UserId) -> StoreResult<Vec<Note>>;

    /// Lists every note, newest first.
    async fn list_all(&self) -> StoreResult<Vec<Note>>;

    /// Inserts a new note.
    async fn insert(&self, note: Note) -> StoreResult<Note>;

    /// Replaces an existing note, returning `None` when it no longer exists.
    async fn update(&self, note: Note) -> StoreResult<Option<Note>>;

    /// Deletes a note, returning the removed record if it existed.
    async fn delete(&self, id: NoteId) -> StoreResult<Option<Note>>;
}
