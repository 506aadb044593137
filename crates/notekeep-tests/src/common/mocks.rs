// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Store implementations for exercising failure paths and observing how
//! often a collaborator is consulted.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use notekeep_core::store::{IdentityStore, MemoryIdentityStore, MemoryNoteStore, NoteStore};
use notekeep_core::{
    Identity, IdentitySummary, Note, NoteId, Role, StoreError, StoreResult, UserId,
};

// =============================================================================
// Failing Note Store
// =============================================================================

/// A note store backed by memory that can be switched into failing every
/// operation.
#[derive(Default)]
pub struct FailingNoteStore {
    inner: MemoryNoteStore,
    failing: AtomicBool,
}

impl FailingNoteStore {
    /// Message carried by injected failures.
    pub const FAILURE: &'static str = "simulated disk failure";

    /// Creates a store that fails every operation.
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    /// Toggles failure injection.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::backend(Self::FAILURE))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NoteStore for FailingNoteStore {
    async fn find_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.check()?;
        self.inner.find_by_id(id).await
    }

    async fn find_by_owner(&self, owner: UserId) -> StoreResult<Vec<Note>> {
        self.check()?;
        self.inner.find_by_owner(owner).await
    }

    async fn list_all(&self) -> StoreResult<Vec<Note>> {
        self.check()?;
        self.inner.list_all().await
    }

    async fn insert(&self, note: Note) -> StoreResult<Note> {
        self.check()?;
        self.inner.insert(note).await
    }

    async fn update(&self, note: Note) -> StoreResult<Option<Note>> {
        self.check()?;
        self.inner.update(note).await
    }

    async fn delete(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.check()?;
        self.inner.delete(id).await
    }
}

// =============================================================================
// Counting Identity Store
// =============================================================================

/// An in-memory identity store that counts id lookups.
#[derive(Default)]
pub struct CountingIdentityStore {
    inner: MemoryIdentityStore,
    id_lookups: AtomicU64,
}

impl CountingIdentityStore {
    /// Creates an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of `find_by_id` calls so far.
    pub fn id_lookups(&self) -> u64 {
        self.id_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityStore for CountingIdentityStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        self.inner.find_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        self.id_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id(id).await
    }

    async fn insert(&self, identity: Identity) -> StoreResult<Identity> {
        self.inner.insert(identity).await
    }

    async fn update_role(&self, id: UserId, role: Role) -> StoreResult<Option<Identity>> {
        self.inner.update_role(id, role).await
    }

    async fn list_all(&self) -> StoreResult<Vec<IdentitySummary>> {
        self.inner.list_all().await
    }

    async fn earliest_admin(&self) -> StoreResult<Option<Identity>> {
        self.inner.earliest_admin().await
    }
}
