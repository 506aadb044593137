// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory stores.
//!
//! Both stores keep their records in a `HashMap` behind a
//! `parking_lot::RwLock` and stamp every insert with a monotonically
//! increasing sequence number, used to break creation-time ties.
//! Data is lost when the store is dropped.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::identity::{normalize_email, Identity, IdentitySummary};
use crate::note::Note;
use crate::types::{NoteId, Role, UserId};

use super::{IdentityStore, NoteStore};

/// A stored record with its insertion sequence.
#[derive(Debug, Clone)]
struct Entry<T> {
    seq: u64,
    record: T,
}

// =============================================================================
// MemoryIdentityStore
// =============================================================================

#[derive(Debug, Default)]
struct IdentityTables {
    by_id: HashMap<UserId, Entry<Identity>>,
    by_email: HashMap<String, UserId>,
}

/// An in-memory [`IdentityStore`].
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    tables: RwLock<IdentityTables>,
    sequence: AtomicU64,
}

impl MemoryIdentityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored identities.
    pub fn len(&self) -> usize {
        self.tables.read().by_id.len()
    }

    /// Returns `true` if no identity is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Identity>> {
        let email = normalize_email(email);
        let tables = self.tables.read();
        Ok(tables
            .by_email
            .get(&email)
            .and_then(|id| tables.by_id.get(id))
            .map(|entry| entry.record.clone()))
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<Identity>> {
        Ok(self.tables.read().by_id.get(&id).map(|e| e.record.clone()))
    }

    async fn insert(&self, mut identity: Identity) -> StoreResult<Identity> {
        identity.email = normalize_email(&identity.email);

        let mut tables = self.tables.write();
        if tables.by_email.contains_key(&identity.email) {
            return Err(StoreError::duplicate_email(&identity.email));
        }

        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        tables.by_email.insert(identity.email.clone(), identity.id);
        tables.by_id.insert(
            identity.id,
            Entry {
                seq,
                record: identity.clone(),
            },
        );

        debug!(user_id = %identity.id, seq, "Identity stored");
        Ok(identity)
    }

    async fn update_role(&self, id: UserId, role: Role) -> StoreResult<Option<Identity>> {
        let mut tables = self.tables.write();
        Ok(tables.by_id.get_mut(&id).map(|entry| {
            entry.record.role = role;
            entry.record.clone()
        }))
    }

    async fn list_all(&self) -> StoreResult<Vec<IdentitySummary>> {
        let tables = self.tables.read();
        let mut entries: Vec<&Entry<Identity>> = tables.by_id.values().collect();
        entries.sort_by_key(|e| Reverse((e.record.created_at, e.seq)));
        Ok(entries.into_iter().map(|e| e.record.summary()).collect())
    }

    async fn earliest_admin(&self) -> StoreResult<Option<Identity>> {
        let tables = self.tables.read();
        Ok(tables
            .by_id
            .values()
            .filter(|e| e.record.is_admin())
            .min_by_key(|e| (e.record.created_at, e.seq))
            .map(|e| e.record.clone()))
    }
}

// =============================================================================
// MemoryNoteStore
// =============================================================================

/// An in-memory [`NoteStore`].
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: RwLock<HashMap<NoteId, Entry<Note>>>,
    sequence: AtomicU64,
}

impl MemoryNoteStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored notes.
    pub fn len(&self) -> usize {
        self.notes.read().len()
    }

    /// Returns `true` if no note is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect_newest_first(&self, filter: impl Fn(&Note) -> bool) -> Vec<Note> {
        let notes = self.notes.read();
        let mut entries: Vec<&Entry<Note>> =
            notes.values().filter(|e| filter(&e.record)).collect();
        entries.sort_by_key(|e| Reverse((e.record.created_at, e.seq)));
        entries.into_iter().map(|e| e.record.clone()).collect()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn find_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        Ok(self.notes.read().get(&id).map(|e| e.record.clone()))
    }

    async fn find_by_owner(&self, owner: UserId) -> StoreResult<Vec<Note>> {
        Ok(self.collect_newest_first(|note| note.is_owned_by(owner)))
    }

    async fn list_all(&self) -> StoreResult<Vec<Note>> {
        Ok(self.collect_newest_first(|_| true))
    }

    async fn insert(&self, note: Note) -> StoreResult<Note> {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.notes.write().insert(
            note.id,
            Entry {
                seq,
                record: note.clone(),
            },
        );
        Ok(note)
    }

    async fn update(&self, note: Note) -> StoreResult<Option<Note>> {
        let mut notes = self.notes.write();
        Ok(notes.get_mut(&note.id).map(|entry| {
            entry.record = note;
            entry.record.clone()
        }))
    }

    async fn delete(&self, id: NoteId) -> StoreResult<Option<Note>> {
        Ok(self.notes.write().remove(&id).map(|e| e.record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteDraft;
    use chrono::{Duration, Utc};

    fn identity(email: &str, role: Role) -> Identity {
        Identity::new("someone", email, "$argon2id$stub", role)
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let store = MemoryIdentityStore::new();
        store.insert(identity("a@example.com", Role::User)).await.unwrap();

        let err = store
            .insert(identity("A@Example.com", Role::User))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateEmail { .. }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive() {
        let store = MemoryIdentityStore::new();
        let stored = store.insert(identity("a@example.com", Role::User)).await.unwrap();

        let found = store.find_by_email(" A@EXAMPLE.com").await.unwrap().unwrap();
        assert_eq!(found.id, stored.id);
    }

    #[tokio::test]
    async fn test_earliest_admin_uses_created_at_then_insertion_order() {
        let store = MemoryIdentityStore::new();
        let now = Utc::now();

        let mut late = identity("late@example.com", Role::Admin);
        late.created_at = now;
        let mut early = identity("early@example.com", Role::Admin);
        early.created_at = now - Duration::seconds(10);
        let mut tied = identity("tied@example.com", Role::Admin);
        tied.created_at = now - Duration::seconds(10);
        let mut user = identity("user@example.com", Role::User);
        user.created_at = now - Duration::seconds(60);

        store.insert(late).await.unwrap();
        let early = store.insert(early).await.unwrap();
        store.insert(tied).await.unwrap();
        store.insert(user).await.unwrap();

        let first = store.earliest_admin().await.unwrap().unwrap();
        assert_eq!(first.id, early.id);
    }

    #[tokio::test]
    async fn test_earliest_admin_none_without_admins() {
        let store = MemoryIdentityStore::new();
        store.insert(identity("u@example.com", Role::User)).await.unwrap();
        assert!(store.earliest_admin().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_role_unknown_id() {
        let store = MemoryIdentityStore::new();
        let updated = store.update_role(UserId::new(), Role::Admin).await.unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_list_identities_newest_first() {
        let store = MemoryIdentityStore::new();
        let a = store.insert(identity("a@example.com", Role::User)).await.unwrap();
        let b = store.insert(identity("b@example.com", Role::User)).await.unwrap();

        let listed = store.list_all().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, b.id);
        assert_eq!(listed[1].id, a.id);
    }

    #[tokio::test]
    async fn test_note_store_scopes_by_owner() {
        let store = MemoryNoteStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        let first = store
            .insert(Note::new(alice, NoteDraft::new("one", "1").unwrap()))
            .await
            .unwrap();
        store
            .insert(Note::new(bob, NoteDraft::new("two", "2").unwrap()))
            .await
            .unwrap();
        let third = store
            .insert(Note::new(alice, NoteDraft::new("three", "3").unwrap()))
            .await
            .unwrap();

        let owned = store.find_by_owner(alice).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert_eq!(owned[0].id, third.id);
        assert_eq!(owned[1].id, first.id);
        assert_eq!(store.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_note_update_and_delete() {
        let store = MemoryNoteStore::new();
        let mut note = store
            .insert(Note::new(UserId::new(), NoteDraft::new("T", "C").unwrap()))
            .await
            .unwrap();

        note.title = "T2".into();
        let updated = store.update(note.clone()).await.unwrap().unwrap();
        assert_eq!(updated.title, "T2");

        assert!(store.delete(note.id).await.unwrap().is_some());
        assert!(store.delete(note.id).await.unwrap().is_none());
        assert!(store.update(note).await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
