// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Core Integration Tests
//!
//! The services wired over in-memory stores, without HTTP.
//!
//! ## Test Categories
//!
//! - `test_notes_*`: Ownership and admin rules on notes
//! - `test_promote_*`: First-admin promotion
//! - `test_register_*`: Registration role policy and duplicates
//! - `test_authenticate_*`: Credential failures

use std::sync::Arc;

use notekeep_core::credentials::{
    CredentialError, CredentialVerifier, RegistrationPolicy, RegistrationTrust,
};
use notekeep_core::service::{IdentityService, NoteService};
use notekeep_core::store::{IdentityStore, MemoryIdentityStore, MemoryNoteStore};
use notekeep_core::{Actor, Identity, NoteId, NotePatch, Role, UserId};
use notekeep_tests::common::init_test_logging;
use notekeep_tests::prelude::*;

// =============================================================================
// Test Helpers
// =============================================================================

struct Core {
    identities: Arc<MemoryIdentityStore>,
    credentials: CredentialVerifier,
    notes: NoteService,
    users: IdentityService,
}

impl Core {
    fn new() -> Self {
        init_test_logging();
        let identities = Arc::new(MemoryIdentityStore::new());
        let notes_store = Arc::new(MemoryNoteStore::new());
        let dyn_identities: Arc<dyn IdentityStore> = identities.clone();

        Self {
            credentials: CredentialVerifier::new(
                dyn_identities.clone(),
                RegistrationPolicy::new(UserFixtures::admin_emails()),
            ),
            notes: NoteService::new(notes_store, dyn_identities.clone()),
            users: IdentityService::new(dyn_identities),
            identities,
        }
    }

    async fn user(&self, fixture: UserFixture) -> Actor {
        let identity = self
            .credentials
            .register(fixture.registration(), RegistrationTrust::Public)
            .await
            .unwrap();
        Actor::new(identity.id, identity.role)
    }

    async fn admin(&self, fixture: UserFixture) -> Actor {
        let identity = self
            .credentials
            .register(fixture.registration_as(Role::Admin), RegistrationTrust::Trusted)
            .await
            .unwrap();
        assert_eq!(identity.role, Role::Admin);
        Actor::new(identity.id, identity.role)
    }
}

fn patch_title(title: &str) -> NotePatch {
    NotePatch::new(Some(title.to_string()), None).unwrap()
}

// =============================================================================
// Note Ownership Tests
// =============================================================================

#[tokio::test]
async fn test_notes_owner_scenario() {
    let core = Core::new();
    let alice = core.user(UserFixtures::alice()).await;
    let bob = core.user(UserFixtures::bob()).await;
    let root = core.admin(UserFixtures::root()).await;

    let note = core.notes.create(Some(&alice), NoteFixtures::draft()).await.unwrap();
    assert_eq!(note.owner, alice.id);
    assert_eq!(note.title, NoteFixtures::TITLE);
    assert_eq!(note.content, NoteFixtures::CONTENT);

    // Owner may read and update.
    assert_eq!(core.notes.get(Some(&alice), note.id).await.unwrap(), note);
    let updated = core
        .notes
        .update(Some(&alice), note.id, patch_title("T2"))
        .await
        .unwrap();
    assert_eq!(updated.title, "T2");
    assert_eq!(updated.content, NoteFixtures::CONTENT);
    assert_eq!(updated.owner, alice.id);

    // Another user may not touch it.
    core.notes.get(Some(&bob), note.id).await.assert_kind("forbidden");
    core.notes
        .update(Some(&bob), note.id, patch_title("mine now"))
        .await
        .assert_kind("forbidden");
    core.notes.delete(Some(&bob), note.id).await.assert_kind("forbidden");

    // An admin may.
    let deleted = core.notes.delete(Some(&root), note.id).await.unwrap();
    assert_eq!(deleted.id, note.id);
    core.notes.get(Some(&alice), note.id).await.assert_kind("not_found");
}

#[tokio::test]
async fn test_notes_owner_can_delete() {
    let core = Core::new();
    let alice = core.user(UserFixtures::alice()).await;

    let note = core.notes.create(Some(&alice), NoteFixtures::draft()).await.unwrap();
    core.notes.delete(Some(&alice), note.id).await.unwrap();
    core.notes.delete(Some(&alice), note.id).await.assert_kind("not_found");
}

#[tokio::test]
async fn test_notes_admin_update_keeps_owner() {
    let core = Core::new();
    let alice = core.user(UserFixtures::alice()).await;
    let root = core.admin(UserFixtures::root()).await;

    let note = core.notes.create(Some(&alice), NoteFixtures::draft()).await.unwrap();
    let updated = core
        .notes
        .update(Some(&root), note.id, patch_title("moderated"))
        .await
        .unwrap();

    assert_eq!(updated.title, "moderated");
    assert_eq!(updated.owner, alice.id);
}

#[tokio::test]
async fn test_notes_missing_before_forbidden() {
    let core = Core::new();
    let alice = core.user(UserFixtures::alice()).await;
    let bob = core.user(UserFixtures::bob()).await;

    let note = core.notes.create(Some(&alice), NoteFixtures::draft()).await.unwrap();

    core.notes.get(Some(&bob), NoteId::new()).await.assert_kind("not_found");
    core.notes.get(Some(&bob), note.id).await.assert_kind("forbidden");
}

#[tokio::test]
async fn test_notes_anonymous_is_unauthenticated() {
    let core = Core::new();
    let alice = core.user(UserFixtures::alice()).await;
    let note = core.notes.create(Some(&alice), NoteFixtures::draft()).await.unwrap();

    core.notes.create(None, NoteFixtures::draft()).await.assert_kind("unauthenticated");
    core.notes.list_own(None).await.assert_kind("unauthenticated");
    core.notes.get(None, note.id).await.assert_kind("unauthenticated");
    core.notes.get(None, NoteId::new()).await.assert_kind("unauthenticated");
}

#[tokio::test]
async fn test_notes_list_own_is_scoped_and_newest_first() {
    let core = Core::new();
    let alice = core.user(UserFixtures::alice()).await;
    let bob = core.user(UserFixtures::bob()).await;

    for title in ["first", "second", "third"] {
        core.notes.create(Some(&alice), NoteFixtures::titled(title)).await.unwrap();
    }
    core.notes.create(Some(&bob), NoteFixtures::titled("bob's")).await.unwrap();

    let titles: Vec<String> = core
        .notes
        .list_own(Some(&alice))
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_notes_list_all_requires_admin() {
    let core = Core::new();
    let alice = core.user(UserFixtures::alice()).await;
    let root = core.admin(UserFixtures::root()).await;

    core.notes.create(Some(&alice), NoteFixtures::draft()).await.unwrap();

    core.notes.list_all(Some(&alice)).await.assert_kind("forbidden");

    let all = core.notes.list_all(Some(&root)).await.unwrap();
    assert_eq!(all.len(), 1);
    let author = all[0].author.as_ref().unwrap();
    assert_eq!(author.email, UserFixtures::alice().email);
}

// =============================================================================
// Promotion Tests
// =============================================================================

#[tokio::test]
async fn test_promote_only_first_admin() {
    let core = Core::new();
    let root = core.admin(UserFixtures::root()).await;
    let ops = core.admin(UserFixtures::ops()).await;
    let alice = core.user(UserFixtures::alice()).await;
    let bob = core.user(UserFixtures::bob()).await;

    // A later admin is refused.
    core.users.promote(Some(&ops), alice.id).await.assert_kind("forbidden");
    // So is a user, and an anonymous caller.
    core.users.promote(Some(&bob), alice.id).await.assert_kind("forbidden");
    core.users.promote(None, alice.id).await.assert_kind("unauthenticated");

    let promoted = core.users.promote(Some(&root), alice.id).await.unwrap();
    assert_eq!(promoted.role, Role::Admin);

    let stored = core.identities.find_by_id(alice.id).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Admin);
}

#[tokio::test]
async fn test_promote_unknown_target() {
    let core = Core::new();
    let root = core.admin(UserFixtures::root()).await;

    core.users.promote(Some(&root), UserId::new()).await.assert_kind("not_found");
}

#[tokio::test]
async fn test_promote_first_admin_is_loaded_per_call() {
    let core = Core::new();
    let alice = core.user(UserFixtures::alice()).await;
    let bob = core.user(UserFixtures::bob()).await;

    // No admin exists yet: nobody may promote.
    let claimed_admin = Actor::new(alice.id, Role::Admin);
    core.users.promote(Some(&claimed_admin), bob.id).await.assert_kind("forbidden");

    // Once the first admin exists, it is recognized without any cache refresh.
    let root = core.admin(UserFixtures::root()).await;
    core.users.promote(Some(&root), bob.id).await.unwrap();
}

#[tokio::test]
async fn test_list_identities_requires_admin() {
    let core = Core::new();
    let alice = core.user(UserFixtures::alice()).await;
    let root = core.admin(UserFixtures::root()).await;

    core.users.list(Some(&alice)).await.assert_kind("forbidden");

    let users = core.users.list(Some(&root)).await.unwrap();
    let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec![UserFixtures::root().email, UserFixtures::alice().email]);
}

// =============================================================================
// Registration Tests
// =============================================================================

#[tokio::test]
async fn test_register_duplicate_email() {
    let core = Core::new();
    core.user(UserFixtures::alice()).await;

    let mut again = UserFixtures::alice().registration();
    again.email = "  Alice@Example.COM ".to_string();
    let err = core
        .credentials
        .register(again, RegistrationTrust::Public)
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::DuplicateEmail { .. }));

    let root = core.admin(UserFixtures::root()).await;
    assert_eq!(core.users.list(Some(&root)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_register_admin_request_from_unlisted_email() {
    let core = Core::new();

    let identity = core
        .credentials
        .register(
            UserFixtures::alice().registration_as(Role::Admin),
            RegistrationTrust::Public,
        )
        .await
        .unwrap();
    assert_eq!(identity.role, Role::User);
}

#[tokio::test]
async fn test_register_admin_request_from_listed_email() {
    let core = Core::new();

    let identity = core
        .credentials
        .register(
            UserFixtures::root().registration_as(Role::Admin),
            RegistrationTrust::Public,
        )
        .await
        .unwrap();
    assert_eq!(identity.role, Role::Admin);
}

#[tokio::test]
async fn test_register_never_stores_plaintext() {
    let core = Core::new();
    let alice = core.user(UserFixtures::alice()).await;

    let stored: Identity = core.identities.find_by_id(alice.id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, UserFixtures::alice().password);
    assert!(stored.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn test_register_rejects_missing_fields() {
    let core = Core::new();
    let mut registration = UserFixtures::alice().registration();
    registration.password.clear();

    let err = core
        .credentials
        .register(registration, RegistrationTrust::Public)
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::Invalid { .. }));
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_authenticate_outcomes() {
    let core = Core::new();
    let alice = core.user(UserFixtures::alice()).await;

    let identity = core
        .credentials
        .authenticate("ALICE@example.com", UserFixtures::alice().password)
        .await
        .unwrap();
    assert_eq!(identity.id, alice.id);

    let err = core
        .credentials
        .authenticate(UserFixtures::alice().email, "wrong-password")
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::BadCredential));

    let err = core
        .credentials
        .authenticate("nobody@example.com", "anything")
        .await
        .unwrap_err();
    assert!(matches!(err, CredentialError::UnknownAccount));
}
