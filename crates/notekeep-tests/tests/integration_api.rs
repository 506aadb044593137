// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # API Integration Tests
//!
//! End-to-end requests through the full router and middleware stack.
//!
//! ## Test Categories
//!
//! - `test_auth_*`: Signup, login, logout and verify
//! - `test_token_*`: Token transport and rejection reasons
//! - `test_notes_*`: Note ownership over HTTP
//! - `test_admin_*`: Admin listing and promotion
//! - `test_role_source_*`: Token versus store role resolution
//! - `test_errors_*`: Error bodies

use std::sync::Arc;
use std::time::Duration;

use notekeep_api::Claims;
use notekeep_core::roles::RoleSource;
use notekeep_core::{Identity, Role, UserId};
use notekeep_tests::prelude::*;
use serde_json::json;

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_auth_signup_sets_session_cookie() {
    let app = TestApp::new_default();

    let response = app.signup(&UserFixtures::alice()).await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.body["token_type"], "Bearer");
    assert_eq!(response.body["user"]["email"], UserFixtures::alice().email);
    assert_eq!(response.body["user"]["role"], "user");
    assert!(response.body["user"].get("password_hash").is_none());

    let cookie = response.set_cookie().unwrap();
    assert!(cookie.starts_with(&format!("token={}", response.token())));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_auth_signup_duplicate_email() {
    let app = TestApp::new_default();
    app.signup_token(&UserFixtures::alice()).await;

    app.signup(&UserFixtures::alice())
        .await
        .assert_status(StatusCode::CONFLICT)
        .assert_error_code("CONFLICT");
}

#[tokio::test]
async fn test_auth_signup_missing_fields() {
    let app = TestApp::new_default();

    app.request(RequestBuilder::post("/api/auth/signup").json(json!({ "email": "x@example.com" })))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("VALIDATION_ERROR");

    app.request(RequestBuilder::post("/api/auth/signup").raw_json("{ not json"))
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("BAD_REQUEST");
}

#[tokio::test]
async fn test_auth_signup_cannot_self_escalate() {
    let app = TestApp::new_default();

    let response = app
        .request(
            RequestBuilder::post("/api/auth/signup")
                .json(UserFixtures::alice().signup_body_as("admin")),
        )
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.body["user"]["role"], "user");

    app.request(RequestBuilder::get("/api/admin/users").bearer(&response.token()))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_auth_signup_allow_listed_admin() {
    let app = TestApp::new_default();

    let response = app
        .request(
            RequestBuilder::post("/api/auth/signup")
                .json(UserFixtures::root().signup_body_as("admin")),
        )
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.body["user"]["role"], "admin");
}

#[tokio::test]
async fn test_auth_login_and_verify() {
    let app = TestApp::new_default();
    let alice = UserFixtures::alice();
    app.signup_token(&alice).await;

    let login = app.login(alice.email, alice.password).await;
    login.assert_status(StatusCode::OK);
    assert!(login.set_cookie().is_some());

    let verify = app
        .request(RequestBuilder::get("/api/auth/verify").bearer(&login.token()))
        .await;
    verify.assert_status(StatusCode::OK);
    assert_eq!(verify.body["email"], alice.email);
    assert_eq!(verify.body["username"], alice.username);
}

#[tokio::test]
async fn test_auth_token_lifetime_is_reported() {
    let app = TestApp::builder()
        .token_lifetime(Duration::from_secs(900))
        .build();

    let response = app.signup(&UserFixtures::alice()).await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.body["expires_in"], 900);
    assert!(response.set_cookie().unwrap().contains("Max-Age=900"));

    let login = app
        .request(RequestBuilder::post("/api/auth/login").json(UserFixtures::alice().login_body()))
        .await;
    login.assert_status(StatusCode::OK);
    assert_eq!(login.body["expires_in"], 900);
}

#[tokio::test]
async fn test_auth_login_bad_credentials() {
    let app = TestApp::new_default();
    let alice = UserFixtures::alice();
    app.signup_token(&alice).await;

    let wrong_password = app.login(alice.email, "not-the-password").await;
    let unknown_account = app.login("nobody@example.com", alice.password).await;

    for response in [wrong_password, unknown_account] {
        response
            .assert_status(StatusCode::UNAUTHORIZED)
            .assert_auth_reason("bad_credentials");
    }
}

#[tokio::test]
async fn test_auth_logout_clears_cookie() {
    let app = TestApp::new_default();

    let response = app.request(RequestBuilder::post("/api/auth/logout")).await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body["success"], true);
    let cookie = response.set_cookie().unwrap();
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

// =============================================================================
// Token Transport
// =============================================================================

#[tokio::test]
async fn test_token_missing() {
    let app = TestApp::new_default();

    app.request(RequestBuilder::get("/api/notes"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_error_code("UNAUTHORIZED")
        .assert_auth_reason("token_missing");
}

#[tokio::test]
async fn test_token_malformed() {
    let app = TestApp::new_default();

    app.request(RequestBuilder::get("/api/notes").bearer("invalid.token.here"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_auth_reason("token_malformed");
}

#[tokio::test]
async fn test_token_expired() {
    let app = TestApp::new_default();
    let token = app.signup_token(&UserFixtures::alice()).await;
    let subject = app
        .request(RequestBuilder::get("/api/auth/verify").bearer(&token))
        .await
        .str_field("/id");

    let claims = Claims::new(UserId::parse(&subject).unwrap(), Role::User, -3600)
        .with_issuer(app.state().jwt().issuer());
    let expired = app.state().jwt().encode_claims(&claims).unwrap();

    app.request(RequestBuilder::get("/api/notes").bearer(&expired))
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_auth_reason("token_expired");
}

#[tokio::test]
async fn test_token_from_cookie() {
    let app = TestApp::new_default();
    let token = app.signup_token(&UserFixtures::alice()).await;

    app.request(RequestBuilder::get("/api/notes").cookie(&token))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_token_from_quoted_cookie() {
    let app = TestApp::new_default();
    let token = app.signup_token(&UserFixtures::alice()).await;

    app.request(RequestBuilder::get("/api/notes").cookie(&format!("\"{token}\"")))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_token_empty_cookie_falls_back_to_bearer() {
    let app = TestApp::new_default();
    let token = app.signup_token(&UserFixtures::alice()).await;

    app.request(RequestBuilder::get("/api/notes").cookie("").bearer(&token))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_token_bearer_scheme_is_case_insensitive() {
    let app = TestApp::new_default();
    let token = app.signup_token(&UserFixtures::alice()).await;

    for scheme in ["bearer", "BEARER", "Bearer"] {
        app.request(
            RequestBuilder::get("/api/notes")
                .header("authorization", format!("{scheme} {token}")),
        )
        .await
        .assert_status(StatusCode::OK);
    }

    app.request(RequestBuilder::get("/api/notes").header("authorization", format!("Basic {token}")))
        .await
        .assert_auth_reason("token_missing");
}

#[tokio::test]
async fn test_token_cookie_wins_over_bearer() {
    let app = TestApp::new_default();
    let token = app.signup_token(&UserFixtures::alice()).await;

    app.request(
        RequestBuilder::get("/api/notes")
            .cookie("invalid.token.here")
            .bearer(&token),
    )
    .await
    .assert_status(StatusCode::UNAUTHORIZED)
    .assert_auth_reason("token_malformed");
}

#[tokio::test]
async fn test_token_custom_cookie_name() {
    let app = TestApp::builder().cookie_name("nk_session").build();

    let signup = app.signup(&UserFixtures::alice()).await;
    signup.assert_status(StatusCode::CREATED);
    let token = signup.token();
    assert!(signup.set_cookie().unwrap().starts_with("nk_session="));

    app.request(RequestBuilder::get("/api/notes").named_cookie("nk_session", &token))
        .await
        .assert_status(StatusCode::OK);
    app.request(RequestBuilder::get("/api/notes").cookie(&token))
        .await
        .assert_auth_reason("token_missing");
}

#[tokio::test]
async fn test_token_public_routes() {
    let app = TestApp::new_default();

    let health = app.request(RequestBuilder::get("/health")).await;
    health.assert_status(StatusCode::OK);
    assert_eq!(health.body["status"], "ok");

    // A bad token on a public route is ignored.
    app.request(RequestBuilder::get("/health").bearer("invalid.token.here"))
        .await
        .assert_status(StatusCode::OK);
}

// =============================================================================
// Notes
// =============================================================================

#[tokio::test]
async fn test_notes_ownership_scenario() {
    let app = TestApp::new_default();
    let alice = app.signup_token(&UserFixtures::alice()).await;
    let bob = app.signup_token(&UserFixtures::bob()).await;

    let id = app.create_note(&alice).await;
    let uri = format!("/api/notes/{id}");

    let own = app.request(RequestBuilder::get(&uri).bearer(&alice)).await;
    own.assert_status(StatusCode::OK);
    assert_eq!(own.body["title"], NoteFixtures::TITLE);
    assert_eq!(own.body["content"], NoteFixtures::CONTENT);

    app.request(RequestBuilder::get(&uri).bearer(&bob))
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .assert_error_code("FORBIDDEN");
    app.request(RequestBuilder::put(&uri).bearer(&bob).json(json!({ "title": "x" })))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.request(RequestBuilder::delete(&uri).bearer(&bob))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let listed = app.request(RequestBuilder::get("/api/notes").bearer(&bob)).await;
    listed.assert_status(StatusCode::OK);
    assert_eq!(listed.body, json!([]));
}

#[tokio::test]
async fn test_notes_update_and_delete() {
    let app = TestApp::new_default();
    let alice = app.signup_token(&UserFixtures::alice()).await;
    let id = app.create_note(&alice).await;
    let uri = format!("/api/notes/{id}");

    let updated = app
        .request(RequestBuilder::put(&uri).bearer(&alice).json(json!({ "content": "revised" })))
        .await;
    updated.assert_status(StatusCode::OK);
    assert_eq!(updated.body["title"], NoteFixtures::TITLE);
    assert_eq!(updated.body["content"], "revised");

    let deleted = app.request(RequestBuilder::delete(&uri).bearer(&alice)).await;
    deleted.assert_status(StatusCode::OK);
    assert_eq!(deleted.body["success"], true);

    app.request(RequestBuilder::get(&uri).bearer(&alice))
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_code("NOT_FOUND");
}

#[tokio::test]
async fn test_notes_validation() {
    let app = TestApp::new_default();
    let alice = app.signup_token(&UserFixtures::alice()).await;

    app.request(
        RequestBuilder::post("/api/notes")
            .bearer(&alice)
            .json(json!({ "title": "  ", "content": "C" })),
    )
    .await
    .assert_status(StatusCode::BAD_REQUEST)
    .assert_error_code("VALIDATION_ERROR");

    let id = app.create_note(&alice).await;
    app.request(
        RequestBuilder::put(format!("/api/notes/{id}"))
            .bearer(&alice)
            .json(json!({})),
    )
    .await
    .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notes_missing_and_malformed_ids() {
    let app = TestApp::new_default();
    let alice = app.signup_token(&UserFixtures::alice()).await;

    app.request(RequestBuilder::get(format!("/api/notes/{}", UserId::new())).bearer(&alice))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.request(RequestBuilder::get("/api/notes/not-a-uuid").bearer(&alice))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notes_admin_moderates_any_note() {
    let app = TestApp::new_default();
    let alice = app.signup_token(&UserFixtures::alice()).await;
    let (_, root) = app.bootstrap_admin(&UserFixtures::root()).await;
    let id = app.create_note(&alice).await;
    let uri = format!("/api/notes/{id}");

    let alice_id = app
        .request(RequestBuilder::get("/api/auth/verify").bearer(&alice))
        .await
        .str_field("/id");

    let updated = app
        .request(RequestBuilder::put(&uri).bearer(&root).json(json!({ "title": "moderated" })))
        .await;
    updated.assert_status(StatusCode::OK);
    assert_eq!(updated.body["owner"], alice_id);

    app.request(RequestBuilder::delete(&uri).bearer(&root))
        .await
        .assert_status(StatusCode::OK);
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_endpoints_require_admin() {
    let app = TestApp::new_default();
    let alice = app.signup_token(&UserFixtures::alice()).await;

    for uri in ["/api/admin/notes", "/api/admin/users"] {
        app.request(RequestBuilder::get(uri).bearer(&alice))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        app.request(RequestBuilder::get(uri))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_admin_lists_everything() {
    let app = TestApp::new_default();
    let alice = app.signup_token(&UserFixtures::alice()).await;
    let bob = app.signup_token(&UserFixtures::bob()).await;
    let (_, root) = app.bootstrap_admin(&UserFixtures::root()).await;
    app.create_note(&alice).await;
    app.create_note(&bob).await;

    let notes = app
        .request(RequestBuilder::get("/api/admin/notes").bearer(&root))
        .await;
    notes.assert_status(StatusCode::OK);
    let notes = notes.body.as_array().unwrap();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| n["author"]["email"].is_string()));

    let users = app
        .request(RequestBuilder::get("/api/admin/users").bearer(&root))
        .await;
    users.assert_status(StatusCode::OK);
    let users = users.body.as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_admin_promotion_by_first_admin_only() {
    let app = TestApp::new_default();
    let (_, root) = app.bootstrap_admin(&UserFixtures::root()).await;
    let (_, ops) = app.bootstrap_admin(&UserFixtures::ops()).await;
    let alice = app.signup_token(&UserFixtures::alice()).await;
    let bob = app.signup_token(&UserFixtures::bob()).await;

    let alice_id = app
        .request(RequestBuilder::get("/api/auth/verify").bearer(&alice))
        .await
        .str_field("/id");
    let uri = format!("/api/admin/promote/{alice_id}");

    app.request(RequestBuilder::put(&uri).bearer(&ops))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.request(RequestBuilder::put(&uri).bearer(&bob))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let promoted = app.request(RequestBuilder::put(&uri).bearer(&root)).await;
    promoted.assert_status(StatusCode::OK);
    assert_eq!(promoted.body["role"], "admin");

    app.request(RequestBuilder::put(format!("/api/admin/promote/{}", UserId::new())).bearer(&root))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.request(RequestBuilder::put("/api/admin/promote/not-a-uuid").bearer(&root))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// =============================================================================
// Role Source
// =============================================================================

async fn promote_alice(app: &TestApp) -> String {
    let (_, root) = app.bootstrap_admin(&UserFixtures::root()).await;
    let alice = app.signup_token(&UserFixtures::alice()).await;
    let alice_id = app
        .request(RequestBuilder::get("/api/auth/verify").bearer(&alice))
        .await
        .str_field("/id");
    app.request(RequestBuilder::put(format!("/api/admin/promote/{alice_id}")).bearer(&root))
        .await
        .assert_status(StatusCode::OK);
    alice
}

#[tokio::test]
async fn test_role_source_token_keeps_issued_role() {
    let app = TestApp::builder().role_source(RoleSource::Token).build();
    let stale = promote_alice(&app).await;

    app.request(RequestBuilder::get("/api/admin/users").bearer(&stale))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // A fresh login carries the new role.
    let alice = UserFixtures::alice();
    let fresh = app.login(alice.email, alice.password).await.token();
    app.request(RequestBuilder::get("/api/admin/users").bearer(&fresh))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_role_source_store_applies_promotion_immediately() {
    let app = TestApp::builder().role_source(RoleSource::Store).build();
    let stale = promote_alice(&app).await;

    app.request(RequestBuilder::get("/api/admin/users").bearer(&stale))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_role_source_store_rejects_unknown_subject() {
    let token_app = TestApp::builder().role_source(RoleSource::Token).build();
    let store_app = TestApp::builder().role_source(RoleSource::Store).build();
    let ghost = Identity::new("ghost", "ghost@example.com", "$argon2id$stub", Role::User);

    let token_side = token_app.issue(&ghost);
    token_app
        .request(RequestBuilder::get("/api/notes").bearer(&token_side))
        .await
        .assert_status(StatusCode::OK);

    let store_side = store_app.issue(&ghost);
    store_app
        .request(RequestBuilder::get("/api/notes").bearer(&store_side))
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_auth_reason("token_malformed");
}

#[tokio::test]
async fn test_role_source_store_consults_store_per_request() {
    let identities = CountingIdentityStore::new();
    let app = TestApp::builder()
        .role_source(RoleSource::Store)
        .identity_store(identities.clone())
        .build();
    let token = app.signup_token(&UserFixtures::alice()).await;

    let before = identities.id_lookups();
    app.request(RequestBuilder::get("/api/notes").bearer(&token))
        .await
        .assert_status(StatusCode::OK);
    app.request(RequestBuilder::get("/api/notes").bearer(&token))
        .await
        .assert_status(StatusCode::OK);

    assert!(identities.id_lookups() >= before + 2);
}

#[tokio::test]
async fn test_role_source_token_skips_store() {
    let identities = CountingIdentityStore::new();
    let app = TestApp::builder()
        .role_source(RoleSource::Token)
        .identity_store(identities.clone())
        .build();
    let token = app.signup_token(&UserFixtures::alice()).await;

    let before = identities.id_lookups();
    app.request(RequestBuilder::get("/api/notes").bearer(&token))
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(identities.id_lookups(), before);
}

// =============================================================================
// Error Bodies
// =============================================================================

#[tokio::test]
async fn test_errors_internal_detail_hidden_by_default() {
    let app = TestApp::builder()
        .note_store(Arc::new(FailingNoteStore::failing()))
        .build();
    let token = app.signup_token(&UserFixtures::alice()).await;

    let response = app
        .request(RequestBuilder::get("/api/notes").bearer(&token))
        .await;

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_error_code("INTERNAL_ERROR");
    assert_eq!(response.body["error"]["message"], "An internal error occurred");
    assert!(!response.body.to_string().contains(FailingNoteStore::FAILURE));
}

#[tokio::test]
async fn test_errors_internal_detail_exposed_when_configured() {
    let app = TestApp::builder()
        .note_store(Arc::new(FailingNoteStore::failing()))
        .expose_internal_errors()
        .build();
    let token = app.signup_token(&UserFixtures::alice()).await;

    let response = app
        .request(RequestBuilder::get("/api/notes").bearer(&token))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let diagnostic = response.str_field("/error/details/diagnostic");
    assert!(diagnostic.contains(FailingNoteStore::FAILURE));
}

#[tokio::test]
async fn test_errors_unknown_route() {
    let app = TestApp::new_default();
    let token = app.signup_token(&UserFixtures::alice()).await;

    app.request(RequestBuilder::get("/api/nowhere").bearer(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_error_code("NOT_FOUND");
}
