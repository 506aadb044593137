// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built accounts, notes and configuration documents.
//!
//! Fixtures are plain constants so every test sees the same data. Emails are
//! only unique within one harness; each harness starts with empty stores.

use notekeep_core::credentials::Registration;
use notekeep_core::{NoteDraft, Role};
use serde_json::{json, Value};

/// Signing secret used by every harness.
pub const TEST_JWT_SECRET: &str = "integration-test-secret-that-is-at-least-32-bytes";

// =============================================================================
// User Fixtures
// =============================================================================

/// A fixed account.
#[derive(Debug, Clone, Copy)]
pub struct UserFixture {
    /// Display name.
    pub username: &'static str,
    /// Email address.
    pub email: &'static str,
    /// Plaintext password.
    pub password: &'static str,
}

impl UserFixture {
    /// Returns a registration requesting the default role.
    pub fn registration(&self) -> Registration {
        Registration::new(self.username, self.email, self.password)
    }

    /// Returns a registration requesting `role`.
    pub fn registration_as(&self, role: Role) -> Registration {
        self.registration().with_role(role)
    }

    /// Returns a signup request body.
    pub fn signup_body(&self) -> Value {
        json!({
            "username": self.username,
            "email": self.email,
            "password": self.password,
        })
    }

    /// Returns a signup request body requesting `role`.
    pub fn signup_body_as(&self, role: &str) -> Value {
        let mut body = self.signup_body();
        body["role"] = json!(role);
        body
    }

    /// Returns a login request body.
    pub fn login_body(&self) -> Value {
        json!({ "email": self.email, "password": self.password })
    }
}

/// Standard accounts.
pub struct UserFixtures;

impl UserFixtures {
    /// Regular user who owns notes in most scenarios.
    pub fn alice() -> UserFixture {
        UserFixture {
            username: "alice",
            email: "alice@example.com",
            password: "alice-password",
        }
    }

    /// Second regular user.
    pub fn bob() -> UserFixture {
        UserFixture {
            username: "bob",
            email: "bob@example.com",
            password: "bob-password",
        }
    }

    /// Allow-listed admin, normally the first admin.
    pub fn root() -> UserFixture {
        UserFixture {
            username: "root",
            email: "root@example.com",
            password: "root-password",
        }
    }

    /// Allow-listed admin created after `root`.
    pub fn ops() -> UserFixture {
        UserFixture {
            username: "ops",
            email: "ops@example.com",
            password: "ops-password",
        }
    }

    /// Emails allowed to self-register as admin.
    pub fn admin_emails() -> Vec<String> {
        vec![Self::root().email.to_string(), Self::ops().email.to_string()]
    }
}

// =============================================================================
// Note Fixtures
// =============================================================================

/// Standard note content.
pub struct NoteFixtures;

impl NoteFixtures {
    /// Title of the standard note.
    pub const TITLE: &'static str = "T";

    /// Content of the standard note.
    pub const CONTENT: &'static str = "C";

    /// The standard draft.
    pub fn draft() -> NoteDraft {
        Self::titled("T")
    }

    /// A draft with the given title.
    pub fn titled(title: &str) -> NoteDraft {
        match NoteDraft::new(title, Self::CONTENT) {
            Ok(draft) => draft,
            Err(e) => panic!("fixture title '{title}' rejected: {e}"),
        }
    }

    /// The standard note as a request body.
    pub fn create_body() -> Value {
        json!({ "title": Self::TITLE, "content": Self::CONTENT })
    }
}

// =============================================================================
// Config Fixtures
// =============================================================================

/// Configuration documents in each supported format.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Smallest valid YAML document.
    pub fn minimal_yaml() -> String {
        format!("auth:\n  jwt:\n    secret: \"{TEST_JWT_SECRET}\"\n")
    }

    /// Fully populated YAML document.
    pub fn full_yaml() -> String {
        format!(
            r#"
server:
  host: "127.0.0.1"
  port: 9090
  request_timeout_secs: 10
  max_body_size: 65536
  cors:
    allowed_origins: ["https://notes.example.com"]
    allow_credentials: true
    max_age_secs: 600
auth:
  jwt:
    secret: "{TEST_JWT_SECRET}"
    issuer: "notes.example.com"
    expiration_secs: 3600
  admin_emails: ["root@example.com"]
  role_source: store
  cookie:
    name: "nk_session"
    secure: true
bootstrap:
  admins:
    - username: root
      email: root@example.com
      password: root-password
logging:
  level: debug
  format: json
"#
        )
    }

    /// Fully populated TOML document equivalent to [`Self::full_yaml`].
    pub fn full_toml() -> String {
        format!(
            r#"
[server]
host = "127.0.0.1"
port = 9090
request_timeout_secs = 10
max_body_size = 65536

[server.cors]
allowed_origins = ["https://notes.example.com"]
allow_credentials = true
max_age_secs = 600

[auth]
admin_emails = ["root@example.com"]
role_source = "store"

[auth.jwt]
secret = "{TEST_JWT_SECRET}"
issuer = "notes.example.com"
expiration_secs = 3600

[auth.cookie]
name = "nk_session"
secure = true

[[bootstrap.admins]]
username = "root"
email = "root@example.com"
password = "root-password"

[logging]
level = "debug"
format = "json"
"#
        )
    }

    /// Fully populated JSON document equivalent to [`Self::full_yaml`].
    pub fn full_json() -> String {
        json!({
            "server": {
                "host": "127.0.0.1",
                "port": 9090,
                "request_timeout_secs": 10,
                "max_body_size": 65536,
                "cors": {
                    "allowed_origins": ["https://notes.example.com"],
                    "allow_credentials": true,
                    "max_age_secs": 600
                }
            },
            "auth": {
                "jwt": {
                    "secret": TEST_JWT_SECRET,
                    "issuer": "notes.example.com",
                    "expiration_secs": 3600
                },
                "admin_emails": ["root@example.com"],
                "role_source": "store",
                "cookie": { "name": "nk_session", "secure": true }
            },
            "bootstrap": {
                "admins": [
                    { "username": "root", "email": "root@example.com", "password": "root-password" }
                ]
            },
            "logging": { "level": "debug", "format": "json" }
        })
        .to_string()
    }
}
