// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential verification: registration and password authentication.
//!
//! # Role policy
//!
//! A registration may request the admin role. The request is honored only
//! when the email is on the configured allow-list or the caller is trusted
//! (startup bootstrap). Everything else is created as a plain user.
//!
//! # Timing
//!
//! [`CredentialVerifier::authenticate`] verifies against a fixed dummy hash
//! when the account does not exist, so both failure paths do the same work.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{CoreError, StoreError};
use crate::identity::{normalize_email, Identity};
use crate::password::{dummy_hash, hash_password_blocking, verify_password_blocking};
use crate::store::IdentityStore;
use crate::types::Role;

// =============================================================================
// CredentialError
// =============================================================================

/// Failure of a credential operation.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The normalized email is already registered.
    #[error("Email already registered: {email}")]
    DuplicateEmail {
        /// The normalized email.
        email: String,
    },

    /// No account exists for the email.
    #[error("No account for the given email")]
    UnknownAccount,

    /// The password does not match.
    #[error("Password does not match")]
    BadCredential,

    /// The registration input is incomplete or malformed.
    #[error("Invalid registration: {message}")]
    Invalid {
        /// User-safe description.
        message: String,
    },

    /// The identity store failed.
    #[error("Identity store failure: {0}")]
    Store(StoreError),

    /// Hashing or verification failed.
    #[error("Password hashing failure: {message}")]
    Hashing {
        /// Diagnostic message.
        message: String,
    },
}

impl CredentialError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

impl From<StoreError> for CredentialError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail { email } => Self::DuplicateEmail { email },
            other => Self::Store(other),
        }
    }
}

impl From<CoreError> for CredentialError {
    fn from(err: CoreError) -> Self {
        Self::Hashing {
            message: err.to_string(),
        }
    }
}

impl From<CredentialError> for CoreError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::DuplicateEmail { .. } => {
                CoreError::conflict("An account with this email already exists")
            }
            CredentialError::UnknownAccount | CredentialError::BadCredential => {
                CoreError::unauthenticated("Invalid email or password")
            }
            CredentialError::Invalid { message } => CoreError::validation(message),
            CredentialError::Store(e) => e.into(),
            CredentialError::Hashing { message } => CoreError::internal(message),
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Who is asking for a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationTrust {
    /// An anonymous caller. Admin requests need the allow-list.
    Public,
    /// Startup bootstrap. Admin requests are honored.
    Trusted,
}

/// Registration input.
#[derive(Clone)]
pub struct Registration {
    /// Display name.
    pub username: String,
    /// Email, normalized on registration.
    pub email: String,
    /// Plaintext password. Never logged.
    pub password: String,
    /// Requested role, if any.
    pub requested_role: Option<Role>,
}

impl Registration {
    /// Creates a registration requesting the default role.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            requested_role: None,
        }
    }

    /// Requests a role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.requested_role = Some(role);
        self
    }

    fn validate(&self) -> Result<(), CredentialError> {
        if self.username.trim().is_empty() {
            return Err(CredentialError::invalid("username is required"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(CredentialError::invalid("email is required"));
        }
        if !email.contains('@') {
            return Err(CredentialError::invalid("email must contain '@'"));
        }
        if self.password.is_empty() {
            return Err(CredentialError::invalid("password is required"));
        }
        Ok(())
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("requested_role", &self.requested_role)
            .finish()
    }
}

/// Which emails may self-register as admin.
#[derive(Debug, Clone, Default)]
pub struct RegistrationPolicy {
    admin_emails: HashSet<String>,
}

impl RegistrationPolicy {
    /// Creates a policy from an allow-list. Entries are normalized.
    pub fn new<I, S>(admin_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            admin_emails: admin_emails
                .into_iter()
                .map(|e| normalize_email(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Returns `true` if `email` is allow-listed for admin self-registration.
    pub fn allows_admin(&self, email: &str) -> bool {
        self.admin_emails.contains(&normalize_email(email))
    }

    /// Decides the role granted to a registration.
    pub fn granted_role(&self, registration: &Registration, trust: RegistrationTrust) -> Role {
        match registration.requested_role {
            None | Some(Role::User) => Role::User,
            Some(Role::Admin) => match trust {
                RegistrationTrust::Trusted => Role::Admin,
                RegistrationTrust::Public if self.allows_admin(&registration.email) => Role::Admin,
                RegistrationTrust::Public => Role::User,
            },
        }
    }
}

// =============================================================================
// CredentialVerifier
// =============================================================================

/// Registers identities and authenticates passwords.
#[derive(Clone)]
pub struct CredentialVerifier {
    identities: Arc<dyn IdentityStore>,
    policy: RegistrationPolicy,
}

impl CredentialVerifier {
    /// Creates a verifier over an identity store.
    pub fn new(identities: Arc<dyn IdentityStore>, policy: RegistrationPolicy) -> Self {
        Self { identities, policy }
    }

    /// Returns the registration policy.
    pub fn policy(&self) -> &RegistrationPolicy {
        &self.policy
    }

    /// Registers a new identity.
    ///
    /// # Errors
    ///
    /// - `Invalid` when username, email or password is missing
    /// - `DuplicateEmail` when the normalized email already exists
    pub async fn register(
        &self,
        registration: Registration,
        trust: RegistrationTrust,
    ) -> Result<Identity, CredentialError> {
        registration.validate()?;
        let email = normalize_email(&registration.email);

        if self.identities.find_by_email(&email).await?.is_some() {
            debug!(email = %email, "Registration rejected: email taken");
            return Err(CredentialError::DuplicateEmail { email });
        }

        let role = self.policy.granted_role(&registration, trust);
        if registration.requested_role == Some(Role::Admin) && role != Role::Admin {
            warn!(email = %email, "Admin role requested by non-allow-listed email, granted user");
        }

        let hash = hash_password_blocking(registration.password).await?;
        let identity = Identity::new(registration.username.trim(), &email, hash, role);
        let identity = self.identities.insert(identity).await?;

        info!(user_id = %identity.id, role = %identity.role, "Identity registered");
        Ok(identity)
    }

    /// Authenticates an email and password.
    ///
    /// # Errors
    ///
    /// - `UnknownAccount` when no identity has the email
    /// - `BadCredential` when the password does not match
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, CredentialError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(CredentialError::invalid("email and password are required"));
        }

        let email = normalize_email(email);
        let Some(identity) = self.identities.find_by_email(&email).await? else {
            let _ = verify_password_blocking(password.to_string(), dummy_hash().to_string()).await;
            debug!(email = %email, "Authentication failed: unknown account");
            return Err(CredentialError::UnknownAccount);
        };

        let matches =
            verify_password_blocking(password.to_string(), identity.password_hash.clone()).await?;
        if !matches {
            debug!(user_id = %identity.id, "Authentication failed: bad password");
            return Err(CredentialError::BadCredential);
        }

        debug!(user_id = %identity.id, "Authentication succeeded");
        Ok(identity)
    }
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
