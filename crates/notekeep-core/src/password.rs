// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Argon2 password hashing.
//!
//! Hashes are PHC strings produced with the crate's default Argon2id
//! parameters. The async variants run on tokio's blocking pool.

use std::sync::OnceLock;

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{CoreError, CoreResult};

/// Hashes a password into a PHC string.
pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::internal(format!("password hashing failed: {e}")))
}

/// Verifies a password against a PHC string in constant time.
///
/// Returns `Ok(false)` on mismatch and an error when the stored hash cannot
/// be parsed.
pub fn verify_password(password: &str, phc: &str) -> CoreResult<bool> {
    let parsed = PasswordHash::new(phc)
        .map_err(|e| CoreError::internal(format!("stored password hash is invalid: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CoreError::internal(format!(
            "password verification failed: {e}"
        ))),
    }
}

/// Hashes a password on the blocking pool.
pub async fn hash_password_blocking(password: String) -> CoreResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CoreError::internal(format!("hashing task failed: {e}")))?
}

/// Verifies a password on the blocking pool.
pub async fn verify_password_blocking(password: String, phc: String) -> CoreResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &phc))
        .await
        .map_err(|e| CoreError::internal(format!("verification task failed: {e}")))?
}

/// A fixed hash verified against when an account does not exist, so that
/// unknown-account and wrong-password failures cost the same.
pub(crate) fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("notekeep-dummy-password").unwrap_or_default())
}
