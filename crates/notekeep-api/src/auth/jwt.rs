// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT token management.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use notekeep_core::{Actor, Identity};
use thiserror::Error;

use super::Claims;
use crate::error::{ApiError, ApiResult, AuthFailure};

/// Default token lifetime: three days.
pub const DEFAULT_EXPIRATION_SECS: i64 = 259_200;

/// Secrets shorter than this are accepted with a warning.
pub const MIN_SECRET_LEN: usize = 32;

const ALGORITHM: Algorithm = Algorithm::HS256;

// =============================================================================
// JwtConfig
// =============================================================================

/// JWT configuration.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Token expiration time in seconds.
    pub expiration_secs: i64,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "notekeep".to_string(),
            expiration_secs: DEFAULT_EXPIRATION_SECS,
            leeway_secs: 0,
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the expiration time.
    pub fn with_expiration(mut self, duration: Duration) -> Self {
        self.expiration_secs = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);
        self
    }

    /// Sets the clock skew tolerance.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Validates the configuration.
    ///
    /// An empty secret is fatal. A short one only warns.
    pub fn validate(&self) -> ApiResult<()> {
        if self.secret.is_empty() {
            return Err(ApiError::internal("JWT secret is not configured"));
        }
        if self.expiration_secs <= 0 {
            return Err(ApiError::internal("JWT expiration must be positive"));
        }
        if self.secret.len() < MIN_SECRET_LEN {
            tracing::warn!(
                length = self.secret.len(),
                "JWT secret is shorter than recommended ({} bytes)",
                MIN_SECRET_LEN
            );
        }
        Ok(())
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("issuer", &self.issuer)
            .field("expiration_secs", &self.expiration_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

// =============================================================================
// TokenError
// =============================================================================

/// Why a presented token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// No token was presented.
    #[error("No token presented")]
    Missing,
    /// Signature, issuer, encoding or claim validation failed.
    #[error("Token is malformed or its signature is invalid")]
    Malformed,
    /// The signature is valid but the token has expired.
    #[error("Token has expired")]
    Expired,
}

impl TokenError {
    /// Returns the matching authentication failure.
    pub fn failure(&self) -> AuthFailure {
        match self {
            TokenError::Missing => AuthFailure::TokenMissing,
            TokenError::Malformed => AuthFailure::TokenMalformed,
            TokenError::Expired => AuthFailure::TokenExpired,
        }
    }

    /// Returns the wire name of the failure.
    pub fn reason(&self) -> &'static str {
        self.failure().as_str()
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::unauthenticated(err.failure())
    }
}

// =============================================================================
// JwtManager
// =============================================================================

/// Manager for JWT token operations.
///
/// Issues HS256 tokens carrying `{sub, role, iat, exp, iss, jti}` and
/// recovers the [`Actor`] from them.
#[derive(Clone)]
pub struct JwtManager {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl JwtManager {
    /// Creates a new JWT manager with the given configuration.
    ///
    /// # Errors
    ///
    /// Fails when the secret is empty or the expiration is not positive.
    pub fn new(config: JwtConfig) -> ApiResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Signs the given claims.
    pub fn encode_claims(&self, claims: &Claims) -> ApiResult<String> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("Failed to create token: {e}")))
    }

    /// Issues a token for an identity's current role.
    pub fn issue(&self, identity: &Identity) -> ApiResult<String> {
        let claims = Claims::for_identity(identity, self.config.expiration_secs)
            .with_issuer(&self.config.issuer);
        self.encode_claims(&claims)
    }

    /// Validates and decodes a token.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    tracing::debug!(error = %e, "Token rejected");
                    TokenError::Malformed
                }
            })
    }

    /// Verifies a token and returns the actor it names.
    pub fn verify(&self, token: &str) -> Result<Actor, TokenError> {
        self.decode(token).map(|claims| claims.actor())
    }

    /// Verifies a token that may not have been presented at all.
    pub fn verify_presented(&self, token: Option<&str>) -> Result<Actor, TokenError> {
        match token {
            Some(token) if !token.is_empty() => self.verify(token),
            _ => Err(TokenError::Missing),
        }
    }

    /// Returns the token expiration time in seconds.
    pub fn expiration_secs(&self) -> i64 {
        self.config.expiration_secs
    }

    /// Returns the issuer.
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }
}

impl fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtManager")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &ALGORITHM)
            .field("expiration_secs", &self.config.expiration_secs)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use notekeep_core::{Role, UserId};

    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    fn manager() -> JwtManager {
        JwtManager::new(JwtConfig::new(SECRET)).unwrap()
    }

    fn identity(role: Role) -> Identity {
        Identity::new("alice", "alice@example.com", "$argon2id$stub", role)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let manager = manager();
        let identity = identity(Role::Admin);

        let token = manager.issue(&identity).unwrap();
        let actor = manager.verify(&token).unwrap();

        assert_eq!(actor, Actor::new(identity.id, Role::Admin));
    }

    #[test]
    fn test_default_lifetime() {
        let manager = manager();
        let token = manager.issue(&identity(Role::User)).unwrap();
        let claims = manager.decode(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, DEFAULT_EXPIRATION_SECS);
        assert_eq!(claims.iss, "notekeep");
    }

    #[test]
    fn test_empty_secret_is_fatal() {
        assert!(JwtManager::new(JwtConfig::new("")).is_err());
    }

    #[test]
    fn test_short_secret_is_accepted() {
        assert!(JwtManager::new(JwtConfig::new("short")).is_ok());
    }

    #[test]
    fn test_expired_token() {
        let manager = manager();
        let claims = Claims::new(UserId::new(), Role::User, -3600).with_issuer("notekeep");
        let token = manager.encode_claims(&claims).unwrap();

        assert_eq!(manager.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        assert_eq!(manager().verify("invalid.token.here"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_wrong_secret_is_malformed() {
        let other = JwtManager::new(JwtConfig::new("another-secret-key-long-enough-for-tests")).unwrap();
        let token = other.issue(&identity(Role::User)).unwrap();

        assert_eq!(manager().verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_wrong_issuer_is_malformed() {
        let other = JwtManager::new(JwtConfig::new(SECRET).with_issuer("elsewhere")).unwrap();
        let token = other.issue(&identity(Role::User)).unwrap();

        assert_eq!(manager().verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_unknown_role_is_malformed() {
        let claims = serde_json::json!({
            "sub": UserId::new().to_string(),
            "role": "superuser",
            "iat": chrono::Utc::now().timestamp(),
            "exp": chrono::Utc::now().timestamp() + 3600,
            "iss": "notekeep",
            "jti": "x",
        });
        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(manager().verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_verify_presented() {
        let manager = manager();
        assert_eq!(manager.verify_presented(None), Err(TokenError::Missing));
        assert_eq!(manager.verify_presented(Some("")), Err(TokenError::Missing));

        let token = manager.issue(&identity(Role::User)).unwrap();
        assert!(manager.verify_presented(Some(&token)).is_ok());
    }

    #[test]
    fn test_token_error_reasons() {
        assert_eq!(TokenError::Missing.reason(), "token_missing");
        assert_eq!(TokenError::Malformed.reason(), "token_malformed");
        assert_eq!(TokenError::Expired.reason(), "token_expired");

        let err: ApiError = TokenError::Expired.into();
        assert_eq!(err.auth_failure(), Some(AuthFailure::TokenExpired));
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", JwtConfig::new(SECRET));
        assert!(!debug.contains(SECRET));
    }
}
