// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema for NoteKeep.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//!   request_timeout_secs: 30
//!   max_body_size: 1048576
//!   expose_internal_errors: false
//!   cors:
//!     allowed_origins: ["http://localhost:3000"]
//!     allow_credentials: true
//!     max_age_secs: 3600
//! auth:
//!   jwt:
//!     secret: "${NOTEKEEP_JWT_SECRET}"
//!     issuer: notekeep
//!     expiration_secs: 259200
//!     leeway_secs: 0
//!   admin_emails: []
//!   role_source: token
//!   cookie:
//!     name: token
//!     secure: false
//! bootstrap:
//!   admins:
//!     - username: root
//!       email: root@example.com
//!       password: "${NOTEKEEP_ROOT_PASSWORD}"
//! logging:
//!   level: info
//!   format: text
//! ```

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use notekeep_core::roles::RoleSource;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Constants
// =============================================================================

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default token lifetime: three days.
pub const DEFAULT_JWT_EXPIRATION_SECS: u64 = 259_200;

/// Default token issuer.
pub const DEFAULT_JWT_ISSUER: &str = "notekeep";

/// Default name of the token cookie.
pub const DEFAULT_COOKIE_NAME: &str = "token";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default maximum request body size (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for NoteKeep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteKeepConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Accounts created at startup.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl NoteKeepConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.auth.validate()?;
        self.bootstrap.validate()?;
        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Attach internal error diagnostics to responses. Development only.
    #[serde(default)]
    pub expose_internal_errors: bool,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

impl ServerConfig {
    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::validation("server.port", "cannot be zero"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "cannot be zero",
            ));
        }
        if self.max_body_size == 0 {
            return Err(ConfigError::validation(
                "server.max_body_size",
                "cannot be zero",
            ));
        }
        Ok(())
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            expose_internal_errors: false,
            cors: CorsConfig::default(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (use "*" for all, empty to disable CORS).
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Allow credentials (cookies) on cross-origin requests.
    #[serde(default)]
    pub allow_credentials: bool,

    /// Preflight max age in seconds.
    #[serde(default = "default_max_age", alias = "max_age")]
    pub max_age_secs: u64,
}

fn default_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: false,
            max_age_secs: default_max_age(),
        }
    }
}

// =============================================================================
// Auth Configuration
// =============================================================================

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Token signing settings.
    #[serde(default)]
    pub jwt: JwtSettings,

    /// Emails allowed to self-register as admin.
    #[serde(default)]
    pub admin_emails: Vec<String>,

    /// Where the role in effect for a request comes from.
    #[serde(default)]
    pub role_source: RoleSource,

    /// Token cookie settings.
    #[serde(default)]
    pub cookie: CookieConfig,
}

impl AuthConfig {
    /// Validates the auth configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.jwt.validate()?;
        for (i, email) in self.admin_emails.iter().enumerate() {
            if !email.contains('@') {
                return Err(ConfigError::validation(
                    format!("auth.admin_emails[{i}]"),
                    "must be an email address",
                ));
            }
        }
        if self.cookie.name.trim().is_empty() {
            return Err(ConfigError::validation("auth.cookie.name", "cannot be empty"));
        }
        Ok(())
    }
}

/// Token signing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwtSettings {
    /// HMAC signing secret.
    #[serde(default)]
    pub secret: SecretValue,

    /// Token issuer.
    #[serde(default = "default_jwt_issuer")]
    pub issuer: String,

    /// Token lifetime in seconds.
    #[serde(default = "default_jwt_expiration")]
    pub expiration_secs: u64,

    /// Clock skew tolerated when checking expiry.
    #[serde(default)]
    pub leeway_secs: u64,
}

fn default_jwt_issuer() -> String {
    DEFAULT_JWT_ISSUER.to_string()
}

fn default_jwt_expiration() -> u64 {
    DEFAULT_JWT_EXPIRATION_SECS
}

impl JwtSettings {
    /// Validates the JWT settings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.secret.is_empty() {
            return Err(ConfigError::validation(
                "auth.jwt.secret",
                "secret is required (set it in the file or via NOTEKEEP_JWT_SECRET)",
            ));
        }
        if self.expiration_secs == 0 {
            return Err(ConfigError::validation(
                "auth.jwt.expiration_secs",
                "cannot be zero",
            ));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::validation("auth.jwt.issuer", "cannot be empty"));
        }
        Ok(())
    }

    /// Returns the expiration as a Duration.
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_secs)
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: SecretValue::default(),
            issuer: default_jwt_issuer(),
            expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
            leeway_secs: 0,
        }
    }
}

/// Token cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CookieConfig {
    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Set the `Secure` attribute.
    #[serde(default)]
    pub secure: bool,
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            secure: false,
        }
    }
}

// =============================================================================
// Bootstrap Configuration
// =============================================================================

/// Accounts created at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Admin accounts, created in order. The first becomes the first admin
    /// on an empty store.
    #[serde(default)]
    pub admins: Vec<BootstrapAdmin>,
}

impl BootstrapConfig {
    /// Validates every bootstrap entry.
    pub fn validate(&self) -> ConfigResult<()> {
        for (i, admin) in self.admins.iter().enumerate() {
            let field = |name: &str| format!("bootstrap.admins[{i}].{name}");
            if admin.username.trim().is_empty() {
                return Err(ConfigError::validation(field("username"), "cannot be empty"));
            }
            if !admin.email.contains('@') {
                return Err(ConfigError::validation(
                    field("email"),
                    "must be an email address",
                ));
            }
            if admin.password.is_empty() {
                return Err(ConfigError::validation(field("password"), "cannot be empty"));
            }
        }
        Ok(())
    }
}

/// An admin account created at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapAdmin {
    /// Display name.
    pub username: String,
    /// Email.
    pub email: String,
    /// Plaintext password.
    pub password: SecretValue,
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level name understood by tracing filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON lines for log aggregation.
    Json,
    /// Single-line compact text.
    Compact,
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret string that never appears in `Debug`, `Display` or serialized
/// output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plain value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no secret is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "SecretValue(<unset>)")
        } else {
            write!(f, "SecretValue(***)")
        }
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "")
        } else {
            write!(f, "***")
        }
    }
}

impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}
