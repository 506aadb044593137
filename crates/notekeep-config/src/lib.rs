// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # notekeep-config
//!
//! Configuration management for the NoteKeep service.
//!
//! ## Features
//!
//! - **Schema Definition**: server, auth, bootstrap and logging sections with validation
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `NOTEKEEP_*` variables override file values
//! - **Placeholders**: `${VAR}` and `${VAR:default}` in file content
//!
//! ## Quick Start
//!
//! ```no_run
//! use notekeep_config::loader::load_config;
//!
//! let config = load_config("notekeep.yaml").unwrap();
//! println!("Listening on {}", config.server.socket_addr());
//! ```
//!
//! Values in config files can reference environment variables:
//!
//! ```yaml
//! auth:
//!   jwt:
//!     secret: "${JWT_SECRET}"
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{
    AuthConfig, BootstrapAdmin, BootstrapConfig, CookieConfig, CorsConfig, JwtSettings, LogFormat,
    LogLevel, LoggingConfig, NoteKeepConfig, SecretValue, ServerConfig,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// =============================================================================
// Prelude
// =============================================================================

/// Convenience re-exports for common use cases.
pub mod prelude {
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::loader::{load_config, ConfigLoader};
    pub use crate::schema::{NoteKeepConfig, SecretValue};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(NAME, "notekeep-config");
    }

    #[test]
    fn test_prelude_imports() {
        use prelude::*;
        let config = NoteKeepConfig::default();
        assert!(config.validate().is_err());
    }
}
