// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Server runtime orchestration.
//!
//! The runtime turns a loaded [`NoteKeepConfig`] into a running server:
//!
//! 1. Map the file configuration onto the API and token settings
//! 2. Build the application state (stores, services, role resolver)
//! 3. Create the configured bootstrap admins
//! 4. Serve until a shutdown signal arrives, then drain

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use notekeep_api::{ApiConfig, ApiServer, ApiServerBuilder, AppState, CookieConfig, CorsConfig, JwtConfig};
use notekeep_config::{BootstrapAdmin, ConfigLoader, NoteKeepConfig};
use notekeep_core::credentials::{CredentialError, Registration, RegistrationPolicy, RegistrationTrust};
use notekeep_core::Role;

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// NoteKeepRuntime
// =============================================================================

/// The server runtime.
pub struct NoteKeepRuntime {
    config: Arc<NoteKeepConfig>,
    shutdown: ShutdownCoordinator,
    dev_mode: bool,
}

impl NoteKeepRuntime {
    /// Creates a new runtime.
    pub fn new(config: NoteKeepConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
            dev_mode: false,
        }
    }

    /// Enables development mode. Internal error details are returned to
    /// clients regardless of `server.expose_internal_errors`.
    pub fn with_dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = enabled;
        self
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &NoteKeepConfig {
        &self.config
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Maps the file configuration onto the HTTP layer's settings.
    pub fn api_config(&self) -> ApiConfig {
        let server = &self.config.server;
        let cookie = &self.config.auth.cookie;

        ApiConfig::new()
            .with_host(server.host)
            .with_port(server.port)
            .with_request_timeout(server.request_timeout())
            .with_max_body_size(server.max_body_size)
            .with_internal_errors_exposed(server.expose_internal_errors || self.dev_mode)
            .with_cors(CorsConfig {
                allowed_origins: server.cors.allowed_origins.clone(),
                allow_credentials: server.cors.allow_credentials,
                max_age: server.cors.max_age_secs,
            })
            .with_cookie(CookieConfig {
                name: cookie.name.clone(),
                secure: cookie.secure,
            })
    }

    /// Maps the file configuration onto the token settings.
    pub fn jwt_config(&self) -> JwtConfig {
        let jwt = &self.config.auth.jwt;
        JwtConfig::new(jwt.secret.expose())
            .with_issuer(jwt.issuer.clone())
            .with_expiration(jwt.expiration())
            .with_leeway(jwt.leeway_secs)
    }

    /// Builds the server and creates the bootstrap admins. Does not bind.
    pub async fn build_server(&self) -> BinResult<ApiServer> {
        let server = ApiServerBuilder::new()
            .config(self.api_config())
            .jwt_config(self.jwt_config())
            .registration_policy(RegistrationPolicy::new(&self.config.auth.admin_emails))
            .role_source(self.config.auth.role_source)
            .build()
            .map_err(|e| BinError::from(e).with_context("Failed to build API server"))?;

        let created = bootstrap_admins(server.state(), &self.config.bootstrap.admins).await?;
        if created > 0 {
            info!(count = created, "Bootstrap admins created");
        }

        Ok(server)
    }

    /// Runs the server until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!(
            version = notekeep_core::VERSION,
            dev_mode = self.dev_mode,
            role_source = %self.config.auth.role_source,
            "Starting NoteKeep"
        );
        if self.dev_mode {
            warn!("Development mode: internal error details are returned to clients");
        }

        let server = self.build_server().await?;
        info!("NoteKeep is ready (API: {})", server.addr());

        let watcher = self.shutdown.clone();
        let os_signal = tokio::spawn(async move { watcher.wait_for_os_signal().await });

        let result = server
            .run_with_shutdown(self.shutdown.shutdown_signal().wait())
            .await;

        self.shutdown.initiate_shutdown();
        let _ = os_signal.await;

        result.map_err(|e| BinError::from(e).with_context("API server stopped"))?;
        info!("NoteKeep shutdown complete");
        Ok(())
    }
}

/// Registers each bootstrap admin whose email is not taken yet.
///
/// Returns how many identities were created.
pub async fn bootstrap_admins(state: &AppState, admins: &[BootstrapAdmin]) -> BinResult<usize> {
    let mut created = 0;

    for admin in admins {
        let registration = Registration::new(
            admin.username.as_str(),
            admin.email.as_str(),
            admin.password.expose(),
        )
        .with_role(Role::Admin);

        match state
            .credentials()
            .register(registration, RegistrationTrust::Trusted)
            .await
        {
            Ok(identity) => {
                info!(user_id = %identity.id, email = %identity.email, "Bootstrap admin created");
                created += 1;
            }
            Err(CredentialError::DuplicateEmail { email }) => {
                info!(email = %email, "Bootstrap admin already exists, skipping");
            }
            Err(e) => {
                return Err(BinError::init(format!(
                    "Failed to create bootstrap admin '{}': {}",
                    admin.email, e
                )));
            }
        }
    }

    Ok(created)
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<NoteKeepConfig>,
    dev_mode: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: Option<impl AsRef<Path>>) -> Self {
        self.config_path = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: NoteKeepConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Enables development mode.
    pub fn dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = enabled;
        self
    }

    /// Builds the runtime, loading the configuration unless one was given.
    pub fn build(self) -> BinResult<NoteKeepRuntime> {
        let config = match self.config {
            Some(config) => config,
            None => ConfigLoader::new()
                .load_optional(self.config_path.as_deref())
                .map_err(|e| {
                    let context = match &self.config_path {
                        Some(path) => format!("Failed to load config from {}", path.display()),
                        None => "Failed to load config from environment".to_string(),
                    };
                    BinError::from(e).with_context(context)
                })?,
        };

        Ok(NoteKeepRuntime::new(config).with_dev_mode(self.dev_mode))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use notekeep_config::SecretValue;

    use super::*;

    const SECRET: &str = "runtime-test-secret-that-is-long-enough";

    fn test_config() -> NoteKeepConfig {
        let mut config = NoteKeepConfig::default();
        config.auth.jwt.secret = SecretValue::new(SECRET);
        config
    }

    fn admin(email: &str) -> BootstrapAdmin {
        BootstrapAdmin {
            username: "root".into(),
            email: email.into(),
            password: SecretValue::new("bootstrap-pass"),
        }
    }

    #[test]
    fn test_runtime_builder_with_config() {
        let runtime = RuntimeBuilder::new()
            .config(test_config())
            .dev_mode(true)
            .build()
            .unwrap();

        assert!(runtime.dev_mode);
        assert!(!runtime.shutdown().is_shutdown_initiated());
    }

    #[test]
    fn test_runtime_builder_reports_missing_file() {
        let err = RuntimeBuilder::new()
            .config_path(Some("/nonexistent/notekeep.yaml"))
            .build()
            .err()
            .unwrap();

        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("/nonexistent/notekeep.yaml"));
    }

    #[test]
    fn test_api_config_mapping() {
        let mut config = test_config();
        config.server.port = 9191;
        config.server.cors.allowed_origins = vec!["https://notes.example.com".into()];
        config.auth.cookie.secure = true;

        let api = NoteKeepRuntime::new(config).api_config();
        assert_eq!(api.port, 9191);
        assert_eq!(api.cors.allowed_origins, vec!["https://notes.example.com"]);
        assert!(api.cookie.secure);
        assert!(!api.expose_internal_errors);
    }

    #[test]
    fn test_dev_mode_exposes_internal_errors() {
        let runtime = NoteKeepRuntime::new(test_config()).with_dev_mode(true);
        assert!(runtime.api_config().expose_internal_errors);
    }

    #[test]
    fn test_jwt_config_mapping() {
        let mut config = test_config();
        config.auth.jwt.issuer = "notes.example.com".into();
        config.auth.jwt.expiration_secs = 600;

        let jwt = NoteKeepRuntime::new(config).jwt_config();
        assert_eq!(jwt.secret, SECRET);
        assert_eq!(jwt.issuer, "notes.example.com");
        assert_eq!(jwt.expiration_secs, 600);
    }

    #[tokio::test]
    async fn test_build_server_requires_secret() {
        let runtime = NoteKeepRuntime::new(NoteKeepConfig::default());
        assert!(runtime.build_server().await.is_err());
    }

    #[tokio::test]
    async fn test_bootstrap_admins_are_idempotent() {
        let mut config = test_config();
        config.bootstrap.admins = vec![admin("root@example.com")];
        let runtime = NoteKeepRuntime::new(config);

        let server = runtime.build_server().await.unwrap();
        let admins = [admin("ROOT@example.com"), admin("ops@example.com")];
        let created = bootstrap_admins(server.state(), &admins).await.unwrap();
        assert_eq!(created, 1);

        let identity = server
            .state()
            .credentials()
            .authenticate("root@example.com", "bootstrap-pass")
            .await
            .unwrap();
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_with_invalid_email_fails() {
        let runtime = NoteKeepRuntime::new(test_config());
        let server = runtime.build_server().await.unwrap();

        let err = bootstrap_admins(server.state(), &[admin("not-an-email")])
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
