// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::fmt;
use std::sync::Arc;

use notekeep_core::credentials::{CredentialVerifier, RegistrationPolicy};
use notekeep_core::roles::{resolver_for, RoleResolver, RoleSource};
use notekeep_core::service::{IdentityService, NoteService};
use notekeep_core::store::{IdentityStore, MemoryIdentityStore, MemoryNoteStore, NoteStore};

use crate::auth::{JwtConfig, JwtManager};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// This is the central state container that is passed to all handlers via
/// Axum's state extraction mechanism. Everything is constructed once at
/// startup; nothing is looked up from globals afterwards.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// JWT manager for token operations.
    pub jwt_manager: Arc<JwtManager>,
    /// Per-request role resolution strategy.
    pub role_resolver: Arc<dyn RoleResolver>,
    /// Registration and login.
    pub credentials: Arc<CredentialVerifier>,
    /// Note operations.
    pub notes: Arc<NoteService>,
    /// Identity operations.
    pub identities: Arc<IdentityService>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the JWT manager.
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt_manager
    }

    /// Returns the credential verifier.
    pub fn credentials(&self) -> &CredentialVerifier {
        &self.credentials
    }

    /// Returns the note service.
    pub fn notes(&self) -> &NoteService {
        &self.notes
    }

    /// Returns the identity service.
    pub fn identities(&self) -> &IdentityService {
        &self.identities
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("jwt_manager", &self.jwt_manager)
            .field("role_source", &self.role_resolver.source())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
///
/// Stores default to empty in-memory implementations. A JWT manager or a
/// JWT configuration is required.
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    jwt_manager: Option<Arc<JwtManager>>,
    jwt_config: Option<JwtConfig>,
    identity_store: Option<Arc<dyn IdentityStore>>,
    note_store: Option<Arc<dyn NoteStore>>,
    registration_policy: Option<RegistrationPolicy>,
    role_source: RoleSource,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            jwt_manager: None,
            jwt_config: None,
            identity_store: None,
            note_store: None,
            registration_policy: None,
            role_source: RoleSource::default(),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the JWT manager.
    pub fn jwt_manager(mut self, manager: Arc<JwtManager>) -> Self {
        self.jwt_manager = Some(manager);
        self
    }

    /// Sets the JWT configuration the manager is built from.
    pub fn jwt_config(mut self, config: JwtConfig) -> Self {
        self.jwt_config = Some(config);
        self
    }

    /// Sets the identity store.
    pub fn identity_store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.identity_store = Some(store);
        self
    }

    /// Sets the note store.
    pub fn note_store(mut self, store: Arc<dyn NoteStore>) -> Self {
        self.note_store = Some(store);
        self
    }

    /// Sets the registration policy.
    pub fn registration_policy(mut self, policy: RegistrationPolicy) -> Self {
        self.registration_policy = Some(policy);
        self
    }

    /// Sets where each request's role comes from.
    pub fn role_source(mut self, source: RoleSource) -> Self {
        self.role_source = source;
        self
    }

    /// Builds the AppState.
    ///
    /// # Errors
    ///
    /// Fails when no JWT manager can be produced.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let jwt_manager = match (self.jwt_manager, self.jwt_config) {
            (Some(manager), _) => manager,
            (None, Some(jwt_config)) => Arc::new(JwtManager::new(jwt_config)?),
            (None, None) => return Err(ApiError::internal("JWT manager is not configured")),
        };

        let identity_store = self
            .identity_store
            .unwrap_or_else(|| Arc::new(MemoryIdentityStore::new()));
        let note_store = self
            .note_store
            .unwrap_or_else(|| Arc::new(MemoryNoteStore::new()));
        let policy = self.registration_policy.unwrap_or_default();

        Ok(AppState {
            config: Arc::new(config),
            jwt_manager,
            role_resolver: resolver_for(self.role_source, identity_store.clone()),
            credentials: Arc::new(CredentialVerifier::new(identity_store.clone(), policy)),
            notes: Arc::new(NoteService::new(note_store, identity_store.clone())),
            identities: Arc::new(IdentityService::new(identity_store)),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_manager.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
