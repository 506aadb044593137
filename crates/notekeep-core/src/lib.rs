// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # notekeep-core
//!
//! Domain model and authorization core for the NoteKeep note service.
//!
//! This crate is transport-agnostic. It provides:
//!
//! - **Types**: `UserId`, `NoteId`, `Role`, `Actor`
//! - **Model**: `Identity`, `IdentitySummary`, `Note`, `NoteDraft`, `NotePatch`
//! - **Store**: `IdentityStore` / `NoteStore` contracts and in-memory implementations
//! - **Credentials**: registration and password verification
//! - **Policy**: the access policy engine deciding every operation
//! - **Roles**: per-request role resolution strategies
//! - **Service**: `NoteService` and `IdentityService` (lookup, policy, store)
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use notekeep_core::prelude::*;
//!
//! let identities: Arc<dyn IdentityStore> = Arc::new(MemoryIdentityStore::new());
//! let notes: Arc<dyn NoteStore> = Arc::new(MemoryNoteStore::new());
//! let service = NoteService::new(notes, identities);
//!
//! let draft = NoteDraft::new("Groceries", "milk, eggs")?;
//! let note = service.create(Some(&actor), draft).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod identity;
pub mod note;
pub mod types;

// =============================================================================
// Authorization Modules
// =============================================================================

pub mod credentials;
pub mod password;
pub mod policy;
pub mod roles;

// =============================================================================
// Storage & Service Modules
// =============================================================================

pub mod service;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CoreError, CoreResult, StoreError, StoreResult};
pub use identity::{Identity, IdentitySummary};
pub use note::{Note, NoteDraft, NotePatch, OwnedNote};
pub use types::{Actor, NoteId, Role, UserId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::credentials::{
        CredentialError, CredentialVerifier, Registration, RegistrationPolicy, RegistrationTrust,
    };
    pub use crate::error::{CoreError, CoreResult, StoreError, StoreResult};
    pub use crate::identity::{Identity, IdentitySummary};
    pub use crate::note::{Note, NoteDraft, NotePatch, OwnedNote};
    pub use crate::policy::{AccessPolicy, Decision, DenyReason, Operation, Resource};
    pub use crate::roles::{
        resolver_for, RoleResolver, RoleSource, StoreRoleResolver, TokenRoleResolver,
    };
    pub use crate::service::{IdentityService, NoteService};
    pub use crate::store::{IdentityStore, MemoryIdentityStore, MemoryNoteStore, NoteStore};
    pub use crate::types::{Actor, NoteId, Role, UserId};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
