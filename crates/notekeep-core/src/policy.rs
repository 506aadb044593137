// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access policy engine.
//!
//! [`AccessPolicy::authorize`] is a pure function of the actor, the
//! operation and the resource as loaded from the store. It holds no state
//! and is safe to evaluate concurrently.
//!
//! # Evaluation order
//!
//! 1. authentication: an absent actor is `Unauthenticated`
//! 2. existence: a missing target is `NotFound`
//! 3. ownership or role: otherwise `Forbidden`
//!
//! Because existence is checked before ownership, a caller can tell an
//! existing note it may not touch (`Forbidden`) from an absent one
//! (`NotFound`).
//!
//! # Rules
//!
//! | Operation | Allowed for |
//! |-----------|-------------|
//! | `note:create`, `note:list_own` | any authenticated actor |
//! | `note:list_all`, `identity:list` | admins |
//! | `note:read`, `note:update`, `note:delete` | owner or admin |
//! | `identity:promote` | the first admin |

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::identity::Identity;
use crate::note::Note;
use crate::types::{Actor, Role, UserId};

// =============================================================================
// Operation
// =============================================================================

/// An operation subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create a note owned by the actor.
    CreateNote,
    /// List the actor's own notes.
    ListOwnNotes,
    /// List every note.
    ListAllNotes,
    /// Read a single note.
    ReadNote,
    /// Update a single note.
    UpdateNote,
    /// Delete a single note.
    DeleteNote,
    /// List every identity.
    ListIdentities,
    /// Promote an identity to admin.
    PromoteIdentity,
}

impl Operation {
    /// Returns the stable operation name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateNote => "note:create",
            Self::ListOwnNotes => "note:list_own",
            Self::ListAllNotes => "note:list_all",
            Self::ReadNote => "note:read",
            Self::UpdateNote => "note:update",
            Self::DeleteNote => "note:delete",
            Self::ListIdentities => "identity:list",
            Self::PromoteIdentity => "identity:promote",
        }
    }

    /// Parses a stable operation name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|op| op.as_str() == s)
    }

    /// Returns every operation.
    pub fn all() -> &'static [Operation] {
        &[
            Self::CreateNote,
            Self::ListOwnNotes,
            Self::ListAllNotes,
            Self::ReadNote,
            Self::UpdateNote,
            Self::DeleteNote,
            Self::ListIdentities,
            Self::PromoteIdentity,
        ]
    }

    /// Returns the label of the resource this operation targets.
    pub fn resource_label(&self) -> &'static str {
        match self {
            Self::CreateNote
            | Self::ListOwnNotes
            | Self::ListAllNotes
            | Self::ReadNote
            | Self::UpdateNote
            | Self::DeleteNote => "Note",
            Self::ListIdentities | Self::PromoteIdentity => "User",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Resource & Decision
// =============================================================================

/// The resource an operation targets, as loaded from the store.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// The operation has no target record.
    None,
    /// A single note, `None` when the lookup found nothing.
    Note(Option<&'a Note>),
    /// The earliest-created admin, `None` when no admin exists.
    FirstAdmin(Option<&'a Identity>),
}

/// Why an operation was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// No valid identity.
    Unauthenticated,
    /// Valid identity, insufficient privilege.
    Forbidden,
    /// The target does not exist.
    NotFound,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The operation may proceed.
    Allow,
    /// The operation is denied.
    Deny(DenyReason),
}

impl Decision {
    /// Returns `true` for `Allow`.
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Converts the decision into a core result for `operation`.
    pub fn into_result(self, operation: Operation) -> CoreResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(DenyReason::Unauthenticated) => {
                Err(CoreError::unauthenticated("Authentication required"))
            }
            Self::Deny(DenyReason::Forbidden) => Err(CoreError::forbidden(format!(
                "Not permitted to perform {operation}"
            ))),
            Self::Deny(DenyReason::NotFound) => {
                Err(CoreError::not_found(operation.resource_label()))
            }
        }
    }
}

// =============================================================================
// AccessPolicy
// =============================================================================

/// Decides whether an actor may perform an operation on a resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    /// Creates the policy engine.
    pub fn new() -> Self {
        Self
    }

    /// The single ownership predicate: the actor owns the resource or is an admin.
    pub fn owner_or_admin(actor: &Actor, owner: UserId) -> bool {
        match actor.role {
            Role::Admin => true,
            Role::User => actor.id == owner,
        }
    }

    /// Authorizes `operation` for `actor` against `resource`.
    pub fn authorize(
        &self,
        actor: Option<&Actor>,
        operation: Operation,
        resource: Resource<'_>,
    ) -> Decision {
        let Some(actor) = actor else {
            return Decision::Deny(DenyReason::Unauthenticated);
        };

        let decision = match operation {
            Operation::CreateNote | Operation::ListOwnNotes => Decision::Allow,
            Operation::ListAllNotes | Operation::ListIdentities => admin_only(actor),
            Operation::ReadNote | Operation::UpdateNote | Operation::DeleteNote => match resource {
                Resource::Note(None) => Decision::Deny(DenyReason::NotFound),
                Resource::Note(Some(note)) if Self::owner_or_admin(actor, note.owner) => {
                    Decision::Allow
                }
                Resource::Note(Some(_)) | Resource::None | Resource::FirstAdmin(_) => {
                    Decision::Deny(DenyReason::Forbidden)
                }
            },
            Operation::PromoteIdentity => match resource {
                Resource::FirstAdmin(Some(first)) if is_first_admin(actor, first) => {
                    Decision::Allow
                }
                Resource::FirstAdmin(_) | Resource::None | Resource::Note(_) => {
                    Decision::Deny(DenyReason::Forbidden)
                }
            },
        };

        debug!(
            user_id = %actor.id,
            role = %actor.role,
            operation = %operation,
            allowed = decision.is_allowed(),
            "Authorization decision"
        );
        decision
    }

    /// Authorizes and converts the decision into a core result.
    pub fn check(
        &self,
        actor: Option<&Actor>,
        operation: Operation,
        resource: Resource<'_>,
    ) -> CoreResult<()> {
        self.authorize(actor, operation, resource)
            .into_result(operation)
    }
}

fn admin_only(actor: &Actor) -> Decision {
    match actor.role {
        Role::Admin => Decision::Allow,
        Role::User => Decision::Deny(DenyReason::Forbidden),
    }
}

fn is_first_admin(actor: &Actor, first: &Identity) -> bool {
    match actor.role {
        Role::Admin => first.is_admin() && first.id == actor.id,
        Role::User => false,
    }
}
