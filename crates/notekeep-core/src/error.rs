// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error taxonomy for the NoteKeep core.
//!
//! ```text
//! CoreError (outcome kinds surfaced to the transport)
//! ├── Validation       - bad input shape
//! ├── Unauthenticated  - missing, invalid or expired identity
//! ├── Forbidden        - authenticated but denied by policy
//! ├── NotFound         - resource absent
//! ├── Conflict         - duplicate email on registration
//! └── Internal         - store or hashing failure
//!
//! StoreError (persistence contract failures)
//! ├── DuplicateEmail
//! └── Backend
//! ```
//!
//! `StoreError::DuplicateEmail` becomes `Conflict`; every other store failure
//! becomes `Internal` at the service boundary.

use thiserror::Error;

// =============================================================================
// CoreError
// =============================================================================

/// Outcome kind of a failed core operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The input was malformed or incomplete.
    #[error("Validation error: {message}")]
    Validation {
        /// User-safe description of the problem.
        message: String,
    },

    /// The caller has no valid identity.
    #[error("Unauthenticated: {message}")]
    Unauthenticated {
        /// User-safe description.
        message: String,
    },

    /// The caller is authenticated but the policy denies the operation.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// User-safe description.
        message: String,
    },

    /// The addressed resource does not exist.
    #[error("{resource} not found")]
    NotFound {
        /// Resource label (e.g. "Note", "User").
        resource: String,
    },

    /// The operation conflicts with existing state.
    #[error("Conflict: {message}")]
    Conflict {
        /// User-safe description.
        message: String,
    },

    /// An unexpected failure in a collaborator.
    #[error("Internal error: {message}")]
    Internal {
        /// Diagnostic message. Not user-safe.
        message: String,
    },
}

impl CoreError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the stable kind name of this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Internal { .. } => "internal",
        }
    }

    /// Returns `true` for failures the caller did not cause.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail { .. } => {
                Self::conflict("An account with this email already exists")
            }
            StoreError::Backend { message } => Self::internal(format!("store: {message}")),
        }
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Failure reported by an identity or note store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An identity with the same normalized email already exists.
    #[error("Email already registered: {email}")]
    DuplicateEmail {
        /// The normalized email.
        email: String,
    },

    /// The backing storage failed.
    #[error("Store backend failure: {message}")]
    Backend {
        /// Diagnostic message.
        message: String,
    },
}

impl StoreError {
    /// Creates a duplicate email error.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

// =============================================================================
// Result Aliases
// =============================================================================

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
