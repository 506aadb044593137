// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Operation services.
//!
//! Every operation follows the same shape: load the target, ask the
//! [`AccessPolicy`](crate::policy::AccessPolicy), then read or write the
//! store. Failures are reported as [`CoreError`](crate::error::CoreError);
//! nothing is retried.

mod identities;
mod notes;

pub use identities::IdentityService;
pub use notes::NoteService;
