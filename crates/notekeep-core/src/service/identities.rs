// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{CoreError, CoreResult};
use crate::identity::IdentitySummary;
use crate::policy::{AccessPolicy, Operation, Resource};
use crate::store::IdentityStore;
use crate::types::{Actor, Role, UserId};

/// Identity operations gated by the access policy.
#[derive(Clone)]
pub struct IdentityService {
    identities: Arc<dyn IdentityStore>,
    policy: AccessPolicy,
}

impl IdentityService {
    /// Creates an identity service.
    pub fn new(identities: Arc<dyn IdentityStore>) -> Self {
        Self {
            identities,
            policy: AccessPolicy::new(),
        }
    }

    /// Returns the caller's own identity summary.
    pub async fn current(&self, actor: Option<&Actor>) -> CoreResult<IdentitySummary> {
        let actor = actor.ok_or_else(|| CoreError::unauthenticated("Authentication required"))?;
        self.identities
            .find_by_id(actor.id)
            .await?
            .map(|identity| identity.summary())
            .ok_or_else(|| CoreError::not_found("User"))
    }

    /// Lists every identity, newest first.
    pub async fn list(&self, actor: Option<&Actor>) -> CoreResult<Vec<IdentitySummary>> {
        self.policy
            .check(actor, Operation::ListIdentities, Resource::None)?;
        Ok(self.identities.list_all().await?)
    }

    /// Promotes `target` to admin.
    ///
    /// The first admin is loaded from the store on every call. Promoting an
    /// identity that is already an admin succeeds without change.
    pub async fn promote(
        &self,
        actor: Option<&Actor>,
        target: UserId,
    ) -> CoreResult<IdentitySummary> {
        if actor.is_none() {
            self.policy
                .check(actor, Operation::PromoteIdentity, Resource::None)?;
        }

        let first_admin = self.identities.earliest_admin().await?;
        self.policy
            .check(
                actor,
                Operation::PromoteIdentity,
                Resource::FirstAdmin(first_admin.as_ref()),
            )
            .inspect_err(|_| {
                warn!(
                    user_id = ?actor.map(|a| a.id),
                    target = %target,
                    "Promotion denied: caller is not the first admin"
                );
            })?;

        let promoted = self
            .identities
            .update_role(target, Role::Admin)
            .await?
            .ok_or_else(|| CoreError::not_found("User"))?;

        info!(
            user_id = ?actor.map(|a| a.id),
            target = %promoted.id,
            "Identity promoted to admin"
        );
        Ok(promoted.summary())
    }
}

impl fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::store::MemoryIdentityStore;

    async fn seeded() -> (IdentityService, Identity, Identity, Identity) {
        let store = Arc::new(MemoryIdentityStore::new());
        let first = store
            .insert(Identity::new("root", "root@example.com", "$argon2id$stub", Role::Admin))
            .await
            .unwrap();
        let second = store
            .insert(Identity::new("ops", "ops@example.com", "$argon2id$stub", Role::Admin))
            .await
            .unwrap();
        let user = store
            .insert(Identity::new("u", "u@example.com", "$argon2id$stub", Role::User))
            .await
            .unwrap();
        (IdentityService::new(store), first, second, user)
    }

    fn actor(identity: &Identity) -> Actor {
        Actor::new(identity.id, identity.role)
    }

    #[tokio::test]
    async fn test_first_admin_promotes() {
        let (service, first, _, user) = seeded().await;
        let promoted = service.promote(Some(&actor(&first)), user.id).await.unwrap();
        assert_eq!(promoted.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_second_admin_cannot_promote() {
        let (service, _, second, user) = seeded().await;
        let err = service
            .promote(Some(&actor(&second)), user.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_promote_unknown_target_is_not_found() {
        let (service, first, _, _) = seeded().await;
        let err = service
            .promote(Some(&actor(&first)), UserId::new())
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::not_found("User"));
    }

    #[tokio::test]
    async fn test_list_requires_admin() {
        let (service, first, _, user) = seeded().await;
        assert!(matches!(
            service.list(Some(&actor(&user))).await.unwrap_err(),
            CoreError::Forbidden { .. }
        ));
        assert_eq!(service.list(Some(&actor(&first))).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_current() {
        let (service, _, _, user) = seeded().await;
        let me = service.current(Some(&actor(&user))).await.unwrap();
        assert_eq!(me.id, user.id);
        assert!(service.current(None).await.is_err());
    }
}
