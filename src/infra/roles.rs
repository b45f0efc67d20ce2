//! Role check backends.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::RoleCheck;
use crate::util::types::{TenantId, UserId};

/// Admin list held in memory, keyed by tenant.
#[derive(Debug, Default)]
pub struct StaticRoleCheck {
    admins: RwLock<HashSet<(TenantId, UserId)>>,
}

impl StaticRoleCheck {
    /// No admins anywhere.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant admin on `tenant` to `user`.
    pub fn grant(&self, tenant: TenantId, user: UserId) {
        self.admins.write().insert((tenant, user));
    }

    /// Revoke admin on `tenant` from `user`.
    pub fn revoke(&self, tenant: TenantId, user: UserId) {
        self.admins.write().remove(&(tenant, user));
    }
}

#[async_trait]
impl RoleCheck for StaticRoleCheck {
    async fn is_admin(&self, user: UserId, tenant: TenantId) -> bool {
        self.admins.read().contains(&(tenant, user))
    }
}
