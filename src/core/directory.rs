//! Process-wide index of tenants and their islands.
//!
//! The directory is a plain value owned by whoever drives the service; tests
//! build a fresh one per case. Lookups by owner and by id span every tenant
//! because platform user ids are global.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{ServiceConfig, TenantSettings};
use crate::core::error::QueueError;
use crate::core::island::{Island, Outcome};
use crate::core::notice::{Audience, CloseReason, Envelope, Notice, Target};
use crate::core::tenant::Tenant;
use crate::util::types::{ChannelId, Identity, IslandId, TenantId, UserId};

/// What remained of an island when it was closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedIsland {
    /// Island id, free for reuse from now on.
    pub island: IslandId,
    /// Former owner.
    pub owner: Identity,
    /// Former tenant.
    pub tenant: TenantId,
    /// Price at close time.
    pub price: Option<u32>,
    /// Visitors still in line, in queue order.
    pub remaining: Vec<Identity>,
}

/// Rendering and routing inputs for turning notices into envelopes.
#[derive(Debug, Clone)]
pub struct RouteContext<'a> {
    /// Command prefix quoted in message text.
    pub prefix: &'a str,
    /// Current time, used for day-dependent wording.
    pub now_ms: u128,
    /// Channel the triggering command was issued in, if any.
    pub origin: Option<ChannelId>,
    /// Drop channel posts that would land in `origin`.
    pub suppress_origin_echo: bool,
}

/// All tenant registries known to the process.
#[derive(Debug, Clone)]
pub struct Directory {
    tenants: HashMap<TenantId, Tenant>,
    id_digits: u32,
    max_id_attempts: usize,
}

impl Directory {
    /// Empty directory generating `id_digits`-wide ids with at most
    /// `max_id_attempts` draws per allocation.
    pub fn new(id_digits: u32, max_id_attempts: usize) -> Self {
        Self {
            tenants: HashMap::new(),
            id_digits,
            max_id_attempts,
        }
    }

    /// Empty directory using the id settings from `cfg`.
    pub fn from_config(cfg: &ServiceConfig) -> Self {
        Self::new(cfg.island_id_digits, cfg.max_id_attempts)
    }

    /// Add a tenant if it is not known yet. Returns whether it was added.
    pub fn register_tenant(&mut self, id: TenantId, settings: TenantSettings) -> bool {
        if self.tenants.contains_key(&id) {
            return false;
        }
        self.tenants.insert(id, Tenant::new(id, settings));
        info!(tenant = %id, "tenant registered");
        true
    }

    /// Drop a tenant together with its islands.
    pub fn unregister_tenant(&mut self, id: TenantId) -> Option<Tenant> {
        let removed = self.tenants.remove(&id);
        if let Some(tenant) = &removed {
            info!(tenant = %id, islands = tenant.islands().len(), "tenant unregistered");
        }
        removed
    }

    /// Tenant registry by key.
    pub fn tenant(&self, id: TenantId) -> Option<&Tenant> {
        self.tenants.get(&id)
    }

    /// Mutable tenant registry by key.
    pub fn tenant_mut(&mut self, id: TenantId) -> Option<&mut Tenant> {
        self.tenants.get_mut(&id)
    }

    /// Every tenant registry.
    pub fn tenants(&self) -> impl Iterator<Item = &Tenant> {
        self.tenants.values()
    }

    /// Keys of every tenant, sorted.
    pub fn tenant_ids(&self) -> Vec<TenantId> {
        let mut ids: Vec<_> = self.tenants.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Every island in every tenant.
    pub fn islands(&self) -> impl Iterator<Item = &Island> {
        self.tenants.values().flat_map(Tenant::islands)
    }

    /// Number of live islands.
    pub fn island_count(&self) -> usize {
        self.islands().count()
    }

    /// Island owned by `owner` in any tenant.
    pub fn find_by_owner(&self, owner: UserId) -> Option<&Island> {
        self.tenants.values().find_map(|t| t.find_by_owner(owner))
    }

    /// Mutable island owned by `owner` in any tenant.
    pub fn find_by_owner_mut(&mut self, owner: UserId) -> Option<&mut Island> {
        self.tenants.values_mut().find_map(|t| t.find_by_owner_mut(owner))
    }

    /// Island with `id` in any tenant.
    pub fn find_by_id(&self, id: &IslandId) -> Option<&Island> {
        self.tenants.values().find_map(|t| t.find_by_id(id))
    }

    /// Mutable island with `id` in any tenant.
    pub fn find_by_id_mut(&mut self, id: &IslandId) -> Option<&mut Island> {
        self.tenants.values_mut().find_map(|t| t.find_by_id_mut(id))
    }

    /// Island owned by `owner` in `tenant` only.
    pub fn find_by_owner_in(&self, tenant: TenantId, owner: UserId) -> Option<&Island> {
        self.tenant(tenant)?.find_by_owner(owner)
    }

    /// Island with `id` in `tenant` only.
    pub fn find_by_id_in(&self, tenant: TenantId, id: &IslandId) -> Option<&Island> {
        self.tenant(tenant)?.find_by_id(id)
    }

    /// Draw a random fixed-width numeric id not held by any live island.
    pub fn generate_unique_id<R: Rng>(&self, rng: &mut R) -> Result<IslandId, QueueError> {
        let upper = 10u64.pow(self.id_digits);
        let keyspace = upper - 1;
        if self.island_count() as u64 >= keyspace {
            return Err(QueueError::IdSpaceExhausted(0));
        }
        let width = self.id_digits as usize;
        for attempt in 1..=self.max_id_attempts {
            let candidate = IslandId::new(format!("{:0width$}", rng.random_range(1..upper)));
            if self.find_by_id(&candidate).is_none() {
                debug!(island = %candidate, attempt, "allocated island id");
                return Ok(candidate);
            }
        }
        Err(QueueError::IdSpaceExhausted(self.max_id_attempts))
    }

    /// Register a new, not yet open island for `owner` in `tenant`.
    pub fn create_island<R: Rng>(
        &mut self,
        owner: Identity,
        price: Option<u32>,
        tenant: TenantId,
        now_ms: u128,
        rng: &mut R,
    ) -> Result<&Island, QueueError> {
        if let Some(existing) = self.find_by_owner(owner.id) {
            return Err(QueueError::AlreadyExists(format!(
                "{} already has island queue {}",
                owner.name,
                existing.id()
            )));
        }
        if !self.tenants.contains_key(&tenant) {
            return Err(QueueError::NotFound(format!("{tenant} is not registered")));
        }
        let id = self.generate_unique_id(rng)?;
        let owner_id = owner.id;
        let island = Island::new(owner, price, id.clone(), tenant, now_ms);
        if let Some(registry) = self.tenants.get_mut(&tenant) {
            registry.insert(island);
        }
        info!(island = %id, owner = %owner_id, %tenant, ?price, "island created");

        match self.find_by_owner(owner_id) {
            Some(created) if created.id() == &id => Ok(created),
            _ => {
                error!(island = %id, owner = %owner_id, "island missing right after creation");
                Err(QueueError::Conflict(format!("failed to create island for {owner_id}")))
            }
        }
    }

    /// Remove the island with `id` and report who was still in line.
    pub fn close_island(
        &mut self,
        id: &IslandId,
        reason: CloseReason,
    ) -> Result<Outcome<ClosedIsland>, QueueError> {
        let tenant_id = self
            .find_by_id(id)
            .map(Island::tenant)
            .ok_or_else(|| QueueError::NotFound(format!("{id} is not an open island")))?;
        let island = self
            .tenants
            .get_mut(&tenant_id)
            .and_then(|t| t.remove_by_id(id))
            .ok_or_else(|| QueueError::NotFound(format!("{id} is not an open island")))?;

        let owner_id = island.owner().id;
        if self.find_by_owner(owner_id).is_some() || self.find_by_id(id).is_some() {
            error!(island = %id, owner = %owner_id, "island still present after close");
            return Err(QueueError::Conflict(format!("failed to close {id}")));
        }

        let closed = ClosedIsland {
            island: id.clone(),
            owner: island.owner().clone(),
            tenant: tenant_id,
            price: island.price(),
            remaining: island.remaining(),
        };
        info!(island = %id, owner = %owner_id, remaining = closed.remaining.len(), ?reason, "island closed");
        let notices = vec![Notice::QueueClosed {
            tenant: tenant_id,
            owner: closed.owner.clone(),
            island: id.clone(),
            price: closed.price,
            remaining: closed.remaining.clone(),
            reason,
        }];
        Ok(Outcome {
            value: closed,
            notices,
        })
    }

    /// Resolve notices to delivery targets and render their text.
    ///
    /// Channel notices for tenants without a configured channel are dropped.
    pub fn route(&self, notices: &[Notice], ctx: &RouteContext<'_>) -> Vec<Envelope> {
        notices
            .iter()
            .filter_map(|notice| {
                let target = match notice.audience() {
                    Audience::Direct(user) => Target::User(user),
                    Audience::Channel(tenant, kind) => {
                        let Some(channel) = self.tenant(tenant).and_then(|t| t.channel_for(kind)) else {
                            debug!(%tenant, ?kind, "no broadcast channel configured");
                            return None;
                        };
                        if ctx.suppress_origin_echo && ctx.origin == Some(channel) {
                            debug!(%channel, "suppressing broadcast into origin channel");
                            return None;
                        }
                        Target::Channel(channel)
                    }
                };
                Some(Envelope {
                    target,
                    text: notice.render(ctx.prefix, ctx.now_ms),
                })
            })
            .collect()
    }
}
