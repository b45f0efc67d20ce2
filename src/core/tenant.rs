//! Per-tenant registry of islands and routing settings.

use tracing::info;

use crate::config::TenantSettings;
use crate::core::error::QueueError;
use crate::core::island::Island;
use crate::util::types::{ChannelId, ChannelKind, IslandId, TenantId, UserId};

/// Islands and configuration belonging to one tenant.
#[derive(Debug, Clone)]
pub struct Tenant {
    id: TenantId,
    islands: Vec<Island>,
    settings: TenantSettings,
}

impl Tenant {
    /// Create an empty registry with the given settings.
    pub const fn new(id: TenantId, settings: TenantSettings) -> Self {
        Self {
            id,
            islands: Vec::new(),
            settings,
        }
    }

    /// Tenant key.
    pub const fn id(&self) -> TenantId {
        self.id
    }

    /// Current settings.
    pub const fn settings(&self) -> &TenantSettings {
        &self.settings
    }

    /// Islands in creation order.
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// Island owned by `owner` in this tenant.
    pub fn find_by_owner(&self, owner: UserId) -> Option<&Island> {
        self.islands.iter().find(|i| i.owner().id == owner)
    }

    /// Mutable island owned by `owner` in this tenant.
    pub fn find_by_owner_mut(&mut self, owner: UserId) -> Option<&mut Island> {
        self.islands.iter_mut().find(|i| i.owner().id == owner)
    }

    /// Island with `id` in this tenant.
    pub fn find_by_id(&self, id: &IslandId) -> Option<&Island> {
        self.islands.iter().find(|i| i.id() == id)
    }

    /// Mutable island with `id` in this tenant.
    pub fn find_by_id_mut(&mut self, id: &IslandId) -> Option<&mut Island> {
        self.islands.iter_mut().find(|i| i.id() == id)
    }

    pub(crate) fn insert(&mut self, island: Island) {
        self.islands.push(island);
    }

    pub(crate) fn remove_by_id(&mut self, id: &IslandId) -> Option<Island> {
        let idx = self.islands.iter().position(|i| i.id() == id)?;
        Some(self.islands.remove(idx))
    }

    /// Broadcast channel configured for `kind`.
    pub const fn channel_for(&self, kind: ChannelKind) -> Option<ChannelId> {
        match kind {
            ChannelKind::Turnip => self.settings.turnip_channel,
            ChannelKind::General => self.settings.general_channel,
        }
    }

    /// Minutes an active visitor may stay before the sweep evicts them.
    pub const fn visitor_timeout_minutes(&self) -> u64 {
        self.settings.timeout_minutes
    }

    /// Replace the settings wholesale, e.g. after a persisted write.
    pub fn apply_settings(&mut self, settings: TenantSettings) {
        info!(tenant = %self.id, ?settings, "tenant settings applied");
        self.settings = settings;
    }

    /// Settings with one channel replaced; the caller persists then applies.
    pub fn with_channel(&self, kind: ChannelKind, channel: Option<ChannelId>) -> TenantSettings {
        let mut next = self.settings.clone();
        match kind {
            ChannelKind::Turnip => next.turnip_channel = channel,
            ChannelKind::General => next.general_channel = channel,
        }
        next
    }

    /// Settings with the visitor timeout replaced, validated against
    /// `[min, max]` minutes.
    pub fn with_timeout(&self, minutes: u64, min: u64, max: u64) -> Result<TenantSettings, QueueError> {
        if !(min..=max).contains(&minutes) {
            return Err(QueueError::InvalidRange {
                what: "visitor timeout minutes",
                min,
                max,
                got: minutes,
            });
        }
        let mut next = self.settings.clone();
        next.timeout_minutes = minutes;
        Ok(next)
    }
}
