//! Abstractions for the collaborators the queue core calls into.

use async_trait::async_trait;

use crate::config::TenantSettings;
use crate::core::QueueError;
use crate::util::types::{ChannelId, TenantId, UserId};

/// Outbound message transport (chat platform DMs and channel posts).
///
/// Delivery is best-effort: errors are logged by the dispatcher and never
/// undo the mutation that produced the message.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a private message to one user.
    async fn notify(&self, user: UserId, text: &str) -> Result<(), QueueError>;
    /// Post a message to a channel.
    async fn broadcast(&self, channel: ChannelId, text: &str) -> Result<(), QueueError>;
}

/// Persistent per-tenant configuration rows.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the row for `tenant`, `None` when absent.
    async fn load(&self, tenant: TenantId) -> Result<Option<TenantSettings>, QueueError>;
    /// Insert or replace the row for `tenant`.
    async fn save(&self, tenant: TenantId, settings: &TenantSettings) -> Result<(), QueueError>;
}

/// Capability check against the platform's role system.
#[async_trait]
pub trait RoleCheck: Send + Sync {
    /// Whether `user` administers `tenant`.
    async fn is_admin(&self, user: UserId, tenant: TenantId) -> bool;
}
