//! Notifier that only logs, for running without a chat connection.

use async_trait::async_trait;

use crate::core::{Notifier, QueueError};
use crate::util::types::{ChannelId, UserId};

/// Writes every message to `tracing` instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, user: UserId, text: &str) -> Result<(), QueueError> {
        tracing::info!(target: "island_queue::notify", %user, text, "direct message");
        Ok(())
    }

    async fn broadcast(&self, channel: ChannelId, text: &str) -> Result<(), QueueError> {
        tracing::info!(target: "island_queue::notify", %channel, text, "channel post");
        Ok(())
    }
}
