//! In-memory notifier backend.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{Notifier, QueueError, Target};
use crate::util::clock::now_ms;
use crate::util::types::{ChannelId, UserId};

/// A recorded delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Recipient.
    pub target: Target,
    /// Message text.
    pub text: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Notifier that records every message, for development and tests.
///
/// Recipients marked unreachable fail delivery, like users with DMs closed.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    deliveries: Mutex<Vec<Delivery>>,
    unreachable: Mutex<HashSet<Target>>,
}

impl InMemoryNotifier {
    /// Create an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deliveries to `target` fail from now on.
    pub fn mark_unreachable(&self, target: Target) {
        self.unreachable.lock().insert(target);
    }

    /// Every delivery so far, in order.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    /// Messages delivered to `target`, oldest first.
    pub fn fetch(&self, target: Target) -> Vec<String> {
        self.deliveries
            .lock()
            .iter()
            .filter(|d| d.target == target)
            .map(|d| d.text.clone())
            .collect()
    }

    /// Private messages received by `user`.
    pub fn messages_for(&self, user: UserId) -> Vec<String> {
        self.fetch(Target::User(user))
    }

    /// Posts made to `channel`.
    pub fn posts_in(&self, channel: ChannelId) -> Vec<String> {
        self.fetch(Target::Channel(channel))
    }

    /// Forget recorded deliveries.
    pub fn clear(&self) {
        self.deliveries.lock().clear();
    }

    fn record(&self, target: Target, text: &str) -> Result<(), QueueError> {
        if self.unreachable.lock().contains(&target) {
            return Err(QueueError::Backend(format!("{target:?} is unreachable")));
        }
        self.deliveries.lock().push(Delivery {
            target,
            text: text.to_string(),
            created_at_ms: now_ms(),
        });
        Ok(())
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(&self, user: UserId, text: &str) -> Result<(), QueueError> {
        self.record(Target::User(user), text)
    }

    async fn broadcast(&self, channel: ChannelId, text: &str) -> Result<(), QueueError> {
        self.record(Target::Channel(channel), text)
    }
}
