//! Notifier backends and the envelope dispatcher.

pub mod log;
pub mod memory;

pub use log::TracingNotifier;
pub use memory::{Delivery, InMemoryNotifier};

use serde::{Deserialize, Serialize};

use crate::core::{Envelope, Notifier, Target};

/// Delivery counts for one dispatch call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Envelopes the notifier accepted.
    pub delivered: usize,
    /// Envelopes the notifier rejected.
    pub failed: usize,
}

/// Deliver `envelopes` in order. Failures are logged and counted; the
/// remaining envelopes are still attempted.
pub async fn dispatch(notifier: &dyn Notifier, envelopes: Vec<Envelope>) -> DispatchReport {
    let mut report = DispatchReport::default();
    for envelope in envelopes {
        let result = match envelope.target {
            Target::User(user) => notifier.notify(user, &envelope.text).await,
            Target::Channel(channel) => notifier.broadcast(channel, &envelope.text).await,
        };
        match result {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::warn!(target = ?envelope.target, error = %e, "notification delivery failed");
                report.failed += 1;
            }
        }
    }
    report
}
