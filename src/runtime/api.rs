//! Serializable payloads returned to the command layer for formatting.

use serde::{Deserialize, Serialize};

use crate::core::{Island, Visitor};
use crate::util::types::{Identity, IslandId, TenantId, UserId};

/// One queued visitor as shown in a queue listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorView {
    /// 1-based queue position.
    pub position: usize,
    /// Visitor key.
    pub user: UserId,
    /// Display name.
    pub name: String,
    /// Trip count label (`?` when unspecified).
    pub trips: String,
    /// Minutes since joining or last admission.
    pub minutes: u64,
}

impl VisitorView {
    fn from_visitor(position: usize, visitor: &Visitor, now_ms: u128) -> Self {
        Self {
            position,
            user: visitor.identity.id,
            name: visitor.identity.name.clone(),
            trips: visitor.trips_label(),
            minutes: visitor.minutes_active(now_ms),
        }
    }
}

/// Full view of one island queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandSnapshot {
    /// Island id.
    pub id: IslandId,
    /// Owner.
    pub owner: Identity,
    /// Owning tenant.
    pub tenant: TenantId,
    /// Turnip price, if any.
    pub price: Option<u32>,
    /// Active window size, `None` until opened.
    pub admission_size: Option<u8>,
    /// Whether joins are accepted.
    pub open: bool,
    /// Whole hours since creation.
    pub age_hours: u64,
    /// Visitors inside the window.
    pub active: Vec<VisitorView>,
    /// Visitors behind the window.
    pub waiting: Vec<VisitorView>,
}

impl IslandSnapshot {
    /// Capture `island` at `now_ms`.
    pub fn capture(island: &Island, now_ms: u128) -> Self {
        let active_count = island.active_count();
        let views = island
            .visitors()
            .iter()
            .enumerate()
            .map(|(idx, v)| VisitorView::from_visitor(idx + 1, v, now_ms));
        let (active, waiting): (Vec<_>, Vec<_>) = views.partition(|v| v.position <= active_count);
        Self {
            id: island.id().clone(),
            owner: island.owner().clone(),
            tenant: island.tenant(),
            price: island.price(),
            admission_size: island.admission_size(),
            open: island.is_open(),
            age_hours: island.age_in_hours(now_ms),
            active,
            waiting,
        }
    }

    /// Queue length.
    pub fn total(&self) -> usize {
        self.active.len() + self.waiting.len()
    }
}

/// One line of an island listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandSummary {
    /// Island id.
    pub id: IslandId,
    /// Owner.
    pub owner: Identity,
    /// Turnip price, if any.
    pub price: Option<u32>,
    /// Queue length.
    pub total: usize,
    /// Whether joins are accepted.
    pub open: bool,
}

impl From<&Island> for IslandSummary {
    fn from(island: &Island) -> Self {
        Self {
            id: island.id().clone(),
            owner: island.owner().clone(),
            price: island.price(),
            total: island.total_count(),
            open: island.is_open(),
        }
    }
}

/// Result of a join request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    /// Island joined.
    pub island: IslandId,
    /// Island owner.
    pub owner: Identity,
    /// 1-based queue position.
    pub position: usize,
    /// Queue length.
    pub total: usize,
    /// The visitor was already in line.
    pub already_queued: bool,
    /// The visitor holds the dodo code.
    pub admitted: bool,
}

/// Result of a forced removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedVisitor {
    /// Island the visitor was removed from.
    pub island: IslandId,
    /// Who was removed.
    pub visitor: Identity,
    /// 1-based position they held.
    pub position: usize,
}
