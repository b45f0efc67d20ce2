//! Island queues and the admission window.
//!
//! An island holds visitors in join order. The first `admission_size` of them
//! form the active window and hold the dodo code; everyone behind them waits.
//! Every operation that changes who is inside the window returns the
//! [`Notice`]s describing that change instead of sending anything itself.
//!
//! Window rules:
//! - a join that lands inside the window is admitted immediately;
//! - removing an active visitor promotes exactly the entry that slides into
//!   the last window slot, if there is one;
//! - resizing admits or demotes the entries between the old and new bounds.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::QueueError;
use crate::core::notice::{AdmitReason, Notice};
use crate::core::visitor::Visitor;
use crate::util::clock::HOUR_MS;
use crate::util::types::{Identity, IslandId, TenantId, UserId};

/// Smallest allowed admission window.
pub const MIN_ADMISSION: u8 = 1;
/// Largest allowed admission window.
pub const MAX_ADMISSION: u8 = 7;
/// Window used when the owner does not pick one.
pub const DEFAULT_ADMISSION: u8 = 3;

/// Validated admission window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AdmissionSize(u8);

impl AdmissionSize {
    /// Validate `size` against `[MIN_ADMISSION, MAX_ADMISSION]`.
    pub fn new(size: u8) -> Result<Self, QueueError> {
        if (MIN_ADMISSION..=MAX_ADMISSION).contains(&size) {
            Ok(Self(size))
        } else {
            Err(QueueError::InvalidRange {
                what: "admission size",
                min: u64::from(MIN_ADMISSION),
                max: u64::from(MAX_ADMISSION),
                got: u64::from(size),
            })
        }
    }

    /// Window size as a count.
    pub const fn get(self) -> u8 {
        self.0
    }

    const fn slots(self) -> usize {
        self.0 as usize
    }
}

impl Default for AdmissionSize {
    fn default() -> Self {
        Self(DEFAULT_ADMISSION)
    }
}

impl TryFrom<u8> for AdmissionSize {
    type Error = QueueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AdmissionSize> for u8 {
    fn from(value: AdmissionSize) -> Self {
        value.0
    }
}

/// Lifecycle state. Only an open island has a code and a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IslandState {
    /// Registered by the owner, not accepting joins.
    Created,
    /// Accepting joins.
    Open {
        /// Dodo code handed to active visitors.
        code: String,
        /// Active window size.
        admission: AdmissionSize,
    },
}

/// Result of a mutation plus the notifications it triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    /// Operation result.
    pub value: T,
    /// Notifications to dispatch, in emission order.
    pub notices: Vec<Notice>,
}

impl<T> Outcome<T> {
    /// Outcome without notifications.
    pub const fn quiet(value: T) -> Self {
        Self {
            value,
            notices: Vec::new(),
        }
    }
}

/// What a join did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinReceipt {
    /// 0-based queue position.
    pub position: usize,
    /// Queue length after the join.
    pub total: usize,
    /// The visitor was already in line; nothing changed.
    pub already_queued: bool,
    /// The visitor is inside the active window.
    pub admitted: bool,
}

/// A visitation queue bound to one owner's island.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Island {
    owner: Identity,
    price: Option<u32>,
    id: IslandId,
    tenant: TenantId,
    created_at_ms: u128,
    state: IslandState,
    queue: Vec<Visitor>,
}

impl Island {
    /// Register an island that does not accept joins yet.
    pub fn new(
        owner: Identity,
        price: Option<u32>,
        id: IslandId,
        tenant: TenantId,
        now_ms: u128,
    ) -> Self {
        Self {
            owner,
            price,
            id,
            tenant,
            created_at_ms: now_ms,
            state: IslandState::Created,
            queue: Vec::new(),
        }
    }

    /// Island owner.
    pub const fn owner(&self) -> &Identity {
        &self.owner
    }

    /// Turnip price, if this is a priced island.
    pub const fn price(&self) -> Option<u32> {
        self.price
    }

    /// Directory-unique id.
    pub const fn id(&self) -> &IslandId {
        &self.id
    }

    /// Owning tenant.
    pub const fn tenant(&self) -> TenantId {
        self.tenant
    }

    /// Registration time.
    pub const fn created_at_ms(&self) -> u128 {
        self.created_at_ms
    }

    /// Lifecycle state.
    pub const fn state(&self) -> &IslandState {
        &self.state
    }

    /// Whether joins are accepted.
    pub const fn is_open(&self) -> bool {
        matches!(self.state, IslandState::Open { .. })
    }

    /// Current dodo code.
    pub fn code(&self) -> Option<&str> {
        match &self.state {
            IslandState::Open { code, .. } => Some(code),
            IslandState::Created => None,
        }
    }

    /// Active window size, `None` until opened.
    pub const fn admission_size(&self) -> Option<u8> {
        match &self.state {
            IslandState::Open { admission, .. } => Some(admission.get()),
            IslandState::Created => None,
        }
    }

    /// All visitors in join order.
    pub fn visitors(&self) -> &[Visitor] {
        &self.queue
    }

    /// Visitors inside the window.
    pub fn active(&self) -> &[Visitor] {
        &self.queue[..self.active_count()]
    }

    /// Visitors behind the window.
    pub fn waiting(&self) -> &[Visitor] {
        &self.queue[self.active_count()..]
    }

    /// Number of visitors inside the window.
    pub fn active_count(&self) -> usize {
        self.window().min(self.queue.len())
    }

    /// Number of queued visitors.
    pub fn total_count(&self) -> usize {
        self.queue.len()
    }

    /// 0-based position of `user`.
    pub fn position_of(&self, user: UserId) -> Option<usize> {
        self.queue.iter().position(|v| v.identity.id == user)
    }

    /// Whether `user` is inside the window.
    pub fn is_active(&self, user: UserId) -> bool {
        self.position_of(user)
            .is_some_and(|idx| idx < self.window())
    }

    /// Whole hours since registration.
    pub fn age_in_hours(&self, now_ms: u128) -> u64 {
        let hours = now_ms.saturating_sub(self.created_at_ms) / HOUR_MS;
        u64::try_from(hours).unwrap_or(u64::MAX)
    }

    /// Identities still in line, in queue order.
    pub fn remaining(&self) -> Vec<Identity> {
        self.queue.iter().map(|v| v.identity.clone()).collect()
    }

    fn window(&self) -> usize {
        match &self.state {
            IslandState::Open { admission, .. } => admission.slots(),
            IslandState::Created => 0,
        }
    }

    fn admitted_notice(&self, idx: usize, reason: AdmitReason) -> Option<Notice> {
        let code = self.code()?;
        let visitor = self.queue.get(idx)?;
        Some(Notice::Admitted {
            visitor: visitor.identity.clone(),
            owner: self.owner.clone(),
            island: self.id.clone(),
            code: code.to_string(),
            reason,
        })
    }

    fn admit_at(&mut self, idx: usize, reason: AdmitReason, now_ms: u128, notices: &mut Vec<Notice>) {
        let Some(visitor) = self.queue.get_mut(idx) else {
            return;
        };
        visitor.admit(now_ms);
        debug!(island = %self.id, user = %visitor.identity.id, position = idx + 1, ?reason, "visitor admitted");
        if let Some(notice) = self.admitted_notice(idx, reason) {
            notices.push(notice);
        }
    }

    /// After removing the entry that sat at `removed_idx`, admit the one entry
    /// that slid into the last window slot.
    fn slide_window(&mut self, removed_idx: usize, now_ms: u128, notices: &mut Vec<Notice>) {
        let window = self.window();
        if window == 0 || removed_idx >= window || self.queue.len() < window {
            return;
        }
        self.admit_at(window - 1, AdmitReason::Promoted, now_ms, notices);
    }

    /// Start accepting joins with `code` and a window of `size`.
    pub fn open(&mut self, code: impl Into<String>, size: u8) -> Result<Vec<Notice>, QueueError> {
        if self.is_open() {
            return Err(QueueError::AlreadyExists(format!("{} is already open", self.id)));
        }
        let admission = AdmissionSize::new(size)?;
        self.state = IslandState::Open {
            code: code.into(),
            admission,
        };
        info!(island = %self.id, owner = %self.owner.id, size, "island opened");
        Ok(vec![Notice::QueueOpened {
            tenant: self.tenant,
            owner: self.owner.clone(),
            island: self.id.clone(),
            price: self.price,
            admission_size: size,
        }])
    }

    /// Append `identity` to the queue.
    ///
    /// Joining twice is not an error: the receipt reports the existing
    /// position with `already_queued` set. `allow_self` lets the owner queue
    /// on their own island (debug mode).
    pub fn join(
        &mut self,
        identity: Identity,
        trips: u32,
        now_ms: u128,
        allow_self: bool,
    ) -> Result<Outcome<JoinReceipt>, QueueError> {
        if !self.is_open() {
            return Err(QueueError::NotOpen(self.id.to_string()));
        }
        if !allow_self && identity == self.owner {
            return Err(QueueError::SelfReference);
        }
        let window = self.window();
        if let Some(position) = self.position_of(identity.id) {
            return Ok(Outcome::quiet(JoinReceipt {
                position,
                total: self.queue.len(),
                already_queued: true,
                admitted: position < window,
            }));
        }

        self.queue.push(Visitor::new(identity, trips, now_ms));
        let position = self.queue.len() - 1;
        let mut notices = Vec::new();
        if position < window {
            self.admit_at(position, AdmitReason::Joined, now_ms, &mut notices);
        }
        debug!(island = %self.id, position = position + 1, total = self.queue.len(), "visitor joined");
        Ok(Outcome {
            value: JoinReceipt {
                position,
                total: self.queue.len(),
                already_queued: false,
                admitted: position < window,
            },
            notices,
        })
    }

    /// Remove `user` from the queue. `value` is false when they were not in it.
    pub fn leave(&mut self, user: UserId, now_ms: u128) -> Outcome<bool> {
        let Some(idx) = self.position_of(user) else {
            return Outcome::quiet(false);
        };
        self.queue.remove(idx);
        let mut notices = Vec::new();
        self.slide_window(idx, now_ms, &mut notices);
        debug!(island = %self.id, %user, remaining = self.queue.len(), "visitor left");
        Outcome {
            value: true,
            notices,
        }
    }

    /// Force-remove the visitor at 1-based `position`.
    pub fn remove_at(&mut self, position: usize, now_ms: u128) -> Result<Outcome<Visitor>, QueueError> {
        if self.queue.is_empty() {
            return Err(QueueError::NotFound(format!("{} has nobody in line", self.id)));
        }
        if position == 0 || position > self.queue.len() {
            return Err(QueueError::InvalidRange {
                what: "position",
                min: 1,
                max: self.queue.len() as u64,
                got: position as u64,
            });
        }
        let idx = position - 1;
        let removed = self.queue.remove(idx);
        let mut notices = vec![Notice::RemovedByOwner {
            visitor: removed.identity.clone(),
            owner: self.owner.clone(),
            island: self.id.clone(),
        }];
        self.slide_window(idx, now_ms, &mut notices);
        info!(island = %self.id, user = %removed.identity.id, position, "visitor removed by owner");
        Ok(Outcome {
            value: removed,
            notices,
        })
    }

    /// Replace the dodo code and re-send it to every active visitor.
    pub fn update_code(&mut self, new_code: impl Into<String>) -> Result<Vec<Notice>, QueueError> {
        let IslandState::Open { code, .. } = &mut self.state else {
            return Err(QueueError::NotOpen(self.id.to_string()));
        };
        *code = new_code.into();
        let notices = (0..self.active_count())
            .filter_map(|idx| self.admitted_notice(idx, AdmitReason::CodeUpdated))
            .collect();
        info!(island = %self.id, "dodo code updated");
        Ok(notices)
    }

    /// Resize the active window.
    ///
    /// Growing admits every entry that newly falls inside; shrinking tells
    /// every entry that fell outside to wait, without removing anyone.
    pub fn update_admission_size(&mut self, new_size: u8, now_ms: u128) -> Result<Vec<Notice>, QueueError> {
        let resized = AdmissionSize::new(new_size)?;
        let IslandState::Open { admission, .. } = &mut self.state else {
            return Err(QueueError::NotOpen(self.id.to_string()));
        };
        let old = admission.slots();
        *admission = resized;
        let new = resized.slots();
        let len = self.queue.len();

        let mut notices = Vec::new();
        if new > old {
            for idx in old..new.min(len) {
                self.admit_at(idx, AdmitReason::WindowGrew, now_ms, &mut notices);
            }
        } else {
            for idx in new..old.min(len) {
                notices.push(Notice::WindowShrank {
                    visitor: self.queue[idx].identity.clone(),
                    owner: self.owner.clone(),
                    island: self.id.clone(),
                    position: idx + 1,
                });
            }
        }
        info!(island = %self.id, old, new, "admission size updated");
        Ok(notices)
    }

    /// Replace the price. Changes only future announcement routing.
    pub fn update_price(&mut self, price: Option<u32>) {
        self.price = price;
    }

    /// Build the access notice again for an active visitor.
    pub fn resend_code(&self, user: UserId) -> Result<Notice, QueueError> {
        if !self.is_open() {
            return Err(QueueError::NotOpen(self.id.to_string()));
        }
        let idx = self
            .position_of(user)
            .ok_or_else(|| QueueError::NotFound(format!("{user} is not queued on {}", self.id)))?;
        if idx >= self.window() {
            return Err(QueueError::NotAdmitted {
                position: idx + 1,
                total: self.queue.len(),
            });
        }
        self.admitted_notice(idx, AdmitReason::Resent)
            .ok_or_else(|| QueueError::Conflict(format!("no access notice for {user}")))
    }

    /// Evict active visitors who used up `timeout_minutes`.
    ///
    /// Each eviction re-evaluates the window before looking further, so a
    /// visitor promoted by one eviction is never skipped or admitted twice.
    pub fn evict_stale(&mut self, timeout_minutes: u64, now_ms: u128) -> Outcome<Vec<Identity>> {
        let mut evicted = Vec::new();
        let mut notices = Vec::new();
        let mut idx = 0;
        while idx < self.active_count() {
            let minutes = self.queue[idx].minutes_active(now_ms);
            if minutes < timeout_minutes {
                idx += 1;
                continue;
            }
            let visitor = self.queue.remove(idx);
            info!(island = %self.id, user = %visitor.identity.id, minutes, "evicting visitor after timeout");
            notices.push(Notice::TurnExpired {
                visitor: visitor.identity.clone(),
                owner: self.owner.clone(),
                island: self.id.clone(),
                minutes,
            });
            self.slide_window(idx, now_ms, &mut notices);
            evicted.push(visitor.identity);
        }
        Outcome {
            value: evicted,
            notices,
        }
    }
}
