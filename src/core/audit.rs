//! Audit sink implementations.
//!
//! Records island lifecycle and admission changes for operators. The service
//! writes to a sink only when one is attached.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::util::clock::now_ms;

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier (UUID v4).
    pub event_id: String,
    /// Island the event concerns.
    pub island: String,
    /// Tenant identifier.
    pub tenant: String,
    /// User who triggered the event, or `sweep`.
    pub actor: String,
    /// Action taken (create, open, join, leave, remove, close, evict, auto_close, ...).
    pub action: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Additional context.
    pub payload: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
#[derive(Debug)]
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Sink that forwards events to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&mut self, event: AuditEvent) {
        tracing::info!(
            target: "island_queue::audit",
            event_id = %event.event_id,
            island = %event.island,
            tenant = %event.tenant,
            actor = %event.actor,
            action = %event.action,
            payload = event.payload.as_deref().unwrap_or(""),
            "audit"
        );
    }
}

/// Helper to build an audit event from context with a fresh event id.
pub fn build_audit_event(
    island: impl Into<String>,
    tenant: impl Into<String>,
    actor: impl Into<String>,
    action: impl Into<String>,
    payload: Option<String>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        island: island.into(),
        tenant: tenant.into(),
        actor: actor.into(),
        action: action.into(),
        created_at_ms: now_ms(),
        payload,
    }
}
