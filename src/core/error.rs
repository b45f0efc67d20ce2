//! Error types for queue operations.

use thiserror::Error;

/// Errors produced by queue, tenant and directory operations.
///
/// Everything except [`QueueError::Conflict`] is an expected outcome of user
/// input and is turned into a reply at the command boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Owner already has an island, or the island is already open.
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// Unknown island id, tenant, or the owner has no island.
    #[error("not found: {0}")]
    NotFound(String),
    /// Admission size, position or timeout outside its allowed bounds.
    #[error("{what} must be between {min} and {max}, got {got}")]
    InvalidRange {
        /// Name of the offending value.
        what: &'static str,
        /// Inclusive lower bound.
        min: u64,
        /// Inclusive upper bound.
        max: u64,
        /// Value supplied.
        got: u64,
    },
    /// Caller is neither the owner nor a tenant admin.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Owner tried to join their own island.
    #[error("owners cannot join their own island queue")]
    SelfReference,
    /// Join attempted before the island was opened.
    #[error("island {0} is not open yet")]
    NotOpen(String),
    /// Visitor is queued but not inside the active window.
    #[error("not admitted yet: position {position} of {total}")]
    NotAdmitted {
        /// 1-based queue position.
        position: usize,
        /// Queue length.
        total: usize,
    },
    /// No free island id could be drawn.
    #[error("no free island id after {0} attempts")]
    IdSpaceExhausted(usize),
    /// A post-mutation check failed; indicates a logic bug.
    #[error("internal conflict: {0}")]
    Conflict(String),
    /// Collaborator (config store, transport) failure with context.
    #[error("backend error: {0}")]
    Backend(String),
}

impl QueueError {
    /// Whether this error signals broken internal invariants rather than bad
    /// user input.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
