//! Queue data model, admission window, and sweep logic.

pub mod audit;
pub mod backend;
pub mod directory;
pub mod error;
pub mod island;
pub mod notice;
pub mod spawn;
pub mod sweep;
pub mod tenant;
pub mod visitor;

pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use backend::{ConfigStore, Notifier, RoleCheck};
pub use directory::{ClosedIsland, Directory, RouteContext};
pub use error::{AppResult, QueueError};
pub use island::{
    AdmissionSize, Island, IslandState, JoinReceipt, Outcome, DEFAULT_ADMISSION, MAX_ADMISSION,
    MIN_ADMISSION,
};
pub use notice::{AdmitReason, Audience, CloseReason, Envelope, Notice, Target};
pub use spawn::Spawn;
pub use sweep::{sweep_once, SweepReport};
pub use tenant::Tenant;
pub use visitor::Visitor;
