//! Async service facade, background sweep, and response payloads.

pub mod api;
pub mod service;
pub mod sweep_task;
pub mod tokio_spawner;

pub use api::{IslandSnapshot, IslandSummary, JoinResponse, RemovedVisitor, VisitorView};
pub use service::QueueService;
pub use sweep_task::{start as start_sweep, SweepHandle};
pub use tokio_spawner::TokioSpawner;
