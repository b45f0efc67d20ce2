//! Configuration models for the queue service and per-tenant settings.

pub mod service;
pub mod tenant;

pub use service::ServiceConfig;
pub use tenant::{TenantSettings, DEFAULT_VISITOR_TIMEOUT_MINUTES};
