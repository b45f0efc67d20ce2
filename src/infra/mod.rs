//! Infrastructure adapters for notification transport, configuration
//! storage, and role checks.

pub mod config_store;
pub mod notifier;
pub mod roles;

pub use config_store::{InMemoryConfigStore, JsonFileConfigStore};
pub use notifier::{dispatch, DispatchReport, InMemoryNotifier, TracingNotifier};
pub use roles::StaticRoleCheck;
