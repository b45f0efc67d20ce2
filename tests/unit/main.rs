//! Unit tests for individual components

mod audit_test;
mod config_store_test;
mod config_test;
mod error_test;
mod notifier_test;
mod util_test;
