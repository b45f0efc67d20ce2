//! Tenant configuration store backends.

pub mod file;
pub mod memory;

pub use file::JsonFileConfigStore;
pub use memory::InMemoryConfigStore;
