//! # Island Queue
//!
//! Per-island visitor queues for sharing a game dodo code inside chat
//! communities.
//!
//! An owner registers an island, opens it with a dodo code, and visitors join
//! a first-come-first-served line. The first `N` visitors form the *active
//! window* and are sent the code privately; everyone behind them waits. When
//! someone leaves, is removed, or times out, the window slides forward and
//! the next visitor is admitted.
//!
//! ## Key Features
//!
//! - **Admission Window**: configurable 1..=7 slots, resized while open
//! - **Tenant Isolation**: one registry per community, each with its own
//!   broadcast channels and visitor timeout
//! - **Sweep**: periodic eviction of stale visitors and closing of old islands
//! - **Pluggable Backends**: message transport, settings storage, and role
//!   checks are traits with in-memory and local implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use island_queue::builders::ServiceBuilder;
//! use island_queue::infra::InMemoryNotifier;
//! use island_queue::util::{Identity, TenantId};
//!
//! let service = ServiceBuilder::from_env()?
//!     .with_notifier(Arc::new(InMemoryNotifier::new()))
//!     .build()?;
//! service.register_tenant(TenantId(1)).await?;
//! let island = service
//!     .create_and_open(Identity::new(10, "Tom"), TenantId(1), "ABCDE".into(), Some(500), None)
//!     .await?;
//! service.join(Identity::new(20, "Isabelle"), &island.id, 2).await?;
//! ```
//!
//! The admission rules themselves live in [`core::island`] and can be driven
//! without a runtime; see `tests/admission_test.rs`.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Queue model, admission window, routing, and sweep logic.
pub mod core;
/// Configuration models for the service and per-tenant settings.
pub mod config;
/// Builders to construct the service from configuration.
#[cfg(feature = "tokio-runtime")]
pub mod builders;
/// Infrastructure adapters for notification, settings storage, and roles.
pub mod infra;
/// Async service facade and background sweep.
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
/// Shared utilities.
pub mod util;
