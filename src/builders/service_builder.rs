//! Builder that assembles a [`QueueService`] from configuration and backends.

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::core::{AppResult, AuditSink, ConfigStore, Notifier, QueueError, RoleCheck};
use crate::infra::{InMemoryConfigStore, StaticRoleCheck, TracingNotifier};
use crate::runtime::QueueService;
use crate::util::clock::{Clock, SystemClock};

/// Collects the collaborators of a queue service.
///
/// Anything not supplied falls back to a local backend: messages are logged,
/// tenant settings live in memory, nobody is an admin, and time comes from
/// the system clock.
#[derive(Default)]
pub struct ServiceBuilder {
    config: ServiceConfig,
    notifier: Option<Arc<dyn Notifier>>,
    store: Option<Arc<dyn ConfigStore>>,
    roles: Option<Arc<dyn RoleCheck>>,
    clock: Option<Arc<dyn Clock>>,
    audit: Option<Box<dyn AuditSink>>,
}

impl std::fmt::Debug for ServiceBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceBuilder")
            .field("config", &self.config)
            .field("audit", &self.audit.is_some())
            .finish_non_exhaustive()
    }
}

impl ServiceBuilder {
    /// Builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded from `ISLAND_QUEUE_*` environment variables.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self::new().with_config(ServiceConfig::from_env()?))
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Message transport.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Tenant settings storage.
    #[must_use]
    pub fn with_config_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Admin lookup.
    #[must_use]
    pub fn with_role_check(mut self, roles: Arc<dyn RoleCheck>) -> Self {
        self.roles = Some(roles);
        self
    }

    /// Time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Validate the configuration and build the service.
    pub fn build(self) -> Result<QueueService, QueueError> {
        self.config
            .validate()
            .map_err(|e| QueueError::Backend(format!("config invalid: {e}")))?;

        let service = QueueService::new(
            self.config,
            self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
            self.store
                .unwrap_or_else(|| Arc::new(InMemoryConfigStore::new())),
            self.roles.unwrap_or_else(|| Arc::new(StaticRoleCheck::new())),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        );
        Ok(match self.audit {
            Some(audit) => service.with_audit(audit),
            None => service,
        })
    }
}
