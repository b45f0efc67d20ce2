//! In-memory configuration store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::TenantSettings;
use crate::core::{ConfigStore, QueueError};
use crate::util::types::TenantId;

/// Configuration rows kept in a map, for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    rows: Mutex<HashMap<TenantId, TenantSettings>>,
}

impl InMemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `rows`.
    pub fn with_rows(rows: impl IntoIterator<Item = (TenantId, TenantSettings)>) -> Self {
        Self {
            rows: Mutex::new(rows.into_iter().collect()),
        }
    }

    /// Current row for `tenant`, bypassing the async trait.
    pub fn row(&self, tenant: TenantId) -> Option<TenantSettings> {
        self.rows.lock().get(&tenant).cloned()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn load(&self, tenant: TenantId) -> Result<Option<TenantSettings>, QueueError> {
        Ok(self.row(tenant))
    }

    async fn save(&self, tenant: TenantId, settings: &TenantSettings) -> Result<(), QueueError> {
        self.rows.lock().insert(tenant, settings.clone());
        Ok(())
    }
}
