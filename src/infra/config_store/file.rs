//! File-backed configuration store using JSON lines.
//!
//! Every save appends one `{"tenant": .., "settings": ..}` line; the last
//! line for a tenant wins when the file is read back.

use std::collections::HashMap;
use std::fs::{create_dir_all, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::TenantSettings;
use crate::core::{ConfigStore, QueueError};
use crate::util::types::TenantId;

#[derive(Debug, Serialize, Deserialize)]
struct Row {
    tenant: TenantId,
    settings: TenantSettings,
}

/// Configuration store persisted to `<dir>/<name>_tenants.jsonl`.
#[derive(Debug)]
pub struct JsonFileConfigStore {
    file: PathBuf,
    rows: Mutex<HashMap<TenantId, TenantSettings>>,
}

impl JsonFileConfigStore {
    /// Open (or create) the store under `dir`, loading existing rows.
    pub fn open(dir: impl AsRef<Path>, name: &str) -> Result<Self, QueueError> {
        let dir = dir.as_ref();
        create_dir_all(dir).map_err(|e| QueueError::Backend(e.to_string()))?;
        let file = dir.join(format!("{name}_tenants.jsonl"));
        let rows = Self::read_rows(&file)?;
        tracing::debug!(path = %file.display(), rows = rows.len(), "config store opened");
        Ok(Self {
            file,
            rows: Mutex::new(rows),
        })
    }

    fn read_rows(file: &Path) -> Result<HashMap<TenantId, TenantSettings>, QueueError> {
        let mut rows = HashMap::new();
        if !file.exists() {
            return Ok(rows);
        }
        let handle = OpenOptions::new()
            .read(true)
            .open(file)
            .map_err(|e| QueueError::Backend(e.to_string()))?;
        for line in BufReader::new(handle).lines() {
            let line = line.map_err(|e| QueueError::Backend(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let row: Row =
                serde_json::from_str(&line).map_err(|e| QueueError::Backend(e.to_string()))?;
            rows.insert(row.tenant, row.settings);
        }
        Ok(rows)
    }

    fn append(&self, row: &Row) -> Result<(), QueueError> {
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)
            .map_err(|e| QueueError::Backend(e.to_string()))?;
        let line = serde_json::to_string(row).map_err(|e| QueueError::Backend(e.to_string()))?;
        writeln!(handle, "{line}").map_err(|e| QueueError::Backend(e.to_string()))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.file
    }
}

#[async_trait]
impl ConfigStore for JsonFileConfigStore {
    async fn load(&self, tenant: TenantId) -> Result<Option<TenantSettings>, QueueError> {
        Ok(self.rows.lock().get(&tenant).cloned())
    }

    async fn save(&self, tenant: TenantId, settings: &TenantSettings) -> Result<(), QueueError> {
        let row = Row {
            tenant,
            settings: settings.clone(),
        };
        self.append(&row)?;
        self.rows.lock().insert(tenant, row.settings);
        Ok(())
    }
}
