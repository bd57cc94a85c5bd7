//! Resource provider backed by a JSON inventory file
//!
//! ```json
//! {"resources": [
//!   {"class": "instance", "instance_id": "i-0abc", "state": "running",
//!    "launch_time": "2025-12-24T08:00:00Z",
//!    "tags": {"Name": "build-box", "lifecycle-policy": "limit-stop:4"}},
//!   {"class": "database", "identifier": "reports-db", "status": "available",
//!    "tags": {"lifecycle-policy": "cycle-weekday:08/18"}}
//! ]}
//! ```

use async_trait::async_trait;
use automanage_host_api::{HostError, HostResult, ManagedResource, ResourceProvider, ResourceRecord};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct InventoryFile {
    #[serde(default)]
    resources: Vec<ResourceRecord>,
}

pub struct JsonInventory {
    path: PathBuf,
}

impl JsonInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResourceProvider for JsonInventory {
    async fn list_resources(&self) -> HostResult<Vec<Arc<dyn ManagedResource>>> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let inventory: InventoryFile = serde_json::from_str(&contents)
            .map_err(|e| HostError::ListFailed(format!("{}: {}", self.path.display(), e)))?;

        debug!(
            path = %self.path.display(),
            count = inventory.resources.len(),
            "Inventory loaded"
        );

        Ok(inventory
            .resources
            .into_iter()
            .map(ResourceRecord::into_managed)
            .collect())
    }
}
