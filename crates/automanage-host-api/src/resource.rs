//! Managed resource classes
//!
//! Each class normalizes its provider-specific shape (tag list and launch
//! time for instances, identifier and status string for databases) behind
//! [`ManagedResource`], so the core never inspects the raw shape.

use automanage_api::{ResourceClass, RunState};
use automanage_util::ResourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::ResourceCapabilities;

/// Tag carrying an instance's human-readable name
pub const NAME_TAG: &str = "Name";

/// Read-only view of a resource, as needed to evaluate its policy
pub trait ManagedResource: Send + Sync + fmt::Debug {
    fn id(&self) -> &ResourceId;

    /// Human-readable name for logs and notifications
    fn display_name(&self) -> String;

    fn class(&self) -> ResourceClass;

    fn run_state(&self) -> RunState;

    /// When the resource last entered its running state, if known
    fn launched_at(&self) -> Option<DateTime<Utc>>;

    fn tags(&self) -> &HashMap<String, String>;

    /// Full description of the resource, attached to notifications
    fn describe(&self) -> serde_json::Value;

    fn tag(&self, key: &str) -> Option<&str> {
        self.tags().get(key).map(String::as_str)
    }

    fn capabilities(&self) -> ResourceCapabilities {
        ResourceCapabilities::for_class(self.class())
    }

    /// Time spent running as of `now`, or `None` when not running.
    ///
    /// A launch time in the future counts as zero.
    fn running_duration(&self, now: DateTime<Utc>) -> Option<Duration> {
        if !self.run_state().is_running() {
            return None;
        }
        let launched = self.launched_at()?;
        Some(
            now.signed_duration_since(launched)
                .to_std()
                .unwrap_or(Duration::ZERO),
        )
    }
}

/// A compute instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeInstance {
    pub instance_id: ResourceId,
    /// Provider state name: pending, running, stopping, stopped, ...
    pub state: String,
    #[serde(default)]
    pub launch_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl ManagedResource for ComputeInstance {
    fn id(&self) -> &ResourceId {
        &self.instance_id
    }

    fn display_name(&self) -> String {
        self.tag(NAME_TAG)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.instance_id.to_string())
    }

    fn class(&self) -> ResourceClass {
        ResourceClass::Instance
    }

    fn run_state(&self) -> RunState {
        match self.state.as_str() {
            "running" => RunState::Running,
            "stopped" => RunState::Stopped,
            other => RunState::Transitional(other.to_string()),
        }
    }

    fn launched_at(&self) -> Option<DateTime<Utc>> {
        self.launch_time
    }

    fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// A managed database instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInstance {
    pub identifier: ResourceId,
    #[serde(default)]
    pub db_name: Option<String>,
    /// Provider status: available, stopped, starting, backing-up, ...
    pub status: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl ManagedResource for DatabaseInstance {
    fn id(&self) -> &ResourceId {
        &self.identifier
    }

    fn display_name(&self) -> String {
        self.db_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.identifier.to_string())
    }

    fn class(&self) -> ResourceClass {
        ResourceClass::Database
    }

    fn run_state(&self) -> RunState {
        match self.status.as_str() {
            "available" => RunState::Running,
            "stopped" => RunState::Stopped,
            other => RunState::Transitional(other.to_string()),
        }
    }

    fn launched_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// A resource as listed by a provider, tagged by class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum ResourceRecord {
    Instance(ComputeInstance),
    Database(DatabaseInstance),
}

impl ResourceRecord {
    pub fn into_managed(self) -> Arc<dyn ManagedResource> {
        match self {
            ResourceRecord::Instance(instance) => Arc::new(instance),
            ResourceRecord::Database(database) => Arc::new(database),
        }
    }
}
