//! Resource capabilities model

use automanage_api::ResourceClass;
use serde::{Deserialize, Serialize};

/// Describes which policies and payloads a resource class supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCapabilities {
    /// Accepts `limit-stop` and `limit-terminate` (needs a launch time)
    pub supports_runtime_limits: bool,

    /// Accepts `limit-email`
    pub supports_notification: bool,

    /// Takes a final snapshot when stopped
    pub snapshot_on_stop: bool,
}

impl ResourceCapabilities {
    /// Compute instances: runtime limits and notifications, plain stop
    pub fn instance() -> Self {
        Self {
            supports_runtime_limits: true,
            supports_notification: true,
            snapshot_on_stop: false,
        }
    }

    /// Database instances: schedules only, snapshot on stop
    pub fn database() -> Self {
        Self {
            supports_runtime_limits: false,
            supports_notification: false,
            snapshot_on_stop: true,
        }
    }

    pub fn for_class(class: ResourceClass) -> Self {
        match class {
            ResourceClass::Instance => Self::instance(),
            ResourceClass::Database => Self::database(),
        }
    }
}
