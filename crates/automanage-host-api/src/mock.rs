//! Mock fleet for testing

use async_trait::async_trait;
use automanage_api::{ActionRequest, EmailMessage};
use automanage_util::ResourceId;
use std::sync::{Arc, Mutex};

use crate::{ActionExecutor, HostError, HostResult, ManagedResource, ResourceProvider};

/// A call recorded by [`MockFleet`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Start(ResourceId),
    Stop {
        resource_id: ResourceId,
        snapshot_id: Option<String>,
    },
    Terminate(ResourceId),
    Notify {
        resource_id: ResourceId,
        to: String,
    },
}

/// In-memory provider and executor for unit/integration testing
pub struct MockFleet {
    resources: Vec<Arc<dyn ManagedResource>>,
    calls: Arc<Mutex<Vec<MockCall>>>,

    /// Configure listing to fail
    pub fail_listing: Arc<Mutex<bool>>,

    /// Configure every executor call to fail
    pub fail_actions: Arc<Mutex<bool>>,
}

impl MockFleet {
    pub fn new(resources: Vec<Arc<dyn ManagedResource>>) -> Self {
        Self {
            resources,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_listing: Arc::new(Mutex::new(false)),
            fail_actions: Arc::new(Mutex::new(false)),
        }
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: MockCall) -> HostResult<()> {
        if self.fail_actions.lock().map(|f| *f).unwrap_or(false) {
            return Err(HostError::Internal("mock failure".into()));
        }
        self.calls
            .lock()
            .map_err(|_| HostError::Internal("mock lock poisoned".into()))?
            .push(call);
        Ok(())
    }
}

impl Default for MockFleet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl ResourceProvider for MockFleet {
    async fn list_resources(&self) -> HostResult<Vec<Arc<dyn ManagedResource>>> {
        if self.fail_listing.lock().map(|f| *f).unwrap_or(false) {
            return Err(HostError::ListFailed("mock failure".into()));
        }
        Ok(self.resources.clone())
    }
}

#[async_trait]
impl ActionExecutor for MockFleet {
    async fn start(&self, request: &ActionRequest) -> HostResult<()> {
        self.record(MockCall::Start(request.resource_id.clone()))
    }

    async fn stop(&self, request: &ActionRequest) -> HostResult<()> {
        self.record(MockCall::Stop {
            resource_id: request.resource_id.clone(),
            snapshot_id: request.snapshot_id.clone(),
        })
    }

    async fn terminate(&self, request: &ActionRequest) -> HostResult<()> {
        self.record(MockCall::Terminate(request.resource_id.clone()))
    }

    async fn notify(&self, request: &ActionRequest, message: &EmailMessage) -> HostResult<()> {
        self.record(MockCall::Notify {
            resource_id: request.resource_id.clone(),
            to: message.to.clone(),
        })
    }
}
