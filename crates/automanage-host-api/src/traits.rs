//! Collaborator traits

use async_trait::async_trait;
use automanage_api::{Action, ActionRequest, EmailMessage};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ManagedResource;

/// Errors from resource listing and action execution
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("Start failed: {0}")]
    StartFailed(String),

    #[error("Stop failed: {0}")]
    StopFailed(String),

    #[error("Terminate failed: {0}")]
    TerminateFailed(String),

    #[error("Notification failed: {0}")]
    NotifyFailed(String),

    #[error("Email action without a composed message")]
    MissingMessage,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Enumerates the fleet for one evaluation cycle
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    async fn list_resources(&self) -> HostResult<Vec<Arc<dyn ManagedResource>>>;
}

/// Carries out side-effecting actions. Each call is fire-and-forget relative
/// to the cycle that requested it.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn start(&self, request: &ActionRequest) -> HostResult<()>;

    /// Stop the resource, taking `request.snapshot_id` first when present
    async fn stop(&self, request: &ActionRequest) -> HostResult<()>;

    async fn terminate(&self, request: &ActionRequest) -> HostResult<()>;

    async fn notify(&self, request: &ActionRequest, message: &EmailMessage) -> HostResult<()>;
}

/// What [`dispatch`] did with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Executed,
    Skipped,
}

/// Route a request to the matching executor call.
///
/// `none` is a no-op and `error` is surfaced in the log without calling the
/// executor.
pub async fn dispatch(
    executor: &dyn ActionExecutor,
    request: &ActionRequest,
) -> HostResult<Dispatched> {
    match &request.action {
        Action::None => {
            debug!(resource_id = %request.resource_id, "Nothing to do");
            Ok(Dispatched::Skipped)
        }
        Action::Error => {
            warn!(
                resource_id = %request.resource_id,
                policy = %request.policy,
                reason = ?request.reason,
                "Policy could not be applied"
            );
            Ok(Dispatched::Skipped)
        }
        Action::Start => executor.start(request).await.map(|_| Dispatched::Executed),
        Action::Stop => executor.stop(request).await.map(|_| Dispatched::Executed),
        Action::Terminate => executor
            .terminate(request)
            .await
            .map(|_| Dispatched::Executed),
        Action::Email { .. } => {
            let message = request.email.as_ref().ok_or(HostError::MissingMessage)?;
            executor
                .notify(request, message)
                .await
                .map(|_| Dispatched::Executed)
        }
    }
}
