//! Action executor that reports each action as one NDJSON line
//!
//! This build has no cloud SDK; the records are meant for whatever carries
//! out the actions downstream. In dry-run mode every record is marked so.

use async_trait::async_trait;
use automanage_api::{ActionRequest, DecisionReason, EmailMessage, ResourceClass};
use automanage_host_api::{ActionExecutor, HostError, HostResult};
use automanage_util::{CycleId, ResourceId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Serialize)]
struct ActionRecord<'a> {
    op: &'static str,
    dry_run: bool,
    cycle_id: &'a CycleId,
    resource_id: &'a ResourceId,
    resource_name: &'a str,
    class: ResourceClass,
    policy: &'a str,
    reason: &'a DecisionReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a EmailMessage>,
    evaluated_at: DateTime<Utc>,
}

pub struct NdjsonExecutor<W> {
    out: Mutex<W>,
    dry_run: bool,
}

impl<W: Write + Send> NdjsonExecutor<W> {
    pub fn new(out: W, dry_run: bool) -> Self {
        Self {
            out: Mutex::new(out),
            dry_run,
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(
        &self,
        op: &'static str,
        request: &ActionRequest,
        email: Option<&EmailMessage>,
    ) -> HostResult<()> {
        let record = ActionRecord {
            op,
            dry_run: self.dry_run,
            cycle_id: &request.cycle_id,
            resource_id: &request.resource_id,
            resource_name: &request.resource_name,
            class: request.class,
            policy: &request.policy,
            reason: &request.reason,
            snapshot_id: request.snapshot_id.as_deref(),
            email,
            evaluated_at: request.evaluated_at,
        };
        let line = serde_json::to_string(&record)
            .map_err(|e| HostError::Internal(format!("Failed to encode action record: {}", e)))?;

        {
            let mut out = self
                .out
                .lock()
                .map_err(|_| HostError::Internal("output lock poisoned".into()))?;
            writeln!(out, "{}", line)?;
            out.flush()?;
        }

        if self.dry_run {
            info!(resource_id = %request.resource_id, op, "Dry run, action reported only");
        } else {
            info!(resource_id = %request.resource_id, op, "Action emitted");
        }
        Ok(())
    }
}

#[async_trait]
impl<W: Write + Send> ActionExecutor for NdjsonExecutor<W> {
    async fn start(&self, request: &ActionRequest) -> HostResult<()> {
        self.emit("start", request, None)
            .map_err(|e| HostError::StartFailed(e.to_string()))
    }

    async fn stop(&self, request: &ActionRequest) -> HostResult<()> {
        self.emit("stop", request, None)
            .map_err(|e| HostError::StopFailed(e.to_string()))
    }

    async fn terminate(&self, request: &ActionRequest) -> HostResult<()> {
        self.emit("terminate", request, None)
            .map_err(|e| HostError::TerminateFailed(e.to_string()))
    }

    async fn notify(&self, request: &ActionRequest, message: &EmailMessage) -> HostResult<()> {
        self.emit("email", request, Some(message))
            .map_err(|e| HostError::NotifyFailed(e.to_string()))
    }
}
