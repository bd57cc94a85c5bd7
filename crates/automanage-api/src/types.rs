//! Shared types for the automanage API

use automanage_util::{CycleId, ResourceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of a managed resource, which determines the policies it accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    /// Compute instance addressed by instance id, labelled through tags
    Instance,
    /// Database instance addressed by identifier and status string
    Database,
}

impl ResourceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceClass::Instance => "instance",
            ResourceClass::Database => "database",
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed run state of a resource, normalized across classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Stopped,
    /// Any other provider state (pending, stopping, backing-up, ...)
    Transitional(String),
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }

    /// A start command is only valid from a fully stopped state
    pub fn is_startable(&self) -> bool {
        matches!(self, RunState::Stopped)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Running => f.write_str("running"),
            RunState::Stopped => f.write_str("stopped"),
            RunState::Transitional(state) => f.write_str(state),
        }
    }
}

/// The single management action chosen for a resource in one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    None,
    Start,
    Stop,
    Terminate,
    /// Notify the address named by the policy
    Email { to: String },
    /// The policy is invalid or does not apply to this resource class
    Error,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::None => "none",
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Terminate => "terminate",
            Action::Email { .. } => "email",
            Action::Error => "error",
        }
    }

    /// Start, stop and terminate change the resource's run state
    pub fn changes_run_state(&self) -> bool {
        matches!(self, Action::Start | Action::Stop | Action::Terminate)
    }

    /// Whether executing this action calls out to a collaborator
    pub fn has_side_effect(&self) -> bool {
        self.changes_run_state() || matches!(self, Action::Email { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured reason codes explaining a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DecisionReason {
    /// Policy is `none` or blank
    NoPolicy,

    /// Resource should be running and already is
    AlreadyRunning,

    /// Resource should be stopped and already is not running
    AlreadyStopped { state: String },

    /// Resource should be running but its state does not accept a start
    NotStartable { state: String },

    /// Current hour is inside the schedule window
    WindowOpen { hour: u8 },

    /// Current hour is outside the schedule window
    WindowClosed { hour: u8 },

    /// On and off hours are equal, so the window is never active
    EmptyWindow { hour: u8 },

    /// Running time is beyond the policy limit
    LimitExceeded { running_secs: u64, limit_hours: u32 },

    /// Running time has not reached the policy limit
    WithinLimit { limit_hours: u32 },

    /// `always-on` policy on a stopped resource
    PinnedOn,

    /// `always-off` policy on a running resource
    PinnedOff,

    /// Policy parameters are missing or malformed
    InvalidPolicy { message: String },

    /// Policy kind cannot be applied to this resource class
    UnsupportedForClass { kind: String, class: ResourceClass },

    /// Policy kind is not recognized
    UnknownKind { kind: String },

    /// Action suppressed because the resource belongs to an orchestrated group
    /// without an orchestrator identifier
    Gated { proposed: Action, marker_tag: String },
}

/// Outcome of evaluating one resource's policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    pub reason: DecisionReason,
}

impl Decision {
    pub fn new(action: Action, reason: DecisionReason) -> Self {
        Self { action, reason }
    }

    pub fn none(reason: DecisionReason) -> Self {
        Self::new(Action::None, reason)
    }

    pub fn error(reason: DecisionReason) -> Self {
        Self::new(Action::Error, reason)
    }
}

/// Notification composed for an `email` action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// What the executor is asked to do for one resource in one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub cycle_id: CycleId,
    pub resource_id: ResourceId,
    pub resource_name: String,
    pub class: ResourceClass,
    /// Raw policy tag value
    pub policy: String,
    pub action: Action,
    pub reason: DecisionReason,
    /// Final snapshot to take while stopping, for snapshot-capable classes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailMessage>,
    pub evaluated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_serializes_with_tag() {
        let json = serde_json::to_value(Action::Email {
            to: "ops@example.com".into(),
        })
        .unwrap();
        assert_eq!(json["action"], "email");
        assert_eq!(json["to"], "ops@example.com");

        let json = serde_json::to_value(Action::Stop).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "stop" }));
    }

    #[test]
    fn action_classification() {
        assert!(Action::Start.changes_run_state());
        assert!(Action::Terminate.changes_run_state());
        assert!(!Action::Email { to: "a@b".into() }.changes_run_state());
        assert!(Action::Email { to: "a@b".into() }.has_side_effect());
        assert!(!Action::Error.has_side_effect());
        assert!(!Action::None.has_side_effect());
    }

    #[test]
    fn reason_round_trips() {
        let reason = DecisionReason::Gated {
            proposed: Action::Stop,
            marker_tag: "fleet-group".into(),
        };
        let json = serde_json::to_string(&reason).unwrap();
        assert!(json.contains("\"code\":\"gated\""));
        let parsed: DecisionReason = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reason);
    }

    #[test]
    fn run_state_predicates() {
        assert!(RunState::Running.is_running());
        assert!(!RunState::Running.is_startable());
        assert!(RunState::Stopped.is_startable());
        let pending = RunState::Transitional("pending".into());
        assert!(!pending.is_running());
        assert!(!pending.is_startable());
        assert_eq!(pending.to_string(), "pending");
    }
}
