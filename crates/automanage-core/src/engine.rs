//! Core decision engine

use automanage_api::{
    Action, ActionRequest, Decision, DecisionReason, ResourceClass, RunState,
};
use automanage_config::Settings;
use automanage_host_api::{ManagedResource, ResourceCapabilities};
use automanage_util::{CycleId, TimeContext, snapshot_identifier};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{
    ActionGate, CycleKind, Policy, PolicyError, PolicyKind, compose_email, is_beyond_limit,
    is_within_window,
};

/// Observed facts about a resource that a decision depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState {
    pub run_state: RunState,
    /// Time spent running, `None` when not running
    pub running_for: Option<Duration>,
    pub class: ResourceClass,
    pub capabilities: ResourceCapabilities,
}

impl ResourceState {
    pub fn observe(resource: &dyn ManagedResource, now: DateTime<Utc>) -> Self {
        Self {
            run_state: resource.run_state(),
            running_for: resource.running_duration(now),
            class: resource.class(),
            capabilities: resource.capabilities(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.run_state.is_running()
    }

    /// Stopped, and so able to accept a start
    pub fn is_startable(&self) -> bool {
        !self.is_running() && self.run_state.is_startable()
    }
}

/// Decide the single action a policy calls for.
///
/// Never fails: malformed parameters, unknown kinds and policies the class
/// cannot honor all become an [`Action::Error`] decision.
pub fn decide(policy: &Policy, state: &ResourceState, now: &TimeContext) -> Decision {
    decide_kind(policy, state, now).unwrap_or_else(|e| {
        Decision::error(DecisionReason::InvalidPolicy {
            message: e.to_string(),
        })
    })
}

fn decide_kind(
    policy: &Policy,
    state: &ResourceState,
    now: &TimeContext,
) -> Result<Decision, PolicyError> {
    let decision = match &policy.kind {
        PolicyKind::None => Decision::none(DecisionReason::NoPolicy),

        PolicyKind::LimitStop | PolicyKind::LimitTerminate => {
            if !state.capabilities.supports_runtime_limits {
                return Ok(unsupported(policy, state));
            }
            let limit_hours = policy.number(0, "hour limit")?;
            if is_beyond_limit(state.running_for, limit_hours) {
                let action = if policy.kind == PolicyKind::LimitStop {
                    Action::Stop
                } else {
                    Action::Terminate
                };
                Decision::new(action, limit_exceeded(state, limit_hours))
            } else {
                Decision::none(DecisionReason::WithinLimit { limit_hours })
            }
        }

        PolicyKind::LimitEmail => {
            if !state.capabilities.supports_notification {
                return Ok(unsupported(policy, state));
            }
            let limit_hours = policy.number(0, "hour limit")?;
            let to = policy.param(1, "notify address")?;
            if is_beyond_limit(state.running_for, limit_hours) {
                Decision::new(
                    Action::Email { to: to.to_string() },
                    limit_exceeded(state, limit_hours),
                )
            } else {
                Decision::none(DecisionReason::WithinLimit { limit_hours })
            }
        }

        PolicyKind::AlwaysOn => want_running(state, DecisionReason::PinnedOn),

        PolicyKind::AlwaysOff => want_stopped(state, DecisionReason::PinnedOff),

        PolicyKind::Unknown(kind) => {
            Decision::error(DecisionReason::UnknownKind { kind: kind.clone() })
        }

        PolicyKind::CycleDaily => decide_cycle(CycleKind::Daily, policy, state, now)?,
        PolicyKind::CycleWeekday => decide_cycle(CycleKind::Weekday, policy, state, now)?,
        PolicyKind::CycleWeekly => decide_cycle(CycleKind::Weekly, policy, state, now)?,
    };

    Ok(decision)
}

fn decide_cycle(
    cycle: CycleKind,
    policy: &Policy,
    state: &ResourceState,
    now: &TimeContext,
) -> Result<Decision, PolicyError> {
    let on_hour = policy.hour(0, "on hour")?;
    let off_hour = policy.hour(1, "off hour")?;
    let target_day = match cycle {
        CycleKind::Weekly => Some(policy.weekday(2, "target day")?),
        CycleKind::Daily | CycleKind::Weekday => None,
    };

    if on_hour == off_hour {
        warn!(
            policy = %policy,
            hour = on_hour,
            "Schedule window opens and closes at the same hour and is never active"
        );
        let reason = DecisionReason::EmptyWindow { hour: now.hour };
        return Ok(if state.is_running() {
            Decision::new(Action::Stop, reason)
        } else {
            Decision::none(reason)
        });
    }

    if is_within_window(cycle, on_hour, off_hour, target_day, now) {
        Ok(want_running(state, DecisionReason::WindowOpen { hour: now.hour }))
    } else {
        Ok(want_stopped(state, DecisionReason::WindowClosed { hour: now.hour }))
    }
}

fn want_running(state: &ResourceState, start_reason: DecisionReason) -> Decision {
    if state.is_running() {
        Decision::none(DecisionReason::AlreadyRunning)
    } else if state.is_startable() {
        Decision::new(Action::Start, start_reason)
    } else {
        Decision::none(DecisionReason::NotStartable {
            state: state.run_state.to_string(),
        })
    }
}

fn want_stopped(state: &ResourceState, stop_reason: DecisionReason) -> Decision {
    if state.is_running() {
        Decision::new(Action::Stop, stop_reason)
    } else {
        Decision::none(DecisionReason::AlreadyStopped {
            state: state.run_state.to_string(),
        })
    }
}

fn limit_exceeded(state: &ResourceState, limit_hours: u32) -> DecisionReason {
    DecisionReason::LimitExceeded {
        running_secs: state.running_for.map(|d| d.as_secs()).unwrap_or(0),
        limit_hours,
    }
}

fn unsupported(policy: &Policy, state: &ResourceState) -> Decision {
    Decision::error(DecisionReason::UnsupportedForClass {
        kind: policy.kind.to_string(),
        class: state.class,
    })
}

/// One evaluation pass over the fleet, pinned to a single instant
#[derive(Debug, Clone)]
pub struct Cycle {
    pub cycle_id: CycleId,
    pub at: DateTime<Utc>,
    /// `at` in the configured timezone
    pub local: DateTime<Tz>,
    pub context: TimeContext,
}

/// Everything a cycle decided
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle_id: CycleId,
    pub evaluated_at: DateTime<Utc>,
    pub requests: Vec<ActionRequest>,
    /// Resources skipped for carrying no policy tag
    pub untagged: usize,
}

impl CycleReport {
    /// Number of requests per action name
    pub fn action_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for request in &self.requests {
            *counts.entry(request.action.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Requests the executor has to carry out
    pub fn side_effects(&self) -> impl Iterator<Item = &ActionRequest> {
        self.requests.iter().filter(|r| r.action.has_side_effect())
    }
}

/// The core decision engine
pub struct CoreEngine {
    settings: Settings,
    gate: ActionGate,
}

impl CoreEngine {
    pub fn new(settings: Settings) -> Self {
        info!(
            timezone = settings.timezone.name(),
            policy_tag = %settings.policy_tag,
            dry_run = settings.dry_run,
            "Core engine initialized"
        );

        let gate = ActionGate::new(&settings.gate);
        Self { settings, gate }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Fix the evaluation instant for a new cycle
    pub fn begin_cycle(&self, at: DateTime<Utc>) -> Cycle {
        let local = at.with_timezone(&self.settings.timezone);
        Cycle {
            cycle_id: CycleId::new(),
            at,
            context: TimeContext::from_datetime(&local),
            local,
        }
    }

    /// Evaluate one resource. Returns `None` for resources without a policy tag.
    pub fn evaluate(&self, resource: &dyn ManagedResource, cycle: &Cycle) -> Option<ActionRequest> {
        let Some(raw_policy) = resource.tag(&self.settings.policy_tag) else {
            debug!(resource_id = %resource.id(), "No policy tag, skipping");
            return None;
        };

        let policy = Policy::parse(raw_policy);
        let state = ResourceState::observe(resource, cycle.at);
        let decision = decide(&policy, &state, &cycle.context);
        let decision = self.gate.apply(resource.tags(), decision);

        let snapshot_id = match decision.action {
            Action::Stop if self.settings.snapshot_on_stop && state.capabilities.snapshot_on_stop => {
                Some(snapshot_identifier(resource.id(), &cycle.local))
            }
            _ => None,
        };

        let email = match &decision.action {
            Action::Email { to } => Some(compose_email(
                &self.settings.email_from,
                to,
                resource,
                &policy,
            )),
            _ => None,
        };

        match &decision.action {
            Action::Error => warn!(
                resource_id = %resource.id(),
                policy = %policy,
                reason = ?decision.reason,
                "Policy cannot be applied"
            ),
            Action::None => debug!(
                resource_id = %resource.id(),
                policy = %policy,
                reason = ?decision.reason,
                "No action"
            ),
            action => info!(
                resource_id = %resource.id(),
                policy = %policy,
                action = %action,
                reason = ?decision.reason,
                "Action decided"
            ),
        }

        Some(ActionRequest {
            cycle_id: cycle.cycle_id.clone(),
            resource_id: resource.id().clone(),
            resource_name: resource.display_name(),
            class: state.class,
            policy: policy.raw().to_string(),
            action: decision.action,
            reason: decision.reason,
            snapshot_id,
            email,
            evaluated_at: cycle.at,
        })
    }

    /// Evaluate every resource at instant `at`
    pub fn evaluate_fleet(
        &self,
        resources: &[Arc<dyn ManagedResource>],
        at: DateTime<Utc>,
    ) -> CycleReport {
        let cycle = self.begin_cycle(at);
        let mut requests = Vec::with_capacity(resources.len());
        let mut untagged = 0;

        for resource in resources {
            match self.evaluate(resource.as_ref(), &cycle) {
                Some(request) => requests.push(request),
                None => untagged += 1,
            }
        }

        debug!(
            cycle_id = %cycle.cycle_id,
            evaluated = requests.len(),
            untagged,
            "Cycle evaluated"
        );

        CycleReport {
            cycle_id: cycle.cycle_id,
            evaluated_at: cycle.at,
            requests,
            untagged,
        }
    }
}
