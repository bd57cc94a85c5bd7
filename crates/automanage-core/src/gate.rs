//! Action gate for externally orchestrated resources
//!
//! A resource carrying the orchestration marker tag but not the companion
//! identifier tag cannot be addressed through its orchestrator, so run-state
//! changes for it are suppressed. Notifications and errors pass through.

use automanage_api::{Decision, DecisionReason};
use automanage_config::GateSettings;
use std::collections::HashMap;
use tracing::warn;

pub struct ActionGate {
    marker_tag: String,
    identifier_tag: String,
}

impl ActionGate {
    pub fn new(settings: &GateSettings) -> Self {
        Self {
            marker_tag: settings.marker_tag.clone(),
            identifier_tag: settings.identifier_tag.clone(),
        }
    }

    /// Marked as orchestrated, with no usable orchestrator identifier
    pub fn is_unaddressable(&self, tags: &HashMap<String, String>) -> bool {
        tags.contains_key(&self.marker_tag)
            && tags
                .get(&self.identifier_tag)
                .is_none_or(|id| id.trim().is_empty())
    }

    /// Downgrade start/stop/terminate to none for unaddressable resources
    pub fn apply(&self, tags: &HashMap<String, String>, decision: Decision) -> Decision {
        if !decision.action.changes_run_state() || !self.is_unaddressable(tags) {
            return decision;
        }

        warn!(
            proposed = %decision.action,
            marker_tag = %self.marker_tag,
            identifier_tag = %self.identifier_tag,
            "Suppressing action on orchestrated resource without identifier"
        );

        Decision::none(DecisionReason::Gated {
            proposed: decision.action,
            marker_tag: self.marker_tag.clone(),
        })
    }
}
