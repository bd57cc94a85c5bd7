//! Validated settings

use crate::schema::{RawAutomanageConfig, RawConfig, RawGateConfig};
use crate::validation::parse_timezone;
use chrono_tz::Tz;

/// Default tag key holding the lifecycle policy
pub const DEFAULT_POLICY_TAG: &str = "lifecycle-policy";

/// Default notification sender
pub const DEFAULT_EMAIL_FROM: &str = "automanage@localhost";

/// Default tag marking membership in an orchestrated group
pub const DEFAULT_MARKER_TAG: &str = "fleet-group";

/// Default tag carrying the orchestrator's identifier for the resource
pub const DEFAULT_IDENTIFIER_TAG: &str = "fleet-member-id";

/// Validated settings for one evaluation cycle
#[derive(Debug, Clone)]
pub struct Settings {
    /// Timezone in which hours and weekdays are evaluated
    pub timezone: Tz,

    /// Executor reports actions without performing them
    pub dry_run: bool,

    /// Attach snapshot identifiers to stops of snapshot-capable resources
    pub snapshot_on_stop: bool,

    pub email_from: String,

    pub policy_tag: String,

    pub gate: GateSettings,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let RawAutomanageConfig {
            timezone,
            dry_run,
            snapshot_on_stop,
            email_from,
            policy_tag,
        } = raw.automanage;

        Self {
            timezone: timezone
                .as_deref()
                .and_then(|tz| parse_timezone(tz).ok())
                .unwrap_or(chrono_tz::UTC),
            dry_run: dry_run.unwrap_or(false),
            snapshot_on_stop: snapshot_on_stop.unwrap_or(true),
            email_from: email_from.unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            policy_tag: policy_tag.unwrap_or_else(|| DEFAULT_POLICY_TAG.to_string()),
            gate: GateSettings::from_raw(raw.gate),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            dry_run: false,
            snapshot_on_stop: true,
            email_from: DEFAULT_EMAIL_FROM.to_string(),
            policy_tag: DEFAULT_POLICY_TAG.to_string(),
            gate: GateSettings::default(),
        }
    }
}

/// Tag names used by the action gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSettings {
    pub marker_tag: String,
    pub identifier_tag: String,
}

impl GateSettings {
    fn from_raw(raw: RawGateConfig) -> Self {
        Self {
            marker_tag: raw
                .marker_tag
                .unwrap_or_else(|| DEFAULT_MARKER_TAG.to_string()),
            identifier_tag: raw
                .identifier_tag
                .unwrap_or_else(|| DEFAULT_IDENTIFIER_TAG.to_string()),
        }
    }
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            marker_tag: DEFAULT_MARKER_TAG.to_string(),
            identifier_tag: DEFAULT_IDENTIFIER_TAG.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_matches_default() {
        let raw = RawConfig {
            config_version: 1,
            automanage: Default::default(),
            gate: Default::default(),
        };
        let settings = Settings::from_raw(raw);
        let default = Settings::default();

        assert_eq!(settings.timezone, default.timezone);
        assert_eq!(settings.dry_run, default.dry_run);
        assert_eq!(settings.snapshot_on_stop, default.snapshot_on_stop);
        assert_eq!(settings.email_from, default.email_from);
        assert_eq!(settings.policy_tag, default.policy_tag);
        assert_eq!(settings.gate, default.gate);
    }
}
