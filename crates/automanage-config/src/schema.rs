//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Evaluation and execution settings
    #[serde(default)]
    pub automanage: RawAutomanageConfig,

    /// Action gate settings
    #[serde(default)]
    pub gate: RawGateConfig,
}

/// Evaluation and execution settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawAutomanageConfig {
    /// IANA timezone used to derive the hour and weekday (default: UTC)
    pub timezone: Option<String>,

    /// Ask the executor to dry-run every action
    pub dry_run: Option<bool>,

    /// Attach a final snapshot identifier to stops of snapshot-capable resources
    pub snapshot_on_stop: Option<bool>,

    /// Sender address for notifications
    pub email_from: Option<String>,

    /// Tag key holding the lifecycle policy
    pub policy_tag: Option<String>,
}

/// Tags identifying resources owned by an external orchestrator
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawGateConfig {
    /// Tag marking membership in an orchestrated group
    pub marker_tag: Option<String>,

    /// Tag carrying the orchestrator's identifier for the resource
    pub identifier_tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sections() {
        let toml_str = r#"
            config_version = 1

            [automanage]
            timezone = "America/New_York"
            dry_run = true

            [gate]
            marker_tag = "fleet-group"
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.automanage.timezone.as_deref(), Some("America/New_York"));
        assert_eq!(config.automanage.dry_run, Some(true));
        assert_eq!(config.gate.marker_tag.as_deref(), Some("fleet-group"));
        assert!(config.gate.identifier_tag.is_none());
    }

    #[test]
    fn sections_are_optional() {
        let config: RawConfig = toml::from_str("config_version = 1").unwrap();
        assert!(config.automanage.timezone.is_none());
        assert!(config.gate.marker_tag.is_none());
    }
}
