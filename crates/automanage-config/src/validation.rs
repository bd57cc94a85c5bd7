//! Configuration validation

use crate::schema::{RawConfig, RawGateConfig};
use crate::settings::{DEFAULT_IDENTIFIER_TAG, DEFAULT_MARKER_TAG};
use chrono_tz::Tz;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Unknown timezone '{0}'")]
    InvalidTimezone(String),

    #[error("Invalid sender address '{0}'")]
    InvalidEmailAddress(String),

    #[error("Tag name for '{field}' cannot be empty")]
    EmptyTagName { field: String },

    #[error("Gate marker and identifier tags must differ (both '{0}')")]
    GateTagsCollide(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let settings = &config.automanage;

    if let Some(timezone) = &settings.timezone
        && parse_timezone(timezone).is_err()
    {
        errors.push(ValidationError::InvalidTimezone(timezone.clone()));
    }

    if let Some(from) = &settings.email_from
        && !is_plausible_address(from)
    {
        errors.push(ValidationError::InvalidEmailAddress(from.clone()));
    }

    if let Some(tag) = &settings.policy_tag
        && tag.trim().is_empty()
    {
        errors.push(ValidationError::EmptyTagName {
            field: "automanage.policy_tag".into(),
        });
    }

    errors.extend(validate_gate(&config.gate));

    errors
}

fn validate_gate(gate: &RawGateConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("gate.marker_tag", &gate.marker_tag),
        ("gate.identifier_tag", &gate.identifier_tag),
    ] {
        if let Some(tag) = value
            && tag.trim().is_empty()
        {
            errors.push(ValidationError::EmptyTagName {
                field: field.into(),
            });
        }
    }

    let marker = gate.marker_tag.as_deref().unwrap_or(DEFAULT_MARKER_TAG);
    let identifier = gate
        .identifier_tag
        .as_deref()
        .unwrap_or(DEFAULT_IDENTIFIER_TAG);
    if marker == identifier {
        errors.push(ValidationError::GateTagsCollide(marker.to_string()));
    }

    errors
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| format!("Unknown timezone '{}': {}", name, e))
}

/// Loose shape check: one `@` with something on both sides
fn is_plausible_address(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}
