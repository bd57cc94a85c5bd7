//! Lifecycle policy tags
//!
//! A policy tag value has the form `<kind>:<param1>/<param2>/...`. Parsing
//! never fails: an unrecognized kind becomes [`PolicyKind::Unknown`] and
//! parameters stay as strings until the decision engine asks for them, so a
//! malformed tag only affects its own resource.

use automanage_util::weekday_from_index;
use chrono::Weekday;
use std::fmt;
use thiserror::Error;

use crate::CycleKind;

/// Separates the policy kind from its parameters
pub const PRIMARY_SEPARATOR: char = ':';

/// Separates individual parameters
pub const SECONDARY_SEPARATOR: char = '/';

/// Problems found when reading a policy's parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("missing {name} (parameter {position})")]
    MissingParameter { name: &'static str, position: usize },

    #[error("{name} '{value}' is not a whole number")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} {value} is outside 0-23")]
    HourOutOfRange { name: &'static str, value: u32 },

    #[error("{name} {value} is outside 0-6 (0 = Sunday)")]
    DayOutOfRange { name: &'static str, value: u32 },
}

/// Kind of lifecycle policy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    None,
    LimitStop,
    LimitTerminate,
    LimitEmail,
    CycleDaily,
    CycleWeekday,
    CycleWeekly,
    AlwaysOn,
    AlwaysOff,
    Unknown(String),
}

impl PolicyKind {
    /// Match a kind token exactly (case-sensitive). A blank token means no policy.
    pub fn from_token(token: &str) -> Self {
        match token {
            "" | "none" => PolicyKind::None,
            "limit-stop" => PolicyKind::LimitStop,
            "limit-terminate" => PolicyKind::LimitTerminate,
            "limit-email" => PolicyKind::LimitEmail,
            "cycle-daily" => PolicyKind::CycleDaily,
            "cycle-weekday" => PolicyKind::CycleWeekday,
            "cycle-weekly" => PolicyKind::CycleWeekly,
            "always-on" => PolicyKind::AlwaysOn,
            "always-off" => PolicyKind::AlwaysOff,
            other => PolicyKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PolicyKind::None => "none",
            PolicyKind::LimitStop => "limit-stop",
            PolicyKind::LimitTerminate => "limit-terminate",
            PolicyKind::LimitEmail => "limit-email",
            PolicyKind::CycleDaily => "cycle-daily",
            PolicyKind::CycleWeekday => "cycle-weekday",
            PolicyKind::CycleWeekly => "cycle-weekly",
            PolicyKind::AlwaysOn => "always-on",
            PolicyKind::AlwaysOff => "always-off",
            PolicyKind::Unknown(token) => token,
        }
    }

    /// The schedule variant, for `cycle-*` kinds
    pub fn cycle(&self) -> Option<CycleKind> {
        match self {
            PolicyKind::CycleDaily => Some(CycleKind::Daily),
            PolicyKind::CycleWeekday => Some(CycleKind::Weekday),
            PolicyKind::CycleWeekly => Some(CycleKind::Weekly),
            _ => None,
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed policy tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub kind: PolicyKind,
    pub parameters: Vec<String>,
    raw: String,
}

impl Policy {
    /// Parse a policy tag value. Surrounding whitespace is ignored.
    pub fn parse(tag_value: &str) -> Self {
        let raw = tag_value.trim();
        let (kind_token, param_token) = match raw.split_once(PRIMARY_SEPARATOR) {
            Some((kind, params)) => (kind, Some(params)),
            None => (raw, None),
        };

        let parameters = match param_token {
            Some(params) if !params.is_empty() => params
                .split(SECONDARY_SEPARATOR)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            kind: PolicyKind::from_token(kind_token),
            parameters,
            raw: raw.to_string(),
        }
    }

    /// The tag value this policy was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parameter at `index`; blank values count as missing
    pub fn param(&self, index: usize, name: &'static str) -> Result<&str, PolicyError> {
        self.parameters
            .get(index)
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .ok_or(PolicyError::MissingParameter {
                name,
                position: index + 1,
            })
    }

    /// Non-negative integer parameter. Leading zeros are accepted (`08`).
    pub fn number(&self, index: usize, name: &'static str) -> Result<u32, PolicyError> {
        let value = self.param(index, name)?;
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PolicyError::InvalidNumber {
                name,
                value: value.to_string(),
            });
        }
        value.parse().map_err(|_| PolicyError::InvalidNumber {
            name,
            value: value.to_string(),
        })
    }

    /// Hour-of-day parameter, 0 to 23
    pub fn hour(&self, index: usize, name: &'static str) -> Result<u8, PolicyError> {
        let value = self.number(index, name)?;
        if value < 24 {
            Ok(value as u8)
        } else {
            Err(PolicyError::HourOutOfRange { name, value })
        }
    }

    /// Day-of-week parameter, 0 (Sunday) to 6 (Saturday)
    pub fn weekday(&self, index: usize, name: &'static str) -> Result<Weekday, PolicyError> {
        let value = self.number(index, name)?;
        u8::try_from(value)
            .ok()
            .and_then(weekday_from_index)
            .ok_or(PolicyError::DayOutOfRange { name, value })
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kind_and_parameters() {
        let policy = Policy::parse("cycle-weekly:22/04/5");
        assert_eq!(policy.kind, PolicyKind::CycleWeekly);
        assert_eq!(policy.parameters, vec!["22", "04", "5"]);
        assert_eq!(policy.raw(), "cycle-weekly:22/04/5");
    }

    #[test]
    fn parse_without_parameters() {
        let policy = Policy::parse("always-on");
        assert_eq!(policy.kind, PolicyKind::AlwaysOn);
        assert!(policy.parameters.is_empty());

        let policy = Policy::parse("limit-stop:");
        assert_eq!(policy.kind, PolicyKind::LimitStop);
        assert!(policy.parameters.is_empty());
    }

    #[test]
    fn only_first_primary_separator_splits() {
        let policy = Policy::parse("limit-email:2/ops:oncall@example.com");
        assert_eq!(policy.kind, PolicyKind::LimitEmail);
        assert_eq!(policy.parameters, vec!["2", "ops:oncall@example.com"]);
    }

    #[test]
    fn kind_is_case_sensitive() {
        let policy = Policy::parse("Cycle-Daily:08/18");
        assert_eq!(policy.kind, PolicyKind::Unknown("Cycle-Daily".into()));
        assert_eq!(policy.parameters, vec!["08", "18"]);
    }

    #[test]
    fn blank_and_none_mean_no_policy() {
        assert_eq!(Policy::parse("").kind, PolicyKind::None);
        assert_eq!(Policy::parse("   ").kind, PolicyKind::None);
        assert_eq!(Policy::parse("none").kind, PolicyKind::None);
    }

    #[test]
    fn kind_tokens_round_trip() {
        for token in [
            "none",
            "limit-stop",
            "limit-terminate",
            "limit-email",
            "cycle-daily",
            "cycle-weekday",
            "cycle-weekly",
            "always-on",
            "always-off",
            "hibernate",
        ] {
            assert_eq!(PolicyKind::from_token(token).as_str(), token);
        }
    }

    #[test]
    fn numeric_parameters() {
        let policy = Policy::parse("cycle-daily:08/18");
        assert_eq!(policy.hour(0, "on hour"), Ok(8));
        assert_eq!(policy.hour(1, "off hour"), Ok(18));
        assert_eq!(
            policy.hour(2, "target day"),
            Err(PolicyError::MissingParameter {
                name: "target day",
                position: 3
            })
        );
    }

    #[test]
    fn non_numeric_parameters_fail_late() {
        let policy = Policy::parse("cycle-daily:eight/-1");
        assert!(matches!(
            policy.hour(0, "on hour"),
            Err(PolicyError::InvalidNumber { .. })
        ));
        assert!(matches!(
            policy.hour(1, "off hour"),
            Err(PolicyError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn range_checks() {
        let policy = Policy::parse("cycle-weekly:24/04/7");
        assert_eq!(
            policy.hour(0, "on hour"),
            Err(PolicyError::HourOutOfRange {
                name: "on hour",
                value: 24
            })
        );
        assert_eq!(
            policy.weekday(2, "target day"),
            Err(PolicyError::DayOutOfRange {
                name: "target day",
                value: 7
            })
        );
        assert_eq!(Policy::parse("cycle-weekly:1/2/0").weekday(2, "d"), Ok(Weekday::Sun));
    }

    #[test]
    fn blank_parameter_is_missing() {
        let policy = Policy::parse("cycle-daily:08//");
        assert!(matches!(
            policy.hour(1, "off hour"),
            Err(PolicyError::MissingParameter { position: 2, .. })
        ));
    }
}
