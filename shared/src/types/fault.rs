//! Fault rule types
//!
//! `FaultRule` is the typed, validated form used inside the harness.
//! `FaultRuleRecord` is the string-typed form written into the fault-injection
//! artifact, where every field is serialized as a string.

use crate::errors::{SharedError, SharedResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound for `probability`, expressed as a percentage
pub const MAX_PROBABILITY: u8 = 100;

/// One injected fault behavior armed in the storage engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaultRule {
    id: u32,
    probability: u8,
    interval: u32,
    max_faults: u32,
}

impl FaultRule {
    /// Build a rule, rejecting probabilities above 100
    pub fn new(id: u32, probability: u8, interval: u32, max_faults: u32) -> SharedResult<Self> {
        if probability > MAX_PROBABILITY {
            return Err(SharedError::InvalidFaultRule {
                field: "probability".to_string(),
                value: probability.to_string(),
            });
        }
        Ok(Self {
            id,
            probability,
            interval,
            max_faults,
        })
    }

    /// Fault point armed by this rule
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Percentage chance the fault fires when its point is reached
    pub fn probability(&self) -> u8 {
        self.probability
    }

    /// Number of times the point must be reached between activations
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Total activations before the rule becomes inert
    pub fn max_faults(&self) -> u32 {
        self.max_faults
    }
}

impl fmt::Display for FaultRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.id, self.probability, self.interval, self.max_faults
        )
    }
}

/// Parses the command-line form `ID:PROBABILITY:INTERVAL:MAX_FAULTS`
impl FromStr for FaultRule {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SharedError::MalformedFaultRule { input: s.to_string() };

        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let [id, probability, interval, max_faults] = parts.as_slice() else {
            return Err(malformed());
        };

        FaultRule::new(
            id.parse().map_err(|_| malformed())?,
            parse_field("probability", probability)?,
            interval.parse().map_err(|_| malformed())?,
            max_faults.parse().map_err(|_| malformed())?,
        )
    }
}

/// Artifact form of a fault rule. Field order matches the order the engine's
/// own tooling has always emitted (alphabetical).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultRuleRecord {
    pub id: String,
    pub interval: String,
    pub max_faults: String,
    pub probability: String,
}

impl From<&FaultRule> for FaultRuleRecord {
    fn from(rule: &FaultRule) -> Self {
        Self {
            id: rule.id.to_string(),
            interval: rule.interval.to_string(),
            max_faults: rule.max_faults.to_string(),
            probability: rule.probability.to_string(),
        }
    }
}

impl TryFrom<FaultRuleRecord> for FaultRule {
    type Error = SharedError;

    fn try_from(record: FaultRuleRecord) -> Result<Self, Self::Error> {
        FaultRule::new(
            parse_field("id", &record.id)?,
            parse_field("probability", &record.probability)?,
            parse_field("interval", &record.interval)?,
            parse_field("max_faults", &record.max_faults)?,
        )
    }
}

fn parse_field<T: FromStr>(field: &str, value: &str) -> SharedResult<T> {
    value.trim().parse().map_err(|_| SharedError::InvalidFaultRule {
        field: field.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_bound() {
        assert!(FaultRule::new(50, 100, 1, 17).is_ok());
        assert_eq!(
            FaultRule::new(50, 101, 1, 17),
            Err(SharedError::InvalidFaultRule {
                field: "probability".to_string(),
                value: "101".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_cli_form() {
        let rule: FaultRule = "52:100:1:50".parse().unwrap();
        assert_eq!(rule.id(), 52);
        assert_eq!(rule.probability(), 100);
        assert_eq!(rule.interval(), 1);
        assert_eq!(rule.max_faults(), 50);
        assert_eq!(rule.to_string(), "52:100:1:50");
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(matches!(
            "52:100:1".parse::<FaultRule>(),
            Err(SharedError::MalformedFaultRule { .. })
        ));
        assert!(matches!(
            "52:100:x:1".parse::<FaultRule>(),
            Err(SharedError::MalformedFaultRule { .. })
        ));
        assert!(matches!(
            "-1:100:1:1".parse::<FaultRule>(),
            Err(SharedError::MalformedFaultRule { .. })
        ));
        assert!(matches!(
            "52:150:1:1".parse::<FaultRule>(),
            Err(SharedError::InvalidFaultRule { .. })
        ));
    }

    #[test]
    fn test_record_conversion_keeps_every_field() {
        let rule = FaultRule::new(50, 100, 1, 17).unwrap();
        let record = FaultRuleRecord::from(&rule);

        assert_eq!(record.id, "50");
        assert_eq!(record.probability, "100");
        assert_eq!(record.interval, "1");
        assert_eq!(record.max_faults, "17");
        assert_eq!(FaultRule::try_from(record).unwrap(), rule);
    }

    #[test]
    fn test_record_with_bad_field_is_rejected() {
        let record = FaultRuleRecord {
            id: "fifty".to_string(),
            interval: "1".to_string(),
            max_faults: "1".to_string(),
            probability: "100".to_string(),
        };
        assert_eq!(
            FaultRule::try_from(record),
            Err(SharedError::InvalidFaultRule {
                field: "id".to_string(),
                value: "fifty".to_string(),
            })
        );
    }
}
