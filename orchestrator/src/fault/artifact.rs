//! Fault-injection artifact format
//!
//! The engine reads `fi.yaml` holding two mapping records, a seed and a rule
//! list, with every value written as a string:
//!
//! ```yaml
//! seed: '123'
//! fault_config:
//! - id: '50'
//!   interval: '1'
//!   max_faults: '17'
//!   probability: '100'
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{OrchestratorError, OrchestratorResult};
use shared::{FaultRule, FaultRuleRecord};

/// Fixed name of the artifact inside its output directory
pub const FAULT_CONFIG_FILE: &str = "fi.yaml";

/// Seed written when the caller does not choose one
pub const DEFAULT_SEED: &str = "123";

#[derive(Serialize)]
struct SeedRecord<'a> {
    seed: &'a str,
}

#[derive(Serialize)]
struct RuleListRecord {
    fault_config: Vec<FaultRuleRecord>,
}

/// Any one YAML document of an artifact
#[derive(Deserialize, Default)]
#[serde(default)]
struct ArtifactDocument {
    seed: Option<String>,
    fault_config: Option<Vec<FaultRuleRecord>>,
}

/// One compiled fault configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultConfig {
    pub seed: String,
    pub rules: Vec<FaultRule>,
}

impl FaultConfig {
    pub fn new<S: Into<String>>(seed: S, rules: Vec<FaultRule>) -> Self {
        Self {
            seed: seed.into(),
            rules,
        }
    }

    /// Serialize the seed record followed by the rule-list record
    pub fn to_yaml(&self) -> OrchestratorResult<String> {
        let mut out = serde_yaml::to_string(&SeedRecord { seed: &self.seed })?;
        out.push_str(&serde_yaml::to_string(&RuleListRecord {
            fault_config: self.rules.iter().map(FaultRuleRecord::from).collect(),
        })?);
        Ok(out)
    }

    /// Read an artifact back. The two records may share one YAML document or
    /// be split across two.
    pub fn parse(text: &str) -> OrchestratorResult<Self> {
        let mut seed = None;
        let mut records = None;

        for document in serde_yaml::Deserializer::from_str(text) {
            let doc = ArtifactDocument::deserialize(document)?;
            if doc.seed.is_some() {
                seed = doc.seed;
            }
            if doc.fault_config.is_some() {
                records = doc.fault_config;
            }
        }

        let seed = seed.ok_or_else(|| OrchestratorError::InvalidArguments {
            message: "fault config artifact has no seed record".to_string(),
        })?;
        let records = records.ok_or_else(|| OrchestratorError::InvalidArguments {
            message: "fault config artifact has no fault_config record".to_string(),
        })?;

        let rules = records
            .into_iter()
            .map(FaultRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { seed, rules })
    }
}
