//! Run reports
//!
//! A `SequenceReport` records what each scenario did and, when the sequence
//! stopped early, where it failed. It serialises to JSON for archiving next to
//! the workload logs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use super::health::HealthVerdict;
use super::scenario::{ScenarioKind, VerificationStep};
use super::state::ScenarioState;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::ExitKind;
use shared::RunId;

/// Result of one completed scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub scenario: ScenarioKind,
    /// States entered, in order, starting and ending at `idle`
    pub states: Vec<ScenarioState>,
    pub exit: ExitKind,
    /// Phase polls used before the phase was confirmed (crash scenarios only)
    pub phase_attempts: Option<u32>,
    pub health: HealthVerdict,
}

/// Where and why a sequence stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub scenario: Option<ScenarioKind>,
    pub step: Option<VerificationStep>,
    pub message: String,
    /// Set when the failed scenario's workload may still be running
    pub stop_failure: Option<String>,
}

impl From<&OrchestratorError> for FailureRecord {
    fn from(err: &OrchestratorError) -> Self {
        let (scenario, step) = err.failure_point().unzip();
        Self {
            scenario,
            step,
            message: err.to_string(),
            stop_failure: err.stop_failure().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SequenceReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<ScenarioOutcome>,
    pub failure: Option<FailureRecord>,
}

impl SequenceReport {
    /// Start a report for a new run
    pub fn begin() -> Self {
        Self {
            run_id: RunId::new(),
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
            failure: None,
        }
    }

    pub fn record(&mut self, outcome: ScenarioOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn record_failure(&mut self, err: &OrchestratorError) {
        self.failure = Some(FailureRecord::from(err));
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// No failure and at least one scenario ran
    pub fn passed(&self) -> bool {
        self.failure.is_none() && !self.outcomes.is_empty()
    }

    /// Scenarios that finished with a degraded cluster without failing
    pub fn degraded_outcomes(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.health.healthy)
    }

    pub fn to_json(&self) -> OrchestratorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report, creating parent directories as needed
    pub fn write_json(&self, path: &Path) -> OrchestratorResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| OrchestratorError::io(parent, e))?;
        }
        std::fs::write(path, self.to_json()?).map_err(|e| OrchestratorError::io(path, e))
    }
}
