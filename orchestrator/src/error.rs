//! Orchestrator-specific error types

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::core::scenario::{IoPhase, ScenarioKind, VerificationStep};
use crate::core::state::ScenarioState;
use shared::{Rank, RankState, SharedError};

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Unknown fault: '{name}'")]
    UnknownFault { name: String },

    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch workload '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Workload never reported the {phase} phase after {attempts} attempts")]
    PhaseTimeout { phase: IoPhase, attempts: u32 },

    #[error("Cluster health check failed: {}", describe_degraded(.degraded))]
    HealthCheckFailure { degraded: Vec<(Rank, RankState)> },

    #[error("Cluster status query returned no ranks")]
    EmptySnapshot,

    #[error("Cluster status query failed: {message}")]
    StatusQuery { message: String },

    #[error("Failed to control workload (PID {pid}): {source}")]
    Process {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Workload exited unexpectedly ({status})")]
    WorkloadExited { status: String },

    #[error("Workload completed unsuccessfully ({status})")]
    WorkloadFailed { status: String },

    #[error("Workload (PID {pid}) still running {grace:?} after SIGKILL")]
    WorkloadHung { pid: u32, grace: Duration },

    #[error("Interrupted by {signal}")]
    Interrupted { signal: String },

    #[error("Invalid scenario transition: {from} -> {to}")]
    InvalidTransition { from: ScenarioState, to: ScenarioState },

    #[error("{scenario} scenario failed at {step} step: {source}")]
    Scenario {
        scenario: ScenarioKind,
        step: VerificationStep,
        #[source]
        source: Box<OrchestratorError>,
    },

    #[error("{source}; the workload could not be stopped: {stop}")]
    Unstopped {
        #[source]
        source: Box<OrchestratorError>,
        stop: Box<OrchestratorError>,
    },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl OrchestratorError {
    /// Attach the failing scenario and verification step
    pub fn in_scenario(self, scenario: ScenarioKind, step: VerificationStep) -> Self {
        OrchestratorError::Scenario {
            scenario,
            step,
            source: Box::new(self),
        }
    }

    /// Build an I/O error for a filesystem path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OrchestratorError::Io {
            path: path.into(),
            source,
        }
    }

    /// Record that the workload behind this failure could not be stopped
    pub fn with_stop_failure(self, stop: OrchestratorError) -> Self {
        OrchestratorError::Unstopped {
            source: Box::new(self),
            stop: Box::new(stop),
        }
    }

    /// Error at the root of any scenario wrapping
    pub fn root_cause(&self) -> &OrchestratorError {
        match self {
            OrchestratorError::Scenario { source, .. } | OrchestratorError::Unstopped { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Where a scenario failure happened, if this is one
    pub fn failure_point(&self) -> Option<(ScenarioKind, VerificationStep)> {
        match self {
            OrchestratorError::Scenario { scenario, step, .. } => Some((*scenario, *step)),
            OrchestratorError::Unstopped { source, .. } => source.failure_point(),
            _ => None,
        }
    }

    /// Why a workload abandoned after this failure is still running, if it is
    pub fn stop_failure(&self) -> Option<&OrchestratorError> {
        match self {
            OrchestratorError::Unstopped { stop, .. } => Some(stop.as_ref()),
            OrchestratorError::Scenario { source, .. } => source.stop_failure(),
            _ => None,
        }
    }

    /// True when the cluster itself was found degraded
    pub fn is_health_failure(&self) -> bool {
        matches!(
            self.root_cause(),
            OrchestratorError::HealthCheckFailure { .. } | OrchestratorError::EmptySnapshot
        )
    }
}

fn describe_degraded(degraded: &[(Rank, RankState)]) -> String {
    degraded
        .iter()
        .map(|(rank, state)| format!("{rank} is {state}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_failure_reports_phase_and_step() {
        let err = OrchestratorError::HealthCheckFailure {
            degraded: vec![(Rank(2), RankState::Errored)],
        }
        .in_scenario(ScenarioKind::WriteCrash, VerificationStep::Health);

        assert_eq!(
            err.to_string(),
            "write scenario failed at health step: Cluster health check failed: rank 2 is errored"
        );
        assert_eq!(
            err.failure_point(),
            Some((ScenarioKind::WriteCrash, VerificationStep::Health))
        );
        assert!(err.is_health_failure());
    }

    #[test]
    fn test_launch_failure_is_not_health_failure() {
        let err = OrchestratorError::Launch {
            program: "ior".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        }
        .in_scenario(ScenarioKind::ReadCrash, VerificationStep::Launch);

        assert!(!err.is_health_failure());
        assert!(matches!(err.root_cause(), OrchestratorError::Launch { .. }));
        assert!(err.stop_failure().is_none());
    }

    #[test]
    fn test_stop_failure_keeps_original_cause() {
        let err = OrchestratorError::PhaseTimeout {
            phase: IoPhase::Write,
            attempts: 12,
        }
        .in_scenario(ScenarioKind::WriteCrash, VerificationStep::Phase)
        .with_stop_failure(OrchestratorError::WorkloadHung {
            pid: 4001,
            grace: Duration::from_secs(10),
        });

        assert_eq!(
            err.failure_point(),
            Some((ScenarioKind::WriteCrash, VerificationStep::Phase))
        );
        assert!(matches!(err.root_cause(), OrchestratorError::PhaseTimeout { .. }));
        assert!(matches!(
            err.stop_failure(),
            Some(OrchestratorError::WorkloadHung { pid: 4001, .. })
        ));
        assert!(err.to_string().contains("could not be stopped"));
    }
}
