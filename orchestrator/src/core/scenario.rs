//! Scenario vocabulary: which I/O phase is interrupted, which scenario of the
//! sequence is running, and which verification step a failure belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OrchestratorError;

/// Stage of I/O activity a workload is performing when interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoPhase {
    Write,
    Read,
}

impl fmt::Display for IoPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoPhase::Write => write!(f, "write"),
            IoPhase::Read => write!(f, "read"),
        }
    }
}

/// One scenario of the crash sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Kill the workload while it is writing
    WriteCrash,
    /// Kill the workload once it has moved on to reading
    ReadCrash,
    /// Let the workload run to completion
    FullRun,
}

impl ScenarioKind {
    /// The fixed order scenarios run in
    pub const SEQUENCE: [ScenarioKind; 3] = [
        ScenarioKind::WriteCrash,
        ScenarioKind::ReadCrash,
        ScenarioKind::FullRun,
    ];

    /// Phase the workload must be in before it is interrupted
    pub fn interrupted_phase(&self) -> Option<IoPhase> {
        match self {
            ScenarioKind::WriteCrash => Some(IoPhase::Write),
            ScenarioKind::ReadCrash => Some(IoPhase::Read),
            ScenarioKind::FullRun => None,
        }
    }

    pub fn is_crash(&self) -> bool {
        self.interrupted_phase().is_some()
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioKind::WriteCrash => write!(f, "write"),
            ScenarioKind::ReadCrash => write!(f, "read"),
            ScenarioKind::FullRun => write!(f, "final"),
        }
    }
}

impl FromStr for ScenarioKind {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "write" | "write_crash" => Ok(ScenarioKind::WriteCrash),
            "read" | "read_crash" => Ok(ScenarioKind::ReadCrash),
            "final" | "full" | "full_run" => Ok(ScenarioKind::FullRun),
            other => Err(OrchestratorError::InvalidArguments {
                message: format!("unknown scenario '{other}' (expected write, read or final)"),
            }),
        }
    }
}

/// Verification step a scenario failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStep {
    Launch,
    Phase,
    Interrupt,
    Health,
    Completion,
}

impl fmt::Display for VerificationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerificationStep::Launch => "launch",
            VerificationStep::Phase => "phase",
            VerificationStep::Interrupt => "interrupt",
            VerificationStep::Health => "health",
            VerificationStep::Completion => "completion",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_order() {
        assert_eq!(
            ScenarioKind::SEQUENCE.map(|k| k.to_string()),
            ["write", "read", "final"]
        );
        assert_eq!(ScenarioKind::WriteCrash.interrupted_phase(), Some(IoPhase::Write));
        assert_eq!(ScenarioKind::ReadCrash.interrupted_phase(), Some(IoPhase::Read));
        assert!(!ScenarioKind::FullRun.is_crash());
    }

    #[test]
    fn test_parse_scenario_names() {
        assert_eq!("write".parse::<ScenarioKind>().unwrap(), ScenarioKind::WriteCrash);
        assert_eq!("READ".parse::<ScenarioKind>().unwrap(), ScenarioKind::ReadCrash);
        assert_eq!("final".parse::<ScenarioKind>().unwrap(), ScenarioKind::FullRun);
        assert!("rebuild".parse::<ScenarioKind>().is_err());
    }
}
