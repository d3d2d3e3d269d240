//! Core types used throughout the crash-test harness

pub mod cluster;
pub mod fault;

pub use cluster::{ClusterHealthSnapshot, Rank, RankState};
pub use fault::{FaultRule, FaultRuleRecord};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Identifier attached to every log event emitted by the harness
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// Crash-scenario orchestrator binary (or library use)
    Orchestrator,
    /// Test-case runner binary
    Tester,
    /// External workload launched by the harness, numbered per launch
    Workload(u64),
}

impl ProcessId {
    /// Initialize the global process ID for the orchestrator binary
    pub fn init_orchestrator() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Orchestrator)
    }

    /// Initialize the global process ID for the tester binary
    pub fn init_tester() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Tester)
    }

    /// Get the global process ID, defaulting to the orchestrator when the
    /// binary never initialised one (library use and tests)
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Orchestrator)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Orchestrator => write!(f, "orchestrator"),
            ProcessId::Tester => write!(f, "tester"),
            ProcessId::Workload(n) => write!(f, "workload_{n}"),
        }
    }
}

/// Unique identifier of one harness run, used to correlate logs and reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_id_display() {
        assert_eq!(ProcessId::Orchestrator.to_string(), "orchestrator");
        assert_eq!(ProcessId::Tester.to_string(), "tester");
        assert_eq!(ProcessId::Workload(3).to_string(), "workload_3");
    }

    #[test]
    fn test_current_never_panics() {
        // Whatever was initialised first wins, but current() must always resolve
        let current = ProcessId::current();
        assert!(matches!(current, ProcessId::Orchestrator | ProcessId::Tester));
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }
}
