//! Trait definitions with mockall annotations for testing
//!
//! These are the seams between the crash-scenario orchestrator and the outside
//! world: the workload process, the cluster's administration interface, and
//! the wall clock. Real implementations live in `services`; tests substitute
//! the generated mocks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::config::PoolTarget;
use crate::core::scenario::IoPhase;
use crate::error::OrchestratorResult;
use shared::ClusterHealthSnapshot;

/// Handle for a launched workload process
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkloadHandle {
    /// Launch sequence number, unique per controller
    pub id: u64,
    /// OS process id of the workload (or its launcher)
    pub pid: u32,
}

/// How a workload process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitKind {
    /// Finished on its own with this exit code (None when killed by a signal
    /// the harness did not send)
    Exited(Option<i32>),
    /// Stopped by the termination signal within the grace period
    Terminated,
    /// Needed a forced kill after the grace period
    Killed,
}

impl ExitKind {
    pub fn is_natural(&self) -> bool {
        matches!(self, ExitKind::Exited(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitKind::Exited(Some(0)))
    }
}

impl fmt::Display for ExitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitKind::Exited(Some(code)) => write!(f, "exit code {code}"),
            ExitKind::Exited(None) => write!(f, "killed by external signal"),
            ExitKind::Terminated => write!(f, "terminated"),
            ExitKind::Killed => write!(f, "force killed"),
        }
    }
}

/// Workload process control
///
/// Launches the external I/O workload against a pool, probes it, and stops
/// it. Only `stop` and `wait` block.
#[mockall::automock]
#[async_trait::async_trait]
pub trait WorkloadController: Send + Sync {
    /// Begin the workload asynchronously
    ///
    /// # Returns
    /// Handle for the launched process, or `Launch` if it could not be spawned
    async fn start(&self, target: &PoolTarget) -> OrchestratorResult<WorkloadHandle>;

    /// Non-blocking liveness probe
    ///
    /// With a phase hint, also requires the workload output to show that the
    /// phase has begun; returns false (never errors) until it has.
    async fn is_running(&self, handle: &WorkloadHandle, phase_hint: Option<IoPhase>) -> bool;

    /// Terminate the workload, escalating to a forced kill after the grace
    /// period. Idempotent on an exited handle.
    async fn stop(&self, handle: &WorkloadHandle) -> OrchestratorResult<ExitKind>;

    /// Block until the workload completes on its own
    async fn wait(&self, handle: &WorkloadHandle) -> OrchestratorResult<ExitKind>;
}

/// Cluster administration interface abstraction
#[mockall::automock]
#[async_trait::async_trait]
pub trait ClusterStatusSource: Send + Sync {
    /// Issue a verbose system status query and return a fresh snapshot
    async fn query(&self) -> OrchestratorResult<ClusterHealthSnapshot>;
}

/// Time abstraction so scenario timing can run on a virtual clock in tests
#[mockall::automock]
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    /// Suspend for the given duration
    async fn sleep(&self, duration: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_trait_instantiation() {
        let _workload = MockWorkloadController::new();
        let _status = MockClusterStatusSource::new();
        let mut clock = MockClock::new();

        clock.expect_sleep().times(1).return_const(());
        clock.sleep(Duration::from_secs(50)).await;
    }

    #[test]
    fn test_exit_kind_classification() {
        assert!(ExitKind::Exited(Some(0)).is_natural());
        assert!(ExitKind::Exited(Some(0)).is_success());
        assert!(!ExitKind::Exited(Some(1)).is_success());
        assert!(!ExitKind::Terminated.is_natural());
        assert!(!ExitKind::Killed.is_natural());
        assert_eq!(ExitKind::Killed.to_string(), "force killed");
    }
}
