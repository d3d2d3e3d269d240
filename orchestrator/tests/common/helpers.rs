//! Test helpers and builder patterns for orchestrator tests
//!
//! The builder wires mockall mocks into a `CrashOrchestrator`. The clock mock
//! records every requested sleep instead of sleeping, so timing is asserted
//! without waiting on it.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use orchestrator::traits::{MockClock, MockClusterStatusSource, MockWorkloadController};
use orchestrator::{CrashConfig, CrashOrchestrator, ExitKind, PoolTarget, WorkloadHandle};
use shared::ClusterHealthSnapshot;

use super::fixtures::TestFixtures;

/// Type alias for test orchestrator with all mocks
pub type TestOrchestrator = CrashOrchestrator<MockWorkloadController, MockClusterStatusSource, MockClock>;

/// Sleeps requested from the virtual clock, in order
#[derive(Clone, Default)]
pub struct SleepLog(Arc<Mutex<Vec<Duration>>>);

impl SleepLog {
    pub fn durations(&self) -> Vec<Duration> {
        self.0.lock().unwrap().clone()
    }

    pub fn total(&self) -> Duration {
        self.durations().iter().sum()
    }
}

/// Builder pattern for creating test orchestrators with sensible defaults
pub struct OrchestratorBuilder {
    workload: MockWorkloadController,
    status: MockClusterStatusSource,
    clock: MockClock,
    target: PoolTarget,
    config: CrashConfig,
    sleeps: SleepLog,
}

impl OrchestratorBuilder {
    /// Mocks with no expectations except a recording clock
    pub fn new() -> Self {
        let sleeps = SleepLog::default();
        let mut clock = MockClock::new();
        let log = sleeps.clone();
        clock
            .expect_sleep()
            .times(0..)
            .returning(move |duration| log.0.lock().unwrap().push(duration));

        Self {
            workload: MockWorkloadController::new(),
            status: MockClusterStatusSource::new(),
            clock,
            target: TestFixtures::target(),
            config: TestFixtures::crash_config(),
            sleeps,
        }
    }

    /// Configure the workload mock with a setup function
    pub fn with_workload<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockWorkloadController),
    {
        setup(&mut self.workload);
        self
    }

    /// Configure the status mock with a setup function
    pub fn with_status<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockClusterStatusSource),
    {
        setup(&mut self.status);
        self
    }

    pub fn with_config(mut self, config: CrashConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_target(mut self, target: PoolTarget) -> Self {
        self.target = target;
        self
    }

    /// Build the orchestrator and hand back its sleep log
    pub fn build(self) -> (TestOrchestrator, SleepLog) {
        let orchestrator = CrashOrchestrator::new(self.workload, self.status, self.clock, self.target, self.config);
        (orchestrator, self.sleeps)
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper functions for common mock setups
pub struct TestHelpers;

impl TestHelpers {
    /// `start` hands out handles with increasing ids, `times` launches in total
    pub fn expect_starts(workload: &mut MockWorkloadController, times: usize) {
        let next_id = Arc::new(AtomicU64::new(1));
        workload.expect_start().times(times).returning(move |_| {
            let id = next_id.fetch_add(1, Ordering::SeqCst);
            Ok(WorkloadHandle {
                id,
                pid: 4000 + id as u32,
            })
        });
    }

    /// Workload that is always running and always in the requested phase
    pub fn always_in_phase(workload: &mut MockWorkloadController) {
        workload.expect_is_running().times(0..).returning(|_, _| true);
    }

    /// `stop` succeeds with SIGTERM exactly `times` times
    pub fn expect_terminations(workload: &mut MockWorkloadController, times: usize) {
        workload
            .expect_stop()
            .times(times)
            .returning(|_| Ok(ExitKind::Terminated));
    }

    /// Every status query returns a copy of `snapshot`, exactly `times` times
    pub fn expect_snapshots(status: &mut MockClusterStatusSource, times: usize, snapshot: ClusterHealthSnapshot) {
        status
            .expect_query()
            .times(times)
            .returning(move || Ok(snapshot.clone()));
    }
}
