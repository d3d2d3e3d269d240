//! Crash-scenario orchestrator
//!
//! Runs the workload against the target pool three times: interrupted while
//! writing, interrupted while reading, and to completion. After each run the
//! cluster must report every rank joined. The first failure stops the
//! sequence; later scenarios never run against a possibly damaged cluster.

use shared::{process_debug, process_error, process_info, process_warn, ProcessId};

use crate::{
    config::{CrashConfig, PoolTarget},
    core::{
        HealthVerdict, HealthVerifier, IoPhase, ScenarioKind, ScenarioMachine, ScenarioOutcome, ScenarioState,
        SequenceReport, VerificationStep,
    },
    error::{OrchestratorError, OrchestratorResult},
    traits::{Clock, ClusterStatusSource, ExitKind, WorkloadController, WorkloadHandle},
};

/// Drives crash scenarios through injected workload, status and clock services
pub struct CrashOrchestrator<W, S, C>
where
    W: WorkloadController,
    S: ClusterStatusSource,
    C: Clock,
{
    workload: W,
    status: S,
    clock: C,
    target: PoolTarget,
    config: CrashConfig,
    verifier: HealthVerifier,
}

impl<W, S, C> CrashOrchestrator<W, S, C>
where
    W: WorkloadController,
    S: ClusterStatusSource,
    C: Clock,
{
    /// Create new orchestrator with injected dependencies
    pub fn new(workload: W, status: S, clock: C, target: PoolTarget, config: CrashConfig) -> Self {
        Self {
            workload,
            status,
            clock,
            target,
            config,
            verifier: HealthVerifier::new(),
        }
    }

    pub fn config(&self) -> &CrashConfig {
        &self.config
    }

    pub fn target(&self) -> &PoolTarget {
        &self.target
    }

    /// Run the full sequence, failing with the first scenario error
    pub async fn run_sequence(&self) -> OrchestratorResult<SequenceReport> {
        let (report, result) = self.execute_sequence().await;
        result.map(|()| report)
    }

    /// Run the full sequence and always return the report, alongside the
    /// error that stopped it, if any
    pub async fn execute_sequence(&self) -> (SequenceReport, OrchestratorResult<()>) {
        let mut report = SequenceReport::begin();
        process_info!(ProcessId::current(), "🚀 Crash sequence {} against {}", report.run_id, self.target);

        let mut result = Ok(());
        for kind in ScenarioKind::SEQUENCE {
            match self.run_scenario(kind).await {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    process_error!(ProcessId::current(), "❌ {}", e);
                    report.record_failure(&e);
                    result = Err(e);
                    break;
                }
            }
        }

        report.finish();
        if result.is_ok() {
            process_info!(ProcessId::current(), "✅ Crash sequence {} passed", report.run_id);
        }
        (report, result)
    }

    /// Run a single scenario
    pub async fn run_scenario(&self, kind: ScenarioKind) -> OrchestratorResult<ScenarioOutcome> {
        self.target.validate()?;
        self.config.validate()?;

        let mut machine = ScenarioMachine::new(kind);
        process_info!(ProcessId::current(), "▶️ Starting {} scenario", kind);

        let outcome = match kind.interrupted_phase() {
            Some(phase) => self.run_crash(&mut machine, phase).await?,
            None => self.run_to_completion(&mut machine).await?,
        };

        process_info!(
            ProcessId::current(),
            "✅ {} scenario finished ({}, {} of {} rank(s) joined)",
            kind,
            outcome.exit,
            outcome.health.rank_count - outcome.health.degraded.len(),
            outcome.health.rank_count
        );
        Ok(outcome)
    }

    async fn run_crash(&self, machine: &mut ScenarioMachine, phase: IoPhase) -> OrchestratorResult<ScenarioOutcome> {
        let kind = machine.kind();
        let handle = self.launch(machine).await?;

        let attempts = match self.reach_phase(machine, &handle, phase).await {
            Ok(attempts) => attempts,
            Err(e) => return Err(self.abandon(&handle, e).await),
        };

        machine.advance(ScenarioState::Interrupting)?;
        process_info!(ProcessId::current(), "💥 Interrupting workload during {} phase", phase);
        let exit = self
            .workload
            .stop(&handle)
            .await
            .map_err(|e| e.in_scenario(kind, VerificationStep::Interrupt))?;
        if exit.is_natural() {
            process_warn!(
                ProcessId::current(),
                "⚠️ Workload finished on its own ({}) before the {} phase interrupt; no crash was injected",
                exit,
                phase
            );
        }

        machine.advance(ScenarioState::Verifying)?;
        let health = self.verify(kind).await?;
        if !health.healthy {
            return Err(OrchestratorError::HealthCheckFailure {
                degraded: health.degraded,
            }
            .in_scenario(kind, VerificationStep::Health));
        }

        machine.advance(ScenarioState::Idle)?;
        Ok(ScenarioOutcome {
            scenario: kind,
            states: machine.visited().to_vec(),
            exit,
            phase_attempts: Some(attempts),
            health,
        })
    }

    async fn run_to_completion(&self, machine: &mut ScenarioMachine) -> OrchestratorResult<ScenarioOutcome> {
        let kind = machine.kind();
        let handle = self.launch(machine).await?;

        machine.advance(ScenarioState::Completing)?;
        process_info!(ProcessId::current(), "⏳ Waiting for workload to complete");
        let exit = match self.workload.wait(&handle).await {
            Ok(exit) => exit,
            Err(e) => return Err(self.abandon(&handle, e.in_scenario(kind, VerificationStep::Completion)).await),
        };
        if !exit.is_success() {
            return Err(OrchestratorError::WorkloadFailed {
                status: exit.to_string(),
            }
            .in_scenario(kind, VerificationStep::Completion));
        }

        machine.advance(ScenarioState::Verifying)?;
        let health = self.verify(kind).await?;
        if !health.healthy {
            let degraded = OrchestratorError::HealthCheckFailure {
                degraded: health.degraded.clone(),
            };
            if self.config.gate_final_health {
                return Err(degraded.in_scenario(kind, VerificationStep::Health));
            }
            process_warn!(ProcessId::current(), "⚠️ After {} scenario: {}", kind, degraded);
        }

        machine.advance(ScenarioState::Idle)?;
        Ok(ScenarioOutcome {
            scenario: kind,
            states: machine.visited().to_vec(),
            exit,
            phase_attempts: None,
            health,
        })
    }

    /// Start the workload and confirm it is running
    async fn launch(&self, machine: &mut ScenarioMachine) -> OrchestratorResult<WorkloadHandle> {
        let kind = machine.kind();

        machine.advance(ScenarioState::Launching)?;
        let handle = self
            .workload
            .start(&self.target)
            .await
            .map_err(|e| e.in_scenario(kind, VerificationStep::Launch))?;

        if !self.workload.is_running(&handle, None).await {
            let err = OrchestratorError::WorkloadExited {
                status: "exited before it was confirmed running".to_string(),
            };
            return Err(self.abandon(&handle, err.in_scenario(kind, VerificationStep::Launch)).await);
        }

        machine.advance(ScenarioState::Running)?;
        process_info!(ProcessId::current(), "🏃 Workload {} running (PID {})", handle.id, handle.pid);
        Ok(handle)
    }

    /// Wait out the scenario delay, then poll until the workload reports the
    /// phase. Returns the number of polls used.
    async fn reach_phase(
        &self,
        machine: &mut ScenarioMachine,
        handle: &WorkloadHandle,
        phase: IoPhase,
    ) -> OrchestratorResult<u32> {
        let kind = machine.kind();
        machine.advance(ScenarioState::AwaitingPhase)?;

        let delay = self.config.delay_for(kind);
        process_debug!(ProcessId::current(), "⏱️ Letting workload run for {:?}", delay);
        self.clock.sleep(delay).await;

        self.await_phase(handle, phase)
            .await
            .map_err(|e| e.in_scenario(kind, VerificationStep::Phase))
    }

    async fn await_phase(&self, handle: &WorkloadHandle, phase: IoPhase) -> OrchestratorResult<u32> {
        let budget = self.config.phase_poll;

        for attempt in 1..=budget.attempts {
            if self.workload.is_running(handle, Some(phase)).await {
                process_debug!(ProcessId::current(), "🔎 {} phase confirmed after {} poll(s)", phase, attempt);
                return Ok(attempt);
            }
            if !self.workload.is_running(handle, None).await {
                return Err(OrchestratorError::WorkloadExited {
                    status: format!("exited while awaiting the {phase} phase"),
                });
            }
            if attempt < budget.attempts {
                self.clock.sleep(budget.interval).await;
            }
        }

        Err(OrchestratorError::PhaseTimeout {
            phase,
            attempts: budget.attempts,
        })
    }

    /// Query the cluster and reduce the snapshot to a verdict
    async fn verify(&self, kind: ScenarioKind) -> OrchestratorResult<HealthVerdict> {
        let snapshot = self
            .status
            .query()
            .await
            .map_err(|e| e.in_scenario(kind, VerificationStep::Health))?;

        if self.config.require_ranks && snapshot.is_empty() {
            return Err(OrchestratorError::EmptySnapshot.in_scenario(kind, VerificationStep::Health));
        }

        let verdict = self.verifier.verdict(&snapshot);
        process_info!(
            ProcessId::current(),
            "🩺 Cluster health after {} scenario: {}",
            kind,
            if verdict.healthy { "healthy" } else { "degraded" }
        );
        Ok(verdict)
    }

    /// Stop a workload the scenario can no longer use, then hand back the
    /// error that caused it. A failed stop is attached to that error.
    async fn abandon(&self, handle: &WorkloadHandle, err: OrchestratorError) -> OrchestratorError {
        match self.workload.stop(handle).await {
            Ok(ExitKind::Exited(_)) => err,
            Ok(exit) => {
                process_debug!(ProcessId::current(), "Stopped abandoned workload {} ({})", handle.id, exit);
                err
            }
            Err(stop_err) => {
                process_error!(
                    ProcessId::current(),
                    "❌ Abandoned workload {} could not be stopped: {}",
                    handle.id,
                    stop_err
                );
                err.with_stop_failure(stop_err)
            }
        }
    }
}
