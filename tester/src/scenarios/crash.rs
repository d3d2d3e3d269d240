//! IOR crash scenarios against a live cluster

use anyhow::Context;
use tracing::{debug, info, warn};

use orchestrator::services::{DmgStatusSource, RealWorkloadController, TokioClock};
use orchestrator::{CrashOrchestrator, HarnessSettings, ScenarioKind};

type LiveOrchestrator = CrashOrchestrator<RealWorkloadController, DmgStatusSource, TokioClock>;

fn live_orchestrator(settings: &HarnessSettings) -> anyhow::Result<LiveOrchestrator> {
    settings.validate().context("invalid harness settings")?;

    let workload = RealWorkloadController::new(settings.ior.clone()).with_grace_period(settings.crash.stop_grace);
    let status = DmgStatusSource::new(settings.dmg.clone());
    Ok(CrashOrchestrator::new(
        workload,
        status,
        TokioClock,
        settings.target.clone(),
        settings.crash.clone(),
    ))
}

/// Full crash sequence: write crash, read crash, complete run
pub async fn crash_ior(settings: &HarnessSettings) -> anyhow::Result<()> {
    info!("🧪 crash_ior against {}", settings.target);
    let orchestrator = live_orchestrator(settings)?;

    let (report, result) = orchestrator.execute_sequence().await;
    debug!("Sequence report: {}", report.to_json()?);

    result.context("crash sequence failed")?;
    for outcome in report.degraded_outcomes() {
        warn!("⚠️ {} scenario left degraded ranks: {:?}", outcome.scenario, outcome.health.degraded);
    }

    info!("✅ crash_ior passed ({} scenarios)", report.outcomes.len());
    Ok(())
}

/// One scenario of the sequence on its own
pub async fn crash_ior_single(settings: &HarnessSettings, kind: ScenarioKind) -> anyhow::Result<()> {
    info!("🧪 {} scenario against {}", kind, settings.target);
    let orchestrator = live_orchestrator(settings)?;

    let outcome = orchestrator
        .run_scenario(kind)
        .await
        .with_context(|| format!("{kind} scenario failed"))?;
    debug!("Scenario outcome: {}", serde_json::to_string(&outcome)?);

    info!("✅ {} scenario passed ({})", kind, outcome.exit);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use orchestrator::OrchestratorError;

    #[tokio::test]
    async fn test_missing_target_fails_before_launch() {
        let settings = HarnessSettings::default();
        let err = crash_ior(&settings).await.unwrap_err();
        assert!(err.to_string().contains("invalid harness settings"));
        assert_matches!(
            err.downcast_ref::<OrchestratorError>(),
            Some(OrchestratorError::InvalidArguments { .. })
        );
    }

    #[tokio::test]
    async fn test_single_scenario_with_bad_timing() {
        let mut settings = HarnessSettings::default();
        settings.target = orchestrator::PoolTarget::new("pool0", "cont0");
        settings.crash.read_phase_delay = settings.crash.write_phase_delay;

        let err = crash_ior_single(&settings, ScenarioKind::ReadCrash).await.unwrap_err();
        assert_matches!(
            err.downcast_ref::<OrchestratorError>(),
            Some(OrchestratorError::InvalidArguments { message }) if message.contains("read phase delay")
        );
    }
}
