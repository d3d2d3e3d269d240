//! Crash Sequence Configuration
//!
//! Timing and verdict policy for the crash scenarios, with a fluent builder.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::duration_secs;
use crate::core::scenario::ScenarioKind;
use crate::error::{OrchestratorError, OrchestratorResult};

/// Bounded retry budget for phase confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollBudget {
    pub attempts: u32,
    #[serde(rename = "interval_secs", with = "duration_secs")]
    pub interval: Duration,
}

impl Default for PollBudget {
    fn default() -> Self {
        Self {
            attempts: 12,
            interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashConfig {
    /// Time to let the workload write before interrupting it
    #[serde(rename = "write_phase_delay_secs", with = "duration_secs")]
    pub write_phase_delay: Duration,

    /// Time to wait before interrupting the read phase. Reads only start once
    /// the write stonewall limit is reached, so this exceeds the write delay.
    #[serde(rename = "read_phase_delay_secs", with = "duration_secs")]
    pub read_phase_delay: Duration,

    pub phase_poll: PollBudget,

    /// Grace period between SIGTERM and SIGKILL, and again after SIGKILL
    #[serde(rename = "stop_grace_secs", with = "duration_secs")]
    pub stop_grace: Duration,

    /// Treat a status query with zero ranks as a failure
    pub require_ranks: bool,

    /// Fail the sequence when the cluster is degraded after the final run
    pub gate_final_health: bool,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            write_phase_delay: Duration::from_secs(50),
            // 100s stonewall plus 5s for the read phase to begin
            read_phase_delay: Duration::from_secs(105),
            phase_poll: PollBudget::default(),
            stop_grace: Duration::from_secs(10),
            require_ranks: true,
            gate_final_health: false,
        }
    }
}

impl CrashConfig {
    /// Create a new builder
    pub fn builder() -> CrashConfigBuilder {
        CrashConfigBuilder::new()
    }

    /// Delay before the phase check for a scenario (zero for the final run)
    pub fn delay_for(&self, kind: ScenarioKind) -> Duration {
        match kind {
            ScenarioKind::WriteCrash => self.write_phase_delay,
            ScenarioKind::ReadCrash => self.read_phase_delay,
            ScenarioKind::FullRun => Duration::ZERO,
        }
    }

    /// Check the timing invariants
    pub fn validate(&self) -> OrchestratorResult<()> {
        if self.read_phase_delay <= self.write_phase_delay {
            return Err(OrchestratorError::InvalidArguments {
                message: format!(
                    "read phase delay ({:?}) must exceed write phase delay ({:?})",
                    self.read_phase_delay, self.write_phase_delay
                ),
            });
        }
        if self.phase_poll.attempts == 0 {
            return Err(OrchestratorError::InvalidArguments {
                message: "phase poll budget needs at least one attempt".to_string(),
            });
        }
        if self.stop_grace.is_zero() {
            return Err(OrchestratorError::InvalidArguments {
                message: "stop grace period must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

pub struct CrashConfigBuilder {
    config: CrashConfig,
}

impl CrashConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CrashConfig::default(),
        }
    }

    pub fn write_phase_delay(mut self, delay: Duration) -> Self {
        self.config.write_phase_delay = delay;
        self
    }

    pub fn read_phase_delay(mut self, delay: Duration) -> Self {
        self.config.read_phase_delay = delay;
        self
    }

    /// Set the phase confirmation budget
    pub fn phase_poll(mut self, attempts: u32, interval: Duration) -> Self {
        self.config.phase_poll = PollBudget { attempts, interval };
        self
    }

    pub fn stop_grace(mut self, grace: Duration) -> Self {
        self.config.stop_grace = grace;
        self
    }

    pub fn require_ranks(mut self, require: bool) -> Self {
        self.config.require_ranks = require;
        self
    }

    pub fn gate_final_health(mut self, gate: bool) -> Self {
        self.config.gate_final_health = gate;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrashConfig {
        self.config
    }
}

impl Default for CrashConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_stonewall_timing() {
        let config = CrashConfig::default();
        assert_eq!(config.delay_for(ScenarioKind::WriteCrash), Duration::from_secs(50));
        assert_eq!(config.delay_for(ScenarioKind::ReadCrash), Duration::from_secs(105));
        assert_eq!(config.delay_for(ScenarioKind::FullRun), Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_read_delay_must_exceed_write_delay() {
        let config = CrashConfig::builder()
            .write_phase_delay(Duration::from_secs(60))
            .read_phase_delay(Duration::from_secs(60))
            .build();
        assert!(matches!(
            config.validate(),
            Err(OrchestratorError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_zero_budgets_rejected() {
        let no_attempts = CrashConfig::builder()
            .phase_poll(0, Duration::from_secs(1))
            .build();
        assert!(no_attempts.validate().is_err());

        let no_grace = CrashConfig::builder().stop_grace(Duration::ZERO).build();
        assert!(no_grace.validate().is_err());
    }

    #[test]
    fn test_json_uses_whole_seconds() {
        let config: CrashConfig = serde_json::from_str(
            r#"{"write_phase_delay_secs": 5, "read_phase_delay_secs": 9,
                "phase_poll": {"attempts": 3, "interval_secs": 2}}"#,
        )
        .unwrap();

        assert_eq!(config.write_phase_delay, Duration::from_secs(5));
        assert_eq!(config.read_phase_delay, Duration::from_secs(9));
        assert_eq!(
            config.phase_poll,
            PollBudget {
                attempts: 3,
                interval: Duration::from_secs(2)
            }
        );
        // Unspecified fields keep their defaults
        assert_eq!(config.stop_grace, Duration::from_secs(10));
        assert!(config.require_ranks);
        assert!(!config.gate_final_health);
    }
}
