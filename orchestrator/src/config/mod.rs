//! Configuration Management
//!
//! Timing/policy configuration for the crash sequence, command-line builders
//! for the external workload and administration tool, and the settings file
//! that ties them together.

pub mod commands;
pub mod crash;
pub mod settings;

// Re-export main types
pub use commands::{DmgConfig, IorConfig, PhaseMarkers, PoolTarget};
pub use crash::{CrashConfig, CrashConfigBuilder, PollBudget};
pub use settings::HarnessSettings;

/// Serde helper storing a `Duration` as whole seconds
pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
