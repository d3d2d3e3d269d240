//! Harness settings file
//!
//! One JSON document describing the target, the workload, the administration
//! tool, and the crash timing. Environment variables (optionally loaded from
//! `.env` by the binaries) override individual fields.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{CrashConfig, DmgConfig, IorConfig, PoolTarget};
use crate::error::{OrchestratorError, OrchestratorResult};

pub const ENV_POOL: &str = "CRASH_POOL";
pub const ENV_CONTAINER: &str = "CRASH_CONTAINER";
pub const ENV_IOR_BIN: &str = "IOR_BIN";
pub const ENV_DMG_BIN: &str = "DMG_BIN";
pub const ENV_DMG_CONFIG: &str = "DMG_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    pub target: PoolTarget,
    pub crash: CrashConfig,
    pub ior: IorConfig,
    pub dmg: DmgConfig,
    /// Where fault-injection artifacts are written
    pub fault_output_dir: Option<PathBuf>,
}

impl HarnessSettings {
    /// Load settings from a JSON file
    pub fn from_json_file(path: &Path) -> OrchestratorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| OrchestratorError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> OrchestratorResult<Self> {
        let settings = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        Ok(settings.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides from a key lookup (the process environment in practice)
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(pool) = lookup(ENV_POOL) {
            self.target.pool = pool;
        }
        if let Some(container) = lookup(ENV_CONTAINER) {
            self.target.container = container;
        }
        if let Some(ior) = lookup(ENV_IOR_BIN) {
            self.ior.binary = ior;
        }
        if let Some(dmg) = lookup(ENV_DMG_BIN) {
            self.dmg.binary = dmg;
        }
        if let Some(config) = lookup(ENV_DMG_CONFIG) {
            self.dmg.config_file = Some(PathBuf::from(config));
        }
        self
    }

    /// Check everything a crash sequence needs
    pub fn validate(&self) -> OrchestratorResult<()> {
        self.target.validate()?;
        self.crash.validate()
    }
}
