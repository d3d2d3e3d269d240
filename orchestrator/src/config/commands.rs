//! External command configuration
//!
//! Argument builders for the I/O benchmark workload and the cluster
//! administration tool.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::duration_secs;
use crate::core::scenario::IoPhase;
use crate::error::{OrchestratorError, OrchestratorResult};

/// Pool and container the workload runs against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTarget {
    pub pool: String,
    pub container: String,
}

impl PoolTarget {
    pub fn new<P: Into<String>, C: Into<String>>(pool: P, container: C) -> Self {
        Self {
            pool: pool.into(),
            container: container.into(),
        }
    }

    pub fn validate(&self) -> OrchestratorResult<()> {
        if self.pool.trim().is_empty() {
            return Err(OrchestratorError::InvalidArguments {
                message: "pool target is required".to_string(),
            });
        }
        if self.container.trim().is_empty() {
            return Err(OrchestratorError::InvalidArguments {
                message: "container target is required".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for PoolTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pool, self.container)
    }
}

/// Output lines announcing each I/O phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseMarkers {
    pub write: String,
    pub read: String,
}

impl Default for PhaseMarkers {
    fn default() -> Self {
        Self {
            write: "Commencing write performance test".to_string(),
            read: "Commencing read performance test".to_string(),
        }
    }
}

impl PhaseMarkers {
    /// Which phase, if any, a line of workload output announces
    pub fn phase_of(&self, line: &str) -> Option<IoPhase> {
        if line.contains(&self.write) {
            Some(IoPhase::Write)
        } else if line.contains(&self.read) {
            Some(IoPhase::Read)
        } else {
            None
        }
    }
}

/// IOR workload command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IorConfig {
    /// Optional launcher prefix, e.g. `["mpirun", "-np", "4"]`
    pub launcher: Vec<String>,
    pub binary: String,
    pub api: String,
    pub block_size: String,
    pub transfer_size: String,
    pub segments: u32,
    /// Write phase time limit; reads start once it is reached
    pub stonewall_secs: u64,
    pub object_class: Option<String>,
    pub extra_args: Vec<String>,
    pub markers: PhaseMarkers,
}

impl Default for IorConfig {
    fn default() -> Self {
        Self {
            launcher: Vec::new(),
            binary: "ior".to_string(),
            api: "DFS".to_string(),
            block_size: "1G".to_string(),
            transfer_size: "1M".to_string(),
            segments: 1,
            stonewall_secs: 100,
            object_class: None,
            extra_args: Vec::new(),
            markers: PhaseMarkers::default(),
        }
    }
}

impl IorConfig {
    /// Program to execute: the launcher when one is set, otherwise IOR itself
    pub fn program(&self) -> &str {
        self.launcher.first().unwrap_or(&self.binary)
    }

    /// Arguments passed to `program()`
    pub fn to_args(&self, target: &PoolTarget) -> Vec<String> {
        let mut args: Vec<String> = self.launcher.iter().skip(1).cloned().collect();
        if !self.launcher.is_empty() {
            args.push(self.binary.clone());
        }

        args.push("-a".to_string());
        args.push(self.api.clone());
        args.push("-b".to_string());
        args.push(self.block_size.clone());
        args.push("-t".to_string());
        args.push(self.transfer_size.clone());
        args.push("-s".to_string());
        args.push(self.segments.to_string());

        // Write then read, keep the file, verbose so phases are announced
        args.push("-w".to_string());
        args.push("-r".to_string());
        args.push("-k".to_string());
        args.push("-v".to_string());

        args.push("-D".to_string());
        args.push(self.stonewall_secs.to_string());

        args.push("--dfs.pool".to_string());
        args.push(target.pool.clone());
        args.push("--dfs.cont".to_string());
        args.push(target.container.clone());

        if let Some(ref oclass) = self.object_class {
            args.push("--dfs.oclass".to_string());
            args.push(oclass.clone());
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Administration tool used for system status queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmgConfig {
    pub binary: String,
    pub config_file: Option<PathBuf>,
    /// Upper bound on one system query
    #[serde(rename = "query_timeout_secs", with = "duration_secs")]
    pub query_timeout: Duration,
}

impl Default for DmgConfig {
    fn default() -> Self {
        Self {
            binary: "dmg".to_string(),
            config_file: None,
            query_timeout: Duration::from_secs(60),
        }
    }
}

impl DmgConfig {
    /// Arguments for a verbose, JSON-formatted system query
    pub fn system_query_args(&self) -> Vec<String> {
        let mut args = vec!["-j".to_string()];
        if let Some(ref config) = self.config_file {
            args.push("-o".to_string());
            args.push(config.display().to_string());
        }
        args.push("system".to_string());
        args.push("query".to_string());
        args.push("-v".to_string());
        args
    }
}
