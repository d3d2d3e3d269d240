//! Fault-injection artifact scenario

use anyhow::{ensure, Context};
use std::path::{Path, PathBuf};
use tracing::info;

use orchestrator::{FaultCatalog, FaultConfig, FaultConfigCompiler, HarnessSettings};

/// Output directory used when the settings do not name one
pub const DEFAULT_FAULT_DIR: &str = "fault_injection";

const FAULT_NAME: &str = "obj_update_timeout";

/// Compile the object-update timeout fault and check what the engine will read
pub fn fault_config(settings: &HarnessSettings) -> anyhow::Result<()> {
    let output_dir = settings
        .fault_output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FAULT_DIR));

    let catalog = FaultCatalog::builtin();
    let path = FaultConfigCompiler::new(&catalog).compile(&output_dir, Some(&[FAULT_NAME]), None)?;

    let written = read_artifact(&path)?;
    let expected = catalog.lookup(FAULT_NAME)?;
    ensure!(
        written.rules == [expected],
        "{} holds {:?}, expected [{}]",
        path.display(),
        written.rules,
        expected
    );

    info!("✅ fault_config wrote {}", path.display());
    Ok(())
}

fn read_artifact(path: &Path) -> anyhow::Result<FaultConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(FaultConfig::parse(&text)?)
}
