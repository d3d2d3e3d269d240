//! Test Scenarios
//!
//! Each entry maps a test identifier to the harness operation it runs.

pub mod crash;
pub mod fault;

use anyhow::bail;
use orchestrator::{HarnessSettings, ScenarioKind};

/// Tags carried by the full crash sequence
pub const CRASH_IOR_TAGS: &[&str] = &["all", "daosio", "hw", "medium", "ib2", "full_regression", "crashior"];

const SINGLE_CRASH_TAGS: &[&str] = &["daosio", "hw", "medium", "crashior"];
const FAULT_TAGS: &[&str] = &["all", "faults"];

/// A registered test case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioEntry {
    pub name: &'static str,
    pub tags: &'static [&'static str],
    pub description: &'static str,
}

impl ScenarioEntry {
    /// `name<TAB>tag,tag,...` as printed by `--list`
    pub fn listing(&self) -> String {
        format!("{}\t{}", self.name, self.tags.join(","))
    }
}

const REGISTRY: &[ScenarioEntry] = &[
    ScenarioEntry {
        name: "crash_ior",
        tags: CRASH_IOR_TAGS,
        description: "Crash IOR during write, during read, then run it to completion",
    },
    ScenarioEntry {
        name: "crash_ior_write",
        tags: SINGLE_CRASH_TAGS,
        description: "Crash IOR during the write phase",
    },
    ScenarioEntry {
        name: "crash_ior_read",
        tags: SINGLE_CRASH_TAGS,
        description: "Crash IOR during the read phase",
    },
    ScenarioEntry {
        name: "crash_ior_full",
        tags: SINGLE_CRASH_TAGS,
        description: "Run IOR to completion",
    },
    ScenarioEntry {
        name: "fault_config",
        tags: FAULT_TAGS,
        description: "Compile the object-update timeout fault into fi.yaml",
    },
];

pub struct TestScenarios {
    settings: HarnessSettings,
}

impl TestScenarios {
    pub fn new(settings: HarnessSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// Run a specific scenario by name
    pub async fn run_scenario(&self, name: &str) -> anyhow::Result<()> {
        match name {
            "crash_ior" => crash::crash_ior(&self.settings).await,
            "crash_ior_write" => crash::crash_ior_single(&self.settings, ScenarioKind::WriteCrash).await,
            "crash_ior_read" => crash::crash_ior_single(&self.settings, ScenarioKind::ReadCrash).await,
            "crash_ior_full" => crash::crash_ior_single(&self.settings, ScenarioKind::FullRun).await,
            "fault_config" => fault::fault_config(&self.settings),
            _ => bail!(
                "Unknown test scenario: '{}'. Available: {}",
                name,
                Self::available_scenarios().join(", ")
            ),
        }
    }

    /// Every registered test case
    pub fn entries() -> &'static [ScenarioEntry] {
        REGISTRY
    }

    pub fn find(name: &str) -> Option<&'static ScenarioEntry> {
        REGISTRY.iter().find(|entry| entry.name == name)
    }

    /// Get list of available scenarios
    pub fn available_scenarios() -> Vec<&'static str> {
        REGISTRY.iter().map(|entry| entry.name).collect()
    }
}
