//! Crash-harness test runner
//!
//! A registry of named, tagged test cases that external selection tooling can
//! list and invoke one at a time. Tags are opaque labels for that tooling.
//!
//! ## Quick Start
//!
//! ```no_run
//! use orchestrator::HarnessSettings;
//! use tester::TestScenarios;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let settings = HarnessSettings::load(None)?;
//! TestScenarios::new(settings).run_scenario("crash_ior").await?;
//! # Ok(())
//! # }
//! ```

pub mod scenarios;

pub use scenarios::{ScenarioEntry, TestScenarios};
