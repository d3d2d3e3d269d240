//! Common test utilities and infrastructure
//!
//! Shared fixtures and builders used across the orchestrator test suites.

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
#[allow(unused_imports)]
pub use fixtures::TestFixtures;
#[allow(unused_imports)]
pub use helpers::{OrchestratorBuilder, SleepLog, TestHelpers, TestOrchestrator};
