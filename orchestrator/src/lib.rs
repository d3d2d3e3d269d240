//! Crash-consistency harness for a distributed storage cluster
//!
//! This library compiles fault-injection artifacts for the storage engine and
//! drives the IOR workload through a fixed sequence of crash scenarios,
//! checking after each one that every server rank is still joined.

pub mod config;
pub mod core;
pub mod error;
pub mod fault;
pub mod orchestrator;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::{CrashConfig, DmgConfig, HarnessSettings, IorConfig, PoolTarget};
pub use core::{HealthVerdict, HealthVerifier, IoPhase, ScenarioKind, ScenarioOutcome, SequenceReport};
pub use error::{OrchestratorError, OrchestratorResult};
pub use fault::{FaultCatalog, FaultConfig, FaultConfigCompiler};
pub use orchestrator::CrashOrchestrator;
pub use traits::{Clock, ClusterStatusSource, ExitKind, WorkloadController, WorkloadHandle};
