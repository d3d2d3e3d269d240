//! Core business logic modules
//!
//! Pure logic with no I/O dependencies: scenario vocabulary, the scenario
//! state machine, health reduction and run reports.

pub mod health;
pub mod report;
pub mod scenario;
pub mod state;

pub use health::{HealthVerdict, HealthVerifier};
pub use report::{FailureRecord, ScenarioOutcome, SequenceReport};
pub use scenario::{IoPhase, ScenarioKind, VerificationStep};
pub use state::{ScenarioMachine, ScenarioState};
