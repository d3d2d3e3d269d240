//! Scenario state machine
//!
//! Every scenario walks `Idle → Launching → Running → … → Idle`. Crash
//! scenarios pass through `AwaitingPhase → Interrupting → Verifying`; the
//! final scenario substitutes `Completing` for the interruption.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::scenario::ScenarioKind;
use crate::error::{OrchestratorError, OrchestratorResult};
use shared::{process_debug, ProcessId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    Idle,
    Launching,
    Running,
    AwaitingPhase,
    Interrupting,
    Completing,
    Verifying,
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScenarioState::Idle => "idle",
            ScenarioState::Launching => "launching",
            ScenarioState::Running => "running",
            ScenarioState::AwaitingPhase => "awaiting_phase",
            ScenarioState::Interrupting => "interrupting",
            ScenarioState::Completing => "completing",
            ScenarioState::Verifying => "verifying",
        };
        write!(f, "{name}")
    }
}

/// Tracks the state of one scenario and rejects out-of-order transitions
#[derive(Debug, Clone)]
pub struct ScenarioMachine {
    kind: ScenarioKind,
    current: ScenarioState,
    visited: Vec<ScenarioState>,
}

impl ScenarioMachine {
    pub fn new(kind: ScenarioKind) -> Self {
        Self {
            kind,
            current: ScenarioState::Idle,
            visited: vec![ScenarioState::Idle],
        }
    }

    pub fn kind(&self) -> ScenarioKind {
        self.kind
    }

    pub fn current(&self) -> ScenarioState {
        self.current
    }

    /// Every state entered so far, starting with `Idle`
    pub fn visited(&self) -> &[ScenarioState] {
        &self.visited
    }

    /// Whether `from → to` is legal for this scenario kind
    pub fn allows(&self, from: ScenarioState, to: ScenarioState) -> bool {
        use ScenarioState::*;

        match (from, to) {
            (Idle, Launching) | (Launching, Running) | (Verifying, Idle) => true,
            (Running, AwaitingPhase) | (AwaitingPhase, Interrupting) | (Interrupting, Verifying) => {
                self.kind.is_crash()
            }
            (Running, Completing) | (Completing, Verifying) => !self.kind.is_crash(),
            _ => false,
        }
    }

    /// Move to the next state
    pub fn advance(&mut self, to: ScenarioState) -> OrchestratorResult<()> {
        if !self.allows(self.current, to) {
            return Err(OrchestratorError::InvalidTransition {
                from: self.current,
                to,
            });
        }

        process_debug!(
            ProcessId::current(),
            "🔀 {} scenario: {} -> {}",
            self.kind,
            self.current,
            to
        );
        self.current = to;
        self.visited.push(to);
        Ok(())
    }

    /// The scenario ran every step and is back at rest
    pub fn is_complete(&self) -> bool {
        self.current == ScenarioState::Idle && self.visited.len() > 1
    }
}
