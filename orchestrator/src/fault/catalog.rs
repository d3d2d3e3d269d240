//! Catalog of predefined fault rules
//!
//! Entries are static declarations and are not checked against the running
//! engine build; a rule naming a fault point the engine lacks is a no-op there.

use std::collections::BTreeMap;

use crate::error::{OrchestratorError, OrchestratorResult};
use shared::FaultRule;

#[derive(Debug, Clone, Default)]
pub struct FaultCatalog {
    entries: BTreeMap<String, FaultRule>,
}

impl FaultCatalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The predefined faults shipped with the harness
    pub fn builtin() -> Self {
        Self::new()
            // Object updates time out 17 times, then start succeeding
            .with_entry("obj_update_timeout", rule(50, 100, 1, 17))
            // Placeholder; no such fault point in the engine
            .with_entry("bogus_2nd_fault", rule(51, 100, 1, 1))
    }

    /// Add or replace a named entry
    pub fn with_entry<S: Into<String>>(mut self, name: S, rule: FaultRule) -> Self {
        self.entries.insert(name.into(), rule);
        self
    }

    /// Resolve a fault by name
    pub fn lookup(&self, name: &str) -> OrchestratorResult<FaultRule> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| OrchestratorError::UnknownFault {
                name: name.to_string(),
            })
    }

    /// Entry names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Builtin entries are constants well inside the probability bound
fn rule(id: u32, probability: u8, interval: u32, max_faults: u32) -> FaultRule {
    match FaultRule::new(id, probability, interval, max_faults) {
        Ok(rule) => rule,
        Err(e) => unreachable!("builtin fault rule is invalid: {e}"),
    }
}
