//! Shared types for the storage crash-test harness
//!
//! Contains the types every harness crate agrees on: fault rules, cluster
//! status snapshots, process identifiers, and the common logging setup.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
