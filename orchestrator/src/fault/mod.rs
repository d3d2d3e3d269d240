//! Fault injection configuration
//!
//! A catalog of named fault rules and the compiler that writes them, with a
//! fixed seed, into the artifact the storage engine reads at startup.

pub mod artifact;
pub mod catalog;
pub mod compiler;

pub use artifact::{FaultConfig, DEFAULT_SEED, FAULT_CONFIG_FILE};
pub use catalog::FaultCatalog;
pub use compiler::FaultConfigCompiler;
