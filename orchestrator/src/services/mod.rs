//! Service implementations
//!
//! Real implementations of the traits in `crate::traits`. These spawn actual
//! processes and sleep on the actual clock.

pub mod clock;
pub mod process_output_handler;
pub mod status;
pub mod workload;

// Re-export all service implementations
pub use clock::TokioClock;
pub use status::DmgStatusSource;
pub use workload::RealWorkloadController;
