//! Shared error types for the crash-test harness

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid fault rule: {field} = {value}")]
    InvalidFaultRule { field: String, value: String },

    #[error("Malformed fault rule '{input}': expected ID:PROBABILITY:INTERVAL:MAX_FAULTS")]
    MalformedFaultRule { input: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
