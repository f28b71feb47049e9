use std::time::Duration;

use thiserror::Error;

/// A bounded poll ran out of budget.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("Timed out after {}ms waiting for {what}", waited.as_millis())]
    Timeout { what: String, waited: Duration },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Invalid range format")]
    InvalidFormat,
    #[error("Range covers {cells} cells; the limit is {max}")]
    TooLarge { cells: u64, max: u64 },
}

/// Failures raised by the coordinator before or while forwarding a request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Malformed message: {0}")]
    Malformed(String),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("No active tab")]
    NoActiveTab,
    #[error("Coordinator is not running")]
    Closed,
    #[error("{0}")]
    Adapter(String),
}
