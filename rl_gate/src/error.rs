use std::fmt;

/// Result type for gate operations
pub type Result<T> = std::result::Result<T, GateError>;

/// Errors raised by the admission gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// Invalid construction parameters
    InvalidConfig(&'static str),

    /// The caller abandoned a pending wait
    Cancelled,
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::InvalidConfig(msg) => write!(f, "Invalid gate configuration: {}", msg),
            GateError::Cancelled => write!(f, "Admission wait cancelled"),
        }
    }
}

impl std::error::Error for GateError {}
