use std::fmt;

/// Result type for admission operations
pub type Result<T> = std::result::Result<T, RateLimitError>;

/// Errors that can occur while waiting for admission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitError {
    /// The drain loop went away before this ticket was released
    Closed,
}

impl fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitError::Closed => write!(f, "Admission queue closed before the ticket was released"),
        }
    }
}

impl std::error::Error for RateLimitError {}
