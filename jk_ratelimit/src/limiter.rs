use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::Result;

/// Core trait for admission control in front of an upstream API
pub trait RateLimiter: Send + Sync {
    /// Wait until it is this caller's turn to dispatch
    ///
    /// Callers are admitted in the order their futures were first polled.
    fn acquire(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Number of callers currently waiting for admission
    fn pending(&self) -> usize;

    /// Minimum spacing enforced between two admissions
    fn min_interval(&self) -> Duration;
}
