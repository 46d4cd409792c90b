//! Pre-configured spacing limiters for the Jikan API
//!
//! Jikan documents two ceilings for unauthenticated callers:
//! - 3 requests per second
//! - 60 requests per minute
//!
//! Reference: https://docs.api.jikan.moe/#section/Information/Rate-Limiting

use std::time::Duration;

use crate::SpacingLimiter;

/// Default Jikan limiter: 2 requests per second
///
/// Stays below the 3 requests per second burst ceiling with a safety margin.
pub fn jikan() -> SpacingLimiter {
    SpacingLimiter::new(Duration::from_millis(500))
}

/// Jikan limiter running at the documented per-second ceiling
///
/// Leaves no margin; expect occasional 429 responses under load.
pub fn jikan_upstream() -> SpacingLimiter {
    SpacingLimiter::builder().requests_per_second(3.0).build()
}

/// Jikan limiter honouring the sustained per-minute ceiling
///
/// Suitable for long-running batch jobs (crawling all episodes of a series).
pub fn jikan_sustained() -> SpacingLimiter {
    SpacingLimiter::builder().requests_per_minute(60.0).build()
}
