pub mod error;
pub mod limiter;
pub mod presets;
pub mod spacing;

pub use error::RateLimitError;
pub use error::Result;
pub use limiter::RateLimiter;
pub use spacing::SpacingLimiter;
pub use spacing::SpacingLimiterBuilder;
