//! # jk_http
//!
//! Resilient client for the rate-limited Jikan JSON API.
//!
//! Every logical request passes through a shared [`jk_ratelimit::SpacingLimiter`],
//! is dispatched under a per-attempt deadline, and failed responses are
//! classified into [`ApiError`] to decide between retrying and giving up.

pub mod client;
pub mod decoder;
pub mod errors;
pub mod jikan;
pub mod retry;
pub mod transport;

pub use client::HttpClient;
pub use client::HttpClientConfig;
pub use decoder::JsonDecoder;
pub use decoder::ResponseDecoder;
pub use decoder::decode_fn;
pub use errors::ApiError;
pub use errors::ClientError;
pub use errors::DecodeError;
pub use errors::Result;
pub use errors::RetryClass;
pub use errors::classify;
pub use jikan::AnimeSearchQuery;
pub use jikan::JikanClient;
pub use jikan::JikanClientBuilder;
pub use jikan::TopAnimeQuery;
pub use retry::RequestDescriptor;
pub use retry::RetryConfig;
pub use retry::RetryEvent;
pub use retry::RetryObserver;
pub use retry::RetryOrchestrator;
pub use retry::TracingObserver;
pub use transport::RawResponse;
pub use transport::Transport;
pub use transport::TransportError;
