use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use jk_ratelimit::RateLimiter;
use jk_ratelimit::spacing::DEFAULT_MIN_INTERVAL;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::decoder::ResponseDecoder;
use crate::errors::ApiError;
use crate::errors::Result;
use crate::errors::RetryClass;
use crate::errors::classify;
use crate::transport::RawResponse;
use crate::transport::Transport;
use crate::transport::TransportError;

/// Retry and pacing knobs for one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Spacing used when the client builds its own limiter (default: 500ms)
    pub min_interval: Duration,

    /// Deadline for one dispatch including the body read (default: 10s)
    pub attempt_timeout: Duration,

    /// Attempts per logical request when the descriptor sets none (default: 3)
    pub max_attempts: u32,

    /// Linear backoff unit: the wait after attempt `n` is `(n + 1) * backoff_step` (default: 1s)
    pub backoff_step: Duration,

    /// Added to the upstream's `Retry-After` before retrying a 429 (default: 1s)
    pub rate_limit_padding: Duration,

    /// Ceiling on 429 waits per logical request, `None` for unbounded (default: None)
    pub max_rate_limit_waits: Option<u32>,

    /// Pass through the limiter before every dispatch instead of once per request (default: false)
    pub acquire_per_attempt: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            attempt_timeout: Duration::from_secs(10),
            max_attempts: 3,
            backoff_step: Duration::from_secs(1),
            rate_limit_padding: Duration::from_secs(1),
            max_rate_limit_waits: None,
            acquire_per_attempt: false,
        }
    }
}

impl RetryConfig {
    /// Wait after the failed attempt with the given 0-based index
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt.saturating_add(1))
    }

    /// Wait after a 429 that asked for `retry_after_secs`
    pub fn rate_limit_delay(&self, retry_after_secs: u64) -> Duration {
        Duration::from_secs(retry_after_secs).saturating_add(self.rate_limit_padding)
    }
}

/// One logical request: where to go and how to read the answer
pub struct RequestDescriptor<D> {
    pub url: String,
    pub decoder: D,
    pub max_attempts: Option<u32>,
    pub cancel: Option<CancellationToken>,
}

impl<D> RequestDescriptor<D> {
    pub fn new(url: impl Into<String>, decoder: D) -> Self {
        Self { url: url.into(), decoder, max_attempts: None, cancel: None }
    }

    /// Override the attempt budget. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// A non-terminal failure about to be retried
#[derive(Debug)]
pub struct RetryEvent<'a> {
    pub url: &'a str,
    /// 0-based index of the attempt that failed
    pub attempt: u32,
    pub max_attempts: u32,
    pub error: &'a ApiError,
    pub delay: Duration,
    /// Whether this retry consumes an attempt
    pub budgeted: bool,
}

/// Sink for retry telemetry
pub trait RetryObserver: Send + Sync {
    fn on_retry(&self, event: &RetryEvent<'_>);

    fn on_failure(&self, _url: &str, _error: &ApiError) {}
}

/// Logs retries at `warn` and final failures at `debug`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn on_retry(&self, event: &RetryEvent<'_>) {
        warn!(
            url = event.url,
            attempt = event.attempt + 1,
            max_attempts = event.max_attempts,
            delay_ms = event.delay.as_millis() as u64,
            budgeted = event.budgeted,
            "Retrying after {}",
            event.error
        );
    }

    fn on_failure(&self, url: &str, error: &ApiError) {
        debug!(url, error_type = error.error_type(), "Request failed: {error}");
    }
}

/// Drives logical requests through admission, dispatch, classification and retry
pub struct RetryOrchestrator {
    transport: Arc<dyn Transport>,
    limiter: Arc<dyn RateLimiter>,
    observer: Arc<dyn RetryObserver>,
    config: RetryConfig,
}

impl RetryOrchestrator {
    pub fn new(transport: Arc<dyn Transport>, limiter: Arc<dyn RateLimiter>, config: RetryConfig) -> Self {
        Self { transport, limiter, observer: Arc::new(TracingObserver), config }
    }

    /// Replace the default tracing observer
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn limiter(&self) -> &Arc<dyn RateLimiter> {
        &self.limiter
    }

    /// Run one logical request to completion
    ///
    /// Returns the decoded value, the first terminal error, the last
    /// budgeted error once the budget is spent, or `Cancelled` if the
    /// descriptor's token fires while waiting or dispatching.
    pub async fn execute<T, D>(&self, request: RequestDescriptor<D>) -> Result<T>
    where
        D: ResponseDecoder<T>,
    {
        let RequestDescriptor { url, decoder, max_attempts, cancel } = request;
        let cancel = cancel.as_ref();
        let max_attempts = max_attempts.unwrap_or(self.config.max_attempts).max(1);

        let mut attempt: u32 = 0;
        let mut dispatches: u32 = 0;
        let mut rate_limit_waits: u32 = 0;

        cancellable(cancel, self.admit()).await?;

        while attempt < max_attempts {
            if self.config.acquire_per_attempt && dispatches > 0 {
                cancellable(cancel, self.admit()).await?;
            }

            dispatches += 1;
            debug!(url = %url, attempt, dispatches, "Dispatching");

            let error = match cancellable(cancel, self.dispatch(&url)).await {
                Ok(response) if response.is_success() => {
                    return decoder.decode(&response.body).map_err(|err| {
                        let error = ApiError::Decode(err);
                        self.observer.on_failure(&url, &error);
                        error
                    });
                }
                Ok(response) => classify(response.status, &response.headers, Some(&response.body)),
                Err(ApiError::Cancelled) => return Err(ApiError::Cancelled),
                Err(error) => error,
            };

            match error.retry_class() {
                RetryClass::Terminal => {
                    self.observer.on_failure(&url, &error);
                    return Err(error);
                }
                RetryClass::RateLimit { retry_after_secs } => {
                    rate_limit_waits += 1;
                    if self.config.max_rate_limit_waits.is_some_and(|limit| rate_limit_waits > limit) {
                        let exhausted = ApiError::MaxRetriesExceeded { attempts: dispatches };
                        self.observer.on_failure(&url, &exhausted);
                        return Err(exhausted);
                    }

                    let delay = self.config.rate_limit_delay(retry_after_secs);
                    self.observer.on_retry(&RetryEvent { url: &url, attempt, max_attempts, error: &error, delay, budgeted: false });
                    cancellable(cancel, pause(delay)).await?;
                }
                RetryClass::Budgeted => {
                    if attempt + 1 >= max_attempts {
                        self.observer.on_failure(&url, &error);
                        return Err(error);
                    }

                    let delay = self.config.backoff(attempt);
                    self.observer.on_retry(&RetryEvent { url: &url, attempt, max_attempts, error: &error, delay, budgeted: true });
                    cancellable(cancel, pause(delay)).await?;
                    attempt += 1;
                }
            }
        }

        let exhausted = ApiError::MaxRetriesExceeded { attempts: dispatches };
        self.observer.on_failure(&url, &exhausted);
        Err(exhausted)
    }

    async fn admit(&self) -> Result<()> {
        self.limiter.acquire().await.map_err(|_| ApiError::Cancelled)
    }

    /// One HTTP exchange under the per-attempt deadline
    async fn dispatch(&self, url: &str) -> Result<RawResponse> {
        let after = self.config.attempt_timeout;

        match tokio::time::timeout(after, self.transport.get(url)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(TransportError::Timeout)) | Err(_) => Err(ApiError::Timeout { after }),
            Ok(Err(err)) => Err(ApiError::Network { cause: err.to_string() }),
        }
    }
}

async fn pause(delay: Duration) -> Result<()> {
    tokio::time::sleep(delay).await;
    Ok(())
}

/// Race `fut` against the caller's token, if any
async fn cancellable<T, F>(cancel: Option<&CancellationToken>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(ApiError::Cancelled),
                result = fut => result,
            }
        }
        None => fut.await,
    }
}
