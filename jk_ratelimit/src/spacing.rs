use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::debug;
use tracing::trace;

use crate::error::RateLimitError;
use crate::error::Result;
use crate::limiter::RateLimiter;

/// Default spacing between admissions (2 requests per second)
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// FIFO admission queue enforcing a minimum spacing between dispatches
///
/// Every call to [`acquire`](SpacingLimiter::acquire) joins a queue and is
/// released by a single drain task. The drain task sleeps whenever the last
/// release happened less than `min_interval` ago, so no two admissions are
/// ever closer together than `min_interval`, regardless of how many logical
/// requests are in flight.
///
/// Cloning a `SpacingLimiter` yields another handle to the same queue.
#[derive(Clone)]
pub struct SpacingLimiter {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<LimiterState>,
    min_interval: Duration,
}

/// Queue state. Tickets are only popped and `last_dispatch` is only stamped
/// by the drain task.
struct LimiterState {
    last_dispatch: Option<Instant>,
    pending: VecDeque<QueueEntry>,
    is_draining: bool,
    next_ticket: u64,
}

/// Admission ticket waiting in the queue
struct QueueEntry {
    ticket: u64,
    continuation: oneshot::Sender<()>,
}

impl SpacingLimiter {
    /// Create a new limiter with the given spacing
    pub fn new(min_interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(LimiterState { last_dispatch: None, pending: VecDeque::new(), is_draining: false, next_ticket: 0 }),
                min_interval,
            }),
        }
    }

    /// Create a builder for configuring a spacing limiter
    pub fn builder() -> SpacingLimiterBuilder {
        SpacingLimiterBuilder::new()
    }

    /// Suspend until this caller is admitted
    ///
    /// Must be called from within a Tokio runtime: the first caller to find
    /// the queue idle spawns the drain task. Returns [`RateLimitError::Closed`]
    /// if that task is dropped, e.g. by its runtime shutting down, before
    /// this ticket is released.
    pub async fn acquire(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();

        let start_drain = {
            let mut state = self.shared.state.lock();
            let ticket = state.next_ticket;
            state.next_ticket += 1;
            state.pending.push_back(QueueEntry { ticket, continuation: tx });
            trace!(ticket, pending = state.pending.len(), "Queued for admission");

            if state.is_draining {
                false
            } else {
                state.is_draining = true;
                true
            }
        };

        if start_drain {
            // The guard moves into the task before its first poll, so a task dropped unstarted still resets the queue
            tokio::spawn(drain(DrainGuard { shared: Arc::clone(&self.shared), armed: true }));
        }

        rx.await.map_err(|_| RateLimitError::Closed)
    }

    /// Number of callers currently queued
    pub fn pending(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// Configured spacing between admissions
    pub fn min_interval(&self) -> Duration {
        self.shared.min_interval
    }

    /// Whether a drain task is currently releasing tickets
    pub fn is_draining(&self) -> bool {
        self.shared.state.lock().is_draining
    }
}

/// Resets the queue when the drain task is torn down before it runs dry
///
/// Dropping the queued senders wakes every waiter with [`RateLimitError::Closed`]
/// and clears `is_draining`, so the next `acquire` spawns a fresh drain task.
struct DrainGuard {
    shared: Arc<Shared>,
    armed: bool,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut state = self.shared.state.lock();
        let closed = state.pending.len();
        state.pending.clear();
        state.is_draining = false;
        debug!(closed, "Drain task dropped, closing queued tickets");
    }
}

/// Release queued tickets one at a time, in order, spaced by `min_interval`
async fn drain(mut guard: DrainGuard) {
    let shared = Arc::clone(&guard.shared);

    loop {
        let wait = {
            let mut state = shared.state.lock();

            // Waiters that gave up never dispatch, so they do not consume a slot
            while state.pending.front().is_some_and(|entry| entry.continuation.is_closed()) {
                if let Some(entry) = state.pending.pop_front() {
                    trace!(ticket = entry.ticket, "Discarding abandoned ticket");
                }
            }

            if state.pending.is_empty() {
                state.is_draining = false;
                guard.armed = false;
                return;
            }

            match state.last_dispatch {
                Some(last) => shared.min_interval.saturating_sub(last.elapsed()),
                None => Duration::ZERO,
            }
        };

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        let mut state = shared.state.lock();
        if let Some(entry) = state.pending.pop_front() {
            if entry.continuation.send(()).is_ok() {
                state.last_dispatch = Some(Instant::now());
                trace!(ticket = entry.ticket, pending = state.pending.len(), "Admitted");
            } else {
                trace!(ticket = entry.ticket, "Waiter left while the queue was sleeping");
            }
        }
    }
}

impl RateLimiter for SpacingLimiter {
    fn acquire(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(SpacingLimiter::acquire(self))
    }

    fn pending(&self) -> usize {
        SpacingLimiter::pending(self)
    }

    fn min_interval(&self) -> Duration {
        SpacingLimiter::min_interval(self)
    }
}

impl Default for SpacingLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

/// Builder for configuring a spacing limiter
pub struct SpacingLimiterBuilder {
    min_interval: Duration,
}

impl SpacingLimiterBuilder {
    /// Create a new builder with the default 500ms spacing
    pub fn new() -> Self {
        Self { min_interval: DEFAULT_MIN_INTERVAL }
    }

    /// Set the spacing between admissions
    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Set spacing from a requests-per-second ceiling
    ///
    /// Rates that are not positive, or so small the interval overflows a
    /// `Duration`, leave the current spacing in place.
    pub fn requests_per_second(mut self, rate: f64) -> Self {
        if rate > 0.0 {
            if let Ok(interval) = Duration::try_from_secs_f64(1.0 / rate) {
                self.min_interval = interval;
            }
        }
        self
    }

    /// Set spacing from a requests-per-minute ceiling
    pub fn requests_per_minute(mut self, rate: f64) -> Self {
        if rate > 0.0 {
            if let Ok(interval) = Duration::try_from_secs_f64(60.0 / rate) {
                self.min_interval = interval;
            }
        }
        self
    }

    /// Build the limiter
    pub fn build(self) -> SpacingLimiter {
        SpacingLimiter::new(self.min_interval)
    }
}

impl Default for SpacingLimiterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
