use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::GateError;
use crate::error::Result;
use crate::time::Clock;

/// Length of the rolling admission window
pub const WINDOW: Duration = Duration::from_secs(1);

const WINDOW_NANOS: u64 = WINDOW.as_nanos() as u64;

/// Sliding-window admission gate
///
/// Admits at most `limit` callers within any rolling one-second window.
/// A saturated gate never rejects: the caller waits until the oldest
/// admission's slot leaves the window, then proceeds. Admissions are
/// granted in FIFO order of arrival at the internal critical section.
///
/// The gate holds no resources beyond its queue and lock, so dropping it
/// requires no teardown; waiters that already reserved a slot finish
/// their sleep independently.
pub struct RateGate {
    /// Admission timestamps still inside (or projected into) the window,
    /// oldest first. Mutated only under the lock; a caller sleeping out
    /// its wait has already released it.
    admissions: Mutex<VecDeque<u64>>,

    /// Maximum admissions per rolling window
    limit: usize,

    /// Monotonic time source
    clock: Clock,
}

impl RateGate {
    /// Create a gate admitting `limit` requests per rolling second
    pub fn new(limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(GateError::InvalidConfig("limit must be greater than zero"));
        }

        Ok(Self { admissions: Mutex::new(VecDeque::with_capacity(limit)), limit, clock: Clock::new() })
    }

    /// Alias of [`RateGate::new`] spelling out the window unit
    pub fn per_second(limit: usize) -> Result<Self> {
        Self::new(limit)
    }

    /// Maximum admissions per rolling window
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Wait until the gate admits this caller
    ///
    /// Equivalent to [`RateGate::admit_with`] with a signal that never
    /// fires; cannot return [`GateError::Cancelled`].
    pub async fn admit(&self) -> Result<()> {
        let wait = self.reserve();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        Ok(())
    }

    /// Wait until the gate admits this caller, honoring `cancel`
    ///
    /// Returns [`GateError::Cancelled`] if the token fires while the
    /// caller is still waiting. The slot reserved for a cancelled caller
    /// is kept and expires with its window: one admission of throughput
    /// is lost rather than re-timing the callers queued behind it.
    pub async fn admit_with(&self, cancel: &CancellationToken) -> Result<()> {
        let wait = self.reserve();
        if wait.is_zero() {
            return Ok(());
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(GateError::Cancelled),
            _ = tokio::time::sleep(wait) => Ok(()),
        }
    }

    /// Reserve an admission slot and return how long the caller must wait
    ///
    /// One short critical section per call: evict entries whose window
    /// has elapsed, admit immediately when under the limit, otherwise
    /// replace the oldest entry with this caller's projected admission
    /// time so concurrent callers see the reservation before the lock is
    /// released. A zero wait means the caller may proceed at once.
    fn reserve(&self) -> Duration {
        let now = self.clock.now_nanos();
        let mut admissions = self.admissions.lock();

        while let Some(&oldest) = admissions.front() {
            if oldest >= now.saturating_sub(WINDOW_NANOS) {
                break;
            }
            admissions.pop_front();
        }

        if admissions.len() < self.limit {
            admissions.push_back(now);
            return Duration::ZERO;
        }

        // Saturated: take over the oldest slot. The queue is non-empty
        // here since limit > 0.
        let oldest = admissions.pop_front().unwrap_or(now);
        let wait_nanos = (oldest + WINDOW_NANOS).saturating_sub(now);
        admissions.push_back(now + wait_nanos);

        Duration::from_nanos(wait_nanos)
    }
}
