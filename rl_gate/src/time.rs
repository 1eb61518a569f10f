use tokio::time::Instant;

/// Monotonic time for the gate
///
/// Measures nanoseconds since a per-gate construction epoch. Built on
/// `tokio::time::Instant` so the paused runtime clock drives gate time in
/// tests; outside a test runtime this is the same monotonic clock as
/// `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Clock {
    epoch: Instant,
}

impl Clock {
    #[inline(always)]
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }

    /// Nanoseconds elapsed since the epoch
    #[inline(always)]
    pub fn now_nanos(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}
