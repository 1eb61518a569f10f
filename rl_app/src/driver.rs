use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures::StreamExt;
use futures::stream;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Outcome of one batch run
#[derive(Debug, Clone, Copy)]
pub struct BatchReport {
    /// Requests that completed successfully
    pub completed: usize,

    /// Wall-clock time for the whole batch
    pub elapsed: Duration,
}

/// Why a batch stopped before completing
#[derive(Debug)]
pub enum BatchError<E> {
    /// The batch was abandoned via the cancellation token
    Cancelled,

    /// An operation failed; the batch stops at the first failure
    Op(E),
}

impl<E: fmt::Display> fmt::Display for BatchError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Cancelled => write!(f, "Batch cancelled"),
            BatchError::Op(err) => write!(f, "Batch operation failed: {}", err),
        }
    }
}

impl<E: std::error::Error> std::error::Error for BatchError<E> {}

/// Fan `total` invocations of `op` out with bounded concurrency
///
/// Each invocation receives its request index. The batch stops at the
/// first operation error, which is propagated unchanged, or as soon as
/// `cancel` fires. Cancellation is checked before in-flight results, so
/// a fired token wins even when completed work is waiting to be drained.
pub async fn run_batch<F, Fut, E>(
    total: usize,
    parallelism: usize,
    cancel: &CancellationToken,
    op: F,
) -> Result<BatchReport, BatchError<E>>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let started = Instant::now();
    let mut completed = 0usize;

    // buffer_unordered(0) would stall forever; the config layer rejects
    // zero upstream.
    let mut results = stream::iter((0..total).map(|index| op(index))).buffer_unordered(parallelism.max(1));

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BatchError::Cancelled),
            next = results.next() => match next {
                Some(Ok(())) => completed += 1,
                Some(Err(err)) => return Err(BatchError::Op(err)),
                None => break,
            },
        }
    }

    Ok(BatchReport { completed, elapsed: started.elapsed() })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use rl_gate::RateGate;
    use rl_gate::WINDOW;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_batch_completes_all_requests() {
        let cancel = CancellationToken::new();

        let report = run_batch(100, 2, &cancel, |_| async { Ok::<(), &str>(()) }).await.unwrap();

        assert_eq!(report.completed, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallelism_is_bounded() {
        let cancel = CancellationToken::new();
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let report = run_batch(10, 3, &cancel, |_| {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Ok::<(), &str>(())
            }
        })
        .await
        .unwrap();

        assert_eq!(report.completed, 10);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gated_batch_paces_to_the_window() {
        let cancel = CancellationToken::new();
        let gate = Arc::new(RateGate::new(5).unwrap());

        let report = run_batch(15, 16, &cancel, |_| {
            let gate = Arc::clone(&gate);
            async move {
                gate.admit().await.map_err(|_| "gate error")?;
                Ok::<(), &str>(())
            }
        })
        .await
        .unwrap();

        assert_eq!(report.completed, 15);
        // 5 immediate, 5 after one window, 5 after two.
        assert!(report.elapsed >= WINDOW * 2 && report.elapsed <= WINDOW * 2 + Duration::from_millis(5), "took {:?}", report.elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_error_stops_the_batch() {
        let cancel = CancellationToken::new();
        let attempts = Arc::new(AtomicUsize::new(0));

        let result = run_batch(10, 1, &cancel, |index| {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                if index == 3 { Err("boom") } else { Ok(()) }
            }
        })
        .await;

        assert!(matches!(result, Err(BatchError::Op("boom"))));
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pre_cancelled_token_stops_immediately() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = run_batch(10, 2, &cancel, |_| async { Ok::<(), &str>(()) }).await;

        assert!(matches!(result, Err(BatchError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_inflight_batch() {
        let cancel = CancellationToken::new();
        let started = Instant::now();

        {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                cancel.cancel();
            });
        }

        let result = run_batch(4, 2, &cancel, |_| async {
            tokio::time::sleep(Duration::from_secs(1000)).await;
            Ok::<(), &str>(())
        })
        .await;

        assert!(matches!(result, Err(BatchError::Cancelled)));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5) && elapsed <= Duration::from_secs(5) + Duration::from_millis(5), "took {elapsed:?}");
    }
}
