//! The generic poll loop.
//!
//! Checks fire on a fixed interval, the first one immediately. RPC errors
//! from a check are logged and retried; any other error ends the loop.
//! Only the [`PollContext`] bounds how long the loop runs.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use crate::cancel::CancelToken;
use crate::error::CheckerError;

/// Cancellation and deadline for a wait.
#[derive(Clone, Debug, Default)]
pub struct PollContext {
    cancel: Option<CancelToken>,
    deadline: Option<Instant>,
}

impl PollContext {
    /// No deadline, not cancellable.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail if already cancelled or past the deadline.
    pub fn check(&self) -> Result<(), CheckerError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(CheckerError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(CheckerError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Resolves with the reason once the context is done.
    pub async fn done(&self) -> CheckerError {
        let deadline = async {
            match self.deadline {
                Some(d) => time::sleep_until(d).await,
                None => std::future::pending().await,
            }
        };
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            _ = cancelled => CheckerError::Cancelled,
            _ = deadline => CheckerError::DeadlineExceeded,
        }
    }
}

/// Run `check` every `interval` until it yields a value.
///
/// Returns the value and the time spent waiting.
pub async fn poll<T, F, Fut>(
    ctx: &PollContext,
    interval: Duration,
    mut check: F,
) -> Result<(T, Duration), CheckerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, CheckerError>>,
{
    if interval.is_zero() {
        return Err(CheckerError::ZeroInterval);
    }
    let start = Instant::now();
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut attempts = 0u64;
    loop {
        tokio::select! {
            biased;
            reason = ctx.done() => return Err(reason),
            _ = ticker.tick() => {}
        }
        ctx.check()?;
        attempts += 1;
        let outcome = tokio::select! {
            biased;
            reason = ctx.done() => return Err(reason),
            outcome = check() => outcome,
        };
        match outcome {
            Ok(Some(value)) => return Ok((value, start.elapsed())),
            Ok(None) => tracing::trace!(attempts, "condition not met yet"),
            Err(CheckerError::Rpc(e)) => {
                tracing::warn!(attempts, error = %e, "poll check failed, retrying");
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelController;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use subnet_rpc::RpcError;

    const TICK: Duration = Duration::from_millis(5);

    #[tokio::test]
    async fn first_check_is_immediate() {
        let started = Instant::now();
        let (value, _) = poll(&PollContext::new(), Duration::from_secs(60), || async {
            Ok::<_, CheckerError>(Some(7))
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn rpc_errors_are_retried() {
        let calls = AtomicUsize::new(0);
        let (value, _) = poll(&PollContext::new(), TICK, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 3 {
                    Err(CheckerError::Rpc(RpcError::EmptyResponse("test".into())))
                } else {
                    Ok(Some(n))
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn other_errors_end_the_loop() {
        let calls = AtomicUsize::new(0);
        let err = poll(&PollContext::new(), TICK, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<Option<()>, _>(CheckerError::EmptyId("tx ID")) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CheckerError::EmptyId(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn deadline_stops_the_loop() {
        let ctx = PollContext::new().with_timeout(Duration::from_millis(30));
        let err = poll(&ctx, TICK, || async { Ok::<Option<()>, CheckerError>(None) })
            .await
            .unwrap_err();
        assert!(matches!(err, CheckerError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn cancellation_stops_the_loop() {
        let controller = CancelController::new();
        let ctx = PollContext::new().with_cancel(controller.token());
        let calls = AtomicUsize::new(0);
        let err = poll(&ctx, TICK, || {
            if calls.fetch_add(1, Ordering::SeqCst) == 2 {
                controller.cancel();
            }
            async { Ok::<Option<()>, CheckerError>(None) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CheckerError::Cancelled));
        assert!(err.is_interrupted());
    }

    #[tokio::test]
    async fn slow_check_is_interrupted() {
        let ctx = PollContext::new().with_timeout(Duration::from_millis(20));
        let err = poll(&ctx, TICK, || async {
            time::sleep(Duration::from_secs(60)).await;
            Ok::<Option<()>, CheckerError>(Some(()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CheckerError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn zero_interval_rejected() {
        let err = poll(&PollContext::new(), Duration::ZERO, || async {
            Ok::<Option<()>, CheckerError>(Some(()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CheckerError::ZeroInterval));
    }
}
