//! Per-request context: who is acting, and how long a store call may take.

use std::future::Future;
use std::time::Duration;

use rentledger_shared::types::UserId;
use tokio_util::sync::CancellationToken;

use crate::ledger::LedgerError;

/// Authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// Acting user.
    pub user_id: UserId,
}

/// Context threaded through every posting, credit, and report operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    principal: Principal,
    query_timeout: Duration,
    cancel: CancellationToken,
}

impl RequestContext {
    /// Creates a context with its own cancellation token.
    #[must_use]
    pub fn new(principal: Principal, query_timeout: Duration) -> Self {
        Self::with_cancel(principal, query_timeout, CancellationToken::new())
    }

    /// Creates a context cancelled together with `cancel`.
    #[must_use]
    pub const fn with_cancel(
        principal: Principal,
        query_timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            principal,
            query_timeout,
            cancel,
        }
    }

    /// Acting principal.
    #[must_use]
    pub const fn principal(&self) -> Principal {
        self.principal
    }

    /// Per-call deadline.
    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Token that fires when the caller goes away.
    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs one store call under the cancellation token and the deadline.
    ///
    /// Cancellation wins over completion when both are ready.
    pub async fn guard<T, F>(&self, call: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, LedgerError>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(LedgerError::Cancelled),
            outcome = tokio::time::timeout(self.query_timeout, call) => {
                outcome.unwrap_or(Err(LedgerError::DeadlineExceeded))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(timeout: Duration) -> RequestContext {
        RequestContext::new(
            Principal {
                user_id: UserId::new(1),
            },
            timeout,
        )
    }

    #[tokio::test]
    async fn test_guard_passes_result_through() {
        let ctx = ctx(Duration::from_secs(1));
        let value = ctx.guard(async { Ok::<_, LedgerError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_guard_times_out() {
        let ctx = ctx(Duration::from_millis(50));
        let err = ctx
            .guard(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, LedgerError>(())
            })
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::DeadlineExceeded);
    }

    #[tokio::test]
    async fn test_guard_observes_cancellation() {
        let ctx = ctx(Duration::from_secs(5));
        ctx.cancel_token().cancel();
        let err = ctx
            .guard(async { Ok::<_, LedgerError>(()) })
            .await
            .unwrap_err();
        assert_eq!(err, LedgerError::Cancelled);
    }
}
