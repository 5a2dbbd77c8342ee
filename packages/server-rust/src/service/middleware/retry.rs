//! Retry middleware for operations.
//!
//! Replays a failed operation against a clone of the inner service according
//! to a [`RetryPolicy`]. Every failure is retried; the error of the last
//! attempt is returned unchanged.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use calculadora_core::OperationResponse;
use tower::{Layer, Service, ServiceExt};

use crate::service::operation::{Operation, OperationError};
use crate::service::retry::RetryPolicy;

/// Counter of retry attempts (attempts after the first), labelled by `operation`.
pub const RETRY_ATTEMPTS_TOTAL: &str = "calculadora_retry_attempts_total";

// ---------------------------------------------------------------------------
// RetryLayer
// ---------------------------------------------------------------------------

/// Tower layer that wraps services with a bounded retry loop.
#[derive(Debug, Clone)]
pub struct RetryLayer {
    policy: RetryPolicy,
}

impl RetryLayer {
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = RetryService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RetryService {
            inner,
            policy: self.policy,
        }
    }
}

// ---------------------------------------------------------------------------
// RetryService
// ---------------------------------------------------------------------------

/// Service wrapper that retries failed operations.
#[derive(Debug, Clone)]
pub struct RetryService<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> Service<Operation> for RetryService<S>
where
    S: Service<Operation, Response = OperationResponse, Error = OperationError>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = Pin<Box<dyn Future<Output = Result<OperationResponse, OperationError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        // Keep the service that was driven to readiness and leave a fresh
        // clone behind for the next call.
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let policy = self.policy;

        Box::pin(async move {
            let operation = op.ctx.op.name();
            policy
                .run(move |attempt| {
                    if attempt > 1 {
                        metrics::counter!(RETRY_ATTEMPTS_TOTAL, "operation" => operation)
                            .increment(1);
                    }
                    inner.clone().oneshot(op.clone())
                })
                .await
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
