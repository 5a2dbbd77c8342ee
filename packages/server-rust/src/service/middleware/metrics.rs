//! Metrics middleware for operations.
//!
//! Wraps each operation in a `tracing` span and records its duration and
//! outcome through the `metrics` facade. Nothing is exported unless a
//! recorder (the Prometheus one in the server binary) is installed.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use calculadora_core::OperationResponse;
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::operation::{Operation, OperationError};

/// Counter of finished operations, labelled by `operation` and `outcome`.
pub const OPERATIONS_TOTAL: &str = "calculadora_operations_total";
/// Histogram of operation durations in seconds, retries included.
pub const OPERATION_DURATION_SECONDS: &str = "calculadora_operation_duration_seconds";

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments operations with timing and outcome.
#[derive(Debug, Clone)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

/// Service wrapper that records operation duration and outcome.
#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

impl<S> Service<Operation> for MetricsService<S>
where
    S: Service<Operation, Response = OperationResponse, Error = OperationError> + Send,
    S::Future: Send + 'static,
{
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = Pin<Box<dyn Future<Output = Result<OperationResponse, OperationError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let operation = op.ctx.op.name();
        let call_id = op.ctx.call_id;

        let span = info_span!(
            "operation",
            operation = operation,
            call_id = call_id,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(op);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;
                let elapsed = start.elapsed();

                let outcome = match &result {
                    Ok(_) => "ok",
                    Err(OperationError::InvalidArgument(_)) => "invalid_argument",
                    Err(OperationError::Overloaded) => "overloaded",
                };

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = elapsed.as_millis() as u64;
                tracing::Span::current().record("duration_ms", duration_ms);
                tracing::Span::current().record("outcome", outcome);

                metrics::counter!(OPERATIONS_TOTAL, "operation" => operation, "outcome" => outcome)
                    .increment(1);
                metrics::histogram!(OPERATION_DURATION_SECONDS, "operation" => operation)
                    .record(elapsed.as_secs_f64());

                tracing::info!(
                    operation = operation,
                    call_id = call_id,
                    duration_ms = duration_ms,
                    outcome = outcome,
                    "operation complete"
                );

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use calculadora_core::{ArithmeticOp, InvalidArgument, OperationRequest};
    use tower::ServiceExt;

    use super::*;
    use crate::service::domain::CalculatorService;

    #[tokio::test]
    async fn metrics_layer_passes_through_response() {
        let svc = MetricsLayer.layer(CalculatorService);
        let op = Operation::new(42, ArithmeticOp::Add, OperationRequest::new(2.0, 3.0));

        let resp = svc.oneshot(op).await.unwrap();
        assert_eq!(resp, OperationResponse { result: 5.0 });
    }

    #[tokio::test]
    async fn metrics_layer_passes_through_error() {
        let svc = MetricsLayer.layer(CalculatorService);
        let op = Operation::new(7, ArithmeticOp::Divide, OperationRequest::new(1.0, 0.0));

        let err = svc.oneshot(op).await.unwrap_err();
        assert_eq!(
            err,
            OperationError::InvalidArgument(InvalidArgument::DivisionByZero)
        );
    }
}
