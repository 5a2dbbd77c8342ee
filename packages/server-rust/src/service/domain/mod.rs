//! Calculator domain service: the operation dispatcher as a Tower service.

use std::future::{ready, Ready};
use std::task::{Context, Poll};

use calculadora_core::{OperationRequest, OperationResponse};
use tower::Service;
use tracing::debug;

use crate::service::operation::{Operation, OperationError};

/// Computes the arithmetic result of an [`Operation`].
///
/// Stateless and always ready. Fails only with
/// [`OperationError::InvalidArgument`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorService;

impl CalculatorService {
    /// Runs the dispatch for a single operation.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidArgument`] when the dispatcher rejects
    /// the operands.
    pub fn compute(op: &Operation) -> Result<OperationResponse, OperationError> {
        let OperationRequest { param1, param2 } = op.request;
        let result = op.ctx.op.apply(param1, param2)?;
        debug!(
            call_id = op.ctx.call_id,
            operation = op.ctx.op.name(),
            param1,
            param2,
            result,
            "computed"
        );
        Ok(OperationResponse { result })
    }
}

impl Service<Operation> for CalculatorService {
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = Ready<Result<OperationResponse, OperationError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        ready(Self::compute(&op))
    }
}

#[cfg(test)]
mod tests {
    use calculadora_core::{ArithmeticOp, InvalidArgument};
    use tower::ServiceExt;

    use super::*;

    fn make_op(op: ArithmeticOp, param1: f64, param2: f64) -> Operation {
        Operation::new(1, op, OperationRequest::new(param1, param2))
    }

    #[tokio::test]
    async fn computes_each_operation() {
        let cases = [
            (ArithmeticOp::Add, 2.0, 3.0, 5.0),
            (ArithmeticOp::Subtract, 5.0, 9.0, -4.0),
            (ArithmeticOp::Multiply, 4.0, 2.5, 10.0),
            (ArithmeticOp::Divide, 10.0, 2.0, 5.0),
        ];
        for (op, a, b, expected) in cases {
            let resp = CalculatorService.oneshot(make_op(op, a, b)).await.unwrap();
            assert_eq!(resp, OperationResponse { result: expected }, "{op}");
        }
    }

    #[tokio::test]
    async fn division_by_zero_is_invalid_argument() {
        let err = CalculatorService
            .oneshot(make_op(ArithmeticOp::Divide, 10.0, 0.0))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            OperationError::InvalidArgument(InvalidArgument::DivisionByZero)
        );
    }

    #[tokio::test]
    async fn overflow_is_invalid_argument() {
        let err = CalculatorService
            .oneshot(make_op(ArithmeticOp::Add, 1e308, 1e308))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            OperationError::InvalidArgument(InvalidArgument::ResultOutOfRange)
        );
    }
}
