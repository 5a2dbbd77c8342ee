//! The four `/operation/*` endpoints.
//!
//! Each handler binds one [`ArithmeticOp`] and maps the JSON body onto an
//! [`Operation`](crate::service::Operation) for the shared pipeline. Malformed
//! bodies are rejected before anything is dispatched.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use calculadora_core::{ArithmeticOp, OperationRequest, OperationResponse};
use tower::ServiceExt;

use super::AppState;
use crate::network::error::{ApiError, ErrorBody};

/// Result type shared by the operation handlers.
pub type OperationResult = Result<Json<OperationResponse>, ApiError>;

async fn execute(
    state: AppState,
    op: ArithmeticOp,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> OperationResult {
    let Json(request) = payload?;
    let _in_flight = state.shutdown.in_flight_guard();

    let operation = state.operation(op, request);
    let response = state.pipeline.clone().oneshot(operation).await?;
    Ok(Json(response))
}

/// Adds `param1` and `param2`.
///
/// # Errors
///
/// 400 for a malformed body or an overflowing result, 503 when overloaded.
#[utoipa::path(
    post,
    path = "/operation/soma",
    tag = "operation",
    request_body = OperationRequest,
    responses(
        (status = 200, description = "Sum of the operands", body = OperationResponse),
        (status = 400, description = "Malformed request body or result out of range", body = ErrorBody),
        (status = 503, description = "Too many concurrent operations", body = ErrorBody),
    )
)]
pub async fn soma_handler(
    State(state): State<AppState>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> OperationResult {
    execute(state, ArithmeticOp::Add, payload).await
}

/// Subtracts `param2` from `param1`.
///
/// # Errors
///
/// 400 for a malformed body or an overflowing result, 503 when overloaded.
#[utoipa::path(
    post,
    path = "/operation/subtracao",
    tag = "operation",
    request_body = OperationRequest,
    responses(
        (status = 200, description = "Difference of the operands", body = OperationResponse),
        (status = 400, description = "Malformed request body or result out of range", body = ErrorBody),
        (status = 503, description = "Too many concurrent operations", body = ErrorBody),
    )
)]
pub async fn subtracao_handler(
    State(state): State<AppState>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> OperationResult {
    execute(state, ArithmeticOp::Subtract, payload).await
}

/// Multiplies `param1` by `param2`.
///
/// # Errors
///
/// 400 for a malformed body or an overflowing result, 503 when overloaded.
#[utoipa::path(
    post,
    path = "/operation/multiplicacao",
    tag = "operation",
    request_body = OperationRequest,
    responses(
        (status = 200, description = "Product of the operands", body = OperationResponse),
        (status = 400, description = "Malformed request body or result out of range", body = ErrorBody),
        (status = 503, description = "Too many concurrent operations", body = ErrorBody),
    )
)]
pub async fn multiplicacao_handler(
    State(state): State<AppState>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> OperationResult {
    execute(state, ArithmeticOp::Multiply, payload).await
}

/// Divides `param1` by `param2`.
///
/// A zero `param2` is retried like any other failure, so the 400 arrives
/// after the full retry delay (about 2 s with the default policy).
///
/// # Errors
///
/// 400 for a malformed body, a zero divisor or an overflowing result, 503
/// when overloaded.
#[utoipa::path(
    post,
    path = "/operation/divisao",
    tag = "operation",
    request_body = OperationRequest,
    responses(
        (status = 200, description = "Quotient of the operands", body = OperationResponse),
        (status = 400, description = "Malformed request body, division by zero or result out of range", body = ErrorBody),
        (status = 503, description = "Too many concurrent operations", body = ErrorBody),
    )
)]
pub async fn divisao_handler(
    State(state): State<AppState>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> OperationResult {
    execute(state, ArithmeticOp::Divide, payload).await
}
