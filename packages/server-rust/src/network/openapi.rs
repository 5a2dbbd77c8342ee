//! `OpenAPI` document for the operation endpoints.

use axum::Json;
use calculadora_core::{OperationRequest, OperationResponse};
use utoipa::OpenApi;

use super::error::ErrorBody;
use super::handlers::operation;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Calculadora",
        description = "Basic arithmetic over HTTP with server-side retry"
    ),
    paths(
        operation::soma_handler,
        operation::subtracao_handler,
        operation::multiplicacao_handler,
        operation::divisao_handler,
    ),
    components(schemas(OperationRequest, OperationResponse, ErrorBody)),
    tags((name = "operation", description = "Arithmetic operations"))
)]
pub struct ApiDoc;

/// Serves the generated document at `/api-docs/openapi.json`.
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
