//! Pipeline composition: combines all middleware layers into a single service stack.

use calculadora_core::OperationResponse;
use tower::util::BoxCloneSyncService;
use tower::ServiceBuilder;

use super::load_shed::LoadShedLayer;
use super::metrics::MetricsLayer;
use super::retry::RetryLayer;
use crate::service::config::ServerConfig;
use crate::service::domain::CalculatorService;
use crate::service::operation::{Operation, OperationError};

/// Type-erased, cheaply cloneable operation pipeline shared by all handlers.
pub type OperationPipeline = BoxCloneSyncService<Operation, OperationResponse, OperationError>;

/// Build the operation pipeline by wrapping the `CalculatorService` with middleware layers.
///
/// Layer order (outermost to innermost):
/// 1. `LoadShedLayer` -- reject when overloaded (fail fast before doing any work)
/// 2. `MetricsLayer` -- record timing and outcome, retry delays included
/// 3. `RetryLayer` -- replay failed dispatches per the configured policy
#[must_use]
pub fn build_operation_pipeline(config: &ServerConfig) -> OperationPipeline {
    let svc = ServiceBuilder::new()
        .layer(LoadShedLayer::new(config.max_concurrent_operations))
        .layer(MetricsLayer)
        .layer(RetryLayer::new(config.retry_policy()))
        .service(CalculatorService);
    BoxCloneSyncService::new(svc)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
