//! HTTP handler definitions for the Calculadora server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod health;
pub mod metrics;
pub mod operation;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use metrics::metrics_handler;
pub use operation::{divisao_handler, multiplicacao_handler, soma_handler, subtracao_handler};

use std::sync::Arc;
use std::time::Instant;

use calculadora_core::{ArithmeticOp, OperationRequest};
use metrics_exporter_prometheus::PrometheusHandle;

use super::ShutdownController;
use crate::service::{CallIdGenerator, Operation, OperationPipeline};

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Every field is an `Arc` or a cheaply cloneable handle.
#[derive(Clone)]
pub struct AppState {
    /// Load-shed -> metrics -> retry -> calculator service stack.
    pub pipeline: OperationPipeline,
    /// Source of per-operation call IDs.
    pub call_ids: Arc<CallIdGenerator>,
    /// Health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    /// Prometheus recorder handle, when one is installed.
    pub metrics: Option<PrometheusHandle>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Builds an [`Operation`] with a fresh call ID.
    #[must_use]
    pub fn operation(&self, op: ArithmeticOp, request: OperationRequest) -> Operation {
        Operation::new(self.call_ids.next_id(), op, request)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::service::{build_operation_pipeline, ServerConfig};

    pub(crate) fn test_state() -> AppState {
        AppState {
            pipeline: build_operation_pipeline(&ServerConfig::default()),
            call_ids: Arc::new(CallIdGenerator::new()),
            shutdown: Arc::new(ShutdownController::new()),
            metrics: None,
            start_time: Instant::now(),
        }
    }
}
