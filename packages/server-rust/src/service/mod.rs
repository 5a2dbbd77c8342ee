//! Operation execution framework.
//!
//! This module implements the service-oriented operation pipeline:
//!
//! 1. **Operations** (`operation`): typed `Operation` values built by the HTTP handlers
//! 2. **Domain service** (`domain`): the calculator dispatcher as a `tower::Service`
//! 3. **Retry** (`retry`): the bounded retry policy used by the pipeline and the client
//! 4. **Middleware** (`middleware`): Tower layers (load-shedding, metrics, retry)

pub mod config;
pub mod domain;
pub mod middleware;
pub mod operation;
pub mod retry;

// Re-export key types for convenient access.
pub use config::ServerConfig;
pub use domain::CalculatorService;
pub use middleware::{build_operation_pipeline, OperationPipeline};
pub use operation::{CallIdGenerator, Operation, OperationContext, OperationError};
pub use retry::{Backoff, RetryPolicy};
