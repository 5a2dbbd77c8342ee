//! Tower middleware layers for the operation pipeline.
//!
//! - [`load_shed`]: Semaphore-based concurrency limiting
//! - [`metrics`]: Operation timing and outcome via `tracing` spans and `metrics`
//! - [`retry`]: Bounded replay of failed operations
//! - [`pipeline`]: Composes all layers around the calculator service

pub mod load_shed;
pub mod metrics;
pub mod pipeline;
pub mod retry;

pub use load_shed::LoadShedLayer;
pub use metrics::MetricsLayer;
pub use pipeline::{build_operation_pipeline, OperationPipeline};
pub use retry::RetryLayer;
