//! Operation types flowing through the pipeline.

use std::sync::atomic::{AtomicU64, Ordering};

use calculadora_core::{ArithmeticOp, InvalidArgument, OperationRequest};

/// Context carried with every operation through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationContext {
    /// Process-unique identifier used to correlate log lines of one request.
    pub call_id: u64,
    /// Operation bound by the endpoint that accepted the request.
    pub op: ArithmeticOp,
}

/// A single arithmetic request ready to be dispatched.
///
/// `Clone` so the retry layer can replay it on every attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub ctx: OperationContext,
    pub request: OperationRequest,
}

impl Operation {
    #[must_use]
    pub fn new(call_id: u64, op: ArithmeticOp, request: OperationRequest) -> Self {
        Self {
            ctx: OperationContext { call_id, op },
            request,
        }
    }
}

/// Hands out monotonically increasing call IDs, starting at 1.
#[derive(Debug)]
pub struct CallIdGenerator {
    next: AtomicU64,
}

impl CallIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns the next call ID.
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for CallIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors returned by the operation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    /// The dispatcher rejected the caller's input.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    /// Too many operations in flight; rejected without running.
    #[error("server overloaded, try again later")]
    Overloaded,
}
