//! JSON bodies of the `/operation/*` endpoints.
//!
//! Field names are part of the public contract and are case-sensitive.
//! Unknown request fields are ignored.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body shared by all four operation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OperationRequest {
    /// First operand.
    #[schema(example = 10.0)]
    pub param1: f64,
    /// Second operand. Must be non-zero for `divisao`.
    #[schema(example = 2.0)]
    pub param2: f64,
}

impl OperationRequest {
    #[must_use]
    pub fn new(param1: f64, param2: f64) -> Self {
        Self { param1, param2 }
    }
}

/// Response body of a successful operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OperationResponse {
    /// Result of the computation.
    #[schema(example = 5.0)]
    pub result: f64,
}
