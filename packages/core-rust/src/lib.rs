//! Calculadora core: arithmetic dispatch, validation errors, and wire types.

pub mod error;
pub mod messages;
pub mod operation;

pub use error::InvalidArgument;
pub use messages::{OperationRequest, OperationResponse};
pub use operation::{dispatch, ArithmeticOp};
