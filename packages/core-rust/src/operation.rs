//! Arithmetic dispatch over the closed set of supported operations.
//!
//! Callers that know the operation up front (the HTTP handlers) pick an
//! [`ArithmeticOp`] variant directly and can only fail on the operands (a zero
//! divisor or a result that overflows).
//! Callers holding a name go through [`dispatch`], which additionally rejects
//! names outside the supported set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidArgument;

/// One of the four supported arithmetic operations.
///
/// The wire name (`soma`, `subtracao`, `multiplicacao`, `divisao`) is also the
/// last path segment of the corresponding HTTP endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    #[serde(rename = "soma")]
    Add,
    #[serde(rename = "subtracao")]
    Subtract,
    #[serde(rename = "multiplicacao")]
    Multiply,
    #[serde(rename = "divisao")]
    Divide,
}

impl ArithmeticOp {
    /// All operations, in endpoint registration order.
    pub const ALL: [ArithmeticOp; 4] = [
        ArithmeticOp::Add,
        ArithmeticOp::Subtract,
        ArithmeticOp::Multiply,
        ArithmeticOp::Divide,
    ];

    /// Returns the wire name of this operation.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "soma",
            ArithmeticOp::Subtract => "subtracao",
            ArithmeticOp::Multiply => "multiplicacao",
            ArithmeticOp::Divide => "divisao",
        }
    }

    /// Applies the operation to two operands.
    ///
    /// The zero check is an exact float comparison, so both `0.0` and `-0.0`
    /// are rejected and tiny non-zero divisors are accepted. A successful
    /// result is always finite.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::DivisionByZero`] when dividing by zero, and
    /// [`InvalidArgument::ResultOutOfRange`] when the result is not finite.
    #[allow(clippy::float_cmp)]
    pub fn apply(self, param1: f64, param2: f64) -> Result<f64, InvalidArgument> {
        let result = match self {
            ArithmeticOp::Add => param1 + param2,
            ArithmeticOp::Subtract => param1 - param2,
            ArithmeticOp::Multiply => param1 * param2,
            ArithmeticOp::Divide => {
                if param2 == 0.0 {
                    return Err(InvalidArgument::DivisionByZero);
                }
                param1 / param2
            }
        };

        if result.is_finite() {
            Ok(result)
        } else {
            Err(InvalidArgument::ResultOutOfRange)
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArithmeticOp {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArithmeticOp::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| InvalidArgument::UnknownOperation {
                name: s.to_string(),
            })
    }
}

/// Resolves `name` to an operation and applies it.
///
/// # Errors
///
/// Returns [`InvalidArgument::UnknownOperation`] for names outside the
/// supported set, otherwise whatever [`ArithmeticOp::apply`] returns.
pub fn dispatch(name: &str, param1: f64, param2: f64) -> Result<f64, InvalidArgument> {
    name.parse::<ArithmeticOp>()?.apply(param1, param2)
}
