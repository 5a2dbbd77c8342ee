//! Validation failures raised by the arithmetic dispatcher.

/// The single failure kind produced by dispatch: the caller's input is invalid.
///
/// `Display` yields the exact client-visible message, so the HTTP layer can
/// surface it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgument {
    /// Division with a second operand equal to zero (including `-0.0`).
    #[error("Divisão por zero não permitida")]
    DivisionByZero,
    /// The operation name is not one of the four supported operations.
    #[error("Operação inválida")]
    UnknownOperation {
        /// The name that failed to resolve.
        name: String,
    },
    /// Finite operands whose result overflows to an infinity.
    #[error("Resultado fora do intervalo representável")]
    ResultOutOfRange,
}
