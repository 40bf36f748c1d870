//! Error types for dualgrad.

use thiserror::Error;

/// Errors raised by the differentiation engines and the computation graph.
///
/// Every failure is a static authoring error in the supplied function or the
/// call site; retrying the same call yields the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdError {
    /// The number of inputs does not match the arity of the function.
    #[error("number of inputs (={actual}) is not consistent with number of function arguments (={expected})")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An operation received an operand it cannot combine with.
    #[error("unsupported operand kind for `{op}`: {kind}")]
    UnsupportedOperandKind { op: &'static str, kind: String },

    /// A multi-output function does not expose its outputs as independent expressions.
    #[error("multi-output parse failure: {0}")]
    MultiOutputParseFailure(String),
}
