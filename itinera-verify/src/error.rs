//! Error types raised while parsing and evaluating expressions.

use thiserror::Error;

/// Errors raised by [`Expression`](crate::Expression) parsing and evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// The expression text does not follow the grammar.
    #[error("syntax error at column {column}: {message}")]
    Syntax {
        /// One-based column of the offending input.
        column: usize,
        /// Parser diagnostic.
        message: String,
    },
    /// A numeric literal could not be represented.
    #[error("invalid number literal {literal:?}")]
    InvalidNumber {
        /// Literal text.
        literal: String,
    },
    /// The expression names a concept the itinerary does not define.
    #[error("unknown concept {name:?}")]
    UnknownConcept {
        /// Concept name.
        name: String,
    },
    /// The expression calls a function that does not exist.
    #[error("unknown function {name:?}")]
    UnknownFunction {
        /// Function name.
        name: String,
    },
    /// A function was called with the wrong number of arguments.
    #[error("{function} expects {expected} argument(s), got {found}")]
    Arity {
        /// Function name.
        function: &'static str,
        /// Accepted argument count.
        expected: &'static str,
        /// Supplied argument count.
        found: usize,
    },
    /// A binary operator was applied to incompatible values.
    #[error("cannot apply {operator} to {left} and {right}")]
    TypeMismatch {
        /// Operator symbol.
        operator: &'static str,
        /// Kind of the left operand.
        left: &'static str,
        /// Kind of the right operand.
        right: &'static str,
    },
    /// A unary operator or function was applied to an unsupported value.
    #[error("cannot apply {operator} to {operand}")]
    OperandMismatch {
        /// Operator symbol or function name.
        operator: &'static str,
        /// Kind of the operand.
        operand: &'static str,
    },
    /// A division had a zero divisor.
    #[error("division by zero")]
    DivisionByZero,
    /// The expression evaluated to a value of the wrong kind.
    #[error("expected a {expected} result, got {found}")]
    ResultType {
        /// Required kind.
        expected: &'static str,
        /// Kind produced.
        found: &'static str,
    },
}
