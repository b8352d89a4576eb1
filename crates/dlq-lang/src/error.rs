//! Error types for the DLQ frontend.

use thiserror::Error;

/// Errors raised while scanning or parsing DLQ source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Illegal character seen by the scanner.
    #[error("Lexical error at line {line}: illegal character '{text}'")]
    Lexical { line: usize, text: String },

    /// Unexpected token.
    #[error("Parsing error at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Parsing error at end of input: expected {0}")]
    UnexpectedEof(String),

    /// Division applied to a non-constant operand.
    #[error("Parsing error at line {line}: '/' can only be applied to constant values")]
    NonConstantDivision { line: usize },

    /// Division by a constant zero.
    #[error("Parsing error at line {line}: division by zero")]
    DivisionByZero { line: usize },

    /// Power with a non-constant exponent.
    #[error("Parsing error at line {line}: '^' requires a constant exponent")]
    NonConstantExponent { line: usize },

    /// Power with a negative exponent.
    #[error("Parsing error at line {line}: '^' requires a non-negative exponent")]
    NegativeExponent { line: usize },

    /// Constant folding overflowed.
    #[error("Parsing error at line {line}: constant expression overflows")]
    ConstantOverflow { line: usize },

    /// Register declared with size zero.
    #[error("Parsing error at line {line}: register size must be greater than 0")]
    RegisterSizeNotPositive { line: usize },

    /// Bare identifier or constant on the right-hand side of `:=`.
    #[error(
        "Parsing error at line {line}: the right-hand side of ':=' must be a \
         logical, arithmetic or relational expression, not a bare identifier \
         or constant"
    )]
    DirectAssignment { line: usize },

    /// Set definition with a non-constant element.
    #[error("Parsing error at line {line}: a set must contain only constant values")]
    NonConstantSetValue { line: usize },

    /// Set definition with a negative element.
    #[error("Parsing error at line {line}: set values must be non-negative")]
    NegativeSetValue { line: usize },
}

/// Result type for frontend operations.
pub type ParseResult<T> = Result<T, ParseError>;
