//! Error types for circuit synthesis.

use dlq_ir::IrError;
use thiserror::Error;

/// Errors raised while synthesising a circuit from a DLQ program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SynthError {
    /// A register name is defined more than once.
    #[error("Synthesis error at line {line}: \"{name}\" is already defined")]
    AlreadyDefined { line: usize, name: String },

    /// An expression references an undefined register.
    #[error("Synthesis error at line {line}: the identifier \"{name}\" is not defined")]
    Undefined { line: usize, name: String },

    /// The amplify terminator targets an undefined register.
    #[error(
        "Synthesis error at line {line}: the target \"{name}\" specified at \
         the amplify terminator is not defined"
    )]
    AmplifyTargetUndefined { line: usize, name: String },

    /// A set value does not fit in the declared register.
    #[error("Synthesis error at line {line}: value {value} does not fit in {size} qubits")]
    SetValueOutOfRange {
        line: usize,
        value: u64,
        size: u32,
    },

    /// A comparison against a negative constant (register values are naturals).
    #[error("Synthesis error at line {line}: comparison with negative constant {value}")]
    NegativeComparisonConstant { line: usize, value: i64 },

    /// Folded constants overflowed during normalisation.
    #[error("Synthesis error at line {line}: constant folding overflows")]
    ConstantOverflow { line: usize },

    /// A set-defined register is too wide for dense state preparation.
    #[error(
        "Synthesis error at line {line}: register \"{name}\" is too wide \
         ({size} qubits) for set-state preparation"
    )]
    SetRegisterTooWide {
        line: usize,
        name: String,
        size: u32,
    },

    /// IR error during circuit emission.
    #[error("Circuit error: {0}")]
    Circuit(#[from] IrError),
}

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;
