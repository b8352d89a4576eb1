//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit not found in circuit.
    #[error("Qubit {qubit:?} not found in circuit (gate: {gate_name})")]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Gate name for context.
        gate_name: String,
    },

    /// The same qubit appears twice among an instruction's operands.
    #[error("Duplicate qubit {qubit:?} in operation (gate: {gate_name})")]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Gate name for context.
        gate_name: String,
    },

    /// Gate requires a different number of target qubits.
    #[error("Gate '{gate_name}' requires {expected} target qubits, got {got}")]
    TargetCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of targets.
        expected: u32,
        /// Actual number of targets provided.
        got: u32,
    },

    /// A register with this name already exists.
    #[error("Register '{0}' already exists in circuit")]
    DuplicateRegister(String),

    /// Register not found.
    #[error("Register '{0}' not found in circuit")]
    RegisterNotFound(String),

    /// Register size must be positive.
    #[error("Register '{0}' must have at least one qubit")]
    EmptyRegister(String),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
