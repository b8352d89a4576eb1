//! Error types for the simulator backend.

use thiserror::Error;

/// Errors raised by the statevector simulator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Circuit exceeds the simulator's qubit capacity.
    #[error("Circuit has {got} qubits but the simulator supports at most {max}")]
    CircuitTooLarge { got: usize, max: u32 },
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
