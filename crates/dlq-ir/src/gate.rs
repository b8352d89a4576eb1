//! Quantum gate types.
//!
//! The gate set is deliberately small: everything the synthesis pipeline
//! emits decomposes into Hadamards, Pauli-X/Z, swaps, phase rotations and
//! dense register unitaries, with arbitrary control sets attached at the
//! instruction level. Every gate has an explicit dagger so inverse
//! circuits can be emitted gate by gate.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A primitive gate acting on its target qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// Hadamard gate.
    H,
    /// Pauli-X gate.
    X,
    /// Pauli-Z gate.
    Z,
    /// SWAP gate.
    Swap,
    /// Phase gate P(θ) = diag(1, e^{iθ}).
    Phase(f64),
    /// Dense unitary on a register, used for state preparation.
    Unitary(RegisterUnitary),
}

impl Gate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H => "h",
            Gate::X => "x",
            Gate::Z => "z",
            Gate::Swap => "swap",
            Gate::Phase(_) => "p",
            Gate::Unitary(_) => "unitary",
        }
    }

    /// Get the number of target qubits this gate acts on.
    #[inline]
    pub fn num_targets(&self) -> u32 {
        match self {
            Gate::H | Gate::X | Gate::Z | Gate::Phase(_) => 1,
            Gate::Swap => 2,
            Gate::Unitary(u) => u.num_targets,
        }
    }

    /// The inverse gate.
    pub fn dagger(&self) -> Gate {
        match self {
            Gate::H | Gate::X | Gate::Z | Gate::Swap => self.clone(),
            Gate::Phase(theta) => Gate::Phase(-theta),
            Gate::Unitary(u) => Gate::Unitary(u.dagger()),
        }
    }

    /// True if the gate is its own inverse.
    pub fn is_self_inverse(&self) -> bool {
        matches!(self, Gate::H | Gate::X | Gate::Z | Gate::Swap)
    }
}

/// A dense unitary matrix acting on a whole register.
///
/// The matrix is row-major with dimension 2^num_targets. Basis states are
/// indexed with the first target qubit as the least-significant bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterUnitary {
    /// The number of target qubits.
    pub num_targets: u32,
    /// Row-major matrix, `dim * dim` entries where `dim = 2^num_targets`.
    pub matrix: Vec<Complex64>,
}

impl RegisterUnitary {
    /// Create a register unitary.
    ///
    /// # Panics
    ///
    /// Panics if `matrix.len()` does not equal `(2^num_targets)^2`.
    pub fn new(num_targets: u32, matrix: Vec<Complex64>) -> Self {
        let dim = 1usize << num_targets;
        assert_eq!(
            matrix.len(),
            dim * dim,
            "Matrix length {} does not match expected {} for {}-qubit unitary",
            matrix.len(),
            dim * dim,
            num_targets,
        );
        Self {
            num_targets,
            matrix,
        }
    }

    /// Matrix dimension (2^num_targets).
    #[inline]
    pub fn dim(&self) -> usize {
        1 << self.num_targets
    }

    /// The conjugate transpose.
    pub fn dagger(&self) -> RegisterUnitary {
        let dim = self.dim();
        let mut out = vec![Complex64::new(0.0, 0.0); dim * dim];
        for row in 0..dim {
            for col in 0..dim {
                out[col * dim + row] = self.matrix[row * dim + col].conj();
            }
        }
        RegisterUnitary {
            num_targets: self.num_targets,
            matrix: out,
        }
    }
}
