//! Simulator backend implementation.

use rand::Rng;
use rustc_hash::FxHashMap;
use std::time::Instant;
use tracing::{debug, instrument};

use dlq_ir::Circuit;

use crate::error::{SimError, SimResult};
use crate::statevector::Statevector;

/// Local statevector simulator.
///
/// Supports circuits up to ~22 qubits (limited by memory). The circuit is
/// evolved once and the final distribution is sampled per shot.
pub struct Simulator {
    /// Maximum number of qubits supported.
    max_qubits: u32,
}

/// Raw simulation outcome: full-basis-state counts.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Counts per measured basis state (all qubits, LSB = qubit 0).
    pub counts: FxHashMap<u64, u32>,
    /// Number of shots taken.
    pub shots: u32,
    /// Number of qubits in the simulated circuit.
    pub num_qubits: usize,
}

impl Simulator {
    /// Create a simulator with default settings.
    pub fn new() -> Self {
        Self { max_qubits: 22 }
    }

    /// Create a simulator with a custom qubit limit.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self { max_qubits }
    }

    /// Simulate the circuit and sample `shots` measurement outcomes.
    #[instrument(skip(self, circuit))]
    pub fn run(&self, circuit: &Circuit, shots: u32) -> SimResult<RunResult> {
        let num_qubits = circuit.num_qubits();
        if num_qubits > self.max_qubits as usize {
            return Err(SimError::CircuitTooLarge {
                got: num_qubits,
                max: self.max_qubits,
            });
        }

        let start = Instant::now();
        debug!(
            qubits = num_qubits,
            ops = circuit.num_instructions(),
            shots,
            "starting simulation"
        );

        let mut sv = Statevector::new(num_qubits);
        for inst in circuit.instructions() {
            sv.apply(inst);
        }

        let probabilities = sv.probabilities();
        let mut counts: FxHashMap<u64, u32> = FxHashMap::default();
        let mut rng = rand::thread_rng();
        for _ in 0..shots {
            let outcome = sample(&probabilities, rng.r#gen());
            *counts.entry(outcome as u64).or_insert(0) += 1;
        }

        debug!(elapsed = ?start.elapsed(), outcomes = counts.len(), "simulation complete");
        Ok(RunResult {
            counts,
            shots,
            num_qubits,
        })
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample a basis state from the distribution given a uniform draw.
fn sample(probabilities: &[f64], r: f64) -> usize {
    let mut cumulative = 0.0;
    for (i, p) in probabilities.iter().enumerate() {
        cumulative += p;
        if r < cumulative {
            return i;
        }
    }
    probabilities.len() - 1
}
