//! DLQ circuit synthesis.
//!
//! Translates a parsed DLQ program into a reversible quantum circuit: a
//! quantum-units library of primitive sub-circuits with explicit daggers,
//! a pre-build normalisation pass over the expression tree, and an
//! evaluator owning the ancilla pool and the named-register environment.
//!
//! The central invariant is a conservation law on scratch qubits: every
//! ancilla handed out by the pool during `build` is returned clean during
//! `reverse`, which emits the exact gate-mirror of the forward walk. The
//! Grover `amplify` terminator exploits that reversibility to unwind and
//! rebuild the whole preparation inside each iteration.
//!
//! ```rust
//! use dlq_lang::parse;
//! use dlq_synth::Synthesizer;
//!
//! let program = parse("a[2] in {0, 1, 2, 3};\nr[1] := a = 2;\namplify r 1 times").unwrap();
//! let mut synth = Synthesizer::new(program).unwrap();
//! synth.build_all().unwrap();
//!
//! assert_eq!(synth.pool().outstanding(), 0);
//! let circuit = synth.into_circuit();
//! assert!(circuit.num_instructions() > 0);
//! ```

pub mod bits;
pub mod check;
pub mod error;
pub mod evaluator;
mod expr;
pub mod qunits;

pub use check::check_program;
pub use error::{SynthError, SynthResult};
pub use evaluator::{AncillaPool, MAX_SET_STATE_QUBITS, Synthesizer};
