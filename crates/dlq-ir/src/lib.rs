//! DLQ Circuit Intermediate Representation
//!
//! This crate provides the core data structures for representing the
//! reversible quantum circuits emitted by the DLQ synthesis pipeline.
//!
//! # Overview
//!
//! A [`Circuit`] is an append-only stream of [`Instruction`]s over a set of
//! qubits. Qubits belong either to a named [`QuantumRegister`] (declared up
//! front, encoding a natural number least-significant bit first) or are
//! free-standing ancillas. Every [`Gate`] carries an explicit dagger, and
//! any instruction may carry an arbitrary control set, which is how
//! multi-controlled operations are expressed.
//!
//! # Example
//!
//! ```rust
//! use dlq_ir::Circuit;
//!
//! let mut circuit = Circuit::new("bell");
//! let q = circuit.add_qreg("q", 2).unwrap();
//! circuit.h(q[0]).unwrap();
//! circuit.cx(q[0], q[1]).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.num_instructions(), 2);
//! ```

pub mod circuit;
pub mod emitter;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::{Circuit, QuantumRegister};
pub use emitter::emit;
pub use error::{IrError, IrResult};
pub use gate::{Gate, RegisterUnitary};
pub use instruction::Instruction;
pub use qubit::{Qubit, QubitId};
