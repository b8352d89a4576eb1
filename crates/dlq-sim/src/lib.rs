//! DLQ local simulator backend.
//!
//! A dense statevector simulator for the circuits emitted by the
//! synthesis pipeline: gates with arbitrary control sets, dense register
//! unitaries for set-state preparation, shot sampling, and frequency
//! tables marginalised onto the named registers (ancillas are not
//! measured).
//!
//! ```rust
//! use dlq_ir::Circuit;
//! use dlq_sim::{FrequencyTable, Simulator};
//!
//! let mut circuit = Circuit::new("coin");
//! let q = circuit.add_qreg("q", 1).unwrap();
//! circuit.h(q[0]).unwrap();
//!
//! let result = Simulator::new().run(&circuit, 100).unwrap();
//! let table = FrequencyTable::from_counts(&result, &circuit);
//! assert_eq!(table.registers, vec!["q"]);
//! ```

pub mod error;
pub mod result;
pub mod simulator;
pub mod statevector;

pub use error::{SimError, SimResult};
pub use result::{FrequencyRow, FrequencyTable};
pub use simulator::{RunResult, Simulator};
pub use statevector::Statevector;
