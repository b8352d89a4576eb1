//! Plain-text emitter for rendering circuits.

use std::fmt::Write;

use crate::circuit::Circuit;
use crate::gate::Gate;
use crate::instruction::Instruction;
use crate::qubit::QubitId;

/// Render a circuit as a human-readable gate listing.
pub fn emit(circuit: &Circuit) -> String {
    let mut emitter = Emitter::new(circuit);
    emitter.emit_circuit()
}

struct Emitter<'a> {
    circuit: &'a Circuit,
    output: String,
}

impl<'a> Emitter<'a> {
    fn new(circuit: &'a Circuit) -> Self {
        Self {
            circuit,
            output: String::new(),
        }
    }

    fn emit_circuit(&mut self) -> String {
        let _ = writeln!(
            self.output,
            "circuit {} ({} qubits, {} ops)",
            self.circuit.name(),
            self.circuit.num_qubits(),
            self.circuit.num_instructions(),
        );

        for reg in self.circuit.registers() {
            let _ = writeln!(self.output, "qreg {}[{}];", reg.name, reg.size());
        }
        let ancillas = self
            .circuit
            .qubits()
            .iter()
            .filter(|q| !q.is_register_member())
            .count();
        if ancillas > 0 {
            let _ = writeln!(self.output, "ancilla[{ancillas}];");
        }
        self.output.push('\n');

        for instruction in self.circuit.instructions() {
            self.emit_instruction(instruction);
        }

        std::mem::take(&mut self.output)
    }

    fn emit_instruction(&mut self, instruction: &Instruction) {
        let name = match &instruction.gate {
            Gate::Phase(theta) => format!("p({theta:.4})"),
            Gate::Unitary(u) => format!("unitary[{}]", u.dim()),
            other => other.name().to_string(),
        };

        if instruction.controls.is_empty() {
            let _ = writeln!(self.output, "{name} {};", self.qubit_list(&instruction.targets));
        } else {
            let _ = writeln!(
                self.output,
                "ctrl({}) {name} {};",
                self.qubit_list(&instruction.controls),
                self.qubit_list(&instruction.targets),
            );
        }
    }

    fn qubit_list(&self, qubits: &[QubitId]) -> String {
        qubits
            .iter()
            .map(|id| self.qubit_name(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn qubit_name(&self, id: QubitId) -> String {
        self.circuit
            .qubits()
            .get(id.index())
            .map_or_else(|| id.to_string(), ToString::to_string)
    }
}
