//! High-level circuit builder API.
//!
//! The circuit is an append-only instruction list over a set of qubits.
//! Qubits either belong to a named register (declared up front, holding a
//! natural number LSB-first) or are free-standing ancillas added on demand.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{Gate, RegisterUnitary};
use crate::instruction::Instruction;
use crate::qubit::{Qubit, QubitId};

/// A named quantum register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantumRegister {
    /// Register name.
    pub name: String,
    /// Qubits of the register, least-significant bit first.
    pub qubits: Vec<QubitId>,
}

impl QuantumRegister {
    /// Number of qubits in the register.
    pub fn size(&self) -> u32 {
        self.qubits.len() as u32
    }
}

/// A reversible quantum circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Qubits in the circuit.
    qubits: Vec<Qubit>,
    /// Named registers, in declaration order.
    registers: Vec<QuantumRegister>,
    /// The instruction stream, in emission order.
    instructions: Vec<Instruction>,
    /// Counter for generating qubit IDs.
    next_qubit_id: u32,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            registers: vec![],
            instructions: vec![],
            next_qubit_id: 0,
        }
    }

    /// Add a single free-standing qubit (ancilla).
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.next_qubit_id);
        self.next_qubit_id += 1;
        self.qubits.push(Qubit::new(id));
        id
    }

    /// Add a named quantum register with the given number of qubits.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> IrResult<Vec<QubitId>> {
        let name = name.into();
        if size == 0 {
            return Err(IrError::EmptyRegister(name));
        }
        if self.registers.iter().any(|r| r.name == name) {
            return Err(IrError::DuplicateRegister(name));
        }
        let mut ids = vec![];
        for i in 0..size {
            let id = QubitId(self.next_qubit_id);
            self.next_qubit_id += 1;
            self.qubits.push(Qubit::with_register(id, &name, i));
            ids.push(id);
        }
        self.registers.push(QuantumRegister {
            name,
            qubits: ids.clone(),
        });
        Ok(ids)
    }

    // =========================================================================
    // Gate builder methods
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(Gate::H, [qubit]))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(Gate::X, [qubit]))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(Gate::Z, [qubit]))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(Gate::Swap, [q1, q2]))
    }

    /// Apply phase gate P(θ).
    pub fn p(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(Gate::Phase(theta), [qubit]))
    }

    /// Apply CNOT (controlled-X) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::controlled(Gate::X, [control], [target]))
    }

    /// Apply multi-controlled X gate.
    pub fn mcx(&mut self, controls: &[QubitId], target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::controlled(
            Gate::X,
            controls.iter().copied(),
            [target],
        ))
    }

    /// Apply multi-controlled Z gate.
    pub fn mcz(&mut self, controls: &[QubitId], target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::controlled(
            Gate::Z,
            controls.iter().copied(),
            [target],
        ))
    }

    /// Apply controlled phase gate.
    pub fn cp(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::controlled(
            Gate::Phase(theta),
            [control],
            [target],
        ))
    }

    /// Apply multi-controlled phase gate.
    pub fn mcp(&mut self, theta: f64, controls: &[QubitId], target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::controlled(
            Gate::Phase(theta),
            controls.iter().copied(),
            [target],
        ))
    }

    /// Apply a dense unitary to a register's qubits.
    pub fn unitary(&mut self, unitary: RegisterUnitary, targets: &[QubitId]) -> IrResult<&mut Self> {
        self.append(Instruction::gate(
            Gate::Unitary(unitary),
            targets.iter().copied(),
        ))
    }

    /// Append an instruction, validating its operands.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        let expected = instruction.gate.num_targets();
        let got = instruction.targets.len() as u32;
        if expected != got {
            return Err(IrError::TargetCountMismatch {
                gate_name: instruction.name().to_string(),
                expected,
                got,
            });
        }
        let mut seen = Vec::with_capacity(instruction.controls.len() + instruction.targets.len());
        for qubit in instruction.operands() {
            if qubit.0 >= self.next_qubit_id {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: instruction.name().to_string(),
                });
            }
            if seen.contains(&qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: instruction.name().to_string(),
                });
            }
            seen.push(qubit);
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Get the number of instructions.
    pub fn num_instructions(&self) -> usize {
        self.instructions.len()
    }

    /// Get the qubits in the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Get the instruction stream.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Get the named registers, in declaration order.
    pub fn registers(&self) -> &[QuantumRegister] {
        &self.registers
    }

    /// Look up a register by name.
    pub fn register(&self, name: &str) -> Option<&QuantumRegister> {
        self.registers.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_instructions(), 0);
    }

    #[test]
    fn test_add_registers() {
        let mut circuit = Circuit::new("test");
        let a = circuit.add_qreg("a", 3).unwrap();
        let b = circuit.add_qreg("b", 2).unwrap();

        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 2);
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.register("a").unwrap().size(), 3);
        assert!(circuit.register("c").is_none());
    }

    #[test]
    fn test_duplicate_register_rejected() {
        let mut circuit = Circuit::new("test");
        circuit.add_qreg("a", 2).unwrap();
        assert!(matches!(
            circuit.add_qreg("a", 2),
            Err(IrError::DuplicateRegister(_))
        ));
    }

    #[test]
    fn test_empty_register_rejected() {
        let mut circuit = Circuit::new("test");
        assert!(matches!(
            circuit.add_qreg("a", 0),
            Err(IrError::EmptyRegister(_))
        ));
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::new("test");
        let q = circuit.add_qreg("q", 2).unwrap();
        circuit
            .h(q[0])
            .unwrap()
            .cx(q[0], q[1])
            .unwrap()
            .p(0.5, q[1])
            .unwrap();

        assert_eq!(circuit.num_instructions(), 3);
        assert_eq!(circuit.instructions()[1].num_controls(), 1);
    }

    #[test]
    fn test_unknown_qubit_rejected() {
        let mut circuit = Circuit::new("test");
        circuit.add_qreg("q", 1).unwrap();
        assert!(matches!(
            circuit.h(QubitId(5)),
            Err(IrError::QubitNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_operand_rejected() {
        let mut circuit = Circuit::new("test");
        let q = circuit.add_qreg("q", 2).unwrap();
        assert!(matches!(
            circuit.cx(q[0], q[0]),
            Err(IrError::DuplicateQubit { .. })
        ));
    }

    #[test]
    fn test_ancillas_are_free_standing() {
        let mut circuit = Circuit::new("test");
        circuit.add_qreg("q", 2).unwrap();
        let anc = circuit.add_qubit();
        assert_eq!(anc, QubitId(2));
        assert!(!circuit.qubits()[2].is_register_member());
    }

    #[test]
    fn test_unitary_append() {
        let mut circuit = Circuit::new("test");
        let q = circuit.add_qreg("q", 1).unwrap();
        let u = RegisterUnitary::new(
            1,
            vec![
                Complex64::new(0.0, 0.0),
                Complex64::new(1.0, 0.0),
                Complex64::new(1.0, 0.0),
                Complex64::new(0.0, 0.0),
            ],
        );
        circuit.unitary(u, &q).unwrap();
        assert_eq!(circuit.instructions()[0].name(), "unitary");
    }
}
