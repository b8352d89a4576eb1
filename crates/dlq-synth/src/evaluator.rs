//! The quantum evaluator: ancilla pool, register environment and the
//! top-level synthesis pipeline.
//!
//! [`Synthesizer::build_all`] drives the whole pipeline: named registers
//! are created, set registers get their superposition preparation,
//! expression definitions are normalised (pre-build), built, and added
//! into their registers, the amplify terminator runs its Grover
//! iterations, and a final reverse pass uncomputes every expression so
//! all ancillas return to the pool clean. The assignments themselves
//! survive the reverse pass so the registers can be measured.

use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use dlq_ir::{Circuit, QubitId};
use dlq_lang::ast::{Definition, ExpressionDef, Program, SetDef};

use crate::check::check_program;
use crate::error::{SynthError, SynthResult};
use crate::expr::{Node, lower};
use crate::qunits;

/// Widest register a set definition may declare: the dense preparation
/// unitary has 4^n entries.
pub const MAX_SET_STATE_QUBITS: u32 = 10;

/// LIFO pool of scratch qubits.
///
/// Because every `reverse` walk releases qubits in the exact mirror order
/// of its `build` walk, popping from the top of the free stack always
/// re-hands the same qubits for the same allocation site, which keeps the
/// gate streams of repeated Grover iterations aligned.
#[derive(Debug, Default)]
pub struct AncillaPool {
    free: Vec<QubitId>,
    total: usize,
    outstanding: usize,
}

impl AncillaPool {
    fn alloc(&mut self, circuit: &mut Circuit) -> QubitId {
        self.outstanding += 1;
        match self.free.pop() {
            Some(q) => q,
            None => {
                self.total += 1;
                circuit.add_qubit()
            }
        }
    }

    fn release(&mut self, qubit: QubitId) {
        debug_assert!(self.outstanding > 0, "freeing more ancillas than allocated");
        self.outstanding -= 1;
        self.free.push(qubit);
    }

    /// Qubits currently handed out.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Qubits ever created for the pool.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Qubits currently free.
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

/// A built expression definition, kept for the Grover unwind/rebuild and
/// the final reverse pass.
struct BuiltDef {
    def: ExpressionDef,
    node: Node,
}

/// The quantum evaluator.
#[derive(Debug)]
pub struct Synthesizer {
    program: Program,
    circuit: Circuit,
    registers: FxHashMap<String, Vec<QubitId>>,
    pool: AncillaPool,
}

impl Synthesizer {
    /// Run the definition checks and set up the named registers.
    pub fn new(program: Program) -> SynthResult<Self> {
        check_program(&program)?;

        let mut circuit = Circuit::new("dlq");
        let mut registers = FxHashMap::default();
        for def in &program.definitions {
            let qubits = circuit.add_qreg(def.name(), def.size())?;
            registers.insert(def.name().to_string(), qubits);
        }

        Ok(Self {
            program,
            circuit,
            registers,
            pool: AncillaPool::default(),
        })
    }

    /// Size of a named register, if defined.
    pub fn register_size(&self, name: &str) -> Option<u32> {
        self.registers.get(name).map(|q| q.len() as u32)
    }

    /// Qubits of a named register, if defined.
    pub fn register_qubits(&self, name: &str) -> Option<&[QubitId]> {
        self.registers.get(name).map(Vec::as_slice)
    }

    /// The circuit built so far.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Consume the evaluator, returning the finished circuit.
    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    /// Ancilla pool statistics.
    pub fn pool(&self) -> &AncillaPool {
        &self.pool
    }

    pub(crate) fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }

    /// Take a free qubit from the pool, growing the circuit when empty.
    pub(crate) fn alloc_ancilla(&mut self) -> QubitId {
        self.pool.alloc(&mut self.circuit)
    }

    /// Take several ancillas at once.
    pub(crate) fn alloc_ancillas(&mut self, n: u32) -> Vec<QubitId> {
        (0..n).map(|_| self.alloc_ancilla()).collect()
    }

    /// Return a clean qubit to the pool.
    pub(crate) fn free_ancilla(&mut self, qubit: QubitId) {
        self.pool.release(qubit);
    }

    /// Execute the full synthesis pipeline.
    #[instrument(skip(self))]
    pub fn build_all(&mut self) -> SynthResult<()> {
        let program = self.program.clone();

        // Superposition preparations for set-defined registers.
        for def in &program.definitions {
            if let Definition::Set(set) = def {
                self.prepare_set(set)?;
            }
        }

        // Pre-build, build, and assign every expression definition.
        let mut built = Vec::new();
        for def in &program.definitions {
            if let Definition::Expression(xdef) = def {
                debug!(line = xdef.line, register = %xdef.name, "building definition");
                let mut node = lower(&xdef.expr, self)?;
                if node.needs_result_allocation() {
                    node.alloc_result(self);
                }
                if !node.is_register() {
                    node.build(self)?;
                }
                self.assign(&mut node, &xdef.name)?;
                built.push(BuiltDef {
                    def: xdef.clone(),
                    node,
                });
            }
        }

        // Terminator.
        self.amplify(&program, &mut built)?;

        // Final reverse pass: uncompute every expression (the assignments
        // persist) and return all scratch qubits to the pool.
        for b in built.iter_mut().rev() {
            if !b.node.is_register() {
                b.node.reverse(self)?;
            }
            if b.node.needs_result_allocation() {
                b.node.release_result(self);
            }
            b.node.release_aux(self);
        }

        debug!(
            qubits = self.circuit.num_qubits(),
            ops = self.circuit.num_instructions(),
            ancillas = self.pool.total(),
            "synthesis complete"
        );
        Ok(())
    }

    fn prepare_set(&mut self, def: &SetDef) -> SynthResult<()> {
        if def.size > MAX_SET_STATE_QUBITS {
            return Err(SynthError::SetRegisterTooWide {
                line: def.line,
                name: def.name.clone(),
                size: def.size,
            });
        }
        let limit = 1u64 << def.size;
        for &v in &def.values {
            if v >= limit {
                return Err(SynthError::SetValueOutOfRange {
                    line: def.line,
                    value: v,
                    size: def.size,
                });
            }
        }

        let reg = self.registers[&def.name].clone();
        qunits::prepare_set_state(&mut self.circuit, &reg, &def.values)?;
        Ok(())
    }

    /// `target += node.result`: assignment is addition into the
    /// zero-initialised register.
    fn assign(&mut self, node: &mut Node, target: &str) -> SynthResult<()> {
        let tgt = self.registers[target].clone();
        let src = node.result_qubits().to_vec();
        qunits::add_register(&mut self.circuit, &src, &tgt)?;
        Ok(())
    }

    /// The inverse assignment, used inside the Grover unwind.
    fn unassign(&mut self, node: &mut Node, target: &str) -> SynthResult<()> {
        let tgt = self.registers[target].clone();
        let src = node.result_qubits().to_vec();
        qunits::add_register_dg(&mut self.circuit, &src, &tgt)?;
        Ok(())
    }

    /// Grover amplitude amplification over the target register.
    ///
    /// With `A` the whole preparation (set preps plus expression
    /// definitions), each iteration applies the oracle (Z on the target's
    /// top bit), then `A†`, a reflection about |0…0⟩ on the named
    /// registers, and `A` again. Ancillas are clean at every reflection.
    #[instrument(skip_all, fields(iterations = program.terminator.iterations))]
    fn amplify(&mut self, program: &Program, built: &mut [BuiltDef]) -> SynthResult<()> {
        let amp = &program.terminator;
        if amp.iterations == 0 {
            return Ok(());
        }

        let target = self
            .registers
            .get(&amp.target)
            .cloned()
            .ok_or_else(|| SynthError::AmplifyTargetUndefined {
                line: amp.line,
                name: amp.target.clone(),
            })?;
        let oracle_bit = *target.last().expect("registers are never empty");

        // Every named-register qubit participates in the zero reflection.
        let reflect: Vec<QubitId> = self
            .circuit
            .registers()
            .iter()
            .flat_map(|r| r.qubits.clone())
            .collect();

        for iteration in 0..amp.iterations {
            debug!(iteration, "amplify iteration");

            // Oracle: phase-flip the states where the predicate holds.
            self.circuit.z(oracle_bit)?;

            // Unwind the preparation.
            for b in built.iter_mut().rev() {
                self.unassign(&mut b.node, &b.def.name)?;
                if !b.node.is_register() {
                    b.node.reverse(self)?;
                }
                if b.node.needs_result_allocation() {
                    b.node.release_result(self);
                }
            }
            for def in program.definitions.iter().rev() {
                if let Definition::Set(set) = def {
                    let reg = self.registers[&set.name].clone();
                    qunits::prepare_set_state_dg(&mut self.circuit, &reg, &set.values)?;
                }
            }

            // Reflection about |0…0⟩.
            for &q in &reflect {
                self.circuit.x(q)?;
            }
            let (&last, rest) = reflect.split_last().expect("circuit has registers");
            self.circuit.mcz(rest, last)?;
            for &q in reflect.iter().rev() {
                self.circuit.x(q)?;
            }

            // Rebuild the preparation.
            for def in &program.definitions {
                if let Definition::Set(set) = def {
                    let reg = self.registers[&set.name].clone();
                    qunits::prepare_set_state(&mut self.circuit, &reg, &set.values)?;
                }
            }
            for b in built.iter_mut() {
                if b.node.needs_result_allocation() {
                    b.node.alloc_result(self);
                }
                if !b.node.is_register() {
                    b.node.build(self)?;
                }
                self.assign(&mut b.node, &b.def.name)?;
            }
        }
        Ok(())
    }
}
