//! Normalised expression tree and the two-phase build/reverse walk.
//!
//! [`lower`] is the pre-build pass: it rewrites the parsed AST into a
//! normalised tree (parentheses bypassed, powers fused into products,
//! integers folded, signs pushed down into the sign vector, relational
//! modes tagged) and allocates the relational widening ancillas up front,
//! so the later walks never block on the pool.
//!
//! Every node owns a result slot. Register references borrow the host
//! register's qubits and are never allocated, built or released; every
//! other node's result is owned, taken from the ancilla pool in `build`
//! and returned clean in `reverse`. `reverse` emits the exact gate-mirror
//! of `build`, child walks in reverse order, so the composition is the
//! identity and the pool empties in LIFO order.

use dlq_ir::QubitId;
use dlq_lang::ast::{Expr, ExprKind, Operand, Sign};

use crate::bits::{bit_length, ceil_log2};
use crate::error::{SynthError, SynthResult};
use crate::evaluator::Synthesizer;
use crate::qunits;

/// The qubits holding a node's computed value.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    /// Not yet allocated.
    Empty,
    /// The qubits of a named register; never released.
    Borrowed(Vec<QubitId>),
    /// Pool-allocated qubits owned by this node.
    Owned(Vec<QubitId>),
}

impl Slot {
    fn qubits(&self) -> &[QubitId] {
        match self {
            Slot::Empty => panic!("result qubits accessed before allocation"),
            Slot::Borrowed(q) | Slot::Owned(q) => q,
        }
    }
}

/// A normalised expression node.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    result: Slot,
}

/// Normalised node kinds. `Parentheses`, `UnaryMinus` and bare `Power`
/// never survive lowering.
#[derive(Debug)]
pub(crate) enum NodeKind {
    /// A named register reference.
    Register,
    /// `const_factor · Π factorᵢ^exponentᵢ`
    Product {
        factors: Vec<Node>,
        exponents: Vec<u32>,
        const_factor: i64,
    },
    /// `const_term + Σ ±termᵢ`
    Summation {
        terms: Vec<Node>,
        signs: Vec<Sign>,
        const_term: i64,
    },
    /// A relational comparison.
    Compare(CompareNode),
    /// Logical negation of the operand's top bit.
    Not { operand: Box<Node> },
    /// Logical conjunction of the operands' top bits.
    And { operands: Vec<Node> },
    /// Logical disjunction of the operands' top bits.
    Or { operands: Vec<Node> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompareOp {
    Equal,
    NotEqual,
    Less,
    Greater,
}

/// Relational operand mode, tagged during lowering.
#[derive(Debug)]
pub(crate) enum CompareOperands {
    /// register ⋈ register
    RegReg { left: Box<Node>, right: Box<Node> },
    /// register ⋈ constant
    RegConst { reg: Box<Node>, constant: u64 },
    /// constant ⋈ register
    ConstReg { constant: u64, reg: Box<Node> },
}

#[derive(Debug)]
pub(crate) struct CompareNode {
    pub(crate) op: CompareOp,
    pub(crate) operands: CompareOperands,
    /// Widening ancillas, allocated during lowering.
    aux: Vec<QubitId>,
}

// =============================================================================
// Pre-build: lowering the AST into the normalised tree
// =============================================================================

/// Normalise an AST expression, allocating relational ancillas as needed.
pub(crate) fn lower(expr: &Expr, ev: &mut Synthesizer) -> SynthResult<Node> {
    let line = expr.line;
    match &expr.kind {
        ExprKind::Identifier(name) => lower_register(line, name, ev),
        ExprKind::Paren(inner) => lower(inner, ev),
        ExprKind::Neg(_) => {
            let (residual, sign) = peel_sign(expr, Sign::Pos);
            let term = lower(residual, ev)?;
            match sign {
                Sign::Pos => Ok(term),
                Sign::Neg => Ok(Node::new(NodeKind::Summation {
                    terms: vec![term],
                    signs: vec![Sign::Neg],
                    const_term: 0,
                })),
            }
        }
        ExprKind::Power { .. } => {
            let mut const_factor = 1i64;
            let (residual, exponent) = peel_factor(expr, &mut const_factor, line)?;
            let factor = lower(residual, ev)?;
            Ok(Node::new(NodeKind::Product {
                factors: vec![factor],
                exponents: vec![exponent],
                const_factor,
            }))
        }
        ExprKind::Product { operands } => lower_product(line, operands, ev),
        ExprKind::Summation { operands, signs } => lower_summation(line, operands, signs, ev),
        ExprKind::Equal { left, right } => {
            lower_compare(line, CompareOp::Equal, left, right, ev)
        }
        ExprKind::NotEqual { left, right } => {
            lower_compare(line, CompareOp::NotEqual, left, right, ev)
        }
        ExprKind::LessThan { left, right } => {
            lower_compare(line, CompareOp::Less, left, right, ev)
        }
        ExprKind::GreaterThan { left, right } => {
            lower_compare(line, CompareOp::Greater, left, right, ev)
        }
        ExprKind::Not(operand) => Ok(Node::new(NodeKind::Not {
            operand: Box::new(lower(operand, ev)?),
        })),
        ExprKind::And { operands } => Ok(Node::new(NodeKind::And {
            operands: lower_all(operands, ev)?,
        })),
        ExprKind::Or { operands } => Ok(Node::new(NodeKind::Or {
            operands: lower_all(operands, ev)?,
        })),
    }
}

fn lower_all(operands: &[Expr], ev: &mut Synthesizer) -> SynthResult<Vec<Node>> {
    operands.iter().map(|e| lower(e, ev)).collect()
}

fn lower_register(line: usize, name: &str, ev: &mut Synthesizer) -> SynthResult<Node> {
    let qubits = ev
        .register_qubits(name)
        .ok_or_else(|| SynthError::Undefined {
            line,
            name: name.to_string(),
        })?
        .to_vec();
    Ok(Node {
        kind: NodeKind::Register,
        result: Slot::Borrowed(qubits),
    })
}

/// Peel `Parentheses` and `UnaryMinus` layers, flipping the sign per minus.
fn peel_sign<'a>(mut expr: &'a Expr, mut sign: Sign) -> (&'a Expr, Sign) {
    loop {
        match &expr.kind {
            ExprKind::Paren(inner) => expr = inner.as_ref(),
            ExprKind::Neg(inner) => {
                sign = sign.flipped();
                expr = inner.as_ref();
            }
            _ => return (expr, sign),
        }
    }
}

/// Peel `Parentheses`, `Power` and `UnaryMinus` layers from a product
/// factor, accumulating the exponent and folding minus signs into the
/// constant factor.
///
/// The exponent is snapshotted before descending into a power's base, so
/// nested powers multiply correctly; a minus layer under an even
/// accumulated exponent cancels.
fn peel_factor<'a>(
    mut expr: &'a Expr,
    const_factor: &mut i64,
    line: usize,
) -> SynthResult<(&'a Expr, u32)> {
    let mut exponent: u64 = 1;
    loop {
        match &expr.kind {
            ExprKind::Paren(inner) => expr = inner.as_ref(),
            ExprKind::Power {
                base,
                exponent: layer,
            } => {
                exponent = exponent
                    .checked_mul(u64::from(*layer))
                    .ok_or(SynthError::ConstantOverflow { line })?;
                expr = base.as_ref();
            }
            ExprKind::Neg(inner) => {
                if exponent % 2 == 1 {
                    *const_factor = -*const_factor;
                }
                expr = inner.as_ref();
            }
            _ => {
                let exponent =
                    u32::try_from(exponent).map_err(|_| SynthError::ConstantOverflow { line })?;
                return Ok((expr, exponent));
            }
        }
    }
}

fn lower_product(line: usize, operands: &[Operand], ev: &mut Synthesizer) -> SynthResult<Node> {
    let mut const_factor = 1i64;
    let mut factors = Vec::new();
    let mut exponents = Vec::new();

    for operand in operands {
        match operand {
            Operand::Const(c) => {
                const_factor = const_factor
                    .checked_mul(*c)
                    .ok_or(SynthError::ConstantOverflow { line })?;
            }
            Operand::Expr(e) => {
                let (residual, exponent) = peel_factor(e, &mut const_factor, line)?;
                factors.push(lower(residual, ev)?);
                exponents.push(exponent);
            }
        }
    }

    Ok(Node::new(NodeKind::Product {
        factors,
        exponents,
        const_factor,
    }))
}

fn lower_summation(
    line: usize,
    operands: &[Operand],
    signs: &[Sign],
    ev: &mut Synthesizer,
) -> SynthResult<Node> {
    let mut const_term = 0i64;
    let mut terms = Vec::new();
    let mut out_signs = Vec::new();

    for (operand, &sign) in operands.iter().zip(signs.iter()) {
        match operand {
            Operand::Const(c) => {
                const_term = match sign {
                    Sign::Pos => const_term.checked_add(*c),
                    Sign::Neg => const_term.checked_sub(*c),
                }
                .ok_or(SynthError::ConstantOverflow { line })?;
            }
            Operand::Expr(e) => {
                let (residual, sign) = peel_sign(e, sign);
                terms.push(lower(residual, ev)?);
                out_signs.push(sign);
            }
        }
    }

    Ok(Node::new(NodeKind::Summation {
        terms,
        signs: out_signs,
        const_term,
    }))
}

fn lower_compare(
    line: usize,
    op: CompareOp,
    left: &Operand,
    right: &Operand,
    ev: &mut Synthesizer,
) -> SynthResult<Node> {
    let operands = match (left, right) {
        (Operand::Expr(l), Operand::Expr(r)) => CompareOperands::RegReg {
            left: Box::new(lower(l, ev)?),
            right: Box::new(lower(r, ev)?),
        },
        (Operand::Expr(l), Operand::Const(c)) => CompareOperands::RegConst {
            reg: Box::new(lower(l, ev)?),
            constant: comparison_constant(*c, line)?,
        },
        (Operand::Const(c), Operand::Expr(r)) => CompareOperands::ConstReg {
            constant: comparison_constant(*c, line)?,
            reg: Box::new(lower(r, ev)?),
        },
        (Operand::Const(_), Operand::Const(_)) => {
            unreachable!("constant comparisons fold during parsing")
        }
    };

    let aux_count = compare_aux_count(op, &operands);
    let aux = ev.alloc_ancillas(aux_count);

    Ok(Node::new(NodeKind::Compare(CompareNode { op, operands, aux })))
}

fn comparison_constant(c: i64, line: usize) -> SynthResult<u64> {
    u64::try_from(c).map_err(|_| SynthError::NegativeComparisonConstant { line, value: c })
}

/// Number of widening ancillas a comparison needs, from the operand widths.
fn compare_aux_count(op: CompareOp, operands: &CompareOperands) -> u32 {
    match operands {
        CompareOperands::RegReg { left, right } => match op {
            CompareOp::Equal | CompareOp::NotEqual => {
                left.n_result_qubits().abs_diff(right.n_result_qubits())
            }
            // One fresh sign bit.
            CompareOp::Less | CompareOp::Greater => 1,
        },
        CompareOperands::RegConst { reg, constant } => {
            constant_aux_count(op, reg.n_result_qubits(), *constant, false)
        }
        CompareOperands::ConstReg { constant, reg } => {
            constant_aux_count(op, reg.n_result_qubits(), *constant, true)
        }
    }
}

fn constant_aux_count(op: CompareOp, n: u32, constant: u64, flipped: bool) -> u32 {
    match op {
        CompareOp::Equal | CompareOp::NotEqual => bit_length(constant).saturating_sub(n),
        CompareOp::Less | CompareOp::Greater => {
            // `k < reg` runs the greater-than unit and vice versa; the
            // greater-than unit subtracts `k + 1`.
            let greater = (op == CompareOp::Greater) != flipped;
            let subtracted = if greater { constant + 1 } else { constant };
            bit_length(subtracted).saturating_sub(n) + 1
        }
    }
}

// =============================================================================
// Sizing, allocation, build and reverse
// =============================================================================

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            result: Slot::Empty,
        }
    }

    /// True unless this is a register reference, whose result is the
    /// externally owned register itself.
    pub(crate) fn needs_result_allocation(&self) -> bool {
        !self.is_register()
    }

    pub(crate) fn is_register(&self) -> bool {
        matches!(self.kind, NodeKind::Register)
    }

    /// The qubits holding this node's value.
    pub(crate) fn result_qubits(&self) -> &[QubitId] {
        self.result.qubits()
    }

    /// Width of the result register.
    pub(crate) fn n_result_qubits(&self) -> u32 {
        match &self.kind {
            NodeKind::Register => self.result.qubits().len() as u32,
            NodeKind::Product {
                factors,
                exponents,
                const_factor,
            } => {
                let factor_bits: u32 = factors
                    .iter()
                    .zip(exponents.iter())
                    .map(|(f, &e)| f.n_result_qubits() * e)
                    .sum();
                factor_bits + ceil_log2(const_factor.unsigned_abs())
            }
            NodeKind::Summation {
                terms, const_term, ..
            } => {
                let term_bits = terms
                    .iter()
                    .map(|t| t.n_result_qubits() + 1)
                    .max()
                    .unwrap_or(0);
                term_bits.max(ceil_log2(const_term.unsigned_abs()))
            }
            NodeKind::Compare(_)
            | NodeKind::Not { .. }
            | NodeKind::And { .. }
            | NodeKind::Or { .. } => 1,
        }
    }

    /// Take result qubits from the pool.
    pub(crate) fn alloc_result(&mut self, ev: &mut Synthesizer) {
        debug_assert!(matches!(self.result, Slot::Empty));
        let n = self.n_result_qubits();
        self.result = Slot::Owned(ev.alloc_ancillas(n));
    }

    /// Return the (clean) result qubits to the pool, in reverse allocation
    /// order so a later re-allocation hands back the same qubits.
    pub(crate) fn release_result(&mut self, ev: &mut Synthesizer) {
        if let Slot::Owned(qubits) = std::mem::replace(&mut self.result, Slot::Empty) {
            for q in qubits.into_iter().rev() {
                ev.free_ancilla(q);
            }
        }
    }

    /// Emit the forward gates computing this node's value into its result.
    pub(crate) fn build(&mut self, ev: &mut Synthesizer) -> SynthResult<()> {
        let result = self.result.qubits().to_vec();
        match &mut self.kind {
            NodeKind::Register => Ok(()),
            NodeKind::Product {
                factors,
                exponents,
                const_factor,
            } => {
                for factor in factors.iter_mut() {
                    if factor.needs_result_allocation() {
                        factor.alloc_result(ev);
                    }
                    if !factor.is_register() {
                        factor.build(ev)?;
                    }
                }
                let bases: Vec<Vec<QubitId>> = factors
                    .iter()
                    .map(|f| f.result_qubits().to_vec())
                    .collect();
                let base_refs: Vec<&[QubitId]> = bases.iter().map(Vec::as_slice).collect();
                qunits::multiproduct(
                    ev.circuit_mut(),
                    &base_refs,
                    exponents,
                    &result,
                    *const_factor,
                )?;
                Ok(())
            }
            NodeKind::Summation {
                terms,
                signs,
                const_term,
            } => {
                for (term, sign) in terms.iter_mut().zip(signs.iter()) {
                    if term.needs_result_allocation() {
                        term.alloc_result(ev);
                    }
                    if !term.is_register() {
                        term.build(ev)?;
                    }
                    let src = term.result_qubits().to_vec();
                    match sign {
                        Sign::Pos => qunits::add_register(ev.circuit_mut(), &src, &result)?,
                        Sign::Neg => qunits::sub_register(ev.circuit_mut(), &src, &result)?,
                    }
                }
                if *const_term != 0 {
                    qunits::add_const(ev.circuit_mut(), &result, *const_term)?;
                }
                Ok(())
            }
            NodeKind::Compare(compare) => compare.build(ev, result[0]),
            NodeKind::Not { operand } => {
                if operand.needs_result_allocation() {
                    operand.alloc_result(ev);
                }
                if !operand.is_register() {
                    operand.build(ev)?;
                }
                let top = top_bit(operand);
                let out = result[0];
                ev.circuit_mut().cx(top, out)?;
                ev.circuit_mut().x(out)?;
                Ok(())
            }
            NodeKind::And { operands } => {
                let tops = build_logic_operands(operands, ev)?;
                ev.circuit_mut().mcx(&tops, result[0])?;
                Ok(())
            }
            NodeKind::Or { operands } => {
                let tops = build_logic_operands(operands, ev)?;
                for &t in &tops {
                    ev.circuit_mut().x(t)?;
                }
                ev.circuit_mut().mcx(&tops, result[0])?;
                for &t in tops.iter().rev() {
                    ev.circuit_mut().x(t)?;
                }
                ev.circuit_mut().x(result[0])?;
                Ok(())
            }
        }
    }

    /// Emit the exact gate-mirror of [`Node::build`], releasing child
    /// results back to the pool.
    pub(crate) fn reverse(&mut self, ev: &mut Synthesizer) -> SynthResult<()> {
        let result = self.result.qubits().to_vec();
        match &mut self.kind {
            NodeKind::Register => Ok(()),
            NodeKind::Product {
                factors,
                exponents,
                const_factor,
            } => {
                let bases: Vec<Vec<QubitId>> = factors
                    .iter()
                    .map(|f| f.result_qubits().to_vec())
                    .collect();
                let base_refs: Vec<&[QubitId]> = bases.iter().map(Vec::as_slice).collect();
                qunits::multiproduct_dg(
                    ev.circuit_mut(),
                    &base_refs,
                    exponents,
                    &result,
                    *const_factor,
                )?;
                for factor in factors.iter_mut().rev() {
                    if !factor.is_register() {
                        factor.reverse(ev)?;
                    }
                    if factor.needs_result_allocation() {
                        factor.release_result(ev);
                    }
                }
                Ok(())
            }
            NodeKind::Summation {
                terms,
                signs,
                const_term,
            } => {
                if *const_term != 0 {
                    qunits::add_const_dg(ev.circuit_mut(), &result, *const_term)?;
                }
                for (term, sign) in terms.iter_mut().zip(signs.iter()).rev() {
                    let src = term.result_qubits().to_vec();
                    match sign {
                        Sign::Pos => qunits::add_register_dg(ev.circuit_mut(), &src, &result)?,
                        Sign::Neg => qunits::sub_register_dg(ev.circuit_mut(), &src, &result)?,
                    }
                    if !term.is_register() {
                        term.reverse(ev)?;
                    }
                    if term.needs_result_allocation() {
                        term.release_result(ev);
                    }
                }
                Ok(())
            }
            NodeKind::Compare(compare) => compare.reverse(ev, result[0]),
            NodeKind::Not { operand } => {
                let top = top_bit(operand);
                let out = result[0];
                ev.circuit_mut().x(out)?;
                ev.circuit_mut().cx(top, out)?;
                if !operand.is_register() {
                    operand.reverse(ev)?;
                }
                if operand.needs_result_allocation() {
                    operand.release_result(ev);
                }
                Ok(())
            }
            NodeKind::And { operands } => {
                let tops: Vec<QubitId> = operands.iter().map(top_bit).collect();
                ev.circuit_mut().mcx(&tops, result[0])?;
                reverse_logic_operands(operands, ev)?;
                Ok(())
            }
            NodeKind::Or { operands } => {
                let tops: Vec<QubitId> = operands.iter().map(top_bit).collect();
                ev.circuit_mut().x(result[0])?;
                for &t in &tops {
                    ev.circuit_mut().x(t)?;
                }
                ev.circuit_mut().mcx(&tops, result[0])?;
                for &t in tops.iter().rev() {
                    ev.circuit_mut().x(t)?;
                }
                reverse_logic_operands(operands, ev)?;
                Ok(())
            }
        }
    }

    /// Return the relational ancillas to the pool, mirroring the order the
    /// lowering pass allocated them.
    pub(crate) fn release_aux(&mut self, ev: &mut Synthesizer) {
        match &mut self.kind {
            NodeKind::Register => {}
            NodeKind::Product { factors, .. } => {
                for factor in factors.iter_mut().rev() {
                    factor.release_aux(ev);
                }
            }
            NodeKind::Summation { terms, .. } => {
                for term in terms.iter_mut().rev() {
                    term.release_aux(ev);
                }
            }
            NodeKind::Compare(compare) => {
                for q in std::mem::take(&mut compare.aux).into_iter().rev() {
                    ev.free_ancilla(q);
                }
                match &mut compare.operands {
                    CompareOperands::RegReg { left, right } => {
                        right.release_aux(ev);
                        left.release_aux(ev);
                    }
                    CompareOperands::RegConst { reg, .. }
                    | CompareOperands::ConstReg { reg, .. } => reg.release_aux(ev),
                }
            }
            NodeKind::Not { operand } => operand.release_aux(ev),
            NodeKind::And { operands } | NodeKind::Or { operands } => {
                for operand in operands.iter_mut().rev() {
                    operand.release_aux(ev);
                }
            }
        }
    }
}

/// The boolean bit of a logic operand: the most significant result qubit.
fn top_bit(node: &Node) -> QubitId {
    *node
        .result_qubits()
        .last()
        .expect("result registers are never empty")
}

fn build_logic_operands(operands: &mut [Node], ev: &mut Synthesizer) -> SynthResult<Vec<QubitId>> {
    for operand in operands.iter_mut() {
        if operand.needs_result_allocation() {
            operand.alloc_result(ev);
        }
        if !operand.is_register() {
            operand.build(ev)?;
        }
    }
    Ok(operands.iter().map(top_bit).collect())
}

fn reverse_logic_operands(operands: &mut [Node], ev: &mut Synthesizer) -> SynthResult<()> {
    for operand in operands.iter_mut().rev() {
        if !operand.is_register() {
            operand.reverse(ev)?;
        }
        if operand.needs_result_allocation() {
            operand.release_result(ev);
        }
    }
    Ok(())
}

impl CompareNode {
    fn build(&mut self, ev: &mut Synthesizer, result: QubitId) -> SynthResult<()> {
        match &mut self.operands {
            CompareOperands::RegReg { left, right } => {
                for side in [left.as_mut(), right.as_mut()] {
                    if side.needs_result_allocation() {
                        side.alloc_result(ev);
                    }
                    if !side.is_register() {
                        side.build(ev)?;
                    }
                }
                let l = left.result_qubits().to_vec();
                let r = right.result_qubits().to_vec();
                let circ = ev.circuit_mut();
                match self.op {
                    CompareOp::Equal => qunits::equal_register(circ, &l, &r, &self.aux, result)?,
                    CompareOp::NotEqual => {
                        qunits::not_equal_register(circ, &l, &r, &self.aux, result)?;
                    }
                    CompareOp::Less => {
                        qunits::less_than_register(circ, &l, &r, self.aux[0], result)?;
                    }
                    CompareOp::Greater => {
                        qunits::greater_than_register(circ, &l, &r, self.aux[0], result)?;
                    }
                }
            }
            CompareOperands::RegConst { reg, constant } => {
                if reg.needs_result_allocation() {
                    reg.alloc_result(ev);
                }
                if !reg.is_register() {
                    reg.build(ev)?;
                }
                let q = reg.result_qubits().to_vec();
                let k = *constant;
                let circ = ev.circuit_mut();
                match self.op {
                    CompareOp::Equal => qunits::equal_const(circ, &q, k, &self.aux, result)?,
                    CompareOp::NotEqual => qunits::not_equal_const(circ, &q, k, &self.aux, result)?,
                    CompareOp::Less => qunits::less_than_const(circ, &q, k, &self.aux, result)?,
                    CompareOp::Greater => {
                        qunits::greater_than_const(circ, &q, k, &self.aux, result)?;
                    }
                }
            }
            CompareOperands::ConstReg { constant, reg } => {
                if reg.needs_result_allocation() {
                    reg.alloc_result(ev);
                }
                if !reg.is_register() {
                    reg.build(ev)?;
                }
                let q = reg.result_qubits().to_vec();
                let k = *constant;
                let circ = ev.circuit_mut();
                // The register sits on the right: ordering comparisons flip.
                match self.op {
                    CompareOp::Equal => qunits::equal_const(circ, &q, k, &self.aux, result)?,
                    CompareOp::NotEqual => qunits::not_equal_const(circ, &q, k, &self.aux, result)?,
                    CompareOp::Less => qunits::greater_than_const(circ, &q, k, &self.aux, result)?,
                    CompareOp::Greater => qunits::less_than_const(circ, &q, k, &self.aux, result)?,
                }
            }
        }
        Ok(())
    }

    fn reverse(&mut self, ev: &mut Synthesizer, result: QubitId) -> SynthResult<()> {
        match &mut self.operands {
            CompareOperands::RegReg { left, right } => {
                let l = left.result_qubits().to_vec();
                let r = right.result_qubits().to_vec();
                let circ = ev.circuit_mut();
                match self.op {
                    CompareOp::Equal => qunits::equal_register_dg(circ, &l, &r, &self.aux, result)?,
                    CompareOp::NotEqual => {
                        qunits::not_equal_register_dg(circ, &l, &r, &self.aux, result)?;
                    }
                    CompareOp::Less => {
                        qunits::less_than_register_dg(circ, &l, &r, self.aux[0], result)?;
                    }
                    CompareOp::Greater => {
                        qunits::greater_than_register_dg(circ, &l, &r, self.aux[0], result)?;
                    }
                }
                for side in [right.as_mut(), left.as_mut()] {
                    if !side.is_register() {
                        side.reverse(ev)?;
                    }
                    if side.needs_result_allocation() {
                        side.release_result(ev);
                    }
                }
            }
            CompareOperands::RegConst { reg, constant } => {
                let q = reg.result_qubits().to_vec();
                let k = *constant;
                let circ = ev.circuit_mut();
                match self.op {
                    CompareOp::Equal => qunits::equal_const_dg(circ, &q, k, &self.aux, result)?,
                    CompareOp::NotEqual => {
                        qunits::not_equal_const_dg(circ, &q, k, &self.aux, result)?;
                    }
                    CompareOp::Less => qunits::less_than_const_dg(circ, &q, k, &self.aux, result)?,
                    CompareOp::Greater => {
                        qunits::greater_than_const_dg(circ, &q, k, &self.aux, result)?;
                    }
                }
                if !reg.is_register() {
                    reg.reverse(ev)?;
                }
                if reg.needs_result_allocation() {
                    reg.release_result(ev);
                }
            }
            CompareOperands::ConstReg { constant, reg } => {
                let q = reg.result_qubits().to_vec();
                let k = *constant;
                let circ = ev.circuit_mut();
                match self.op {
                    CompareOp::Equal => qunits::equal_const_dg(circ, &q, k, &self.aux, result)?,
                    CompareOp::NotEqual => {
                        qunits::not_equal_const_dg(circ, &q, k, &self.aux, result)?;
                    }
                    CompareOp::Less => {
                        qunits::greater_than_const_dg(circ, &q, k, &self.aux, result)?;
                    }
                    CompareOp::Greater => {
                        qunits::less_than_const_dg(circ, &q, k, &self.aux, result)?;
                    }
                }
                if !reg.is_register() {
                    reg.reverse(ev)?;
                }
                if reg.needs_result_allocation() {
                    reg.release_result(ev);
                }
            }
        }
        Ok(())
    }
}
