//! Primitive reversible sub-circuits ("quantum units").
//!
//! Every unit appends named gates to a [`Circuit`] and comes with an
//! explicit dagger form that emits the gate-reverse sequence, so the
//! synthesis walk can undo any unit exactly. Arithmetic is built on the
//! QFT-based constant adder (no carry ancillas); relational units compose
//! only controlled constant adders with CNOT/MCX/X and stay reversible.
//!
//! Registers hold naturals least-significant bit first; all arithmetic is
//! modulo 2^n of the target register.

use std::collections::BTreeSet;
use std::f64::consts::PI;

use num_complex::Complex64;

use dlq_ir::{Circuit, IrResult, QubitId, RegisterUnitary};

use crate::bits::{natural_to_binary, set_to_statevector};

// =============================================================================
// Quantum Fourier transform
// =============================================================================

/// Append a QFT on `qubits`, including the final bit-reversal swap network.
pub fn qft(circ: &mut Circuit, qubits: &[QubitId]) -> IrResult<()> {
    let n = qubits.len();
    for i in (0..n).rev() {
        circ.h(qubits[i])?;
        for j in 0..i {
            circ.cp(rotation_angle(i - j), qubits[j], qubits[i])?;
        }
    }
    for m in 0..n / 2 {
        circ.swap(qubits[m], qubits[n - 1 - m])?;
    }
    Ok(())
}

/// Append the inverse QFT: the exact gate-reverse of [`qft`].
pub fn qft_dg(circ: &mut Circuit, qubits: &[QubitId]) -> IrResult<()> {
    let n = qubits.len();
    for m in (0..n / 2).rev() {
        circ.swap(qubits[m], qubits[n - 1 - m])?;
    }
    for i in 0..n {
        for j in (0..i).rev() {
            circ.cp(-rotation_angle(i - j), qubits[j], qubits[i])?;
        }
        circ.h(qubits[i])?;
    }
    Ok(())
}

/// π / 2^k.
fn rotation_angle(k: usize) -> f64 {
    PI / (1u64 << k) as f64
}

// =============================================================================
// Constant adders (Draper)
// =============================================================================

/// Append `target += c (mod 2^n)` as QFT, phase ramp, inverse QFT.
///
/// Subtraction is addition of a negative constant. No carry ancillas are
/// needed.
pub fn add_const(circ: &mut Circuit, target: &[QubitId], c: i64) -> IrResult<()> {
    ctrl_add_const(circ, &[], target, c)
}

/// Append the inverse of [`add_const`].
pub fn add_const_dg(circ: &mut Circuit, target: &[QubitId], c: i64) -> IrResult<()> {
    ctrl_add_const_dg(circ, &[], target, c)
}

/// Append `target += c (mod 2^n)`, applied only where every control is 1.
///
/// Only the phase ramp carries the controls: with the controls clear, the
/// QFT and inverse QFT cancel to the identity.
pub fn ctrl_add_const(
    circ: &mut Circuit,
    controls: &[QubitId],
    target: &[QubitId],
    c: i64,
) -> IrResult<()> {
    qft(circ, target)?;
    let n = target.len();
    for i in 0..n {
        circ.mcp(draper_angle(c, n, i), controls, target[i])?;
    }
    qft_dg(circ, target)
}

/// Append the inverse of [`ctrl_add_const`].
pub fn ctrl_add_const_dg(
    circ: &mut Circuit,
    controls: &[QubitId],
    target: &[QubitId],
    c: i64,
) -> IrResult<()> {
    qft(circ, target)?;
    let n = target.len();
    for i in (0..n).rev() {
        circ.mcp(-draper_angle(c, n, i), controls, target[i])?;
    }
    qft_dg(circ, target)
}

/// c · π / 2^(n-1-i), the Draper ramp angle for qubit `i` of an n-qubit
/// target.
fn draper_angle(c: i64, n: usize, i: usize) -> f64 {
    c as f64 * PI / (1u64 << (n - 1 - i)) as f64
}

// =============================================================================
// Register-by-register addition and subtraction
// =============================================================================

/// Append `target += src (mod 2^n_target)`.
///
/// Each source bit controls a constant adder of its weight.
pub fn add_register(circ: &mut Circuit, src: &[QubitId], target: &[QubitId]) -> IrResult<()> {
    for i in 0..src.len() {
        ctrl_add_const(circ, &[src[i]], target, bit_weight(i, target.len()))?;
    }
    Ok(())
}

/// Append the inverse of [`add_register`].
pub fn add_register_dg(circ: &mut Circuit, src: &[QubitId], target: &[QubitId]) -> IrResult<()> {
    for i in (0..src.len()).rev() {
        ctrl_add_const_dg(circ, &[src[i]], target, bit_weight(i, target.len()))?;
    }
    Ok(())
}

/// Append `target -= src (mod 2^n_target)`.
pub fn sub_register(circ: &mut Circuit, src: &[QubitId], target: &[QubitId]) -> IrResult<()> {
    for i in 0..src.len() {
        ctrl_add_const(circ, &[src[i]], target, -bit_weight(i, target.len()))?;
    }
    Ok(())
}

/// Append the inverse of [`sub_register`].
pub fn sub_register_dg(circ: &mut Circuit, src: &[QubitId], target: &[QubitId]) -> IrResult<()> {
    for i in (0..src.len()).rev() {
        ctrl_add_const_dg(circ, &[src[i]], target, -bit_weight(i, target.len()))?;
    }
    Ok(())
}

/// 2^i reduced modulo 2^n, as a signed adder constant.
fn bit_weight(i: usize, n: usize) -> i64 {
    if i >= n.min(63) {
        0
    } else {
        1i64 << i
    }
}

// =============================================================================
// Multi-factor product with integer exponents
// =============================================================================

/// Append `result += constant · Π bases[k]^exponents[k] (mod 2^n_result)`.
///
/// The product is expanded by distributivity over the binary expansion of
/// every factor: each tuple of bit positions across the flattened factor
/// list contributes a controlled constant addition of
/// `constant · 2^(sum of positions)`, controlled by the selected bits.
pub fn multiproduct(
    circ: &mut Circuit,
    bases: &[&[QubitId]],
    exponents: &[u32],
    result: &[QubitId],
    constant: i64,
) -> IrResult<()> {
    for (controls, c) in product_terms(bases, exponents, result.len(), constant) {
        ctrl_add_const(circ, &controls, result, c)?;
    }
    Ok(())
}

/// Append the inverse of [`multiproduct`]: the same terms, daggered, in
/// reverse order.
pub fn multiproduct_dg(
    circ: &mut Circuit,
    bases: &[&[QubitId]],
    exponents: &[u32],
    result: &[QubitId],
    constant: i64,
) -> IrResult<()> {
    for (controls, c) in product_terms(bases, exponents, result.len(), constant)
        .into_iter()
        .rev()
    {
        ctrl_add_const_dg(circ, &controls, result, c)?;
    }
    Ok(())
}

/// Enumerate the controlled-addition terms of the product expansion, in a
/// deterministic order shared by the forward and dagger forms.
///
/// Terms whose constant vanishes modulo 2^n_result are dropped.
fn product_terms(
    bases: &[&[QubitId]],
    exponents: &[u32],
    n_result: usize,
    constant: i64,
) -> Vec<(Vec<QubitId>, i64)> {
    // Repeat each factor index once per unit of exponent.
    let mut slots = Vec::new();
    for (idx, &e) in exponents.iter().enumerate() {
        for _ in 0..e {
            slots.push(idx);
        }
    }

    let dims: Vec<usize> = slots.iter().map(|&s| bases[s].len()).collect();
    let modulus = 1i128 << n_result.min(63);

    let mut terms = Vec::new();
    for tuple in cartesian_product(&dims) {
        // A qubit selected twice (same factor at the same bit) collapses to
        // a single control.
        let mut controls: BTreeSet<QubitId> = BTreeSet::new();
        let mut shift = 0usize;
        for (slot, &bit) in tuple.iter().enumerate() {
            controls.insert(bases[slots[slot]][bit]);
            shift += bit;
        }

        let c = if shift >= n_result {
            0
        } else {
            ((constant as i128) << shift).rem_euclid(modulus) as i64
        };
        if c == 0 {
            continue;
        }
        terms.push((controls.into_iter().collect(), c));
    }
    terms
}

/// All index tuples over the given dimensions, odometer order.
fn cartesian_product(dims: &[usize]) -> Vec<Vec<usize>> {
    if dims.iter().any(|&d| d == 0) {
        return vec![];
    }
    let mut tuples = vec![vec![]];
    for &dim in dims {
        let mut next = Vec::with_capacity(tuples.len() * dim);
        for tuple in &tuples {
            for i in 0..dim {
                let mut extended = tuple.clone();
                extended.push(i);
                next.push(extended);
            }
        }
        tuples = next;
    }
    tuples
}

// =============================================================================
// Relational units
// =============================================================================

/// Append `result ^= (left < right)` for two registers.
///
/// `sign` is a fresh zero ancilla widening `left` into the sign position:
/// after subtracting `right`, the sign bit is 1 exactly when left < right.
/// The subtraction is undone so the operands are restored.
pub fn less_than_register(
    circ: &mut Circuit,
    left: &[QubitId],
    right: &[QubitId],
    sign: QubitId,
    result: QubitId,
) -> IrResult<()> {
    let mut wide = left.to_vec();
    wide.push(sign);
    sub_register(circ, right, &wide)?;
    circ.cx(sign, result)?;
    sub_register_dg(circ, right, &wide)?;
    Ok(())
}

/// Append the inverse of [`less_than_register`].
///
/// The unit conjugates a CNOT by a subtraction, so it is its own inverse.
pub fn less_than_register_dg(
    circ: &mut Circuit,
    left: &[QubitId],
    right: &[QubitId],
    sign: QubitId,
    result: QubitId,
) -> IrResult<()> {
    less_than_register(circ, left, right, sign, result)
}

/// Append `result ^= (left > right)`: less-than with swapped operands.
pub fn greater_than_register(
    circ: &mut Circuit,
    left: &[QubitId],
    right: &[QubitId],
    sign: QubitId,
    result: QubitId,
) -> IrResult<()> {
    less_than_register(circ, right, left, sign, result)
}

/// Append the inverse of [`greater_than_register`].
pub fn greater_than_register_dg(
    circ: &mut Circuit,
    left: &[QubitId],
    right: &[QubitId],
    sign: QubitId,
    result: QubitId,
) -> IrResult<()> {
    less_than_register_dg(circ, right, left, sign, result)
}

/// Append `result ^= (reg < constant)`.
///
/// `aux` widens the register so that the subtracted sum fits; the top bit
/// of the widened register is the sign position.
pub fn less_than_const(
    circ: &mut Circuit,
    reg: &[QubitId],
    constant: u64,
    aux: &[QubitId],
    result: QubitId,
) -> IrResult<()> {
    let wide = widened(reg, aux);
    let top = *wide.last().expect("widened register is never empty");
    add_const(circ, &wide, -(constant as i64))?;
    circ.cx(top, result)?;
    add_const_dg(circ, &wide, -(constant as i64))?;
    Ok(())
}

/// Append the inverse of [`less_than_const`] (self-inverse conjugation).
pub fn less_than_const_dg(
    circ: &mut Circuit,
    reg: &[QubitId],
    constant: u64,
    aux: &[QubitId],
    result: QubitId,
) -> IrResult<()> {
    less_than_const(circ, reg, constant, aux, result)
}

/// Append `result ^= (reg > constant)`: less-than against `constant + 1`
/// with the boolean flipped.
pub fn greater_than_const(
    circ: &mut Circuit,
    reg: &[QubitId],
    constant: u64,
    aux: &[QubitId],
    result: QubitId,
) -> IrResult<()> {
    let wide = widened(reg, aux);
    let top = *wide.last().expect("widened register is never empty");
    let c = constant as i64 + 1;
    add_const(circ, &wide, -c)?;
    circ.cx(top, result)?;
    circ.x(result)?;
    add_const_dg(circ, &wide, -c)?;
    Ok(())
}

/// Append the inverse of [`greater_than_const`].
pub fn greater_than_const_dg(
    circ: &mut Circuit,
    reg: &[QubitId],
    constant: u64,
    aux: &[QubitId],
    result: QubitId,
) -> IrResult<()> {
    let wide = widened(reg, aux);
    let top = *wide.last().expect("widened register is never empty");
    let c = constant as i64 + 1;
    add_const(circ, &wide, -c)?;
    circ.x(result)?;
    circ.cx(top, result)?;
    add_const_dg(circ, &wide, -c)?;
    Ok(())
}

/// Append `result ^= (left = right)` for two registers.
///
/// The shorter operand is padded with `aux`; each bit of the left operand
/// is XORed into the right, and an MCX with negative-polarity controls
/// (X-sandwich) fires exactly when every XOR bit is zero. The XOR layer is
/// undone afterwards.
pub fn equal_register(
    circ: &mut Circuit,
    left: &[QubitId],
    right: &[QubitId],
    aux: &[QubitId],
    result: QubitId,
) -> IrResult<()> {
    let (wide_left, wide_right) = if left.len() >= right.len() {
        (left.to_vec(), widened(right, aux))
    } else {
        (widened(left, aux), right.to_vec())
    };
    debug_assert_eq!(wide_left.len(), wide_right.len());

    for i in 0..wide_left.len() {
        circ.cx(wide_left[i], wide_right[i])?;
    }
    for &q in &wide_right {
        circ.x(q)?;
    }
    circ.mcx(&wide_right, result)?;
    for &q in wide_right.iter().rev() {
        circ.x(q)?;
    }
    for i in (0..wide_left.len()).rev() {
        circ.cx(wide_left[i], wide_right[i])?;
    }
    Ok(())
}

/// Append the inverse of [`equal_register`] (self-inverse).
pub fn equal_register_dg(
    circ: &mut Circuit,
    left: &[QubitId],
    right: &[QubitId],
    aux: &[QubitId],
    result: QubitId,
) -> IrResult<()> {
    equal_register(circ, left, right, aux, result)
}

/// Append `result ^= (reg = constant)`.
///
/// X is pre-applied to every widened-register bit whose bit of `constant`
/// is 0, so the all-ones MCX fires exactly on the constant, then the X
/// layer is undone.
pub fn equal_const(
    circ: &mut Circuit,
    reg: &[QubitId],
    constant: u64,
    aux: &[QubitId],
    result: QubitId,
) -> IrResult<()> {
    let wide = widened(reg, aux);
    let bits = natural_to_binary(constant, wide.len() as u32);

    for (i, &bit) in bits.iter().enumerate() {
        if !bit {
            circ.x(wide[i])?;
        }
    }
    circ.mcx(&wide, result)?;
    for (i, &bit) in bits.iter().enumerate().rev() {
        if !bit {
            circ.x(wide[i])?;
        }
    }
    Ok(())
}

/// Append the inverse of [`equal_const`] (self-inverse).
pub fn equal_const_dg(
    circ: &mut Circuit,
    reg: &[QubitId],
    constant: u64,
    aux: &[QubitId],
    result: QubitId,
) -> IrResult<()> {
    equal_const(circ, reg, constant, aux, result)
}

/// Append `result ^= (left != right)`: equality followed by X.
pub fn not_equal_register(
    circ: &mut Circuit,
    left: &[QubitId],
    right: &[QubitId],
    aux: &[QubitId],
    result: QubitId,
) -> IrResult<()> {
    equal_register(circ, left, right, aux, result)?;
    circ.x(result)?;
    Ok(())
}

/// Append the inverse of [`not_equal_register`].
pub fn not_equal_register_dg(
    circ: &mut Circuit,
    left: &[QubitId],
    right: &[QubitId],
    aux: &[QubitId],
    result: QubitId,
) -> IrResult<()> {
    circ.x(result)?;
    equal_register_dg(circ, left, right, aux, result)
}

/// Append `result ^= (reg != constant)`.
pub fn not_equal_const(
    circ: &mut Circuit,
    reg: &[QubitId],
    constant: u64,
    aux: &[QubitId],
    result: QubitId,
) -> IrResult<()> {
    equal_const(circ, reg, constant, aux, result)?;
    circ.x(result)?;
    Ok(())
}

/// Append the inverse of [`not_equal_const`].
pub fn not_equal_const_dg(
    circ: &mut Circuit,
    reg: &[QubitId],
    constant: u64,
    aux: &[QubitId],
    result: QubitId,
) -> IrResult<()> {
    circ.x(result)?;
    equal_const_dg(circ, reg, constant, aux, result)
}

fn widened(reg: &[QubitId], aux: &[QubitId]) -> Vec<QubitId> {
    let mut wide = reg.to_vec();
    wide.extend_from_slice(aux);
    wide
}

// =============================================================================
// Set-state preparation
// =============================================================================

/// Unitary preparing the uniform superposition over a value set from |0…0⟩.
///
/// This is the Householder reflection `I - 2vvᵀ` with `v ∝ |0…0⟩ - |ψ⟩`,
/// which maps |0…0⟩ to the target statevector and is its own inverse. Any
/// unitary completion of ψ works for amplitude amplification; this one is
/// deterministic.
///
/// # Panics
///
/// Panics if the set is empty or contains values outside `[0, 2^size)`.
pub fn set_state_unitary(values: &BTreeSet<u64>, size: u32) -> RegisterUnitary {
    let psi = set_to_statevector(values, size);
    let dim = psi.len();

    // v = e0 - psi; |v|² = 2(1 - psi[0]).
    let norm_sq = 2.0 * (1.0 - psi[0]);
    let mut matrix = vec![Complex64::new(0.0, 0.0); dim * dim];

    if norm_sq < 1e-12 {
        // The set is {0}: the state is already |0…0⟩.
        for i in 0..dim {
            matrix[i * dim + i] = Complex64::new(1.0, 0.0);
        }
        return RegisterUnitary::new(size, matrix);
    }

    let mut v: Vec<f64> = psi.iter().map(|a| -a).collect();
    v[0] += 1.0;

    for row in 0..dim {
        for col in 0..dim {
            let householder = -2.0 * v[row] * v[col] / norm_sq;
            let identity = if row == col { 1.0 } else { 0.0 };
            matrix[row * dim + col] = Complex64::new(identity + householder, 0.0);
        }
    }
    RegisterUnitary::new(size, matrix)
}

/// Append the set-state preparation to a register.
pub fn prepare_set_state(
    circ: &mut Circuit,
    reg: &[QubitId],
    values: &BTreeSet<u64>,
) -> IrResult<()> {
    let unitary = set_state_unitary(values, reg.len() as u32);
    circ.unitary(unitary, reg)?;
    Ok(())
}

/// Append the inverse set-state preparation.
pub fn prepare_set_state_dg(
    circ: &mut Circuit,
    reg: &[QubitId],
    values: &BTreeSet<u64>,
) -> IrResult<()> {
    let unitary = set_state_unitary(values, reg.len() as u32).dagger();
    circ.unitary(unitary, reg)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlq_ir::{Gate, Instruction};

    fn test_circuit(n: u32) -> (Circuit, Vec<QubitId>) {
        let mut circ = Circuit::new("test");
        let q = circ.add_qreg("q", n).unwrap();
        (circ, q)
    }

    fn assert_mirrored(forward: &[Instruction], backward: &[Instruction]) {
        assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.iter().zip(backward.iter().rev()) {
            assert_eq!(&f.dagger(), b);
        }
    }

    #[test]
    fn test_qft_gate_counts() {
        let (mut circ, q) = test_circuit(4);
        qft(&mut circ, &q).unwrap();

        let ops = circ.instructions();
        let hadamards = ops.iter().filter(|i| i.gate == Gate::H).count();
        let rotations = ops
            .iter()
            .filter(|i| matches!(i.gate, Gate::Phase(_)))
            .count();
        let swaps = ops.iter().filter(|i| i.gate == Gate::Swap).count();

        assert_eq!(hadamards, 4);
        assert_eq!(rotations, 6); // n(n-1)/2
        assert_eq!(swaps, 2);
    }

    #[test]
    fn test_qft_dg_mirrors_qft() {
        let (mut circ, q) = test_circuit(3);
        qft(&mut circ, &q).unwrap();
        let split = circ.num_instructions();
        qft_dg(&mut circ, &q).unwrap();

        let (forward, backward) = circ.instructions().split_at(split);
        assert_mirrored(forward, backward);
    }

    #[test]
    fn test_add_const_dg_mirrors_add_const() {
        let (mut circ, q) = test_circuit(3);
        add_const(&mut circ, &q, 5).unwrap();
        let split = circ.num_instructions();
        add_const_dg(&mut circ, &q, 5).unwrap();

        let (forward, backward) = circ.instructions().split_at(split);
        assert_mirrored(forward, backward);
    }

    #[test]
    fn test_ctrl_add_const_controls_only_on_ramp() {
        let mut circ = Circuit::new("test");
        let q = circ.add_qreg("q", 3).unwrap();
        let ctrl = circ.add_qubit();
        ctrl_add_const(&mut circ, &[ctrl], &q, 2).unwrap();

        for inst in circ.instructions() {
            match inst.gate {
                // The QFT's own cp gates carry one control; ramp phases two.
                Gate::Phase(_) => assert!(inst.num_controls() <= 2),
                _ => assert_eq!(inst.num_controls(), 0),
            }
        }
        let ramp_gates = circ
            .instructions()
            .iter()
            .filter(|i| i.controls.contains(&ctrl))
            .count();
        assert_eq!(ramp_gates, 3);
    }

    #[test]
    fn test_register_addition_emits_one_adder_per_source_bit() {
        let mut circ = Circuit::new("test");
        let src = circ.add_qreg("src", 2).unwrap();
        let dst = circ.add_qreg("dst", 4).unwrap();
        add_register(&mut circ, &src, &dst).unwrap();

        for (i, &s) in src.iter().enumerate() {
            let controlled = circ
                .instructions()
                .iter()
                .filter(|inst| inst.controls.contains(&s))
                .count();
            assert_eq!(controlled, 4, "source bit {i} should control 4 ramp phases");
        }
    }

    #[test]
    fn test_sub_register_dg_mirrors_sub_register() {
        let mut circ = Circuit::new("test");
        let src = circ.add_qreg("src", 2).unwrap();
        let dst = circ.add_qreg("dst", 3).unwrap();
        sub_register(&mut circ, &src, &dst).unwrap();
        let split = circ.num_instructions();
        sub_register_dg(&mut circ, &src, &dst).unwrap();

        let (forward, backward) = circ.instructions().split_at(split);
        assert_mirrored(forward, backward);
    }

    fn qubit_range(start: u32, n: u32) -> Vec<QubitId> {
        (start..start + n).map(QubitId).collect()
    }

    #[test]
    fn test_product_terms_single_factor() {
        let a = qubit_range(0, 2);

        // a^1 into 4 qubits: one term per source bit, weight 2^bit.
        let terms = product_terms(&[&a], &[1], 4, 1);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0], (vec![a[0]], 1));
        assert_eq!(terms[1], (vec![a[1]], 2));
    }

    #[test]
    fn test_product_terms_square_deduplicates_controls() {
        let a = qubit_range(0, 2);

        // a^2: tuples (0,0) (0,1) (1,0) (1,1) with constants 1, 2, 2, 4.
        let terms = product_terms(&[&a], &[2], 4, 1);
        assert_eq!(terms.len(), 4);
        // The diagonal tuples collapse to a single control qubit.
        assert_eq!(terms[0], (vec![a[0]], 1));
        assert_eq!(terms[3], (vec![a[1]], 4));
        // Cross terms control on both bits.
        assert_eq!(terms[1].0, vec![a[0], a[1]]);
        assert_eq!(terms[1].1, 2);
    }

    #[test]
    fn test_product_terms_drop_vanishing_constants() {
        let a = qubit_range(0, 3);

        // Into a 2-qubit result, source bit 2 has weight 4 ≡ 0 (mod 4).
        let terms = product_terms(&[&a], &[1], 2, 1);
        assert_eq!(terms.len(), 2);
    }

    #[test]
    fn test_multiproduct_dg_mirrors_multiproduct() {
        let mut circ = Circuit::new("test");
        let a = circ.add_qreg("a", 2).unwrap();
        let b = circ.add_qreg("b", 2).unwrap();
        let r = circ.add_qreg("r", 4).unwrap();

        multiproduct(&mut circ, &[&a, &b], &[1, 1], &r, 3).unwrap();
        let split = circ.num_instructions();
        multiproduct_dg(&mut circ, &[&a, &b], &[1, 1], &r, 3).unwrap();

        let (forward, backward) = circ.instructions().split_at(split);
        assert_mirrored(forward, backward);
    }

    #[test]
    fn test_equal_register_restores_xor_layer() {
        let mut circ = Circuit::new("test");
        let a = circ.add_qreg("a", 2).unwrap();
        let b = circ.add_qreg("b", 2).unwrap();
        let r = circ.add_qreg("r", 1).unwrap();

        equal_register(&mut circ, &a, &b, &[], r[0]).unwrap();

        let ops = circ.instructions();
        // 2 cx + 2 x + mcx + 2 x + 2 cx
        assert_eq!(ops.len(), 9);
        let cnots = ops
            .iter()
            .filter(|i| i.gate == Gate::X && i.num_controls() == 1)
            .count();
        assert_eq!(cnots, 4);
        let mcx = ops.iter().find(|i| i.num_controls() == 2).unwrap();
        assert_eq!(mcx.targets, vec![r[0]]);
    }

    #[test]
    fn test_equal_const_flips_zero_bits() {
        let mut circ = Circuit::new("test");
        let a = circ.add_qreg("a", 3).unwrap();
        let r = circ.add_qreg("r", 1).unwrap();

        // constant 5 = 101₂: bit 1 is zero, so a[1] gets the X sandwich.
        equal_const(&mut circ, &a, 5, &[], r[0]).unwrap();

        let ops = circ.instructions();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].gate, Gate::X);
        assert_eq!(ops[0].targets, vec![a[1]]);
        assert_eq!(ops[1].num_controls(), 3);
        assert_eq!(ops[2].targets, vec![a[1]]);
    }

    #[test]
    fn test_less_than_register_structure() {
        let mut circ = Circuit::new("test");
        let a = circ.add_qreg("a", 2).unwrap();
        let b = circ.add_qreg("b", 2).unwrap();
        let sign = circ.add_qubit();
        let r = circ.add_qubit();

        less_than_register(&mut circ, &a, &b, sign, r).unwrap();

        // The single CNOT reads the sign ancilla into the result.
        let cnot = circ
            .instructions()
            .iter()
            .find(|i| i.gate == Gate::X && i.num_controls() == 1)
            .unwrap();
        assert_eq!(cnot.controls, vec![sign]);
        assert_eq!(cnot.targets, vec![r]);
    }

    #[test]
    fn test_set_state_unitary_first_column_is_statevector() {
        let values: BTreeSet<u64> = [1, 2, 3].into_iter().collect();
        let u = set_state_unitary(&values, 2);
        let dim = u.dim();
        let amp = 1.0 / 3.0_f64.sqrt();

        // Column 0 is U|0⟩ = ψ.
        for row in 0..dim {
            let expected = if (1..=3).contains(&row) { amp } else { 0.0 };
            assert!((u.matrix[row * dim].re - expected).abs() < 1e-12);
            assert!(u.matrix[row * dim].im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_set_state_unitary_is_self_inverse() {
        let values: BTreeSet<u64> = [0, 3].into_iter().collect();
        let u = set_state_unitary(&values, 2);
        let d = u.dagger();
        for (a, b) in u.matrix.iter().zip(d.matrix.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_set_state_unitary_trivial_set() {
        let values: BTreeSet<u64> = [0].into_iter().collect();
        let u = set_state_unitary(&values, 1);
        assert!((u.matrix[0].re - 1.0).abs() < 1e-12);
        assert!((u.matrix[3].re - 1.0).abs() < 1e-12);
        assert!(u.matrix[1].norm() < 1e-12);
    }
}
