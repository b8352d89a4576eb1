//! End-to-end tests: parse → synthesize → simulate.
//!
//! Programs with zero amplify iterations are functionally deterministic:
//! every sampled row must satisfy the defining expressions exactly, and no
//! ancilla may ever be measured non-zero. Grover searches use iteration
//! counts chosen for their problem size, with thresholds several standard
//! deviations below the expected concentration.

use dlq_lang::parse;
use dlq_sim::{FrequencyTable, Simulator};
use dlq_synth::Synthesizer;

/// Compile and simulate, asserting pool conservation and clean ancillas.
fn run(source: &str, shots: u32) -> FrequencyTable {
    let program = parse(source).unwrap();
    let mut synth = Synthesizer::new(program).unwrap();
    synth.build_all().unwrap();
    assert_eq!(synth.pool().outstanding(), 0, "ancilla pool must end empty");

    let circuit = synth.into_circuit();
    let result = Simulator::new().run(&circuit, shots).unwrap();

    let named_bits: u32 = circuit.registers().iter().map(|r| r.size()).sum();
    for &outcome in result.counts.keys() {
        assert_eq!(
            outcome >> named_bits,
            0,
            "ancilla measured non-zero in outcome {outcome:#b}"
        );
    }

    FrequencyTable::from_counts(&result, &circuit)
}

// =============================================================================
// Arithmetic
// =============================================================================

#[test]
fn addition_with_constant() {
    let table = run("a[3] in {1, 2, 3};\nb[6] := a + 1;\namplify b 0 times", 600);

    assert_eq!(table.rows.len(), 3);
    for row in &table.rows {
        let (a, b) = (row.values[0], row.values[1]);
        assert!((1..=3).contains(&a));
        assert_eq!(b, a + 1);
        assert!(row.count > 120, "a={a} appeared only {} times", row.count);
    }
}

#[test]
fn subtraction_wraps_modulo() {
    // 1 - 2 in the 3-qubit intermediate is 7; the 3-qubit target takes it
    // unchanged.
    let table = run(
        "a[2] in {1};\nb[2] in {2};\nc[3] := a - b;\namplify c 0 times",
        50,
    );
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].values, vec![1, 2, 7]);
    assert_eq!(table.rows[0].count, 50);
}

#[test]
fn product_of_registers() {
    let table = run(
        "a[2] in {2, 3};\nb[2] in {1, 2};\nc[4] := a * b;\namplify c 0 times",
        400,
    );
    assert_eq!(table.rows.len(), 4);
    for row in &table.rows {
        let (a, b, c) = (row.values[0], row.values[1], row.values[2]);
        assert_eq!(c, a * b);
        assert!(row.count > 50);
    }
}

#[test]
fn square_of_register() {
    let table = run(
        "x[3] in {0, 1, 2, 3, 4, 5, 6, 7};\ny[6] := x^2;\namplify y 0 times",
        800,
    );
    assert_eq!(table.rows.len(), 8);
    for row in &table.rows {
        let (x, y) = (row.values[0], row.values[1]);
        assert_eq!(y, x * x, "y must equal x² for x={x}");
    }
}

#[test]
fn constant_factor_scales_product() {
    let table = run(
        "a[2] in {1, 2, 3};\nb[5] := 3 * a;\namplify b 0 times",
        300,
    );
    assert_eq!(table.rows.len(), 3);
    for row in &table.rows {
        assert_eq!(row.values[1], 3 * row.values[0]);
    }
}

#[test]
fn composite_arithmetic_expression() {
    let table = run(
        "a[2] in {0, 1, 2, 3};\nb[6] := a^2 + a + 2;\namplify b 0 times",
        600,
    );
    assert_eq!(table.rows.len(), 4);
    for row in &table.rows {
        let (a, b) = (row.values[0], row.values[1]);
        assert_eq!(b, a * a + a + 2);
    }
}

// =============================================================================
// Relational operators (all modes, zero iterations: pure truth tables)
// =============================================================================

#[test]
fn less_than_register_register() {
    let table = run(
        "a[2] in {0, 1, 2, 3};\nb[2] in {0, 1, 2, 3};\nr[1] := a < b;\namplify r 0 times",
        1600,
    );
    assert_eq!(table.rows.len(), 16);
    for row in &table.rows {
        let (a, b, r) = (row.values[0], row.values[1], row.values[2]);
        assert_eq!(r, u64::from(a < b), "wrong a<b for a={a}, b={b}");
    }
}

#[test]
fn less_than_constant() {
    let table = run(
        "a[3] in {0, 1, 2, 3, 4, 5, 6, 7};\nr[1] := a < 5;\namplify r 0 times",
        800,
    );
    assert_eq!(table.rows.len(), 8);
    for row in &table.rows {
        assert_eq!(row.values[1], u64::from(row.values[0] < 5));
    }
}

#[test]
fn greater_than_constant() {
    let table = run(
        "a[3] in {0, 1, 2, 3, 4, 5, 6, 7};\nr[1] := a > 2;\namplify r 0 times",
        800,
    );
    for row in &table.rows {
        assert_eq!(row.values[1], u64::from(row.values[0] > 2));
    }
}

#[test]
fn constant_on_the_left_flips_comparison() {
    let table = run(
        "a[3] in {0, 1, 2, 3, 4, 5, 6, 7};\nr[1] := 3 < a;\namplify r 0 times",
        800,
    );
    for row in &table.rows {
        assert_eq!(row.values[1], u64::from(row.values[0] > 3));
    }
}

#[test]
fn equality_between_mixed_width_registers() {
    let table = run(
        "a[2] in {0, 1, 2, 3};\nb[3] in {0, 1, 2, 3, 4, 5, 6, 7};\nr[1] := a = b;\n\
         amplify r 0 times",
        3200,
    );
    assert_eq!(table.rows.len(), 32);
    for row in &table.rows {
        let (a, b, r) = (row.values[0], row.values[1], row.values[2]);
        assert_eq!(r, u64::from(a == b), "wrong a=b for a={a}, b={b}");
    }
}

#[test]
fn not_equal_with_constant() {
    let table = run(
        "a[3] in {0, 1, 2, 3, 4, 5, 6, 7};\nr[1] := a != 5;\namplify r 0 times",
        800,
    );
    for row in &table.rows {
        assert_eq!(row.values[1], u64::from(row.values[0] != 5));
    }
}

#[test]
fn equality_with_oversized_constant_is_false() {
    // 9 does not fit in 2 qubits: the comparison can never hold.
    let table = run(
        "a[2] in {0, 1, 2, 3};\nr[1] := a = 9;\namplify r 0 times",
        400,
    );
    for row in &table.rows {
        assert_eq!(row.values[1], 0);
    }
}

#[test]
fn less_than_oversized_constant_is_true() {
    let table = run(
        "a[2] in {0, 1, 2, 3};\nr[1] := a < 9;\namplify r 0 times",
        400,
    );
    for row in &table.rows {
        assert_eq!(row.values[1], 1);
    }
}

// =============================================================================
// Logic operators
// =============================================================================

#[test]
fn disjunction_of_predicates() {
    let table = run(
        "p[2] in {0, 1, 2, 3};\nr[1] := (p = 1) or (p = 2);\namplify r 0 times",
        800,
    );
    for row in &table.rows {
        let (p, r) = (row.values[0], row.values[1]);
        assert_eq!(r, u64::from(p == 1 || p == 2));
    }
}

#[test]
fn conjunction_with_negation() {
    let table = run(
        "p[2] in {0, 1, 2, 3};\nr[1] := (p > 0) and (not (p = 3));\namplify r 0 times",
        800,
    );
    for row in &table.rows {
        let (p, r) = (row.values[0], row.values[1]);
        assert_eq!(r, u64::from(p == 1 || p == 2));
    }
}

#[test]
fn predicate_over_computed_register() {
    let table = run(
        "x[2] in {0, 1, 2, 3};\ny[3] := x + 1;\nr[1] := y < 3;\namplify r 0 times",
        800,
    );
    assert_eq!(table.rows.len(), 4);
    for row in &table.rows {
        let (x, y, r) = (row.values[0], row.values[1], row.values[2]);
        assert_eq!(y, x + 1);
        assert_eq!(r, u64::from(y < 3));
    }
}

// =============================================================================
// Grover amplification
// =============================================================================

#[test]
fn grover_concentrates_equality_search() {
    // N=8, one solution: two iterations give sin²(5·asin(1/√8)) ≈ 0.945.
    let table = run(
        "a[3] in {0, 1, 2, 3, 4, 5, 6, 7};\nr[1] := a = 5;\namplify r 2 times",
        400,
    );
    let hits = table.count_where(|v| v[0] == 5);
    assert!(hits > 340, "expected ≈378/400 hits on a=5, got {hits}");
    // The marked rows also carry the predicate bit.
    for row in &table.rows {
        assert_eq!(row.values[1], u64::from(row.values[0] == 5));
    }
}

#[test]
fn grover_concentrates_less_than_search() {
    // 6 good pairs of 16: one iteration gives ≈ 0.84.
    let table = run(
        "a[2] in {0, 1, 2, 3};\nb[2] in {0, 1, 2, 3};\nr[1] := a < b;\namplify r 1 times",
        400,
    );
    let hits = table.count_where(|v| v[0] < v[1]);
    assert!(hits > 280, "expected ≈337/400 hits on a<b, got {hits}");
}

#[test]
fn grover_concentrates_compound_predicate() {
    // 7 good tuples of 64: two iterations give ≈ 0.987.
    let table = run(
        "p[3] in {0, 1, 2, 3, 4, 5, 6, 7};\nq[3] in {0, 1, 2, 3, 4, 5, 6, 7};\n\
         r[1] := (p = 3) and (q != 5);\namplify r 2 times",
        400,
    );
    let hits = table.count_where(|v| v[0] == 3 && v[1] != 5);
    assert!(hits > 360, "expected ≈395/400 hits, got {hits}");
}

#[test]
fn amplify_zero_iterations_keeps_uniform_marginal() {
    let table = run(
        "a[2] in {0, 1, 2, 3};\nr[1] := a = 1;\namplify r 0 times",
        800,
    );
    assert_eq!(table.rows.len(), 4);
    for row in &table.rows {
        assert!(
            row.count > 120,
            "a={} should stay near uniform, got {}",
            row.values[0],
            row.count
        );
    }
}
