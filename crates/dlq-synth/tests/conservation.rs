//! Ancilla conservation across whole programs.
//!
//! For every valid program the pool must end empty: each scratch qubit
//! handed out during the forward walk comes back clean from the reverse
//! walk, whatever mix of arithmetic, relational and logical nodes the
//! program uses, and however many Grover iterations run in between.

use dlq_lang::parse;
use dlq_synth::Synthesizer;

fn build(source: &str) -> Synthesizer {
    let program = parse(source).unwrap();
    let mut synth = Synthesizer::new(program).unwrap();
    synth.build_all().unwrap();
    synth
}

#[track_caller]
fn assert_conserved(source: &str) {
    let synth = build(source);
    assert_eq!(synth.pool().outstanding(), 0, "pool must end empty");
    assert_eq!(
        synth.pool().available(),
        synth.pool().total(),
        "every created ancilla must be back in the pool"
    );
}

#[test]
fn conserves_arithmetic_chains() {
    assert_conserved("a[2] in {1, 2};\nb[5] := a + a + 3;\namplify b 0 times");
    assert_conserved("a[2] in {1, 2};\nb[6] := a * a + 1;\namplify b 0 times");
    assert_conserved("a[2] in {1, 2};\nb[7] := 3 * a^2 - a;\namplify b 0 times");
}

#[test]
fn conserves_relational_modes() {
    assert_conserved("a[2] in {1};\nb[2] in {2};\nr[1] := a < b;\namplify r 0 times");
    assert_conserved("a[2] in {1};\nr[1] := a < 3;\namplify r 0 times");
    assert_conserved("a[2] in {1};\nr[1] := 3 > a;\namplify r 0 times");
    assert_conserved("a[2] in {1};\nr[1] := a = 9;\namplify r 0 times");
    assert_conserved("a[2] in {1};\nb[3] in {2};\nr[1] := a != b;\namplify r 0 times");
}

#[test]
fn conserves_logic_trees() {
    assert_conserved(
        "a[2] in {0, 1};\nb[2] in {2, 3};\n\
         r[1] := not (a = 1) or (a < b and b != 2);\n\
         amplify r 0 times",
    );
}

#[test]
fn conserves_across_grover_iterations() {
    assert_conserved(
        "a[3] in {0, 1, 2, 3, 4, 5, 6, 7};\nr[1] := a = 5;\namplify r 3 times",
    );
    assert_conserved(
        "a[2] in {0, 1, 2, 3};\nb[2] in {0, 1, 2, 3};\nr[1] := a < b;\namplify r 2 times",
    );
}

#[test]
fn conserves_composite_expression_registers() {
    assert_conserved(
        "x[3] in {0, 1, 2, 3};\n\
         y[7] := x^2 + x;\n\
         r[1] := y < 6;\n\
         amplify r 1 times",
    );
}

#[test]
fn definition_results_persist_until_teardown() {
    // A definition's result qubits stay allocated until the final reverse
    // pass, so a second definition takes fresh qubits of the same width.
    let single = build("a[2] in {1};\nb[3] := a + 1;\namplify b 0 times");
    let double = build(
        "a[2] in {1};\nb[3] := a + 1;\nc[3] := a + 2;\namplify c 0 times",
    );
    assert_eq!(double.pool().total(), 2 * single.pool().total());
}
