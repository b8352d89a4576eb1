//! Per-register frequency tables.
//!
//! Measurement marginalises onto the named registers only: ancilla qubits
//! are never part of a row. Rows are keyed by the tuple of register
//! values, ordered by descending count.

use rustc_hash::FxHashMap;
use serde::Serialize;

use dlq_ir::Circuit;

use crate::simulator::RunResult;

/// One measured tuple of register values with its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyRow {
    /// Register values in table column order.
    pub values: Vec<u64>,
    /// Number of shots that produced this tuple.
    pub count: u32,
}

/// Frequency table over the named registers of a circuit.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyTable {
    /// Column names: the registers in declaration order.
    pub registers: Vec<String>,
    /// Rows sorted by descending count, ties by ascending values.
    pub rows: Vec<FrequencyRow>,
    /// Total number of shots.
    pub shots: u32,
}

impl FrequencyTable {
    /// Marginalise raw basis-state counts onto the circuit's registers.
    pub fn from_counts(result: &RunResult, circuit: &Circuit) -> Self {
        let registers: Vec<String> = circuit
            .registers()
            .iter()
            .map(|r| r.name.clone())
            .collect();

        let mut merged: FxHashMap<Vec<u64>, u32> = FxHashMap::default();
        for (&outcome, &count) in &result.counts {
            let values: Vec<u64> = circuit
                .registers()
                .iter()
                .map(|reg| {
                    reg.qubits
                        .iter()
                        .enumerate()
                        .map(|(j, q)| ((outcome >> q.index()) & 1) << j)
                        .sum()
                })
                .collect();
            *merged.entry(values).or_insert(0) += count;
        }

        let mut rows: Vec<FrequencyRow> = merged
            .into_iter()
            .map(|(values, count)| FrequencyRow { values, count })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.values.cmp(&b.values)));

        Self {
            registers,
            rows,
            shots: result.shots,
        }
    }

    /// Probability of a row given the total shot count.
    pub fn probability(&self, row: &FrequencyRow) -> f64 {
        f64::from(row.count) / f64::from(self.shots)
    }

    /// Render the table as CSV: one column per register, then count and
    /// probability.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.registers.join(","));
        out.push_str(",count,probability\n");

        for row in &self.rows {
            let values: Vec<String> = row.values.iter().map(u64::to_string).collect();
            out.push_str(&values.join(","));
            out.push_str(&format!(",{},{:.6}\n", row.count, self.probability(row)));
        }
        out
    }

    /// Look up the total count of rows satisfying a predicate on the
    /// value tuple.
    pub fn count_where(&self, predicate: impl Fn(&[u64]) -> bool) -> u32 {
        self.rows
            .iter()
            .filter(|row| predicate(&row.values))
            .map(|row| row.count)
            .sum()
    }
}
