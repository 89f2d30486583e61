//! Reference execution backend for synthesized circuits.
//!
//! [`Simulator`] runs a [`Circuit`] on a sparse real-amplitude state vector
//! and returns a [`Histogram`] keyed the way [`Circuit::format_key`] lays
//! keys out.
//!
//! Error-correction circuits are mostly deterministic: syndrome extraction
//! and correction on a known codeword leave every measured bit fixed. The
//! simulator therefore runs the longest prefix whose measurements and
//! resets have certain outcomes exactly once. When only measurements follow,
//! shots are drawn from the final distribution; otherwise the remainder is
//! replayed per shot with projective collapse.

pub mod state;

use qec_common::isa::Instruction;
use qec_common::{Circuit, Executor, Histogram, Qubit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

pub use state::StateVector;
use state::CERTAINTY_EPSILON;

/// Basis states are `u64` keys.
pub const MAX_QUBITS: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("circuit needs {requested} qubits, the simulator supports at most {max}")]
    TooManyQubits { requested: usize, max: usize },
}

/// Seedable sparse state-vector executor.
pub struct Simulator {
    rng: StdRng,
}

impl Simulator {
    /// Simulator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Simulator with a fixed seed; identical seeds give identical
    /// histograms for the same circuit.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws a projective measurement of `q`, collapsing the state.
    fn measure(&mut self, state: &mut StateVector, q: Qubit) -> bool {
        let p1 = state.probability_one(q);
        let outcome = self.rng.gen_range(0.0..1.0) < p1;
        state.collapse(q, outcome);
        outcome
    }

    /// Replays `instructions` once on a copy of the prefix state.
    fn replay(
        &mut self,
        state: &StateVector,
        bits: &[bool],
        instructions: &[Instruction],
    ) -> Vec<bool> {
        let mut state = state.clone();
        let mut bits = bits.to_vec();
        for instr in instructions {
            match instr {
                Instruction::Measure { qubit, clbit } => {
                    bits[clbit.0] = self.measure(&mut state, *qubit);
                }
                Instruction::Reset(q) => {
                    if self.measure(&mut state, *q) {
                        state.apply(&Instruction::X(*q));
                    }
                }
                other => state.apply(other),
            }
        }
        bits
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of `q` when it is certain, `None` otherwise.
fn certain_outcome(state: &StateVector, q: Qubit) -> Option<bool> {
    let p1 = state.probability_one(q);
    if p1 < CERTAINTY_EPSILON {
        Some(false)
    } else if p1 > 1.0 - CERTAINTY_EPSILON {
        Some(true)
    } else {
        None
    }
}

/// Runs instructions while every measurement and reset has a certain
/// outcome. Returns the index of the first instruction not executed.
fn run_deterministic_prefix(
    state: &mut StateVector,
    bits: &mut [bool],
    instructions: &[Instruction],
) -> usize {
    for (index, instr) in instructions.iter().enumerate() {
        match instr {
            Instruction::Measure { qubit, clbit } => match certain_outcome(state, *qubit) {
                Some(outcome) => {
                    state.collapse(*qubit, outcome);
                    bits[clbit.0] = outcome;
                }
                None => return index,
            },
            Instruction::Reset(q) => match certain_outcome(state, *q) {
                Some(outcome) => {
                    state.collapse(*q, outcome);
                    if outcome {
                        state.apply(&Instruction::X(*q));
                    }
                }
                None => return index,
            },
            other => state.apply(other),
        }
    }
    instructions.len()
}

impl Executor for Simulator {
    type Error = SimError;

    fn execute(&mut self, circuit: &Circuit, shots: u64) -> Result<Histogram, SimError> {
        if circuit.num_qubits() > MAX_QUBITS {
            return Err(SimError::TooManyQubits {
                requested: circuit.num_qubits(),
                max: MAX_QUBITS,
            });
        }

        let mut histogram = Histogram::new();
        if shots == 0 {
            return Ok(histogram);
        }

        let instructions = circuit.instructions();
        let mut state = StateVector::new();
        let mut bits = vec![false; circuit.num_clbits()];
        let split = run_deterministic_prefix(&mut state, &mut bits, instructions);
        let remainder = &instructions[split..];
        debug!(
            split,
            remaining = remainder.len(),
            support = state.support_size(),
            "deterministic prefix executed"
        );

        let measurement_only = remainder
            .iter()
            .all(|i| matches!(i, Instruction::Measure { .. } | Instruction::Barrier));

        if measurement_only {
            let distribution = state.distribution();
            let mut cumulative = Vec::with_capacity(distribution.len());
            let mut total = 0.0;
            for (_, p) in &distribution {
                total += p;
                cumulative.push(total);
            }

            let mut drawn: HashMap<usize, u64> = HashMap::new();
            for _ in 0..shots {
                let r = self.rng.gen_range(0.0..total);
                let idx = cumulative
                    .partition_point(|&c| c <= r)
                    .min(distribution.len() - 1);
                *drawn.entry(idx).or_insert(0) += 1;
            }

            for (idx, count) in drawn {
                let basis = distribution[idx].0;
                let mut shot_bits = bits.clone();
                for instr in remainder {
                    if let Instruction::Measure { qubit, clbit } = instr {
                        shot_bits[clbit.0] = basis & (1u64 << qubit.0) != 0;
                    }
                }
                *histogram.entry(circuit.format_key(&shot_bits)).or_insert(0) += count;
            }
        } else {
            for _ in 0..shots {
                let shot_bits = self.replay(&state, &bits, remainder);
                *histogram.entry(circuit.format_key(&shot_bits)).or_insert(0) += 1;
            }
        }

        Ok(histogram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qec_common::CircuitBuilder;

    #[test]
    fn deterministic_circuit_gives_single_key() {
        let mut circuit = Circuit::new();
        let q = circuit.add_quantum_register("q", 3);
        let c = circuit.add_classical_register("c", 3);
        circuit.x(q.qubit(0));
        circuit.cx(q.qubit(0), q.qubit(2));
        for i in 0..3 {
            circuit.measure(q.qubit(i), c.clbit(i));
        }

        let hist = Simulator::with_seed(1).execute(&circuit, 50).unwrap();
        assert_eq!(hist.len(), 1);
        assert_eq!(hist.get("101"), Some(&50));
    }

    #[test]
    fn bell_pair_only_reports_correlated_keys() {
        let mut circuit = Circuit::new();
        let q = circuit.add_quantum_register("q", 2);
        let c = circuit.add_classical_register("c", 2);
        circuit.h(q.qubit(0));
        circuit.cx(q.qubit(0), q.qubit(1));
        circuit.measure(q.qubit(0), c.clbit(0));
        circuit.measure(q.qubit(1), c.clbit(1));

        let hist = Simulator::with_seed(7).execute(&circuit, 1000).unwrap();
        assert_eq!(hist.values().sum::<u64>(), 1000);
        assert!(hist.keys().all(|k| k == "00" || k == "11"));
        assert_eq!(hist.len(), 2);
    }

    #[test]
    fn mid_circuit_measurement_feeds_later_gates() {
        // measure a superposed qubit, then copy it: the two bits always agree
        let mut circuit = Circuit::new();
        let q = circuit.add_quantum_register("q", 2);
        let first = circuit.add_classical_register("first", 1);
        let second = circuit.add_classical_register("second", 1);
        circuit.h(q.qubit(0));
        circuit.measure(q.qubit(0), first.clbit(0));
        circuit.cx(q.qubit(0), q.qubit(1));
        circuit.measure(q.qubit(1), second.clbit(0));

        let hist = Simulator::with_seed(3).execute(&circuit, 400).unwrap();
        assert_eq!(hist.values().sum::<u64>(), 400);
        assert!(hist.keys().all(|k| k == "0 0" || k == "1 1"));
    }

    #[test]
    fn reset_returns_qubit_to_zero() {
        let mut circuit = Circuit::new();
        let q = circuit.add_quantum_register("q", 1);
        let c = circuit.add_classical_register("c", 1);
        circuit.h(q.qubit(0));
        circuit.reset(q.qubit(0));
        circuit.measure(q.qubit(0), c.clbit(0));

        let hist = Simulator::with_seed(11).execute(&circuit, 64).unwrap();
        assert_eq!(hist.get("0"), Some(&64));
    }

    #[test]
    fn seeds_reproduce_histograms() {
        let mut circuit = Circuit::new();
        let q = circuit.add_quantum_register("q", 3);
        let c = circuit.add_classical_register("c", 3);
        for i in 0..3 {
            circuit.h(q.qubit(i));
            circuit.measure(q.qubit(i), c.clbit(i));
        }
        let a = Simulator::with_seed(42).execute(&circuit, 200).unwrap();
        let b = Simulator::with_seed(42).execute(&circuit, 200).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn oversized_circuits_are_rejected() {
        let mut circuit = Circuit::new();
        circuit.add_quantum_register("q", 65);
        assert_eq!(
            Simulator::with_seed(0).execute(&circuit, 1),
            Err(SimError::TooManyQubits {
                requested: 65,
                max: 64
            })
        );
    }
}
