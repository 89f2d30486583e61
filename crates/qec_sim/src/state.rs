//! Sparse real-amplitude state vector.
//!
//! Basis states are stored as `u64` keys with bit `q` holding qubit `q`.
//! Only non-zero amplitudes are kept. Every gate of the instruction set has
//! real matrix entries, so `f64` amplitudes are exact up to rounding.

use qec_common::Qubit;
use qec_common::isa::Instruction;
use std::collections::HashMap;
use std::f64::consts::FRAC_1_SQRT_2;

/// Amplitudes below this magnitude are dropped after interference.
const PRUNE_EPSILON: f64 = 1e-12;

/// Outcome probabilities within this distance of 0 or 1 are treated as
/// certain.
pub const CERTAINTY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct StateVector {
    amplitudes: HashMap<u64, f64>,
}

#[inline]
fn mask(q: Qubit) -> u64 {
    1u64 << q.0
}

impl StateVector {
    /// The all-zero basis state.
    pub fn new() -> Self {
        let mut amplitudes = HashMap::new();
        amplitudes.insert(0, 1.0);
        Self { amplitudes }
    }

    /// Number of basis states with non-zero amplitude.
    pub fn support_size(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn amplitude(&self, basis: u64) -> f64 {
        self.amplitudes.get(&basis).copied().unwrap_or(0.0)
    }

    /// Applies a unitary instruction. Measurements and resets are ignored
    /// here; see [`StateVector::collapse`].
    pub fn apply(&mut self, instr: &Instruction) {
        match instr {
            Instruction::H(q) => self.hadamard(*q),
            Instruction::X(q) => self.permute(|k| k ^ mask(*q)),
            Instruction::Z(q) => self.phase(|k| k & mask(*q) != 0),
            Instruction::CX { control, target } => {
                let (c, t) = (mask(*control), mask(*target));
                self.permute(|k| if k & c != 0 { k ^ t } else { k });
            }
            Instruction::CZ { control, target } => {
                let both = mask(*control) | mask(*target);
                self.phase(|k| k & both == both);
            }
            Instruction::CCX { controls, target } => {
                let c = mask(controls[0]) | mask(controls[1]);
                let t = mask(*target);
                self.permute(|k| if k & c == c { k ^ t } else { k });
            }
            Instruction::MCX { controls, target } => {
                let c = controls.iter().fold(0, |acc, &q| acc | mask(q));
                let t = mask(*target);
                self.permute(|k| if k & c == c { k ^ t } else { k });
            }
            Instruction::Measure { .. } | Instruction::Reset(_) | Instruction::Barrier => {}
        }
    }

    /// Probability of reading 1 on `q`.
    pub fn probability_one(&self, q: Qubit) -> f64 {
        let m = mask(q);
        self.amplitudes
            .iter()
            .filter(|(k, _)| *k & m != 0)
            .map(|(_, a)| a * a)
            .sum()
    }

    /// Projects `q` onto `outcome` and renormalises.
    pub fn collapse(&mut self, q: Qubit, outcome: bool) {
        let m = mask(q);
        self.amplitudes.retain(|k, _| (*k & m != 0) == outcome);
        let norm: f64 = self.amplitudes.values().map(|a| a * a).sum::<f64>().sqrt();
        if norm > 0.0 {
            for a in self.amplitudes.values_mut() {
                *a /= norm;
            }
        }
    }

    /// Basis states with their probabilities, sorted by basis index.
    pub fn distribution(&self) -> Vec<(u64, f64)> {
        let mut dist: Vec<(u64, f64)> = self.amplitudes.iter().map(|(&k, &a)| (k, a * a)).collect();
        dist.sort_unstable_by_key(|&(k, _)| k);
        dist
    }

    fn permute(&mut self, f: impl Fn(u64) -> u64) {
        let old = std::mem::take(&mut self.amplitudes);
        self.amplitudes = old.into_iter().map(|(k, a)| (f(k), a)).collect();
    }

    fn phase(&mut self, negate: impl Fn(u64) -> bool) {
        for (k, a) in self.amplitudes.iter_mut() {
            if negate(*k) {
                *a = -*a;
            }
        }
    }

    fn hadamard(&mut self, q: Qubit) {
        let m = mask(q);
        let old = std::mem::take(&mut self.amplitudes);
        let mut next: HashMap<u64, f64> = HashMap::with_capacity(old.len() * 2);
        for (k, a) in old {
            let a = a * FRAC_1_SQRT_2;
            let sign = if k & m != 0 { -1.0 } else { 1.0 };
            *next.entry(k & !m).or_insert(0.0) += a;
            *next.entry(k | m).or_insert(0.0) += sign * a;
        }
        next.retain(|_, a| a.abs() > PRUNE_EPSILON);
        self.amplitudes = next;
    }
}

impl Default for StateVector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hadamard_twice_is_identity() {
        let mut s = StateVector::new();
        s.apply(&Instruction::H(Qubit(3)));
        assert_eq!(s.support_size(), 2);
        s.apply(&Instruction::H(Qubit(3)));
        assert_eq!(s.support_size(), 1);
        assert!((s.amplitude(0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bell_pair_probabilities() {
        let mut s = StateVector::new();
        s.apply(&Instruction::H(Qubit(0)));
        s.apply(&Instruction::CX {
            control: Qubit(0),
            target: Qubit(1),
        });
        assert!((s.probability_one(Qubit(1)) - 0.5).abs() < 1e-12);
        s.collapse(Qubit(0), true);
        assert!((s.probability_one(Qubit(1)) - 1.0).abs() < 1e-12);
        assert!((s.amplitude(0b11) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn phase_kickback_through_cz() {
        // H CZ H on the control reads the Z parity of the target
        let mut s = StateVector::new();
        s.apply(&Instruction::X(Qubit(1)));
        s.apply(&Instruction::H(Qubit(0)));
        s.apply(&Instruction::CZ {
            control: Qubit(0),
            target: Qubit(1),
        });
        s.apply(&Instruction::H(Qubit(0)));
        assert!((s.probability_one(Qubit(0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mcx_needs_every_control() {
        let mut s = StateVector::new();
        let mcx = Instruction::MCX {
            controls: vec![Qubit(0), Qubit(1), Qubit(2)],
            target: Qubit(3),
        };
        s.apply(&Instruction::X(Qubit(0)));
        s.apply(&Instruction::X(Qubit(2)));
        s.apply(&mcx);
        assert_eq!(s.probability_one(Qubit(3)), 0.0);
        s.apply(&Instruction::X(Qubit(1)));
        s.apply(&mcx);
        assert_eq!(s.probability_one(Qubit(3)), 1.0);
    }
}
