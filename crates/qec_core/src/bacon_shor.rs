//! Bacon-Shor code logical qubits.
//!
//! Data qubits form a `blocks x blocks` grid stored row-major, so qubit
//! `row * blocks + column`. Z-type gauge checks compare adjacent rows and
//! X-type checks compare adjacent columns. The ancilla register holds the
//! Z-check qubits first, followed by the X-check qubits.

use crate::logical_qubit::MAX_LOGICAL_QUBITS;
use crate::{QecError, Result};
use qec_common::{Circuit, CircuitBuilder, ClassicalRegister, QuantumRegister, Qubit};
use tracing::debug;

/// Shape and initial state of a Bacon-Shor logical qubit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaconShorConfig {
    pub data_qubits: usize,
    /// Size of the ancilla register per logical qubit.
    pub ancilla_qubits: usize,
    /// Number of checks per stabilizer type.
    pub ancillas: usize,
    pub blocks: usize,
    /// Prepare logical one instead of logical zero (non fault-tolerant
    /// encoding only).
    pub logical_one: bool,
    /// Rotate the fault-tolerant encoding into the Z basis.
    pub logical_z: bool,
}

impl Default for BaconShorConfig {
    fn default() -> Self {
        Self {
            data_qubits: 9,
            ancilla_qubits: 4,
            ancillas: 2,
            blocks: 3,
            logical_one: false,
            logical_z: false,
        }
    }
}

#[derive(Debug, Clone)]
struct BaconShorRegisters {
    data: QuantumRegister,
    ancilla: QuantumRegister,
    data_classical: ClassicalRegister,
    ancilla_classical: ClassicalRegister,
}

/// One or two Bacon-Shor logical qubits built on a circuit builder.
pub struct BaconShorLogicalQubit<B: CircuitBuilder = Circuit> {
    builder: B,
    config: BaconShorConfig,
    registers: Vec<BaconShorRegisters>,
}

impl<B: CircuitBuilder> BaconShorLogicalQubit<B> {
    /// Checks the grid shape and allocates registers. Per logical qubit the
    /// classical registers are added as data, then ancilla.
    pub fn new(mut builder: B, logical_qubits: usize, config: BaconShorConfig) -> Result<Self> {
        if logical_qubits == 0 || logical_qubits > MAX_LOGICAL_QUBITS {
            return Err(QecError::UnsupportedLogicalQubitCount(format!(
                "{} Bacon-Shor logical qubits requested, between 1 and {} are supported",
                logical_qubits, MAX_LOGICAL_QUBITS
            )));
        }
        if config.blocks < 2 || config.data_qubits != config.blocks * config.blocks {
            return Err(QecError::Configuration(format!(
                "{} data qubits do not form a square grid of {} blocks",
                config.data_qubits, config.blocks
            )));
        }
        if config.ancillas == 0 || config.ancillas >= config.blocks {
            return Err(QecError::Configuration(format!(
                "{} checks per type do not fit {} blocks",
                config.ancillas, config.blocks
            )));
        }
        if config.ancilla_qubits < 2 * config.ancillas {
            return Err(QecError::Configuration(format!(
                "{} ancilla qubits cannot hold {} checks of each type",
                config.ancilla_qubits, config.ancillas
            )));
        }

        let mut registers = Vec::with_capacity(logical_qubits);
        for index in 0..logical_qubits {
            let data = builder.add_quantum_register(&format!("data {}", index), config.data_qubits);
            let ancilla =
                builder.add_quantum_register(&format!("ancilla {}", index), config.ancilla_qubits);
            let data_classical = builder
                .add_classical_register(&format!("measure_data {}", index), config.data_qubits);
            let ancilla_classical = builder.add_classical_register(
                &format!("measure_ancilla {}", index),
                config.ancilla_qubits,
            );
            registers.push(BaconShorRegisters {
                data,
                ancilla,
                data_classical,
                ancilla_classical,
            });
        }

        Ok(Self {
            builder,
            config,
            registers,
        })
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn into_builder(self) -> B {
        self.builder
    }

    pub fn config(&self) -> &BaconShorConfig {
        &self.config
    }

    /// Non fault-tolerant encoding: fans the first qubit out to the first
    /// qubit of every other row.
    pub fn encoding_nft(&mut self, logical: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        let b = &mut self.builder;
        for q in regs.data.qubits() {
            b.reset(q);
        }
        if self.config.logical_one {
            b.x(regs.data.qubit(0));
        }
        for row in 1..self.config.blocks {
            b.cx(regs.data.qubit(0), regs.data.qubit(row * self.config.blocks));
        }
        b.barrier();
        Ok(())
    }

    /// Fault-tolerant encoding: every row becomes a GHZ state, rotated into
    /// the Z basis when `logical_z` is set.
    pub fn encoding_ft(&mut self, logical: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        let b = &mut self.builder;
        let width = self.config.blocks;
        for row in 0..self.config.blocks {
            let first = regs.data.qubit(row * width);
            b.h(first);
            for col in 1..width {
                b.cx(first, regs.data.qubit(row * width + col));
            }
            if self.config.logical_z {
                for col in 0..width {
                    b.h(regs.data.qubit(row * width + col));
                }
            }
        }
        b.barrier();
        Ok(())
    }

    pub fn force_x_error(&mut self, logical: usize, physical: usize) -> Result<()> {
        let q = self.data_qubit(logical, physical)?;
        self.builder.x(q);
        self.builder.barrier();
        Ok(())
    }

    pub fn force_z_error(&mut self, logical: usize, physical: usize) -> Result<()> {
        let q = self.data_qubit(logical, physical)?;
        self.builder.z(q);
        self.builder.barrier();
        Ok(())
    }

    /// X-type checks: ancilla `ancillas + a` measures X on columns `a` and
    /// `a + 1` of every row.
    pub fn x_stabilizers(&mut self, logical: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        let b = &mut self.builder;
        let blocks = self.config.blocks;
        for a in 0..self.config.ancillas {
            let anc = regs.ancilla.qubit(a + self.config.ancillas);
            b.h(anc);
            for row in 0..blocks {
                b.cx(anc, regs.data.qubit(row * blocks + a));
                b.cx(anc, regs.data.qubit(row * blocks + a + 1));
            }
            b.h(anc);
        }
        b.barrier();
        Ok(())
    }

    /// Z-type checks: ancilla `a` accumulates the parity of rows `a` and
    /// `a + 1`.
    pub fn z_stabilizers(&mut self, logical: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        let b = &mut self.builder;
        let blocks = self.config.blocks;
        for a in 0..self.config.ancillas {
            let anc = regs.ancilla.qubit(a);
            for col in 0..blocks {
                b.cx(regs.data.qubit(col + blocks * a), anc);
                b.cx(regs.data.qubit(col + blocks * (a + 1)), anc);
            }
        }
        b.barrier();
        Ok(())
    }

    pub fn logical_measure(&mut self, logical: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        for (i, q) in regs.data.qubits().enumerate() {
            self.builder.measure(q, regs.data_classical.clbit(i));
        }
        for (i, q) in regs.ancilla.qubits().enumerate() {
            self.builder.measure(q, regs.ancilla_classical.clbit(i));
        }
        debug!(logical, "measured Bacon-Shor logical qubit");
        Ok(())
    }

    fn data_qubit(&self, logical: usize, physical: usize) -> Result<Qubit> {
        let regs = lookup(&self.registers, logical)?;
        if physical >= self.config.data_qubits {
            return Err(QecError::Configuration(format!(
                "physical qubit {} is outside the {} data qubits",
                physical, self.config.data_qubits
            )));
        }
        Ok(regs.data.qubit(physical))
    }
}

fn lookup(registers: &[BaconShorRegisters], logical: usize) -> Result<&BaconShorRegisters> {
    registers.get(logical).ok_or_else(|| {
        QecError::Configuration(format!(
            "logical qubit {} does not exist, {} allocated",
            logical,
            registers.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qec_common::isa::Opcode;

    fn ops(qubit: &BaconShorLogicalQubit, op: Opcode) -> usize {
        qubit.builder().count_ops().get(&op).copied().unwrap_or(0)
    }

    #[test]
    fn shape_is_validated() {
        assert!(matches!(
            BaconShorLogicalQubit::new(Circuit::new(), 3, BaconShorConfig::default()),
            Err(QecError::UnsupportedLogicalQubitCount(_))
        ));
        let ragged = BaconShorConfig {
            data_qubits: 8,
            ..BaconShorConfig::default()
        };
        assert!(matches!(
            BaconShorLogicalQubit::new(Circuit::new(), 1, ragged),
            Err(QecError::Configuration(_))
        ));
        let crowded = BaconShorConfig {
            ancilla_qubits: 3,
            ..BaconShorConfig::default()
        };
        assert!(matches!(
            BaconShorLogicalQubit::new(Circuit::new(), 1, crowded),
            Err(QecError::Configuration(_))
        ));
    }

    #[test]
    fn register_order_is_data_then_ancilla() {
        let qubit = BaconShorLogicalQubit::new(Circuit::new(), 2, BaconShorConfig::default())
            .unwrap();
        let circuit = qubit.into_builder();
        assert_eq!(circuit.num_qubits(), 26);
        assert_eq!(circuit.segment_index("measure_data 0"), Some(0));
        assert_eq!(circuit.segment_index("measure_ancilla 0"), Some(1));
        assert_eq!(circuit.segment_index("measure_ancilla 1"), Some(3));
    }

    #[test]
    fn encodings_emit_expected_gates() {
        let config = BaconShorConfig {
            logical_one: true,
            logical_z: true,
            ..BaconShorConfig::default()
        };
        let mut qubit = BaconShorLogicalQubit::new(Circuit::new(), 1, config).unwrap();
        qubit.encoding_nft(0).unwrap();
        assert_eq!(ops(&qubit, Opcode::GateX), 1);
        assert_eq!(ops(&qubit, Opcode::GateCX), 2);
        qubit.encoding_ft(0).unwrap();
        assert_eq!(ops(&qubit, Opcode::GateCX), 8);
        assert_eq!(ops(&qubit, Opcode::GateH), 12);
    }

    #[test]
    fn stabilizers_touch_two_lines_each() {
        let mut qubit =
            BaconShorLogicalQubit::new(Circuit::new(), 1, BaconShorConfig::default()).unwrap();
        qubit.x_stabilizers(0).unwrap();
        assert_eq!(ops(&qubit, Opcode::GateH), 4);
        assert_eq!(ops(&qubit, Opcode::GateCX), 12);
        qubit.z_stabilizers(0).unwrap();
        assert_eq!(ops(&qubit, Opcode::GateCX), 24);
        assert!(qubit.force_x_error(0, 9).is_err());
        assert!(qubit.x_stabilizers(1).is_err());
    }
}
