//! Register layout for logical qubits.
//!
//! Each logical qubit owns a data register, X- and Z-type syndrome registers,
//! and optional helper qubits, together with the classical registers that
//! receive their measurements. Classical registers are added in a fixed
//! order, so the same order describes the segments of every histogram key:
//!
//! ```text
//! Z-ancilla rounds | X-ancilla rounds | extra ancilla | data checks | data
//! ```
//!
//! With a single plain measurement round each ancilla type gets one register
//! holding one bit per syndrome row. With fault-tolerant blocks or repeated
//! rounds each (row, round) pair gets its own register holding the whole
//! block. Rows are added highest first, so the row segments read in the same
//! order as the bits of a printed plain register, with rounds innermost.

use qec_common::{CircuitBuilder, ClassicalRegister, Clbit, QuantumRegister, Qubit};

/// Helper qubits reserved for the correction network without
/// multi-controlled gates.
pub const EXTRA_ANCILLA: usize = 4;

/// Goto fault-tolerant preparation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultTolerance {
    #[default]
    None,
    /// Repeated measurement of all data qubits into check registers.
    SchemeB,
    /// One helper qubit checks the logical Z parity, repeated per round.
    SchemeC,
}

/// Options controlling which registers a logical qubit receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterConfig {
    /// Allocate [`EXTRA_ANCILLA`] helpers for correction without MCT gates.
    pub extend_ancilla: bool,
    /// Physical qubits per syndrome qubit; above 1 enables GHZ blocks.
    pub ancilla_block: usize,
    /// Number of classical rounds for ancilla measurement.
    pub ancilla_rounds: usize,
    pub fault_tolerance: FaultTolerance,
    /// Number of data-check rounds for schemes B and C.
    pub check_rounds: usize,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            extend_ancilla: false,
            ancilla_block: 1,
            ancilla_rounds: 1,
            fault_tolerance: FaultTolerance::None,
            check_rounds: 3,
        }
    }
}

impl RegisterConfig {
    /// True when each (row, round) pair gets its own classical register.
    pub fn per_row_segments(&self) -> bool {
        self.ancilla_block > 1 || self.ancilla_rounds > 1
    }
}

/// Syndrome type of an ancilla register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncillaKind {
    /// Checks X-type stabilizers; detects phase flips.
    X,
    /// Checks Z-type stabilizers; detects bit flips.
    Z,
}

/// Quantum and classical registers owned by one logical qubit.
#[derive(Debug, Clone)]
pub struct LogicalQubitRegisters {
    pub data: QuantumRegister,
    pub mx: QuantumRegister,
    pub mz: QuantumRegister,
    pub extra: Option<QuantumRegister>,
    pub helper: Option<QuantumRegister>,
    pub mz_classical: Vec<ClassicalRegister>,
    pub mx_classical: Vec<ClassicalRegister>,
    pub extra_classical: Option<ClassicalRegister>,
    pub check_classical: Vec<ClassicalRegister>,
    pub data_classical: ClassicalRegister,
    rows: usize,
    block: usize,
    rounds: usize,
    per_row: bool,
}

impl LogicalQubitRegisters {
    /// Adds the registers for logical qubit `index` to `builder`.
    pub fn allocate<B: CircuitBuilder>(
        builder: &mut B,
        index: usize,
        num_data: usize,
        num_rows: usize,
        config: &RegisterConfig,
    ) -> Self {
        let block = config.ancilla_block;
        let rounds = config.ancilla_rounds;
        let per_row = config.per_row_segments();

        let data = builder.add_quantum_register(&format!("data {}", index), num_data);
        let mx = builder.add_quantum_register(&format!("ancilla_X {}", index), num_rows * block);
        let mz = builder.add_quantum_register(&format!("ancilla_Z {}", index), num_rows * block);
        let extra = config
            .extend_ancilla
            .then(|| builder.add_quantum_register(&format!("extra_ancilla {}", index), EXTRA_ANCILLA));
        let helper = (config.fault_tolerance == FaultTolerance::SchemeC)
            .then(|| builder.add_quantum_register(&format!("ft_helper {}", index), 1));

        let ancilla_registers = |builder: &mut B, label: &str| -> Vec<ClassicalRegister> {
            let mut regs = Vec::new();
            if per_row {
                for row in (0..num_rows).rev() {
                    for round in 0..rounds {
                        regs.push(builder.add_classical_register(
                            &format!("measure_ancilla_{} {} row {} round {}", label, index, row, round),
                            block,
                        ));
                    }
                }
            } else {
                regs.push(builder.add_classical_register(
                    &format!("measure_ancilla_{} {}", label, index),
                    num_rows,
                ));
            }
            regs
        };
        let mz_classical = ancilla_registers(builder, "Z");
        let mx_classical = ancilla_registers(builder, "X");

        let extra_classical = config.extend_ancilla.then(|| {
            builder.add_classical_register(&format!("measure_extra_ancilla {}", index), EXTRA_ANCILLA)
        });

        let check_width = match config.fault_tolerance {
            FaultTolerance::None => 0,
            FaultTolerance::SchemeB => num_data,
            FaultTolerance::SchemeC => 1,
        };
        let check_classical = if check_width == 0 {
            Vec::new()
        } else {
            (0..config.check_rounds)
                .map(|round| {
                    builder.add_classical_register(
                        &format!("measure_check {} round {}", index, round),
                        check_width,
                    )
                })
                .collect()
        };

        let data_classical =
            builder.add_classical_register(&format!("measure_data {}", index), num_data);

        Self {
            data,
            mx,
            mz,
            extra,
            helper,
            mz_classical,
            mx_classical,
            extra_classical,
            check_classical,
            data_classical,
            rows: num_rows,
            block,
            rounds,
            per_row,
        }
    }

    pub fn block(&self) -> usize {
        self.block
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn ancilla(&self, kind: AncillaKind) -> &QuantumRegister {
        match kind {
            AncillaKind::X => &self.mx,
            AncillaKind::Z => &self.mz,
        }
    }

    /// Physical qubit `copy` of the block measuring syndrome `row`.
    pub fn ancilla_qubit(&self, kind: AncillaKind, row: usize, copy: usize) -> Qubit {
        self.ancilla(kind).qubit(row * self.block + copy)
    }

    /// The block head, which carries the syndrome value after extraction.
    pub fn ancilla_head(&self, kind: AncillaKind, row: usize) -> Qubit {
        self.ancilla_qubit(kind, row, 0)
    }

    /// Classical bit receiving `copy` of syndrome `row` in `round`.
    pub fn ancilla_clbit(&self, kind: AncillaKind, round: usize, row: usize, copy: usize) -> Clbit {
        let regs = match kind {
            AncillaKind::X => &self.mx_classical,
            AncillaKind::Z => &self.mz_classical,
        };
        if self.per_row {
            regs[(self.rows - 1 - row) * self.rounds + round].clbit(copy)
        } else {
            regs[round].clbit(row)
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }
}
