//! Logical-qubit circuit synthesis for the Steane code.
//!
//! [`SteaneCodeLogicalQubit`] owns a [`CircuitBuilder`] and emits every
//! circuit fragment of a logical qubit against it: zero-state preparation,
//! syndrome extraction, the coherent correction network, logical gates,
//! measurement and the decode circuit. All gate sequences are derived from
//! the parity-check matrix; nothing about the Steane layout is hard-coded
//! beyond the qubit counts.

use crate::parity::{
    CodewordSet, ParityCheckMatrix, QubitSyndrome, STEANE_ANCILLA_QUBITS, STEANE_DATA_QUBITS,
};
use crate::registers::{
    AncillaKind, EXTRA_ANCILLA, FaultTolerance, LogicalQubitRegisters, RegisterConfig,
};
use crate::{QecError, Result};
use qec_common::{Circuit, CircuitBuilder, Qubit};
use tracing::debug;

/// Largest number of logical qubits one synthesizer can hold.
pub const MAX_LOGICAL_QUBITS: usize = 2;

/// Toffoli pairs over the weight-2 helpers that accumulate the
/// "all syndromes fired" flag into the last helper.
const WEIGHT_THREE_CHAIN: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// A controlled-X between two data qubits of the preparation circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CxEdge {
    pub control: usize,
    pub target: usize,
}

/// Zero-state preparation derived from a parity-check matrix.
///
/// Every support (weight-1) column is put into superposition and fanned out
/// over the other 1-columns of the row that owns it. `edges` is the CX list
/// in emission order; decoding replays it backwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingPlan {
    pub support: Vec<usize>,
    pub edges: Vec<CxEdge>,
}

impl EncodingPlan {
    /// Derives the preparation circuit, optionally merging redundant pairs.
    ///
    /// With `dedupe`, each pair of rows that shares target columns beyond
    /// both support qubits is examined. The first shared column that belongs
    /// to exactly those two rows becomes a pivot: after the support fan-out
    /// it holds the XOR of both support qubits, so any other shared target
    /// still fed by both supports can take a single CX from the pivot
    /// instead. Pivot edges are emitted after all support edges.
    ///
    /// # Errors
    ///
    /// [`QecError::MatrixAncillaMismatch`] when the support columns do not
    /// give every row exactly one support qubit.
    pub fn from_matrix(matrix: &ParityCheckMatrix, dedupe: bool) -> Result<Self> {
        let support = matrix.support_qubits();
        let rows = matrix.num_rows();
        let row_support: Vec<Option<usize>> =
            (0..rows).map(|row| matrix.support_of_row(row)).collect();
        let owned = row_support.iter().flatten().count();
        if support.len() != rows || owned != rows {
            return Err(QecError::MatrixAncillaMismatch {
                support: support.len(),
                ancilla: rows,
            });
        }

        let mut edges = Vec::new();
        for &s in &support {
            for row in (0..rows).filter(|&r| matrix.entry(r, s)) {
                edges.extend(
                    matrix.rows()[row]
                        .ones()
                        .filter(|&c| c != s)
                        .map(|target| CxEdge { control: s, target }),
                );
            }
        }

        if !dedupe {
            return Ok(Self { support, edges });
        }

        let row_support: Vec<usize> = row_support.into_iter().flatten().collect();
        let mut removed = vec![false; edges.len()];
        let mut pivots = Vec::new();
        for r1 in 0..rows {
            for r2 in (r1 + 1)..rows {
                let (s1, s2) = (row_support[r1], row_support[r2]);
                let floor = s1.max(s2);
                let shared: Vec<usize> = ((floor + 1)..matrix.num_columns())
                    .filter(|&c| matrix.entry(r1, c) && matrix.entry(r2, c))
                    .collect();
                let Some(pivot) = shared
                    .iter()
                    .copied()
                    .find(|&c| (0..rows).all(|r| matrix.entry(r, c) == (r == r1 || r == r2)))
                else {
                    continue;
                };

                for &target in shared.iter().filter(|&&t| t != pivot) {
                    let live = |control: usize| {
                        edges.iter().enumerate().position(|(i, e)| {
                            !removed[i] && e.control == control && e.target == target
                        })
                    };
                    if let (Some(a), Some(b)) = (live(s1), live(s2)) {
                        removed[a] = true;
                        removed[b] = true;
                        pivots.push(CxEdge {
                            control: pivot,
                            target,
                        });
                        debug!(s1, s2, pivot, target, "merged redundant preparation edges");
                    }
                }
            }
        }

        let edges = edges
            .into_iter()
            .zip(removed)
            .filter(|(_, gone)| !gone)
            .map(|(e, _)| e)
            .chain(pivots)
            .collect();
        Ok(Self { support, edges })
    }
}

/// One or two Steane-code logical qubits built on a circuit builder.
///
/// The synthesizer validates the parity-check matrix once at construction
/// and keeps the per-qubit syndrome table for the correction network. All
/// emitting operations take the logical qubit index and fail with
/// [`QecError::Configuration`] when it is out of range.
pub struct SteaneCodeLogicalQubit<B: CircuitBuilder = Circuit> {
    builder: B,
    matrix: ParityCheckMatrix,
    codewords: CodewordSet,
    syndromes: Vec<QubitSyndrome>,
    config: RegisterConfig,
    registers: Vec<LogicalQubitRegisters>,
}

impl<B: CircuitBuilder> SteaneCodeLogicalQubit<B> {
    /// Validates the matrix against the codewords and allocates registers
    /// for `logical_qubits` logical qubits on `builder`.
    pub fn new(
        mut builder: B,
        logical_qubits: usize,
        matrix: ParityCheckMatrix,
        codewords: CodewordSet,
        config: RegisterConfig,
    ) -> Result<Self> {
        if logical_qubits == 0 || logical_qubits > MAX_LOGICAL_QUBITS {
            return Err(QecError::UnsupportedLogicalQubitCount(format!(
                "{} logical qubits requested, between 1 and {} are supported",
                logical_qubits, MAX_LOGICAL_QUBITS
            )));
        }
        if config.extend_ancilla && logical_qubits > 1 {
            return Err(QecError::UnsupportedLogicalQubitCount(
                "extra ancilla can only be set up with one logical qubit".into(),
            ));
        }
        if config.ancilla_rounds == 0 {
            return Err(QecError::Configuration(
                "at least one ancilla round is required".into(),
            ));
        }
        if config.ancilla_block == 0 {
            return Err(QecError::Configuration(
                "ancilla block size must be at least 1".into(),
            ));
        }
        if config.fault_tolerance != FaultTolerance::None && config.check_rounds == 0 {
            return Err(QecError::Configuration(
                "fault-tolerant preparation needs at least one check round".into(),
            ));
        }

        matrix.validate(&codewords, STEANE_DATA_QUBITS, STEANE_ANCILLA_QUBITS)?;
        let syndromes = matrix.qubit_syndromes();

        let registers = (0..logical_qubits)
            .map(|index| {
                LogicalQubitRegisters::allocate(
                    &mut builder,
                    index,
                    matrix.num_columns(),
                    matrix.num_rows(),
                    &config,
                )
            })
            .collect();

        debug!(
            logical_qubits,
            block = config.ancilla_block,
            rounds = config.ancilla_rounds,
            "allocated logical qubit registers"
        );

        Ok(Self {
            builder,
            matrix,
            codewords,
            syndromes,
            config,
            registers,
        })
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// Direct access for gates outside the logical vocabulary, such as
    /// faults placed on individual ancilla.
    pub fn builder_mut(&mut self) -> &mut B {
        &mut self.builder
    }

    /// Releases the builder, typically to hand the circuit to an executor.
    pub fn into_builder(self) -> B {
        self.builder
    }

    pub fn matrix(&self) -> &ParityCheckMatrix {
        &self.matrix
    }

    /// The logical-zero codeword set supplied at construction.
    pub fn codewords(&self) -> &CodewordSet {
        &self.codewords
    }

    pub fn config(&self) -> &RegisterConfig {
        &self.config
    }

    pub fn registers(&self, logical: usize) -> Result<&LogicalQubitRegisters> {
        lookup(&self.registers, logical)
    }

    /// Resets the data qubits and emits the zero-state preparation.
    pub fn prepare_logical_zero(&mut self, logical: usize, dedupe: bool) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        let plan = EncodingPlan::from_matrix(&self.matrix, dedupe)?;
        let b = &mut self.builder;

        for q in regs.data.qubits() {
            b.reset(q);
        }
        for &s in &plan.support {
            b.h(regs.data.qubit(s));
        }
        for e in &plan.edges {
            b.cx(regs.data.qubit(e.control), regs.data.qubit(e.target));
        }
        debug!(logical, dedupe, cx = plan.edges.len(), "prepared logical zero");
        Ok(())
    }

    pub fn prepare_logical_one(&mut self, logical: usize, dedupe: bool) -> Result<()> {
        self.prepare_logical_zero(logical, dedupe)?;
        self.logical_x(logical)
    }

    /// Undoes zero-state preparation: the edges in reverse, then the
    /// support Hadamards.
    pub fn decode(&mut self, logical: usize, dedupe: bool) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        let plan = EncodingPlan::from_matrix(&self.matrix, dedupe)?;
        let b = &mut self.builder;

        for e in plan.edges.iter().rev() {
            b.cx(regs.data.qubit(e.control), regs.data.qubit(e.target));
        }
        for &s in &plan.support {
            b.h(regs.data.qubit(s));
        }
        Ok(())
    }

    /// Emits syndrome extraction for both stabilizer types.
    ///
    /// X-type ancilla couple to the data through CX and detect phase flips;
    /// Z-type ancilla couple through CZ and detect bit flips. With an
    /// ancilla block above 1 each syndrome qubit is a GHZ block: the data
    /// couplings are spread round-robin over the block and the syndrome is
    /// folded back onto the block head.
    pub fn set_up_ancilla(&mut self, logical: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        let b = &mut self.builder;
        let rows = self.matrix.rows();

        for q in regs.mx.qubits().chain(regs.mz.qubits()) {
            b.reset(q);
        }

        let block = regs.block();
        if block == 1 {
            for q in regs.mx.qubits().chain(regs.mz.qubits()) {
                b.h(q);
            }
            b.barrier();
            for (r, row) in rows.iter().enumerate() {
                for c in row.ones() {
                    b.cx(regs.ancilla_head(AncillaKind::X, r), regs.data.qubit(c));
                }
            }
            b.barrier();
            for (r, row) in rows.iter().enumerate() {
                for c in row.ones() {
                    b.cz(regs.ancilla_head(AncillaKind::Z, r), regs.data.qubit(c));
                }
            }
            b.barrier();
            for q in regs.mx.qubits().chain(regs.mz.qubits()) {
                b.h(q);
            }
            return Ok(());
        }

        for kind in [AncillaKind::X, AncillaKind::Z] {
            for (r, row) in rows.iter().enumerate() {
                let copy = |i: usize| regs.ancilla_qubit(kind, r, i);
                b.h(copy(0));
                for i in 1..block {
                    b.cx(copy(i - 1), copy(i));
                }
                for (n, c) in row.ones().enumerate() {
                    let control = copy(n % block);
                    let target = regs.data.qubit(c);
                    match kind {
                        AncillaKind::X => b.cx(control, target),
                        AncillaKind::Z => b.cz(control, target),
                    }
                }
                for i in (1..block).rev() {
                    b.cx(copy(i - 1), copy(i));
                }
                b.h(copy(0));
            }
            b.barrier();
        }
        Ok(())
    }

    /// Emits the coherent correction network driven by the ancilla heads.
    ///
    /// Without multi-controlled gates the network follows syndrome weight:
    /// weight-1 qubits are corrected straight from their ancilla, weight-2
    /// qubits through a Toffoli-loaded helper that also re-triggers any
    /// weight-1 correction sharing one of its bits, and the weight-3 qubit
    /// through a fourth helper that flips every data qubit. The last step
    /// relies on the weight-2 helpers covering an odd number of flips on
    /// every other qubit, which holds for the Steane matrix. Every helper is
    /// loaded from the Z ancilla, so this network repairs bit flips only: the
    /// CZ a weight-2 helper fires after a flip on that qubit completes a
    /// logical Z rather than a stabilizer. Use `use_mct` when phase flips
    /// must be corrected.
    ///
    /// With `use_mct` each data qubit gets one multi-controlled X over the
    /// Z heads and one Hadamard-sandwiched multi-controlled X over the X
    /// heads, with the zero bits of its syndrome temporarily inverted.
    pub fn correct_errors(&mut self, logical: usize, use_mct: bool) -> Result<()> {
        if use_mct {
            self.correct_with_mct(logical)
        } else {
            self.correct_with_helpers(logical)
        }
    }

    fn correct_with_mct(&mut self, logical: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        let b = &mut self.builder;
        let rows = regs.num_rows();

        for syndrome in &self.syndromes {
            let target = regs.data.qubit(syndrome.qubit);
            let zero_rows: Vec<usize> = (0..rows)
                .filter(|r| !syndrome.ancilla_bits.contains(r))
                .collect();
            for kind in [AncillaKind::Z, AncillaKind::X] {
                let heads: Vec<Qubit> = (0..rows).map(|r| regs.ancilla_head(kind, r)).collect();
                for &r in &zero_rows {
                    b.x(heads[r]);
                }
                if kind == AncillaKind::X {
                    b.h(target);
                }
                b.mcx(&heads, target);
                if kind == AncillaKind::X {
                    b.h(target);
                }
                for &r in &zero_rows {
                    b.x(heads[r]);
                }
            }
        }
        Ok(())
    }

    /// Bit-flip correction through the extra helpers; see [`Self::correct_errors`].
    fn correct_with_helpers(&mut self, logical: usize) -> Result<()> {
        if logical != 0 {
            return Err(QecError::UnsupportedLogicalQubitCount(
                "errors can only be corrected on logical qubit 0 without multi-controlled gates"
                    .into(),
            ));
        }
        let regs = lookup(&self.registers, logical)?;
        let Some(extra) = regs.extra.as_ref() else {
            return Err(QecError::Configuration(
                "extra ancilla are needed to correct errors without multi-controlled gates".into(),
            ));
        };
        if let Some(s) = self.syndromes.iter().find(|s| !(1..=3).contains(&s.weight)) {
            return Err(QecError::Configuration(format!(
                "data qubit {} has syndrome weight {}, only 1 to 3 can be corrected",
                s.qubit, s.weight
            )));
        }

        let by_weight = |w: usize| -> Vec<&QubitSyndrome> {
            self.syndromes.iter().filter(|s| s.weight == w).collect()
        };
        let weight_one = by_weight(1);
        let weight_two = by_weight(2);
        let weight_three = by_weight(3);
        if weight_two.len() >= EXTRA_ANCILLA {
            return Err(QecError::Configuration(format!(
                "{} weight-2 qubits need more than {} helpers",
                weight_two.len(),
                EXTRA_ANCILLA - 1
            )));
        }
        if !weight_three.is_empty() && (weight_three.len() > 1 || weight_two.len() != 3) {
            return Err(QecError::Configuration(
                "weight-3 correction needs exactly one weight-3 qubit and three weight-2 helpers"
                    .into(),
            ));
        }

        let b = &mut self.builder;
        let z_head = |r: usize| regs.ancilla_head(AncillaKind::Z, r);
        let x_head = |r: usize| regs.ancilla_head(AncillaKind::X, r);
        let data = |q: usize| regs.data.qubit(q);

        let mut retrigger: Vec<(usize, usize)> = Vec::new();
        for s in &weight_one {
            let bit = s.ancilla_bits[0];
            b.cx(z_head(bit), data(s.qubit));
            b.cz(x_head(bit), data(s.qubit));
            retrigger.push((s.qubit, bit));
        }

        for (i, s) in weight_two.iter().enumerate() {
            let (b1, b2) = (s.ancilla_bits[0], s.ancilla_bits[1]);
            let helper = extra.qubit(i);
            b.ccx(z_head(b1), z_head(b2), helper);
            b.cx(helper, data(s.qubit));
            b.cz(helper, data(s.qubit));
            for &(other, bit) in retrigger.iter().filter(|(_, bit)| *bit == b1 || *bit == b2) {
                debug!(qubit = s.qubit, other, bit, "re-triggering weight-1 correction");
                b.cx(helper, data(other));
                b.cz(helper, data(other));
            }
        }

        if !weight_three.is_empty() {
            let top = extra.qubit(EXTRA_ANCILLA - 1);
            for (h1, h2) in WEIGHT_THREE_CHAIN {
                b.ccx(extra.qubit(h1), extra.qubit(h2), top);
            }
            for q in regs.data.qubits() {
                b.cx(top, q);
                b.cz(top, q);
            }
            for (h1, h2) in WEIGHT_THREE_CHAIN {
                b.ccx(extra.qubit(h1), extra.qubit(h2), top);
            }
        }

        for (i, s) in weight_two.iter().enumerate() {
            b.ccx(
                z_head(s.ancilla_bits[0]),
                z_head(s.ancilla_bits[1]),
                extra.qubit(i),
            );
        }
        Ok(())
    }

    /// Injects a bit flip on one data qubit.
    pub fn force_x_error(&mut self, logical: usize, physical: usize) -> Result<()> {
        let q = self.data_qubit(logical, physical)?;
        self.builder.x(q);
        Ok(())
    }

    /// Injects a phase flip on one data qubit.
    pub fn force_z_error(&mut self, logical: usize, physical: usize) -> Result<()> {
        let q = self.data_qubit(logical, physical)?;
        self.builder.z(q);
        Ok(())
    }

    pub fn logical_x(&mut self, logical: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        for q in regs.data.qubits() {
            self.builder.x(q);
        }
        Ok(())
    }

    pub fn logical_h(&mut self, logical: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        for q in regs.data.qubits() {
            self.builder.h(q);
        }
        Ok(())
    }

    pub fn logical_z(&mut self, logical: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        for q in regs.data.qubits() {
            self.builder.z(q);
        }
        Ok(())
    }

    /// Transversal CX between two different logical qubits.
    pub fn logical_cx(&mut self, control: usize, target: usize) -> Result<()> {
        if control == target {
            return Err(QecError::Configuration(
                "control and target of a logical CX must differ".into(),
            ));
        }
        let c = lookup(&self.registers, control)?;
        let t = lookup(&self.registers, target)?;
        for (cq, tq) in c.data.qubits().zip(t.data.qubits()) {
            self.builder.cx(cq, tq);
        }
        Ok(())
    }

    /// Measures every ancilla qubit, block copies included, into `round`.
    pub fn measure_ancilla(&mut self, logical: usize, round: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        if round >= regs.rounds() {
            return Err(QecError::Configuration(format!(
                "ancilla round {} requested, only {} allocated",
                round,
                regs.rounds()
            )));
        }
        for kind in [AncillaKind::Z, AncillaKind::X] {
            for row in 0..regs.num_rows() {
                for copy in 0..regs.block() {
                    self.builder.measure(
                        regs.ancilla_qubit(kind, row, copy),
                        regs.ancilla_clbit(kind, round, row, copy),
                    );
                }
            }
        }
        Ok(())
    }

    pub fn measure_data(&mut self, logical: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        for (i, q) in regs.data.qubits().enumerate() {
            self.builder.measure(q, regs.data_classical.clbit(i));
        }
        Ok(())
    }

    /// Measures ancilla round 0, the extra helpers if any, then the data.
    pub fn logical_measure(&mut self, logical: usize) -> Result<()> {
        self.measure_ancilla(logical, 0)?;
        let regs = lookup(&self.registers, logical)?;
        if let (Some(extra), Some(classical)) = (&regs.extra, &regs.extra_classical) {
            for (i, q) in extra.qubits().enumerate() {
                self.builder.measure(q, classical.clbit(i));
            }
        }
        self.measure_data(logical)
    }

    /// Goto scheme C: copies the logical Z parity onto the helper qubit and
    /// measures it into check `round`. A logical zero reads 0.
    pub fn check_logical_zero(&mut self, logical: usize, round: usize) -> Result<()> {
        let regs = lookup(&self.registers, logical)?;
        let Some(helper) = regs.helper.as_ref() else {
            return Err(QecError::Configuration(
                "scheme C check needs the fault-tolerant helper qubit".into(),
            ));
        };
        let check = check_register(regs, round)?;
        let helper = helper.qubit(0);

        self.builder.reset(helper);
        for bit in self.matrix.simple_parity_bits() {
            self.builder.cx(regs.data.qubit(bit), helper);
        }
        self.builder.measure(helper, check.clbit(0));
        Ok(())
    }

    /// Goto scheme B: measures all data qubits into check `round`.
    pub fn measure_data_check(&mut self, logical: usize, round: usize) -> Result<()> {
        if self.config.fault_tolerance != FaultTolerance::SchemeB {
            return Err(QecError::Configuration(
                "data check rounds are only allocated for scheme B".into(),
            ));
        }
        let regs = lookup(&self.registers, logical)?;
        let check = check_register(regs, round)?;
        for (i, q) in regs.data.qubits().enumerate() {
            self.builder.measure(q, check.clbit(i));
        }
        Ok(())
    }

    fn data_qubit(&self, logical: usize, physical: usize) -> Result<Qubit> {
        let regs = lookup(&self.registers, logical)?;
        if physical >= regs.data.size {
            return Err(QecError::Configuration(format!(
                "physical qubit {} is outside the {} data qubits",
                physical, regs.data.size
            )));
        }
        Ok(regs.data.qubit(physical))
    }
}

fn lookup(registers: &[LogicalQubitRegisters], logical: usize) -> Result<&LogicalQubitRegisters> {
    registers.get(logical).ok_or_else(|| {
        QecError::Configuration(format!(
            "logical qubit {} does not exist, {} allocated",
            logical,
            registers.len()
        ))
    })
}

fn check_register(
    regs: &LogicalQubitRegisters,
    round: usize,
) -> Result<&qec_common::ClassicalRegister> {
    regs.check_classical.get(round).ok_or_else(|| {
        QecError::Configuration(format!(
            "check round {} requested, {} allocated",
            round,
            regs.check_classical.len()
        ))
    })
}
