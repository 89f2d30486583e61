//! Circuit recording and the collaborator traits used by the synthesizers.
//!
//! Synthesizers never talk to a simulator directly. They emit gates against a
//! [`CircuitBuilder`], and a separate [`Executor`] turns a finished
//! [`Circuit`] into a [`Histogram`] of classical outcomes.

use crate::isa::{Instruction, Opcode};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Absolute index of a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Qubit(pub usize);

/// Absolute index of a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Clbit(pub usize);

/// Mapping from composite classical bit-string keys to observed counts.
///
/// Keys hold one space-separated segment per classical register, in the
/// order the registers were added. Within a segment, register bit 0 is the
/// rightmost character. Counts over all keys sum to the number of shots.
pub type Histogram = BTreeMap<String, u64>;

/// A named, contiguous block of qubits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantumRegister {
    pub name: String,
    pub start: usize,
    pub size: usize,
}

impl QuantumRegister {
    /// Returns the absolute qubit for register-relative index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is outside the register. Synthesizers validate indices
    /// before emitting gates, so a panic here indicates a logic error.
    #[inline]
    pub fn qubit(&self, i: usize) -> Qubit {
        assert!(i < self.size, "qubit {} out of range for register '{}'", i, self.name);
        Qubit(self.start + i)
    }

    /// Iterates the register's qubits in index order.
    pub fn qubits(&self) -> impl Iterator<Item = Qubit> + '_ {
        (0..self.size).map(|i| Qubit(self.start + i))
    }
}

/// A named, contiguous block of classical bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicalRegister {
    pub name: String,
    pub start: usize,
    pub size: usize,
}

impl ClassicalRegister {
    /// Returns the absolute classical bit for register-relative index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is outside the register.
    #[inline]
    pub fn clbit(&self, i: usize) -> Clbit {
        assert!(i < self.size, "clbit {} out of range for register '{}'", i, self.name);
        Clbit(self.start + i)
    }
}

/// Gate-emission capability consumed by the synthesizers.
///
/// Implementors allocate registers and accept the instruction set defined in
/// [`crate::isa`]. `barrier` is a scheduling hint and may be ignored.
pub trait CircuitBuilder {
    fn add_quantum_register(&mut self, name: &str, size: usize) -> QuantumRegister;
    fn add_classical_register(&mut self, name: &str, size: usize) -> ClassicalRegister;
    fn reset(&mut self, qubit: Qubit);
    fn h(&mut self, qubit: Qubit);
    fn x(&mut self, qubit: Qubit);
    fn z(&mut self, qubit: Qubit);
    fn cx(&mut self, control: Qubit, target: Qubit);
    fn cz(&mut self, control: Qubit, target: Qubit);
    fn ccx(&mut self, control_1: Qubit, control_2: Qubit, target: Qubit);
    fn mcx(&mut self, controls: &[Qubit], target: Qubit);
    fn measure(&mut self, qubit: Qubit, clbit: Clbit);
    fn barrier(&mut self);
}

/// Execution capability: runs a circuit for a number of shots.
///
/// The returned histogram follows the key layout documented on
/// [`Histogram`]; use [`Circuit::format_key`] to build keys.
pub trait Executor {
    type Error;

    fn execute(&mut self, circuit: &Circuit, shots: u64) -> Result<Histogram, Self::Error>;
}

/// Recording circuit builder.
///
/// Stores registers and the instruction stream in emission order. This is
/// the builder the synthesizers use by default and the input accepted by
/// every [`Executor`].
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    quantum_registers: Vec<QuantumRegister>,
    classical_registers: Vec<ClassicalRegister>,
    instructions: Vec<Instruction>,
    num_qubits: usize,
    num_clbits: usize,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn quantum_registers(&self) -> &[QuantumRegister] {
        &self.quantum_registers
    }

    pub fn classical_registers(&self) -> &[ClassicalRegister] {
        &self.classical_registers
    }

    /// Returns the key segment position of the named classical register.
    pub fn segment_index(&self, name: &str) -> Option<usize> {
        self.classical_registers.iter().position(|r| r.name == name)
    }

    /// Counts instructions by opcode, ignoring barriers.
    pub fn count_ops(&self) -> BTreeMap<Opcode, usize> {
        let mut counts = BTreeMap::new();
        for instr in &self.instructions {
            let op = instr.opcode();
            if op != Opcode::Barrier {
                *counts.entry(op).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Formats one shot's classical bits as a histogram key.
    ///
    /// `bits` is indexed by absolute classical bit. Registers appear in
    /// registration order; within each segment bit 0 is printed last.
    pub fn format_key(&self, bits: &[bool]) -> String {
        let mut key = String::with_capacity(self.num_clbits + self.classical_registers.len());
        for (n, reg) in self.classical_registers.iter().enumerate() {
            if n > 0 {
                key.push(' ');
            }
            for i in (0..reg.size).rev() {
                key.push(if bits[reg.start + i] { '1' } else { '0' });
            }
        }
        key
    }

    fn push(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }
}

impl CircuitBuilder for Circuit {
    fn add_quantum_register(&mut self, name: &str, size: usize) -> QuantumRegister {
        let reg = QuantumRegister {
            name: name.to_string(),
            start: self.num_qubits,
            size,
        };
        self.num_qubits += size;
        self.quantum_registers.push(reg.clone());
        reg
    }

    fn add_classical_register(&mut self, name: &str, size: usize) -> ClassicalRegister {
        let reg = ClassicalRegister {
            name: name.to_string(),
            start: self.num_clbits,
            size,
        };
        self.num_clbits += size;
        self.classical_registers.push(reg.clone());
        reg
    }

    fn reset(&mut self, qubit: Qubit) {
        self.push(Instruction::Reset(qubit));
    }

    fn h(&mut self, qubit: Qubit) {
        self.push(Instruction::H(qubit));
    }

    fn x(&mut self, qubit: Qubit) {
        self.push(Instruction::X(qubit));
    }

    fn z(&mut self, qubit: Qubit) {
        self.push(Instruction::Z(qubit));
    }

    fn cx(&mut self, control: Qubit, target: Qubit) {
        self.push(Instruction::CX { control, target });
    }

    fn cz(&mut self, control: Qubit, target: Qubit) {
        self.push(Instruction::CZ { control, target });
    }

    fn ccx(&mut self, control_1: Qubit, control_2: Qubit, target: Qubit) {
        self.push(Instruction::CCX {
            controls: [control_1, control_2],
            target,
        });
    }

    fn mcx(&mut self, controls: &[Qubit], target: Qubit) {
        self.push(Instruction::MCX {
            controls: controls.to_vec(),
            target,
        });
    }

    fn measure(&mut self, qubit: Qubit, clbit: Clbit) {
        self.push(Instruction::Measure { qubit, clbit });
    }

    fn barrier(&mut self) {
        self.push(Instruction::Barrier);
    }
}
