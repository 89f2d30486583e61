//! Common definitions shared across the error-correction workspace.
//!
//! This crate provides the gate instruction set emitted by the circuit
//! synthesizers, the qubit and classical-bit addressing types, the recording
//! circuit used as the default builder, and the two collaborator traits
//! (circuit building and execution) that decouple synthesis from any
//! particular simulator.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod circuit;

pub use circuit::{
    Circuit, CircuitBuilder, ClassicalRegister, Clbit, Executor, Histogram, QuantumRegister, Qubit,
};

/// Instruction set for the circuits produced by the synthesizers.
///
/// Defines the gate vocabulary that every circuit builder must accept. The
/// set is deliberately small: single-qubit Hadamard and Pauli gates, the
/// controlled gates used for syndrome extraction and correction, resets,
/// measurements, and scheduling barriers. All gates in the set have real
/// matrix entries, which lets simulators work with real amplitudes.
pub mod isa {
    use crate::circuit::{Clbit, Qubit};
    use alloc::vec::Vec;

    /// Opcode enumeration for circuit instructions.
    ///
    /// Used to tally gate counts and to dispatch on the kind of instruction
    /// without inspecting its operands. The numeric values group single-qubit
    /// gates, controlled gates, and non-unitary operations.
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum Opcode {
        /// Hadamard gate.
        ///
        /// Maps the Z basis onto the X basis. Used to seed superpositions on
        /// support qubits and to open and close syndrome extraction.
        GateH = 0x01,

        /// Pauli X (bit flip).
        GateX = 0x02,

        /// Pauli Z (phase flip).
        GateZ = 0x03,

        /// Controlled-NOT with one control and one target.
        GateCX = 0x10,

        /// Controlled-Z with one control and one target.
        GateCZ = 0x11,

        /// Toffoli gate with two controls and one target.
        GateCCX = 0x12,

        /// Multi-controlled X with an arbitrary control list.
        GateMCX = 0x13,

        /// Projective Z-basis measurement into a classical bit.
        Measure = 0x20,

        /// Reset a qubit to |0⟩.
        Reset = 0x30,

        /// Scheduling hint with no semantic effect.
        Barrier = 0xFF,
    }

    /// One circuit instruction with its operands.
    ///
    /// Operands are absolute qubit and classical-bit indices within the
    /// circuit that recorded the instruction. Multi-controlled gates carry
    /// their control list inline.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Instruction {
        H(Qubit),
        X(Qubit),
        Z(Qubit),
        CX { control: Qubit, target: Qubit },
        CZ { control: Qubit, target: Qubit },
        CCX { controls: [Qubit; 2], target: Qubit },
        MCX { controls: Vec<Qubit>, target: Qubit },
        Measure { qubit: Qubit, clbit: Clbit },
        Reset(Qubit),
        Barrier,
    }

    impl Instruction {
        /// Returns the opcode identifying this instruction's kind.
        pub fn opcode(&self) -> Opcode {
            match self {
                Instruction::H(_) => Opcode::GateH,
                Instruction::X(_) => Opcode::GateX,
                Instruction::Z(_) => Opcode::GateZ,
                Instruction::CX { .. } => Opcode::GateCX,
                Instruction::CZ { .. } => Opcode::GateCZ,
                Instruction::CCX { .. } => Opcode::GateCCX,
                Instruction::MCX { .. } => Opcode::GateMCX,
                Instruction::Measure { .. } => Opcode::Measure,
                Instruction::Reset(_) => Opcode::Reset,
                Instruction::Barrier => Opcode::Barrier,
            }
        }
    }
}
