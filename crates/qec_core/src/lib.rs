//! Core error-correction synthesis and decoding algorithms.
//!
//! This crate derives encoding, syndrome-extraction, and correction circuits
//! from a binary parity-check matrix, and provides the classical pipeline
//! that corrects and classifies the measured outcomes. Circuits are emitted
//! against the [`qec_common::CircuitBuilder`] trait so the algorithms stay
//! independent of any simulator.

/// Bit-string utilities for syndrome and codeword manipulation.
///
/// Provides the canonical [`bit_utils::BitString`] representation together
/// with reversal, masked toggling, one-hot ancilla masks, parity, and the
/// codeword complement used to derive logical-one sets.
pub mod bit_utils;

/// Parity-check matrix engine.
///
/// Validates a matrix against a codeword set, computes column weights and
/// the transposed per-qubit view, and builds the per-qubit syndrome table
/// that drives circuit synthesis.
pub mod parity;

/// Register layout for logical qubits.
///
/// Describes which quantum and classical registers a logical qubit owns and
/// the order in which classical registers are added, which in turn fixes
/// the segment layout of histogram keys.
pub mod registers;

/// Logical-qubit circuit synthesizer for CSS codes such as Steane.
///
/// Emits zero-state preparation (with optional redundant-gate elimination),
/// syndrome extraction (plain and GHZ-block fault-tolerant), the correction
/// network with and without multi-controlled gates, and the decode circuit.
pub mod logical_qubit;

/// Bacon-Shor logical-qubit circuit synthesizer.
///
/// Provides fault-tolerant and non fault-tolerant encodings, forced errors,
/// and X/Z stabilizer extraction for the block-structured Bacon-Shor code.
pub mod bacon_shor;

/// Classical syndrome decoder and result classifier.
///
/// Post-processes execution histograms: software correction from measured
/// syndromes, validity classification under several modes, summaries by
/// ancilla value and parity, and multi-round fault-tolerant consensus.
pub mod decoder;

/// Summary statistics over repeated experiments.
pub mod stats;

/// Error types returned by synthesis and decoding operations.
///
/// All variants describe configuration or programming errors detected at
/// construction time or on first use. None of them are transient, so they
/// are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QecError {
    /// Invalid constructor or call arguments.
    ///
    /// Covers out-of-range qubit indices, unsupported option combinations,
    /// zero round counts, and similar misuse.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The parity-check matrix or a codeword has the wrong dimensions.
    #[error("invalid matrix shape: {0}")]
    InvalidMatrixShape(String),

    /// A matrix entry, codeword entry, or bit string contains something
    /// other than 0 or 1.
    #[error("invalid bit value {value:?} in {context}")]
    InvalidBitValue { value: char, context: String },

    /// A parity-check row is not orthogonal to a codeword.
    ///
    /// The mod-2 inner product of the two must be zero for every pair,
    /// otherwise the codeword is not in the code space the matrix checks.
    #[error("parity row {row} is not orthogonal to codeword {codeword}")]
    OrthogonalityViolation { row: usize, codeword: usize },

    /// The number of weight-1 (support) columns differs from the number of
    /// syndrome qubits, so zero-state preparation cannot be derived.
    #[error("parity matrix has {support} support qubits but {ancilla} ancilla are needed")]
    MatrixAncillaMismatch { support: usize, ancilla: usize },

    /// More than one classification mode was selected, or a mode received a
    /// codeword set of the wrong size.
    #[error("conflicting mode selection: {0}")]
    ConflictingModeSelection(String),

    /// The requested operation is not available for this logical qubit or
    /// logical-qubit count.
    #[error("unsupported logical qubit count: {0}")]
    UnsupportedLogicalQubitCount(String),

    /// A histogram key does not have the segments the layout requires.
    #[error("malformed histogram key {key:?}: {reason}")]
    MalformedKey { key: String, reason: String },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, QecError>;
