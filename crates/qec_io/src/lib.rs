//! I/O utilities for error-correction experiment files.
//!
//! Reads parity-check matrices, codeword sets and measurement histograms
//! from text files and writes histograms back in a line format that the
//! readers accept.

/// File loading and saving with path context on every error.
pub mod loader;

/// nom parsers for bit-row and histogram text.
///
/// Bit-row files tolerate quotes, trailing commas and `#` comments.
/// Histograms are accepted as a dict literal or as `key: count` lines.
pub mod parser;

pub use loader::{load_codewords, load_histogram, load_matrix, save_histogram};
