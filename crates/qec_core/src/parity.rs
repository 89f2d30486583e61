//! Parity-check matrix engine.
//!
//! A parity-check matrix has one row per syndrome (ancilla) qubit and one
//! column per data qubit. Its rows must be orthogonal to every codeword of
//! the code. Everything the synthesizer needs is derived from it: the support
//! qubits that seed zero-state preparation, the per-qubit syndrome table that
//! selects correction branches, and the logical-Z support used by simple
//! classification.

use crate::bit_utils::{BitString, flip_codewords};
use crate::{QecError, Result};

/// Number of data qubits in the Steane code.
pub const STEANE_DATA_QUBITS: usize = 7;

/// Number of syndrome qubits per stabilizer type in the Steane code.
pub const STEANE_ANCILLA_QUBITS: usize = 3;

/// Binary parity-check matrix stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityCheckMatrix {
    rows: Vec<BitString>,
}

/// Syndrome information for one data qubit.
///
/// One entry per data qubit, indexed by qubit position. `weight` is the
/// number of syndrome bits an error on this qubit flips, and `ancilla_bits`
/// lists those syndrome rows in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QubitSyndrome {
    pub qubit: usize,
    pub weight: usize,
    pub ancilla_bits: Vec<usize>,
}

impl ParityCheckMatrix {
    /// Wraps a list of rows. Fails if the list is empty or ragged.
    pub fn new(rows: Vec<BitString>) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(QecError::InvalidMatrixShape(
                "parity check matrix must be specified".into(),
            ));
        };
        let width = first.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(QecError::InvalidMatrixShape(format!(
                "row {} has {} columns, expected {}",
                i,
                row.len(),
                width
            )));
        }
        Ok(Self { rows })
    }

    /// Parses textual rows such as `"0001111"`.
    pub fn from_strs(rows: &[&str]) -> Result<Self> {
        let rows = rows
            .iter()
            .map(|r| BitString::parse(r, "parity check matrix"))
            .collect::<Result<Vec<_>>>()?;
        Self::new(rows)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.rows[0].len()
    }

    pub fn rows(&self) -> &[BitString] {
        &self.rows
    }

    #[inline]
    pub fn entry(&self, row: usize, column: usize) -> bool {
        self.rows[row].get(column)
    }

    /// Checks dimensions against the expected qubit counts and every row
    /// against every codeword.
    pub fn validate(
        &self,
        codewords: &CodewordSet,
        num_data: usize,
        num_ancilla: usize,
    ) -> Result<()> {
        if self.rows.len() != num_ancilla {
            return Err(QecError::InvalidMatrixShape(format!(
                "parity check matrix has {} rows, expected {}",
                self.rows.len(),
                num_ancilla
            )));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != num_data {
                return Err(QecError::InvalidMatrixShape(format!(
                    "parity check matrix row {} has length {}, expected {}",
                    i,
                    row.len(),
                    num_data
                )));
            }
        }
        for (c, word) in codewords.words().iter().enumerate() {
            if word.len() != num_data {
                return Err(QecError::InvalidMatrixShape(format!(
                    "codeword {} has length {}, expected {}",
                    c,
                    word.len(),
                    num_data
                )));
            }
            for (r, row) in self.rows.iter().enumerate() {
                if row.dot(word) {
                    return Err(QecError::OrthogonalityViolation { row: r, codeword: c });
                }
            }
        }
        Ok(())
    }

    /// Number of 1s in each column.
    pub fn column_weights(&self) -> Vec<usize> {
        let mut weights = vec![0; self.num_columns()];
        for row in &self.rows {
            for c in row.ones() {
                weights[c] += 1;
            }
        }
        weights
    }

    /// Qubit-major view: entry `q` holds column `q` as a string of
    /// `num_rows` bits.
    pub fn transpose(&self) -> Vec<BitString> {
        (0..self.num_columns())
            .map(|c| BitString::from_bits(self.rows.iter().map(|row| row.get(c))))
            .collect()
    }

    /// Columns of weight exactly 1, ascending.
    pub fn support_qubits(&self) -> Vec<usize> {
        self.columns_with_weight(1)
    }

    /// The weight-1 column owned by `row`, if any.
    pub fn support_of_row(&self, row: usize) -> Option<usize> {
        self.support_qubits()
            .into_iter()
            .find(|&c| self.entry(row, c))
    }

    /// Columns of weight exactly 2.
    ///
    /// For the Steane matrix these are qubits 2, 4 and 5, whose combined
    /// parity is the logical Z value of a codeword.
    pub fn simple_parity_bits(&self) -> Vec<usize> {
        self.columns_with_weight(2)
    }

    /// Builds the per-qubit syndrome table from the transposed matrix.
    pub fn qubit_syndromes(&self) -> Vec<QubitSyndrome> {
        self.transpose()
            .into_iter()
            .enumerate()
            .map(|(qubit, column)| QubitSyndrome {
                qubit,
                weight: column.count_ones(),
                ancilla_bits: column.ones().collect(),
            })
            .collect()
    }

    fn columns_with_weight(&self, weight: usize) -> Vec<usize> {
        self.column_weights()
            .into_iter()
            .enumerate()
            .filter(|&(_, w)| w == weight)
            .map(|(c, _)| c)
            .collect()
    }
}

/// Ordered set of codewords of one logical state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodewordSet {
    words: Vec<BitString>,
}

impl CodewordSet {
    pub fn new(words: Vec<BitString>) -> Self {
        Self { words }
    }

    pub fn from_strs(words: &[&str]) -> Result<Self> {
        let words = words
            .iter()
            .map(|w| BitString::parse(w, "codeword"))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(words))
    }

    pub fn words(&self) -> &[BitString] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &BitString) -> bool {
        self.words.iter().any(|w| w == word)
    }

    /// The complemented set (logical zero to logical one and back).
    pub fn flipped(&self) -> Self {
        Self::new(flip_codewords(&self.words))
    }
}

/// The Steane code parity-check matrix (a Hamming [7,4] check matrix).
pub fn steane_parity_check_matrix() -> ParityCheckMatrix {
    ParityCheckMatrix {
        rows: ["0001111", "0110011", "1010101"]
            .iter()
            .map(|r| literal_bits(r))
            .collect(),
    }
}

/// The eight logical-zero codewords of the Steane code.
pub fn steane_codewords() -> CodewordSet {
    CodewordSet::new(
        [
            "0000000", "1010101", "0110011", "1100110", "0001111", "1011010", "0111100",
            "1101001",
        ]
        .iter()
        .map(|w| literal_bits(w))
        .collect(),
    )
}

fn literal_bits(text: &str) -> BitString {
    BitString::from_bits(text.bytes().map(|b| b == b'1'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steane_matrix_validates() {
        let matrix = steane_parity_check_matrix();
        let words = steane_codewords();
        matrix
            .validate(&words, STEANE_DATA_QUBITS, STEANE_ANCILLA_QUBITS)
            .unwrap();
        matrix
            .validate(&words.flipped(), STEANE_DATA_QUBITS, STEANE_ANCILLA_QUBITS)
            .unwrap();
    }

    #[test]
    fn wrong_row_length_is_a_shape_error() {
        let matrix = ParityCheckMatrix::from_strs(&["000111", "011001", "101010"]).unwrap();
        let err = matrix.validate(&steane_codewords(), 7, 3).unwrap_err();
        assert!(matches!(err, QecError::InvalidMatrixShape(_)));
    }

    #[test]
    fn wrong_row_count_is_a_shape_error() {
        let matrix = ParityCheckMatrix::from_strs(&["0001111", "0110011"]).unwrap();
        let err = matrix.validate(&steane_codewords(), 7, 3).unwrap_err();
        assert!(matches!(err, QecError::InvalidMatrixShape(_)));
    }

    #[test]
    fn ragged_and_empty_matrices_are_rejected() {
        assert!(matches!(
            ParityCheckMatrix::from_strs(&["0001111", "011"]),
            Err(QecError::InvalidMatrixShape(_))
        ));
        assert!(matches!(
            ParityCheckMatrix::new(Vec::new()),
            Err(QecError::InvalidMatrixShape(_))
        ));
    }

    #[test]
    fn non_binary_entries_are_rejected() {
        assert!(matches!(
            ParityCheckMatrix::from_strs(&["0002111"]),
            Err(QecError::InvalidBitValue { value: '2', .. })
        ));
        assert!(matches!(
            CodewordSet::from_strs(&["010x000"]),
            Err(QecError::InvalidBitValue { value: 'x', .. })
        ));
    }

    #[test]
    fn non_orthogonal_codeword_is_reported() {
        let words = CodewordSet::from_strs(&["0000000", "1000000"]).unwrap();
        let err = steane_parity_check_matrix().validate(&words, 7, 3).unwrap_err();
        assert_eq!(err, QecError::OrthogonalityViolation { row: 2, codeword: 1 });
    }

    #[test]
    fn column_weights_and_derived_sets() {
        let matrix = steane_parity_check_matrix();
        assert_eq!(matrix.column_weights(), vec![1, 1, 2, 1, 2, 2, 3]);
        assert_eq!(matrix.support_qubits(), vec![0, 1, 3]);
        assert_eq!(matrix.simple_parity_bits(), vec![2, 4, 5]);
        assert_eq!(matrix.support_of_row(0), Some(3));
        assert_eq!(matrix.support_of_row(1), Some(1));
        assert_eq!(matrix.support_of_row(2), Some(0));
    }

    #[test]
    fn transpose_is_qubit_major() {
        let t = steane_parity_check_matrix().transpose();
        assert_eq!(t.len(), 7);
        assert_eq!(t[0].to_string(), "001");
        assert_eq!(t[2].to_string(), "011");
        assert_eq!(t[6].to_string(), "111");
    }

    #[test]
    fn syndrome_table_matches_transpose() {
        let table = steane_parity_check_matrix().qubit_syndromes();
        assert_eq!(table[4].weight, 2);
        assert_eq!(table[4].ancilla_bits, vec![0, 2]);
        assert_eq!(table[6].weight, 3);
        assert_eq!(table[3].ancilla_bits, vec![0]);
    }
}
