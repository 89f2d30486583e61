//! Bit-string utilities for syndrome and codeword manipulation.
//!
//! Every bit string in the crate (parity rows, codewords, measured data and
//! ancilla segments) uses [`BitString`]. Text such as `"0110011"` is converted
//! at the boundary; character `i` of the text is bit `i` of the string.

use crate::{QecError, Result};
use bitvec::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Packed bit string with text-order indexing.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    bits: BitVec<u8, Msb0>,
}

impl BitString {
    /// Creates an all-zero string of the given length.
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, len),
        }
    }

    /// Builds a string from bits in text order.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        Self {
            bits: bits.into_iter().collect(),
        }
    }

    /// Parses `0`/`1` text, naming `context` in the error for any other
    /// character.
    pub fn parse(text: &str, context: &str) -> Result<Self> {
        let mut bits = BitVec::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                other => {
                    return Err(QecError::InvalidBitValue {
                        value: other,
                        context: context.to_string(),
                    });
                }
            }
        }
        Ok(Self { bits })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.bits[index]
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: bool) {
        self.bits.set(index, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().by_vals()
    }

    /// Indices of the set bits, ascending.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn is_all_zero(&self) -> bool {
        self.bits.not_any()
    }

    /// Returns the string with its bit order reversed.
    pub fn reversed(&self) -> Self {
        Self::from_bits(self.bits.iter().by_vals().rev())
    }

    /// Returns the string with every bit inverted.
    pub fn complement(&self) -> Self {
        Self::from_bits(self.bits.iter().by_vals().map(|b| !b))
    }

    /// Toggles the bits of `self` selected by `mask`.
    pub fn toggled(&self, mask: &BitString) -> Result<Self> {
        if self.len() != mask.len() {
            return Err(QecError::Configuration(format!(
                "bitwise combination needs equal lengths, got {} and {}",
                self.len(),
                mask.len()
            )));
        }
        Ok(Self::from_bits(
            self.iter().zip(mask.iter()).map(|(a, b)| a ^ b),
        ))
    }

    /// XOR of all bits.
    pub fn parity(&self) -> bool {
        self.bits.count_ones() % 2 == 1
    }

    /// Mod-2 inner product with another string of the same length.
    pub fn dot(&self, other: &BitString) -> bool {
        self.iter()
            .zip(other.iter())
            .fold(false, |acc, (a, b)| acc ^ (a & b))
    }

    /// Interprets the string as a binary number, first character most
    /// significant.
    pub fn to_usize(&self) -> usize {
        self.iter().fold(0, |acc, b| (acc << 1) | usize::from(b))
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.iter() {
            f.write_str(if b { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitString({})", self)
    }
}

impl FromStr for BitString {
    type Err = QecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, "bit string")
    }
}

/// Reverses a bit string.
pub fn reverse_string(input: &BitString) -> BitString {
    input.reversed()
}

/// Combines two equal-length strings position by position, producing 1
/// where exactly one input is 1.
///
/// Applying a one-hot mask this way flips the single masked bit, which is
/// how software correction repairs a data string.
pub fn bitwise_toggle(a: &BitString, b: &BitString) -> Result<BitString> {
    a.toggled(b)
}

/// Builds a one-hot mask of `length` bits with the 1 at the `location`-th
/// position counted from the right (1-based).
///
/// Because measured registers print bit 0 rightmost, location `k` selects
/// register bit `k - 1`.
pub fn ancilla_mask(location: usize, length: usize) -> Result<BitString> {
    if location < 1 {
        return Err(QecError::Configuration(
            "ancilla mask location must be strictly positive".into(),
        ));
    }
    if length < 1 {
        return Err(QecError::Configuration(
            "ancilla mask length must be at least 1".into(),
        ));
    }
    if location > length {
        return Err(QecError::Configuration(format!(
            "ancilla mask location {} exceeds length {}",
            location, length
        )));
    }
    let mut mask = BitString::zeros(length);
    mask.set(length - location, true);
    Ok(mask)
}

/// Complements every codeword, turning a logical-zero set into the
/// logical-one set (and back).
pub fn flip_codewords(codewords: &[BitString]) -> Vec<BitString> {
    codewords.iter().map(BitString::complement).collect()
}

/// Parity of a bit string as 0 or 1.
pub fn calculate_parity(bits: &BitString) -> u8 {
    u8::from(bits.parity())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bs(s: &str) -> BitString {
        s.parse().unwrap()
    }

    #[test]
    fn reverse_string_reverses() {
        assert_eq!(reverse_string(&bs("0001010")), bs("0101000"));
    }

    #[test]
    fn bitwise_toggle_matches_reference() {
        let out = bitwise_toggle(&bs("0101010"), &bs("0001111")).unwrap();
        assert_eq!(out.to_string(), "0100101");
    }

    #[test]
    fn bitwise_toggle_rejects_length_mismatch() {
        assert!(matches!(
            bitwise_toggle(&bs("01"), &bs("011")),
            Err(QecError::Configuration(_))
        ));
    }

    #[test]
    fn ancilla_mask_counts_from_the_right() {
        assert_eq!(ancilla_mask(2, 4).unwrap().to_string(), "0010");
        assert_eq!(ancilla_mask(1, 7).unwrap().to_string(), "0000001");
        assert_eq!(ancilla_mask(7, 7).unwrap().to_string(), "1000000");
    }

    #[test]
    fn ancilla_mask_rejects_bad_arguments() {
        assert!(ancilla_mask(0, 4).is_err());
        assert!(ancilla_mask(1, 0).is_err());
        assert!(ancilla_mask(5, 4).is_err());
    }

    #[test]
    fn flipped_codewords_match_reference() {
        let zero: Vec<BitString> = [
            "0000000", "1010101", "0110011", "1100110", "0001111", "1011010", "0111100",
            "1101001",
        ]
        .iter()
        .map(|s| bs(s))
        .collect();
        let expected: Vec<BitString> = [
            "1111111", "0101010", "1001100", "0011001", "1110000", "0100101", "1000011",
            "0010110",
        ]
        .iter()
        .map(|s| bs(s))
        .collect();
        assert_eq!(flip_codewords(&zero), expected);
    }

    #[test]
    fn parity_of_strings() {
        assert_eq!(calculate_parity(&bs("011")), 0);
        assert_eq!(calculate_parity(&bs("0110111")), 1);
    }

    #[test]
    fn parse_rejects_non_binary() {
        let err = BitString::parse("01a1", "codeword").unwrap_err();
        assert_eq!(
            err,
            QecError::InvalidBitValue {
                value: 'a',
                context: "codeword".into()
            }
        );
    }

    #[test]
    fn to_usize_reads_first_character_as_msb() {
        assert_eq!(bs("010").to_usize(), 2);
        assert_eq!(bs("110").to_usize(), 6);
        assert_eq!(bs("").to_usize(), 0);
    }
}
