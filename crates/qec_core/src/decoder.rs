//! Classical post-processing of execution histograms.
//!
//! Keys are split on whitespace into one segment per classical register.
//! Data segments print register bit 0 rightmost, so they are reversed
//! before being compared with codewords, which list qubit 0 first.

use crate::bit_utils::{BitString, ancilla_mask};
use crate::parity::{CodewordSet, steane_parity_check_matrix};
use crate::{QecError, Result};
use qec_common::Histogram;
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use tracing::{debug, warn};

/// Applies a measured syndrome to a data segment.
///
/// An all-zero syndrome leaves the data unchanged. Otherwise the reversed
/// syndrome, read as a binary number, is the 1-based position of the qubit
/// to flip, counted from the right of the printed data.
pub fn correct_qubit(data: &BitString, ancilla: &BitString, length: usize) -> Result<BitString> {
    if ancilla.is_all_zero() {
        return Ok(data.clone());
    }
    let location = ancilla.reversed().to_usize();
    let mask = ancilla_mask(location, length)?;
    data.toggled(&mask)
}

/// Rewrites every key of `histogram` with its data segment corrected from
/// the syndrome segment at `ancilla_position`.
pub fn apply_software_correction(
    histogram: &Histogram,
    ancilla_position: usize,
    data_position: usize,
    length: usize,
) -> Result<Histogram> {
    let mut corrected = Histogram::new();
    for (key, &count) in histogram {
        let mut segments: Vec<String> = key.split_whitespace().map(str::to_string).collect();
        let ancilla = parse_segment(key, &segments, ancilla_position)?;
        let data = parse_segment(key, &segments, data_position)?;
        segments[data_position] = correct_qubit(&data, &ancilla, length)?.to_string();
        *corrected.entry(segments.join(" ")).or_insert(0) += count;
    }
    Ok(corrected)
}

/// Flags choosing how data segments are classified. At most one may be set;
/// none selects exact codeword matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValiditySelection {
    pub post_selection: bool,
    pub simple: bool,
    pub single: bool,
    /// Qubit inspected in single-bit mode.
    pub single_bit: usize,
}

/// Classification algorithm for data segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidityMode {
    /// The data must equal one of the codewords.
    #[default]
    Exact,
    /// Zero codewords are valid, one codewords invalid, anything else lies
    /// outside the code space.
    PostSelection,
    /// Parity over the weight-2 columns compared with a 1-bit value.
    Simple,
    /// One qubit compared with a 1-bit value.
    Single(usize),
}

impl TryFrom<ValiditySelection> for ValidityMode {
    type Error = QecError;

    fn try_from(sel: ValiditySelection) -> Result<Self> {
        let selected = [sel.post_selection, sel.simple, sel.single]
            .iter()
            .filter(|&&flag| flag)
            .count();
        if selected > 1 {
            return Err(QecError::ConflictingModeSelection(
                "only one of post selection, simple and single may be selected".into(),
            ));
        }
        Ok(if sel.post_selection {
            Self::PostSelection
        } else if sel.simple {
            Self::Simple
        } else if sel.single {
            Self::Single(sel.single_bit)
        } else {
            Self::Exact
        })
    }
}

/// Outcome of classifying one data segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
    /// Neither a zero nor a one codeword (post-selection only).
    Outside,
}

/// Classifies data segments against a codeword set under one mode.
#[derive(Debug, Clone)]
pub struct Classifier {
    mode: ValidityMode,
    zero: CodewordSet,
    one: CodewordSet,
    parity_bits: Vec<usize>,
}

impl Classifier {
    /// Builds a classifier. Simple and single modes take a set holding one
    /// 1-bit word, the expected logical value.
    ///
    /// Simple mode uses the weight-2 columns of the Steane matrix; see
    /// [`Classifier::with_parity_bits`] for other codes.
    pub fn new(mode: ValidityMode, codewords: CodewordSet) -> Result<Self> {
        if matches!(mode, ValidityMode::Simple | ValidityMode::Single(_))
            && (codewords.len() != 1 || codewords.words()[0].len() != 1)
        {
            return Err(QecError::ConflictingModeSelection(format!(
                "{:?} mode needs exactly one 1-bit codeword, got {} codewords",
                mode,
                codewords.len()
            )));
        }
        let one = codewords.flipped();
        Ok(Self {
            mode,
            zero: codewords,
            one,
            parity_bits: steane_parity_check_matrix().simple_parity_bits(),
        })
    }

    pub fn from_selection(selection: ValiditySelection, codewords: CodewordSet) -> Result<Self> {
        Self::new(ValidityMode::try_from(selection)?, codewords)
    }

    pub fn with_parity_bits(mut self, bits: Vec<usize>) -> Self {
        self.parity_bits = bits;
        self
    }

    pub fn mode(&self) -> ValidityMode {
        self.mode
    }

    /// Classifies a data segment as printed (register bit 0 rightmost).
    pub fn classify(&self, data: &BitString) -> Validity {
        let data = data.reversed();
        let hit = |valid: bool| if valid { Validity::Valid } else { Validity::Invalid };
        match self.mode {
            ValidityMode::Exact => hit(self.zero.contains(&data)),
            ValidityMode::PostSelection => {
                if self.zero.contains(&data) {
                    Validity::Valid
                } else if self.one.contains(&data) {
                    Validity::Invalid
                } else {
                    Validity::Outside
                }
            }
            ValidityMode::Simple => {
                let parity = self
                    .parity_bits
                    .iter()
                    .filter(|&&bit| bit < data.len() && data.get(bit))
                    .count()
                    % 2
                    == 1;
                hit(parity == self.zero.words()[0].get(0))
            }
            ValidityMode::Single(bit) => {
                hit(bit < data.len() && data.get(bit) == self.zero.words()[0].get(0))
            }
        }
    }
}

/// Shot counts by validity. Additive, so per-shard counts can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidityCounts {
    pub valid: u64,
    pub invalid: u64,
    pub outside: u64,
}

impl ValidityCounts {
    pub fn record(&mut self, validity: Validity, count: u64) {
        match validity {
            Validity::Valid => self.valid += count,
            Validity::Invalid => self.invalid += count,
            Validity::Outside => self.outside += count,
        }
    }

    pub fn total(&self) -> u64 {
        self.valid + self.invalid + self.outside
    }
}

impl Add for ValidityCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            valid: self.valid + rhs.valid,
            invalid: self.invalid + rhs.invalid,
            outside: self.outside + rhs.outside,
        }
    }
}

impl AddAssign for ValidityCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for ValidityCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Classifies one histogram entry.
pub fn classify_entry(
    key: &str,
    count: u64,
    classifier: &Classifier,
    data_position: usize,
) -> Result<ValidityCounts> {
    let segments: Vec<&str> = key.split_whitespace().collect();
    let data = parse_segment(key, &segments, data_position)?;
    let mut counts = ValidityCounts::default();
    counts.record(classifier.classify(&data), count);
    Ok(counts)
}

/// Counts valid, invalid and outside-code-space shots of a histogram.
pub fn count_valid_output_strings(
    histogram: &Histogram,
    classifier: &Classifier,
    data_position: usize,
) -> Result<ValidityCounts> {
    histogram
        .iter()
        .map(|(key, &count)| classify_entry(key, count, classifier, data_position))
        .sum()
}

/// Summarises two logical qubits per shot.
///
/// Each data segment scores 0 when `zero` accepts it, 1 when `one` accepts
/// it, 2 otherwise. The result holds all nine combinations `"00"` to `"22"`.
pub fn summarise_logical_counts(
    histogram: &Histogram,
    zero: &Classifier,
    one: &Classifier,
    data1_position: usize,
    data2_position: usize,
) -> Result<BTreeMap<String, u64>> {
    let mut summary: BTreeMap<String, u64> = (0..3)
        .flat_map(|a| (0..3).map(move |b| format!("{}{}", a, b)))
        .map(|k| (k, 0))
        .collect();

    let score = |data: &BitString| {
        if zero.classify(data) == Validity::Valid {
            0
        } else if one.classify(data) == Validity::Valid {
            1
        } else {
            2
        }
    };

    for (key, &count) in histogram {
        let segments: Vec<&str> = key.split_whitespace().collect();
        let first = score(&parse_segment(key, &segments, data1_position)?);
        let second = score(&parse_segment(key, &segments, data2_position)?);
        *summary.entry(format!("{}{}", first, second)).or_insert(0) += count;
    }
    Ok(summary)
}

/// Shot counts by the parity of the first `data_qubits` characters of the
/// data segment, indexed by parity.
pub fn find_parity(
    histogram: &Histogram,
    data_position: usize,
    data_qubits: usize,
) -> Result<[u64; 2]> {
    let mut parity = [0u64; 2];
    for (key, &count) in histogram {
        let segments: Vec<&str> = key.split_whitespace().collect();
        let data = parse_segment(key, &segments, data_position)?;
        if data.len() < data_qubits {
            return Err(malformed(key, format!("data segment shorter than {}", data_qubits)));
        }
        let odd = (0..data_qubits).filter(|&i| data.get(i)).count() % 2;
        parity[odd] += count;
    }
    Ok(parity)
}

/// Shot counts for every possible value of the ancilla segment at
/// `ancilla_position`, all `2^ancilla_qubits` values included.
pub fn find_ancilla_values(
    histogram: &Histogram,
    ancilla_qubits: usize,
    ancilla_position: usize,
) -> Result<BTreeMap<String, u64>> {
    let size = u32::try_from(ancilla_qubits)
        .ok()
        .and_then(|shift| 1usize.checked_shl(shift))
        .ok_or_else(|| {
            QecError::Configuration(format!(
                "{} ancilla qubits have too many values to tabulate",
                ancilla_qubits
            ))
        })?;
    let mut values: BTreeMap<String, u64> = (0..size)
        .map(|v| (format!("{:0width$b}", v, width = ancilla_qubits), 0))
        .collect();
    for (key, &count) in histogram {
        let segments: Vec<&str> = key.split_whitespace().collect();
        let ancilla = parse_segment(key, &segments, ancilla_position)?;
        match values.get_mut(&ancilla.to_string()) {
            Some(total) => *total += count,
            None => {
                return Err(malformed(
                    key,
                    format!("ancilla segment is not {} bits wide", ancilla_qubits),
                ));
            }
        }
    }
    Ok(values)
}

/// Spreads combined ancilla counts over individual ancilla.
///
/// Ancilla are numbered after the data qubits, `data_qubits + 1` upward,
/// and the printed ancilla string holds the highest number first.
pub fn find_individual_ancilla_values(
    ancilla_values: &BTreeMap<String, u64>,
    data_qubits: usize,
    ancilla_qubits: usize,
    label: &str,
) -> BTreeMap<String, u64> {
    let mut individual: BTreeMap<String, u64> = (data_qubits + 1..=data_qubits + ancilla_qubits)
        .map(|n| (format!("{}{}", label, n), 0))
        .collect();
    for (ancilla, &count) in ancilla_values {
        for (i, c) in ancilla.chars().take(ancilla_qubits).enumerate() {
            if c == '1' {
                let n = data_qubits + ancilla_qubits - i;
                *individual.entry(format!("{}{}", label, n)).or_insert(0) += count;
            }
        }
    }
    individual
}

/// Segment layout of a fault-tolerant histogram key.
///
/// Ancilla segments start at 0 and run over two stabilizer types, then
/// `ancilla_qubits`, then `ancilla_rounds`. Data-check segments follow at
/// `data_meas_start`, qubit-major then round. The final data segment sits at
/// `data_start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundConfig {
    /// Reading of an ancilla block that reports syndrome 0.
    pub ancilla_zero: BitString,
    /// Reading of an ancilla block that reports syndrome 1.
    pub ancilla_one: BitString,
    pub ancilla_qubits: usize,
    pub ancilla_rounds: usize,
    pub data_meas_start: usize,
    pub data_meas_qubits: usize,
    pub data_meas_rounds: usize,
    /// Accepted data-check readings, compared after reversal.
    pub data_meas_strings: CodewordSet,
    pub data_start: usize,
    pub mode: ValidityMode,
    /// Logical Z support read by simple mode.
    pub parity_bits: Vec<usize>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            ancilla_zero: BitString::from_bits([false]),
            ancilla_one: BitString::from_bits([true]),
            ancilla_qubits: 0,
            ancilla_rounds: 1,
            data_meas_start: 0,
            data_meas_qubits: 0,
            data_meas_rounds: 0,
            data_meas_strings: CodewordSet::new(vec![BitString::from_bits([false])]),
            data_start: 0,
            mode: ValidityMode::Exact,
            parity_bits: steane_parity_check_matrix().simple_parity_bits(),
        }
    }
}

/// Result of fault-tolerant post-processing.
#[derive(Debug, Clone, PartialEq)]
pub struct FtOutcome {
    /// `invalid / accepted`, or 0 when nothing was accepted.
    pub error_rate: f64,
    pub rejected: u64,
    pub accepted: u64,
    pub valid: u64,
    pub invalid: u64,
    /// Set when no shot survived rejection.
    pub no_accepted: bool,
}

/// Post-processes a fault-tolerant histogram.
///
/// A shot is rejected when a data-check reading is not an accepted string,
/// when an ancilla reading is neither `ancilla_zero` nor `ancilla_one`, when
/// the rounds of one ancilla disagree, or, in post-selection mode, when the
/// data lies outside the code space. Accepted shots with ancilla have the
/// first stabilizer type's syndrome applied through [`correct_qubit`] and
/// are then classified against `codewords`. A syndrome that names a qubit
/// beyond the data segment rejects that shot alone.
pub fn process_ft_results(
    histogram: &Histogram,
    codewords: &CodewordSet,
    config: &RoundConfig,
) -> Result<FtOutcome> {
    let classifier = Classifier::new(config.mode, codewords.clone())?
        .with_parity_bits(config.parity_bits.clone());
    let mut rejected = 0;
    let mut counts = ValidityCounts::default();

    for (key, &count) in histogram {
        let segments: Vec<&str> = key.split_whitespace().collect();
        let data = parse_segment(key, &segments, config.data_start)?;

        if !checks_accepted(key, &segments, config)? {
            rejected += count;
            continue;
        }
        let data = match read_ancilla(key, &segments, config)? {
            AncillaReading::Absent => data,
            AncillaReading::Syndrome(syndrome) => {
                match correct_qubit(&data, &syndrome, data.len()) {
                    Ok(corrected) => corrected,
                    Err(err) => {
                        warn!(key = key.as_str(), %err, "syndrome outside the data, rejecting");
                        rejected += count;
                        continue;
                    }
                }
            }
            AncillaReading::Rejected => {
                rejected += count;
                continue;
            }
        };

        match classifier.classify(&data) {
            Validity::Outside if config.mode == ValidityMode::PostSelection => rejected += count,
            validity => counts.record(validity, count),
        }
    }

    let accepted = counts.valid + counts.invalid + counts.outside;
    let no_accepted = accepted == 0;
    let error_rate = if no_accepted {
        warn!(rejected, "no shots accepted, reporting an error rate of 0");
        0.0
    } else {
        counts.invalid as f64 / accepted as f64
    };
    debug!(accepted, rejected, valid = counts.valid, "processed fault-tolerant results");

    Ok(FtOutcome {
        error_rate,
        rejected,
        accepted,
        valid: counts.valid,
        invalid: counts.invalid,
        no_accepted,
    })
}

fn checks_accepted(key: &str, segments: &[&str], config: &RoundConfig) -> Result<bool> {
    for i in 0..config.data_meas_qubits * config.data_meas_rounds {
        let reading = parse_segment(key, segments, config.data_meas_start + i)?;
        if !config.data_meas_strings.contains(&reading.reversed()) {
            return Ok(false);
        }
    }
    Ok(true)
}

enum AncillaReading {
    Absent,
    Rejected,
    /// Agreed syndrome of the first stabilizer type.
    Syndrome(BitString),
}

fn read_ancilla(key: &str, segments: &[&str], config: &RoundConfig) -> Result<AncillaReading> {
    if config.ancilla_qubits == 0 {
        return Ok(AncillaReading::Absent);
    }
    let rounds = config.ancilla_rounds.max(1);
    let mut syndrome = BitString::zeros(config.ancilla_qubits);
    for kind in 0..2 {
        for qubit in 0..config.ancilla_qubits {
            let mut agreed: Option<bool> = None;
            for round in 0..rounds {
                let pos = (kind * config.ancilla_qubits + qubit) * rounds + round;
                let reading = parse_segment(key, segments, pos)?;
                let bit = if reading == config.ancilla_zero {
                    false
                } else if reading == config.ancilla_one {
                    true
                } else {
                    return Ok(AncillaReading::Rejected);
                };
                match agreed {
                    Some(prev) if prev != bit => return Ok(AncillaReading::Rejected),
                    _ => agreed = Some(bit),
                }
            }
            if kind == 0 {
                syndrome.set(qubit, agreed.unwrap_or(false));
            }
        }
    }
    Ok(AncillaReading::Syndrome(syndrome))
}

fn parse_segment(key: &str, segments: &[impl AsRef<str>], position: usize) -> Result<BitString> {
    let segment = segments.get(position).ok_or_else(|| {
        malformed(
            key,
            format!("segment {} requested, key has {}", position, segments.len()),
        )
    })?;
    BitString::parse(segment.as_ref(), "histogram key")
}

fn malformed(key: &str, reason: String) -> QecError {
    QecError::MalformedKey {
        key: key.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parity::steane_codewords;

    fn bs(s: &str) -> BitString {
        s.parse().unwrap()
    }

    fn histogram(entries: &[(&str, u64)]) -> Histogram {
        entries.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    fn one_bit(expected: &str) -> CodewordSet {
        CodewordSet::from_strs(&[expected]).unwrap()
    }

    #[test]
    fn correct_qubit_flips_named_position() {
        let out = correct_qubit(&bs("0011100"), &bs("010"), 7).unwrap();
        assert_eq!(out, bs("0011110"));
        let same = correct_qubit(&bs("0011100"), &bs("000"), 7).unwrap();
        assert_eq!(same, bs("0011100"));
    }

    #[test]
    fn selection_flags_are_exclusive() {
        let both = ValiditySelection {
            simple: true,
            post_selection: true,
            ..ValiditySelection::default()
        };
        assert!(matches!(
            ValidityMode::try_from(both),
            Err(QecError::ConflictingModeSelection(_))
        ));
        let single = ValiditySelection {
            single: true,
            single_bit: 4,
            ..ValiditySelection::default()
        };
        assert_eq!(ValidityMode::try_from(single).unwrap(), ValidityMode::Single(4));
    }

    #[test]
    fn simple_mode_needs_one_codeword() {
        assert!(matches!(
            Classifier::new(ValidityMode::Simple, steane_codewords()),
            Err(QecError::ConflictingModeSelection(_))
        ));
    }

    #[test]
    fn exact_counts_match_reference() {
        let counts = histogram(&[
            ("111 000 1000000", 1),
            ("000 000 0101101", 1),
            ("000 000 1001011", 2),
            ("010 000 0100000", 1),
        ]);
        let classifier = Classifier::new(ValidityMode::Exact, steane_codewords()).unwrap();
        let result = count_valid_output_strings(&counts, &classifier, 2).unwrap();
        assert_eq!(result.valid, 3);
        assert_eq!(result.invalid, 2);
    }

    #[test]
    fn simple_mode_accepts_every_zero_codeword() {
        let counts = histogram(&[
            ("0000000", 12),
            ("0011110", 12),
            ("0101101", 9),
            ("0110011", 12),
            ("1001011", 8),
            ("1010101", 17),
            ("1100110", 16),
            ("1111000", 14),
        ]);
        let classifier = Classifier::new(ValidityMode::Simple, one_bit("0")).unwrap();
        let result = count_valid_output_strings(&counts, &classifier, 0).unwrap();
        assert_eq!((result.valid, result.invalid), (100, 0));
    }

    #[test]
    fn simple_mode_accepts_every_one_codeword() {
        let counts = histogram(&[
            ("0011001", 17),
            ("0101010", 17),
            ("0110100", 9),
            ("1001100", 12),
            ("1010010", 9),
            ("1100001", 13),
            ("0000111", 11),
            ("1111111", 12),
        ]);
        let classifier = Classifier::new(ValidityMode::Simple, one_bit("1")).unwrap();
        let result = count_valid_output_strings(&counts, &classifier, 0).unwrap();
        assert_eq!((result.valid, result.invalid), (100, 0));
    }

    #[test]
    fn simple_mode_only_sees_parity_qubits() {
        let counts = histogram(&[
            ("0000001", 16),
            ("0011100", 18),
            ("0101001", 10),
            ("0001000", 12),
            ("0010000", 8),
            ("0100000", 13),
            ("1000000", 11),
        ]);
        let classifier = Classifier::new(ValidityMode::Simple, one_bit("0")).unwrap();
        let result = count_valid_output_strings(&counts, &classifier, 0).unwrap();
        assert_eq!(result.valid, 16 + 18 + 12 + 11);
        assert_eq!(result.invalid, 10 + 8 + 13);
    }

    #[test]
    fn post_selection_separates_outside_strings() {
        let counts = histogram(&[("0000000", 5), ("1111111", 3), ("0000001", 2)]);
        let classifier =
            Classifier::new(ValidityMode::PostSelection, steane_codewords()).unwrap();
        let result = count_valid_output_strings(&counts, &classifier, 0).unwrap();
        assert_eq!(
            result,
            ValidityCounts {
                valid: 5,
                invalid: 3,
                outside: 2
            }
        );
    }

    #[test]
    fn single_mode_reads_one_qubit() {
        let counts = histogram(&[("0000100", 4), ("0000000", 6)]);
        let classifier = Classifier::new(ValidityMode::Single(2), one_bit("1")).unwrap();
        let result = count_valid_output_strings(&counts, &classifier, 0).unwrap();
        assert_eq!((result.valid, result.invalid), (4, 6));
    }

    #[test]
    fn short_key_is_malformed() {
        let counts = histogram(&[("000 0000000", 1)]);
        let classifier = Classifier::new(ValidityMode::Exact, steane_codewords()).unwrap();
        assert!(matches!(
            count_valid_output_strings(&counts, &classifier, 2),
            Err(QecError::MalformedKey { .. })
        ));
    }

    #[test]
    fn summarise_two_logical_qubits() {
        let counts = histogram(&[
            ("010 000 0011100 100 000 0011101", 1),
            ("010 000 1010101 101 011 0000111", 2),
            ("010 000 0000001 010 010 0101010", 4),
            ("010 000 1000000 101 000 1000000", 8),
            ("010 000 0100000 110 000 1000000", 16),
            ("010 000 0000111 101 010 0000111", 3),
        ]);
        let zero = Classifier::new(ValidityMode::Simple, one_bit("0")).unwrap();
        let one = Classifier::new(ValidityMode::Simple, one_bit("1")).unwrap();
        let summary = summarise_logical_counts(&counts, &zero, &one, 2, 5).unwrap();
        let expected: BTreeMap<String, u64> = [
            ("00", 9),
            ("01", 6),
            ("02", 0),
            ("10", 16),
            ("11", 3),
            ("12", 0),
            ("20", 0),
            ("21", 0),
            ("22", 0),
        ]
        .iter()
        .map(|&(k, v)| (k.to_string(), v))
        .collect();
        assert_eq!(summary, expected);
    }

    #[test]
    fn parity_and_ancilla_summaries() {
        let counts = histogram(&[("01 0110", 3), ("10 0111", 5), ("01 0000", 1)]);
        assert_eq!(find_parity(&counts, 1, 4).unwrap(), [4, 5]);

        let values = find_ancilla_values(&counts, 2, 0).unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(values["01"], 4);
        assert_eq!(values["10"], 5);
        assert_eq!(values["00"], 0);

        let individual = find_individual_ancilla_values(&values, 9, 2, "A");
        assert_eq!(individual["A10"], 4);
        assert_eq!(individual["A11"], 5);
    }

    #[test]
    fn software_correction_rewrites_data_segment() {
        let counts = histogram(&[("100 000 0000001", 2), ("000 000 0000000", 3)]);
        let corrected = apply_software_correction(&counts, 0, 2, 7).unwrap();
        assert_eq!(corrected.len(), 2);
        assert_eq!(corrected["100 000 0000000"], 2);
        assert_eq!(corrected["000 000 0000000"], 3);
    }

    #[test]
    fn scheme_b_results() {
        let counts = histogram(&[
            ("0000000 0000000 0000000 0000000", 1),
            ("0011110 0101101 0110011 1001011", 2),
            ("0011111 0101101 0110011 1001011", 4),
            ("0011110 0001101 0110011 1001011", 8),
            ("0011110 0101101 1111111 1001011", 16),
            ("0011110 0101101 0000000 1001111", 32),
        ]);
        let config = RoundConfig {
            data_start: 3,
            data_meas_qubits: 1,
            data_meas_rounds: 3,
            data_meas_strings: steane_codewords(),
            ..RoundConfig::default()
        };
        let out = process_ft_results(&counts, &steane_codewords(), &config).unwrap();
        assert_eq!(
            (out.valid, out.invalid, out.accepted, out.rejected),
            (3, 32, 35, 28)
        );
        assert!((out.error_rate - 32.0 / 35.0).abs() < 1e-7);
    }

    #[test]
    fn scheme_c_results() {
        let counts = histogram(&[
            ("0 0 0 0000000", 1),
            ("1 0 0 0000001", 2),
            ("0 1 0 0011110", 4),
            ("0 0 1 1000000", 8),
            ("1 0 1 0000000", 16),
            ("1 1 1 0000000", 31),
            ("0 0 0 0000001", 32),
            ("0 0 0 1111111", 33),
        ]);
        let config = RoundConfig {
            data_start: 3,
            data_meas_qubits: 1,
            data_meas_rounds: 3,
            ..RoundConfig::default()
        };
        let out = process_ft_results(&counts, &steane_codewords(), &config).unwrap();
        assert_eq!(
            (out.valid, out.invalid, out.accepted, out.rejected),
            (1, 65, 66, 61)
        );
        assert!((out.error_rate - 65.0 / 66.0).abs() < 1e-7);
    }

    #[test]
    fn scheme_c_with_ancilla_blocks() {
        let zeros = |n: usize| vec!["0000"; n].join(" ");
        let ones = |n: usize| vec!["0001"; n].join(" ");
        let entries = vec![
            (format!("{} 0 0 0 0011110", zeros(18)), 1),
            (format!("{} 1 0 0 0011110", zeros(18)), 3),
            (format!("{} 0 1 0 0000001", zeros(18)), 5),
            (format!("{} 0 0 1 0000000", zeros(18)), 7),
            (format!("{} 1 0 1 0000000", zeros(18)), 11),
            // syndrome on the first ancilla: qubit 0
            (format!("{} {} 0 0 0 0000001", ones(3), zeros(15)), 13),
            (format!("{} {} {} 0 0 0 0000010", zeros(3), ones(3), zeros(12)), 17),
            (format!("{} {} 0 0 0 0111000", ones(9), zeros(9)), 19),
            // rounds disagree
            (format!("0001 0000 0001 {} {} 0 0 0 0111000", ones(6), zeros(9)), 23),
            (format!("{} {} 0 0 0 0000011", ones(3), zeros(15)), 29),
        ];
        let counts: Histogram = entries.into_iter().collect();
        let config = RoundConfig {
            ancilla_zero: bs("0000"),
            ancilla_one: bs("0001"),
            ancilla_qubits: 3,
            ancilla_rounds: 3,
            data_meas_start: 18,
            data_meas_qubits: 1,
            data_meas_rounds: 3,
            data_start: 21,
            ..RoundConfig::default()
        };
        let out = process_ft_results(&counts, &steane_codewords(), &config).unwrap();
        assert_eq!((out.valid, out.invalid, out.rejected), (50, 29, 49));
        assert_eq!(out.accepted, out.valid + out.invalid);
    }

    #[test]
    fn faulty_ancilla_block_rejects_shot() {
        let zeros = |n: usize| vec!["0000"; n].join(" ");
        let entries = vec![
            (format!("{} 0 0 0 0011110", zeros(18)), 5),
            (format!("0010 {} 0 0 0 0011110", zeros(17)), 7),
            (format!("{} 0100 {} 0 0 0 0011110", zeros(10), zeros(7)), 2),
        ];
        let counts: Histogram = entries.into_iter().collect();
        let config = RoundConfig {
            ancilla_zero: bs("0000"),
            ancilla_one: bs("0001"),
            ancilla_qubits: 3,
            ancilla_rounds: 3,
            data_meas_start: 18,
            data_meas_qubits: 1,
            data_meas_rounds: 3,
            data_start: 21,
            ..RoundConfig::default()
        };
        let out = process_ft_results(&counts, &steane_codewords(), &config).unwrap();
        assert_eq!((out.valid, out.invalid, out.rejected), (5, 0, 9));
    }

    #[test]
    fn syndrome_beyond_data_rejects_only_its_shot() {
        let counts = histogram(&[
            ("0 0 0 0 0 0 000", 5),
            ("1 0 0 0 0 0 000", 3),
            ("1 1 1 0 0 0 000", 2),
        ]);
        let config = RoundConfig {
            ancilla_qubits: 3,
            data_start: 6,
            ..RoundConfig::default()
        };
        let codewords = CodewordSet::from_strs(&["000"]).unwrap();
        let out = process_ft_results(&counts, &codewords, &config).unwrap();
        assert_eq!((out.valid, out.invalid, out.rejected), (5, 3, 2));
    }

    #[test]
    fn simple_mode_follows_configured_parity_bits() {
        // Steane codewords printed as keys are the logical zeros of the
        // column-reversed matrix, whose weight-2 columns are 1, 2 and 4
        let entries: Vec<(String, u64)> = steane_codewords()
            .words()
            .iter()
            .map(|w| (w.to_string(), 10))
            .collect();
        let counts: Histogram = entries.into_iter().collect();
        let config = RoundConfig {
            mode: ValidityMode::Simple,
            parity_bits: vec![1, 2, 4],
            ..RoundConfig::default()
        };
        let out = process_ft_results(&counts, &one_bit("0"), &config).unwrap();
        assert_eq!((out.valid, out.invalid), (80, 0));
    }

    #[test]
    fn ancilla_table_too_wide_is_refused() {
        let err = find_ancilla_values(&histogram(&[]), 64, 0).unwrap_err();
        assert!(matches!(err, QecError::Configuration(_)));
    }

    #[test]
    fn nothing_accepted_gives_zero_rate() {
        let counts = histogram(&[("1 0000000", 4)]);
        let config = RoundConfig {
            data_start: 1,
            data_meas_qubits: 1,
            data_meas_rounds: 1,
            ..RoundConfig::default()
        };
        let out = process_ft_results(&counts, &steane_codewords(), &config).unwrap();
        assert!(out.no_accepted);
        assert_eq!(out.error_rate, 0.0);
        assert_eq!(out.rejected, 4);
    }

    #[test]
    fn post_selection_rejects_outside_data() {
        let counts = histogram(&[("0000000", 2), ("0000001", 3), ("1111111", 1)]);
        let config = RoundConfig {
            mode: ValidityMode::PostSelection,
            ..RoundConfig::default()
        };
        let out = process_ft_results(&counts, &steane_codewords(), &config).unwrap();
        assert_eq!((out.valid, out.invalid, out.rejected), (2, 1, 3));
    }
}
