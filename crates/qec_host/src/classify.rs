//! Classification of histogram files.
//!
//! Entries are independent, so the histogram is sharded across the rayon
//! pool and the per-entry counts are summed. The fault-tolerant report runs
//! the round-aware post-processing on a loaded file.

use anyhow::Result;
use qec_common::Histogram;
use qec_core::decoder::{
    Classifier, FtOutcome, RoundConfig, ValidityCounts, classify_entry, process_ft_results,
};
use qec_core::parity::CodewordSet;
use qec_io::loader;
use rayon::prelude::*;
use std::time::Instant;

/// Classifies every histogram entry in parallel and sums the counts.
pub fn classify_histogram(
    histogram: &Histogram,
    classifier: &Classifier,
    data_position: usize,
) -> Result<ValidityCounts> {
    let entries: Vec<(&String, &u64)> = histogram.iter().collect();
    let counts = entries
        .par_iter()
        .map(|(key, count)| classify_entry(key, **count, classifier, data_position))
        .try_reduce(ValidityCounts::default, |a, b| Ok(a + b))?;
    Ok(counts)
}

pub fn run_classify(
    histogram_path: &str,
    classifier: &Classifier,
    data_position: usize,
) -> Result<ValidityCounts> {
    println!("Loading histogram from {}...", histogram_path);
    let histogram = loader::load_histogram(histogram_path)?;
    println!("Loaded {} distinct keys.", histogram.len());

    let start = Instant::now();
    let counts = classify_histogram(&histogram, classifier, data_position)?;
    let seconds = start.elapsed().as_secs_f64();

    println!("Results ({:?} mode)", classifier.mode());
    println!("Time:    {:.4} s", seconds);
    println!("Valid:   {}", counts.valid);
    println!("Invalid: {}", counts.invalid);
    println!("Outside: {}", counts.outside);
    if counts.total() > 0 {
        println!(
            "Error rate: {:.6}",
            counts.invalid as f64 / counts.total() as f64
        );
    }
    Ok(counts)
}

pub fn run_ft(
    histogram_path: &str,
    codewords: &CodewordSet,
    rounds: &RoundConfig,
) -> Result<FtOutcome> {
    println!("Loading histogram from {}...", histogram_path);
    let histogram = loader::load_histogram(histogram_path)?;
    let outcome = process_ft_results(&histogram, codewords, rounds)?;

    println!("Fault-tolerant results");
    println!("Accepted: {}", outcome.accepted);
    println!("Rejected: {}", outcome.rejected);
    println!("Valid:    {}", outcome.valid);
    println!("Invalid:  {}", outcome.invalid);
    if outcome.no_accepted {
        println!("Error rate: n/a (no shots accepted)");
    } else {
        println!("Error rate: {:.6}", outcome.error_rate);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qec_core::decoder::{ValidityMode, count_valid_output_strings};
    use qec_core::parity::steane_codewords;

    #[test]
    fn parallel_counts_match_sequential_counts() {
        let mut histogram = Histogram::new();
        for (i, word) in steane_codewords().words().iter().enumerate() {
            histogram.insert(format!("000 {}", word.reversed()), 10 + i as u64);
        }
        histogram.insert("000 0000001".to_string(), 5);
        histogram.insert("101 1111111".to_string(), 2);

        let classifier = Classifier::new(ValidityMode::Exact, steane_codewords()).unwrap();
        let parallel = classify_histogram(&histogram, &classifier, 1).unwrap();
        let sequential = count_valid_output_strings(&histogram, &classifier, 1).unwrap();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.invalid, 7);
        assert_eq!(parallel.valid, 8 * 10 + 28);
    }

    #[test]
    fn malformed_key_aborts_classification() {
        let mut histogram = Histogram::new();
        histogram.insert("0000000".to_string(), 1);
        let classifier = Classifier::new(ValidityMode::Exact, steane_codewords()).unwrap();
        assert!(classify_histogram(&histogram, &classifier, 1).is_err());
    }
}
