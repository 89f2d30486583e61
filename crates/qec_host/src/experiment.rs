//! Steane and Bacon-Shor experiments run on the reference simulator.
//!
//! Repeats are independent, so they run in parallel with rayon, each on its
//! own simulator seeded from the base seed plus the repeat index.

use crate::stats::ErrorRateStats;
use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use qec_common::{Circuit, Executor, Histogram};
use qec_core::bacon_shor::{BaconShorConfig, BaconShorLogicalQubit};
use qec_core::decoder::{
    Classifier, ValidityMode, apply_software_correction, count_valid_output_strings,
    find_ancilla_values, find_individual_ancilla_values, find_parity,
};
use qec_core::logical_qubit::SteaneCodeLogicalQubit;
use qec_core::parity::{CodewordSet, ParityCheckMatrix};
use qec_core::registers::RegisterConfig;
use qec_sim::Simulator;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// How measured errors are undone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Correction {
    /// Multi-controlled X network.
    Mct,
    /// Toffoli network over the extra helper qubits.
    Helpers,
    /// Classical correction of the measured data from the Z syndrome.
    Software,
    /// Syndromes are measured but nothing is corrected.
    None,
}

/// Options shared by the Steane experiments.
#[derive(Clone, Debug)]
pub struct SteaneOptions {
    pub correction: Correction,
    pub logical_one: bool,
    pub dedupe: bool,
    pub x_error: Option<usize>,
    pub z_error: Option<usize>,
}

/// A built circuit with the key positions needed to post-process it.
pub struct SteaneRun {
    pub circuit: Circuit,
    pub data_position: usize,
    pub z_ancilla_position: usize,
}

fn position(circuit: &Circuit, name: &str) -> Result<usize> {
    circuit
        .segment_index(name)
        .with_context(|| format!("circuit has no classical register named {:?}", name))
}

/// Builds preparation, optional forced errors, syndrome extraction,
/// correction and measurement for one logical qubit.
pub fn correction_circuit(
    matrix: &ParityCheckMatrix,
    codewords: &CodewordSet,
    options: &SteaneOptions,
) -> Result<SteaneRun> {
    let config = RegisterConfig {
        extend_ancilla: options.correction == Correction::Helpers,
        ..RegisterConfig::default()
    };
    let mut qubit = SteaneCodeLogicalQubit::new(
        Circuit::new(),
        1,
        matrix.clone(),
        codewords.clone(),
        config,
    )?;

    if options.logical_one {
        qubit.prepare_logical_one(0, options.dedupe)?;
    } else {
        qubit.prepare_logical_zero(0, options.dedupe)?;
    }
    if let Some(q) = options.x_error {
        qubit.force_x_error(0, q)?;
    }
    if let Some(q) = options.z_error {
        qubit.force_z_error(0, q)?;
    }
    qubit.set_up_ancilla(0)?;
    match options.correction {
        Correction::Mct => qubit.correct_errors(0, true)?,
        Correction::Helpers => qubit.correct_errors(0, false)?,
        Correction::Software | Correction::None => {}
    }
    qubit.logical_measure(0)?;

    let circuit = qubit.into_builder();
    Ok(SteaneRun {
        data_position: position(&circuit, "measure_data 0")?,
        z_ancilla_position: position(&circuit, "measure_ancilla_Z 0")?,
        circuit,
    })
}

/// Runs the correction experiment `repeats` times and prints the logical
/// error rate statistics.
pub fn run_correction(
    matrix: &ParityCheckMatrix,
    codewords: &CodewordSet,
    options: &SteaneOptions,
    shots: u64,
    repeats: usize,
    seed: u64,
) -> Result<ErrorRateStats> {
    let run = correction_circuit(matrix, codewords, options)?;
    let expected = if options.logical_one {
        codewords.flipped()
    } else {
        codewords.clone()
    };
    let classifier = Classifier::new(ValidityMode::Exact, expected)?;
    let length = matrix.num_columns();

    println!(
        "Running {:?} correction: {} qubits, {} repeats x {} shots",
        options.correction,
        run.circuit.num_qubits(),
        repeats,
        shots
    );
    let start = Instant::now();

    let results: Vec<(u64, u64)> = (0..repeats)
        .into_par_iter()
        .map(|i| -> Result<(u64, u64)> {
            let mut simulator = Simulator::with_seed(seed.wrapping_add(i as u64));
            let mut histogram = simulator.execute(&run.circuit, shots)?;
            if options.correction == Correction::Software {
                histogram = apply_software_correction(
                    &histogram,
                    run.z_ancilla_position,
                    run.data_position,
                    length,
                )?;
            }
            let counts = count_valid_output_strings(&histogram, &classifier, run.data_position)?;
            debug!(repeat = i, valid = counts.valid, invalid = counts.invalid, "repeat finished");
            Ok((counts.invalid, counts.total()))
        })
        .collect::<Result<_>>()?;

    let mut stats = ErrorRateStats::new();
    for (failures, total) in results {
        stats.update(failures, total);
    }
    info!(elapsed = ?start.elapsed(), "correction experiment finished");
    stats.print_report()?;
    Ok(stats)
}

/// Prepares logical zero and immediately decodes it. Every shot should read
/// all-zero data; returns the number of shots that did not.
pub fn run_encode(
    matrix: &ParityCheckMatrix,
    codewords: &CodewordSet,
    dedupe: bool,
    shots: u64,
    seed: u64,
) -> Result<u64> {
    let mut qubit = SteaneCodeLogicalQubit::new(
        Circuit::new(),
        1,
        matrix.clone(),
        codewords.clone(),
        RegisterConfig::default(),
    )?;
    qubit.prepare_logical_zero(0, dedupe)?;
    qubit.decode(0, dedupe)?;
    qubit.measure_data(0)?;
    let circuit = qubit.into_builder();
    let data = position(&circuit, "measure_data 0")?;

    let ops = circuit.count_ops();
    println!("Encode round trip (dedupe: {})", dedupe);
    for (op, count) in &ops {
        println!("  {:?}: {}", op, count);
    }

    let histogram = Simulator::with_seed(seed).execute(&circuit, shots)?;
    let zeros = "0".repeat(matrix.num_columns());
    let mismatched: u64 = histogram
        .iter()
        .filter(|(key, _)| key.split_whitespace().nth(data) != Some(zeros.as_str()))
        .map(|(_, &count)| count)
        .sum();
    println!("Shots returning to zero: {}/{}", shots - mismatched, shots);
    Ok(mismatched)
}

/// Options of the Bacon-Shor experiment.
#[derive(Clone, Debug)]
pub struct BaconShorOptions {
    pub config: BaconShorConfig,
    pub fault_tolerant: bool,
    pub x_error: Option<usize>,
    pub z_error: Option<usize>,
    pub x_checks: bool,
    pub z_checks: bool,
}

/// Runs the Bacon-Shor circuit and prints the ancilla and parity summaries.
pub fn run_bacon_shor(options: &BaconShorOptions, shots: u64, seed: u64) -> Result<Histogram> {
    if !options.x_checks && !options.z_checks {
        bail!("select at least one of the X and Z stabilizer checks");
    }
    let mut qubit = BaconShorLogicalQubit::new(Circuit::new(), 1, options.config.clone())?;
    if options.fault_tolerant {
        qubit.encoding_ft(0)?;
    } else {
        qubit.encoding_nft(0)?;
    }
    if let Some(q) = options.x_error {
        qubit.force_x_error(0, q)?;
    }
    if let Some(q) = options.z_error {
        qubit.force_z_error(0, q)?;
    }
    if options.z_checks {
        qubit.z_stabilizers(0)?;
    }
    if options.x_checks {
        qubit.x_stabilizers(0)?;
    }
    qubit.logical_measure(0)?;
    let circuit = qubit.into_builder();
    let data = position(&circuit, "measure_data 0")?;
    let ancilla = position(&circuit, "measure_ancilla 0")?;

    let histogram = Simulator::with_seed(seed).execute(&circuit, shots)?;
    let config = &options.config;

    let values = find_ancilla_values(&histogram, config.ancilla_qubits, ancilla)?;
    println!("Ancilla values:");
    for (value, count) in values.iter().filter(|(_, c)| **c > 0) {
        println!("  {}: {}", value, count);
    }
    let individual =
        find_individual_ancilla_values(&values, config.data_qubits, config.ancilla_qubits, "ancilla ");
    println!("Individual ancilla:");
    for (name, count) in &individual {
        println!("  {}: {}", name, count);
    }
    let parity = find_parity(&histogram, data, config.data_qubits)?;
    println!("Data parity: even {} odd {}", parity[0], parity[1]);
    Ok(histogram)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qec_core::parity::{steane_codewords, steane_parity_check_matrix};

    fn options(correction: Correction, x_error: Option<usize>) -> SteaneOptions {
        SteaneOptions {
            correction,
            logical_one: false,
            dedupe: true,
            x_error,
            z_error: None,
        }
    }

    #[test]
    fn corrected_runs_have_no_logical_errors() {
        let matrix = steane_parity_check_matrix();
        let codewords = steane_codewords();
        for correction in [Correction::Mct, Correction::Helpers, Correction::Software] {
            let stats =
                run_correction(&matrix, &codewords, &options(correction, Some(6)), 64, 3, 1)
                    .unwrap();
            assert_eq!(stats.failures, 0, "{:?}", correction);
            assert_eq!(stats.shots, 192);
        }
    }

    #[test]
    fn uncorrected_flip_is_always_a_logical_error() {
        let stats = run_correction(
            &steane_parity_check_matrix(),
            &steane_codewords(),
            &options(Correction::None, Some(3)),
            32,
            2,
            9,
        )
        .unwrap();
        assert_eq!(stats.failures, 64);
    }

    #[test]
    fn encode_round_trip_is_clean() {
        let mismatched =
            run_encode(&steane_parity_check_matrix(), &steane_codewords(), true, 50, 4).unwrap();
        assert_eq!(mismatched, 0);
    }

    #[test]
    fn bacon_shor_reports_row_syndrome() {
        let options = BaconShorOptions {
            config: BaconShorConfig::default(),
            fault_tolerant: false,
            x_error: Some(4),
            z_error: None,
            x_checks: false,
            z_checks: true,
        };
        let hist = run_bacon_shor(&options, 20, 2).unwrap();
        let values = find_ancilla_values(&hist, 4, 1).unwrap();
        // qubit 4 sits in the middle row, seen by both Z checks
        assert_eq!(values.get("0011"), Some(&20));
    }
}
