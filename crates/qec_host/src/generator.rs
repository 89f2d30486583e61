//! Histogram file generator.
//!
//! Builds one of the Steane experiment circuits, executes it on the
//! reference simulator and writes the resulting histogram in line format,
//! ready for the `classify` and `ft` commands. The classical register
//! layout is printed alongside so segment positions can be passed on.

use crate::experiment::{Correction, SteaneOptions, correction_circuit};
use anyhow::{Result, bail};
use clap::ValueEnum;
use qec_common::{Circuit, Executor, Histogram};
use qec_core::logical_qubit::SteaneCodeLogicalQubit;
use qec_core::parity::{CodewordSet, ParityCheckMatrix};
use qec_core::registers::{FaultTolerance, RegisterConfig};
use qec_io::loader;
use qec_sim::{MAX_QUBITS, Simulator};

/// Circuit family written by the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scheme {
    /// Plain syndrome extraction without correction.
    Plain,
    /// Syndrome extraction followed by the multi-controlled X network.
    Mct,
    /// Syndrome extraction followed by the helper Toffoli network.
    Helpers,
    /// Goto scheme B: repeated measurement of all data qubits.
    SchemeB,
    /// Goto scheme C: repeated logical parity checks with GHZ ancilla blocks.
    SchemeC,
}

/// Shape of the fault-tolerant schemes.
#[derive(Clone, Copy, Debug)]
pub struct FtShape {
    pub ancilla_block: usize,
    pub rounds: usize,
}

fn fault_tolerant_circuit(
    matrix: &ParityCheckMatrix,
    codewords: &CodewordSet,
    scheme: Scheme,
    shape: FtShape,
    x_error: Option<usize>,
) -> Result<Circuit> {
    let config = match scheme {
        Scheme::SchemeB => RegisterConfig {
            fault_tolerance: FaultTolerance::SchemeB,
            check_rounds: shape.rounds,
            ..RegisterConfig::default()
        },
        Scheme::SchemeC => RegisterConfig {
            ancilla_block: shape.ancilla_block,
            ancilla_rounds: shape.rounds,
            fault_tolerance: FaultTolerance::SchemeC,
            check_rounds: shape.rounds,
            ..RegisterConfig::default()
        },
        other => bail!("{:?} is not a fault-tolerant scheme", other),
    };
    let mut qubit =
        SteaneCodeLogicalQubit::new(Circuit::new(), 1, matrix.clone(), codewords.clone(), config)?;

    qubit.prepare_logical_zero(0, false)?;
    for round in 0..shape.rounds {
        match scheme {
            Scheme::SchemeB => qubit.measure_data_check(0, round)?,
            _ => qubit.check_logical_zero(0, round)?,
        }
    }
    if let Some(q) = x_error {
        qubit.force_x_error(0, q)?;
    }
    let ancilla_rounds = qubit.config().ancilla_rounds;
    for round in 0..ancilla_rounds {
        qubit.set_up_ancilla(0)?;
        qubit.measure_ancilla(0, round)?;
    }
    qubit.measure_data(0)?;
    Ok(qubit.into_builder())
}

/// Builds the circuit for `scheme`.
pub fn build_circuit(
    matrix: &ParityCheckMatrix,
    codewords: &CodewordSet,
    scheme: Scheme,
    shape: FtShape,
    x_error: Option<usize>,
) -> Result<Circuit> {
    let correction = match scheme {
        Scheme::Plain => Correction::None,
        Scheme::Mct => Correction::Mct,
        Scheme::Helpers => Correction::Helpers,
        Scheme::SchemeB | Scheme::SchemeC => {
            return fault_tolerant_circuit(matrix, codewords, scheme, shape, x_error);
        }
    };
    let options = SteaneOptions {
        correction,
        logical_one: false,
        dedupe: false,
        x_error,
        z_error: None,
    };
    Ok(correction_circuit(matrix, codewords, &options)?.circuit)
}

/// Simulates `scheme` and writes the histogram to `out_path`.
#[allow(clippy::too_many_arguments)]
pub fn generate_histogram(
    out_path: &str,
    matrix: &ParityCheckMatrix,
    codewords: &CodewordSet,
    scheme: Scheme,
    shape: FtShape,
    x_error: Option<usize>,
    shots: u64,
    seed: u64,
) -> Result<Histogram> {
    let circuit = build_circuit(matrix, codewords, scheme, shape, x_error)?;
    if circuit.num_qubits() > MAX_QUBITS {
        bail!(
            "{:?} needs {} qubits, the simulator holds {}",
            scheme,
            circuit.num_qubits(),
            MAX_QUBITS
        );
    }

    println!(
        "Generating {:?} histogram ({} qubits, {} shots)...",
        scheme,
        circuit.num_qubits(),
        shots
    );
    println!("Key segments:");
    for (i, register) in circuit.classical_registers().iter().enumerate() {
        println!("  [{:2}] {} ({} bits)", i, register.name, register.size);
    }

    let histogram = Simulator::with_seed(seed).execute(&circuit, shots)?;
    loader::save_histogram(out_path, &histogram)?;
    println!("Wrote {} distinct keys to {}", histogram.len(), out_path);
    Ok(histogram)
}
