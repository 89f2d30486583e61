mod classify;
mod experiment;
mod generator;
mod stats;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use experiment::{BaconShorOptions, Correction, SteaneOptions};
use generator::{FtShape, Scheme};
use qec_core::bacon_shor::BaconShorConfig;
use qec_core::bit_utils::BitString;
use qec_core::decoder::{Classifier, RoundConfig, ValidityMode, ValiditySelection};
use qec_core::parity::{CodewordSet, ParityCheckMatrix, steane_codewords, steane_parity_check_matrix};
use qec_io::loader;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(about = "Error-correction circuit synthesis and decoding experiments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Code definition; the Steane code when omitted.
#[derive(Args, Clone)]
struct CodeArgs {
    /// Parity-check matrix file, one row per line.
    #[arg(long)]
    matrix: Option<String>,
    /// Logical-zero codeword file, one codeword per line.
    #[arg(long)]
    codewords: Option<String>,
}

impl CodeArgs {
    fn load(&self) -> Result<(ParityCheckMatrix, CodewordSet)> {
        Ok((self.matrix()?, self.codewords()?))
    }

    fn matrix(&self) -> Result<ParityCheckMatrix> {
        Ok(match &self.matrix {
            Some(path) => loader::load_matrix(path)?,
            None => steane_parity_check_matrix(),
        })
    }

    fn codewords(&self) -> Result<CodewordSet> {
        Ok(match &self.codewords {
            Some(path) => loader::load_codewords(path)?,
            None => steane_codewords(),
        })
    }
}

/// Classification mode flags. At most one may be given.
#[derive(Args, Clone)]
struct ModeArgs {
    #[arg(long)]
    post_selection: bool,
    /// Compare the logical Z parity with `--expected`.
    #[arg(long)]
    simple: bool,
    /// Compare one qubit, `--single-bit`, with `--expected`.
    #[arg(long)]
    single: bool,
    #[arg(long, default_value_t = 0)]
    single_bit: usize,
    /// Expected logical value for the simple and single modes.
    #[arg(long, default_value = "0")]
    expected: String,
    /// Classify against the logical-one codewords.
    #[arg(long)]
    logical_one: bool,
}

impl ModeArgs {
    fn selection(&self) -> ValiditySelection {
        ValiditySelection {
            post_selection: self.post_selection,
            simple: self.simple,
            single: self.single,
            single_bit: self.single_bit,
        }
    }

    /// Mode, the codeword set it classifies against and the logical Z
    /// support of the code. Only simple mode reads the matrix.
    fn resolve(&self, code: &CodeArgs) -> Result<Resolved> {
        let mode = ValidityMode::try_from(self.selection())?;
        let parity_bits = match (mode, &code.matrix) {
            (ValidityMode::Simple, _) => code.matrix()?.simple_parity_bits(),
            (_, Some(path)) => {
                bail!("--matrix {} only affects --simple classification", path)
            }
            (_, None) => steane_parity_check_matrix().simple_parity_bits(),
        };
        let codewords = match mode {
            ValidityMode::Simple | ValidityMode::Single(_) => {
                CodewordSet::new(vec![BitString::parse(&self.expected, "expected value")?])
            }
            _ if self.logical_one => code.codewords()?.flipped(),
            _ => code.codewords()?,
        };
        Ok(Resolved {
            mode,
            codewords,
            parity_bits,
        })
    }
}

struct Resolved {
    mode: ValidityMode,
    codewords: CodewordSet,
    parity_bits: Vec<usize>,
}

impl Resolved {
    fn classifier(self) -> Result<Classifier> {
        Ok(Classifier::new(self.mode, self.codewords)?.with_parity_bits(self.parity_bits))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Checks {
    X,
    Z,
    Both,
}

#[derive(Subcommand)]
enum Commands {
    /// Steane correction experiment with repeat statistics.
    Correct {
        #[arg(long, value_enum, default_value_t = Correction::Mct)]
        correction: Correction,
        #[arg(long)]
        logical_one: bool,
        #[arg(long)]
        dedupe: bool,
        /// Data qubit receiving a forced bit flip.
        #[arg(long)]
        x_error: Option<usize>,
        /// Data qubit receiving a forced phase flip.
        #[arg(long)]
        z_error: Option<usize>,
        #[arg(long, default_value_t = 1024)]
        shots: u64,
        #[arg(long, default_value_t = 10)]
        repeats: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[command(flatten)]
        code: CodeArgs,
    },
    /// Prepare and decode logical zero, expecting all-zero data.
    Encode {
        #[arg(long)]
        dedupe: bool,
        #[arg(long, default_value_t = 100)]
        shots: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[command(flatten)]
        code: CodeArgs,
    },
    /// Simulate a circuit family and write its histogram file.
    Gen {
        #[arg(short, long, default_value = "histogram.txt")]
        out: String,
        #[arg(long, value_enum, default_value_t = Scheme::Plain)]
        scheme: Scheme,
        /// Physical qubits per syndrome qubit (scheme C).
        #[arg(long, default_value_t = 1)]
        block: usize,
        #[arg(long, default_value_t = 3)]
        rounds: usize,
        #[arg(long)]
        x_error: Option<usize>,
        #[arg(long, default_value_t = 1024)]
        shots: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[command(flatten)]
        code: CodeArgs,
    },
    /// Count valid, invalid and outside shots of a histogram file.
    Classify {
        #[arg(short = 'H', long)]
        histogram: String,
        /// Key segment holding the data.
        #[arg(short, long)]
        data_position: usize,
        #[command(flatten)]
        mode: ModeArgs,
        #[command(flatten)]
        code: CodeArgs,
    },
    /// Post-process a fault-tolerant histogram file.
    Ft {
        #[arg(short = 'H', long)]
        histogram: String,
        #[arg(long, default_value = "0")]
        ancilla_zero: String,
        #[arg(long, default_value = "1")]
        ancilla_one: String,
        #[arg(long, default_value_t = 0)]
        ancilla_qubits: usize,
        #[arg(long, default_value_t = 1)]
        ancilla_rounds: usize,
        #[arg(long, default_value_t = 0)]
        data_meas_start: usize,
        #[arg(long, default_value_t = 0)]
        data_meas_qubits: usize,
        #[arg(long, default_value_t = 0)]
        data_meas_rounds: usize,
        /// File of accepted data-check readings; `0` when omitted.
        #[arg(long)]
        data_meas_strings: Option<String>,
        #[arg(long)]
        data_start: usize,
        #[command(flatten)]
        mode: ModeArgs,
        #[command(flatten)]
        code: CodeArgs,
    },
    /// Bacon-Shor experiment with ancilla and parity summaries.
    BaconShor {
        /// Use the fault-tolerant row-GHZ encoding.
        #[arg(long)]
        ft: bool,
        #[arg(long)]
        logical_one: bool,
        #[arg(long)]
        logical_z: bool,
        #[arg(long)]
        x_error: Option<usize>,
        #[arg(long)]
        z_error: Option<usize>,
        #[arg(long, value_enum, default_value_t = Checks::Both)]
        checks: Checks,
        #[arg(long, default_value_t = 1024)]
        shots: u64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Correct {
            correction,
            logical_one,
            dedupe,
            x_error,
            z_error,
            shots,
            repeats,
            seed,
            code,
        } => {
            let (matrix, codewords) = code.load()?;
            let options = SteaneOptions {
                correction,
                logical_one,
                dedupe,
                x_error,
                z_error,
            };
            experiment::run_correction(&matrix, &codewords, &options, shots, repeats, seed)?;
        }
        Commands::Encode {
            dedupe,
            shots,
            seed,
            code,
        } => {
            let (matrix, codewords) = code.load()?;
            let mismatched = experiment::run_encode(&matrix, &codewords, dedupe, shots, seed)?;
            if mismatched > 0 {
                bail!("{} shots did not decode to all-zero data", mismatched);
            }
        }
        Commands::Gen {
            out,
            scheme,
            block,
            rounds,
            x_error,
            shots,
            seed,
            code,
        } => {
            let (matrix, codewords) = code.load()?;
            let shape = FtShape {
                ancilla_block: block,
                rounds,
            };
            generator::generate_histogram(
                &out, &matrix, &codewords, scheme, shape, x_error, shots, seed,
            )?;
        }
        Commands::Classify {
            histogram,
            data_position,
            mode,
            code,
        } => {
            let classifier = mode.resolve(&code)?.classifier()?;
            classify::run_classify(&histogram, &classifier, data_position)?;
        }
        Commands::Ft {
            histogram,
            ancilla_zero,
            ancilla_one,
            ancilla_qubits,
            ancilla_rounds,
            data_meas_start,
            data_meas_qubits,
            data_meas_rounds,
            data_meas_strings,
            data_start,
            mode,
            code,
        } => {
            let resolved = mode.resolve(&code)?;
            let data_meas_strings = match data_meas_strings {
                Some(path) => loader::load_codewords(path)?,
                None => RoundConfig::default().data_meas_strings,
            };
            let rounds = RoundConfig {
                ancilla_zero: BitString::parse(&ancilla_zero, "ancilla zero")?,
                ancilla_one: BitString::parse(&ancilla_one, "ancilla one")?,
                ancilla_qubits,
                ancilla_rounds,
                data_meas_start,
                data_meas_qubits,
                data_meas_rounds,
                data_meas_strings,
                data_start,
                mode: resolved.mode,
                parity_bits: resolved.parity_bits,
            };
            classify::run_ft(&histogram, &resolved.codewords, &rounds)?;
        }
        Commands::BaconShor {
            ft,
            logical_one,
            logical_z,
            x_error,
            z_error,
            checks,
            shots,
            seed,
        } => {
            let options = BaconShorOptions {
                config: BaconShorConfig {
                    logical_one,
                    logical_z,
                    ..BaconShorConfig::default()
                },
                fault_tolerant: ft,
                x_error,
                z_error,
                x_checks: checks != Checks::Z,
                z_checks: checks != Checks::X,
            };
            experiment::run_bacon_shor(&options, shots, seed)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qec_common::Histogram;

    fn mode_args(simple: bool) -> ModeArgs {
        ModeArgs {
            post_selection: false,
            simple,
            single: false,
            single_bit: 0,
            expected: "0".to_string(),
            logical_one: false,
        }
    }

    fn reversed_matrix_file(tag: &str) -> String {
        let path = std::env::temp_dir().join(format!("qec_host_{}_{}.txt", std::process::id(), tag));
        std::fs::write(&path, "1111000\n1100110\n1010101\n").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn simple_mode_reads_parity_bits_from_loaded_matrix() {
        let path = reversed_matrix_file("simple");
        let code = CodeArgs {
            matrix: Some(path.clone()),
            codewords: None,
        };
        let resolved = mode_args(true).resolve(&code).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(resolved.parity_bits, vec![1, 2, 4]);

        // keys print qubit 0 rightmost, so the logical zeros of the
        // column-reversed code show up as the Steane words themselves
        let histogram: Histogram = steane_codewords()
            .words()
            .iter()
            .map(|w| (w.to_string(), 10))
            .collect();
        let classifier = resolved.classifier().unwrap();
        let counts = classify::classify_histogram(&histogram, &classifier, 0).unwrap();
        assert_eq!((counts.valid, counts.invalid), (80, 0));
    }

    #[test]
    fn matrix_outside_simple_mode_is_refused() {
        let code = CodeArgs {
            matrix: Some("unused.txt".to_string()),
            codewords: None,
        };
        assert!(mode_args(false).resolve(&code).is_err());
    }
}
