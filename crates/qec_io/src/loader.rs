use crate::parser::{format_histogram, parse_bit_rows, parse_histogram};
use anyhow::{Context, Result};
use qec_common::Histogram;
use qec_core::parity::{CodewordSet, ParityCheckMatrix};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

fn read(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to open {} file {}", what, path.display()))
}

/// Loads a parity-check matrix, one row per line.
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<ParityCheckMatrix> {
    let path = path.as_ref();
    let rows = parse_bit_rows(&read(path, "matrix")?, "parity check matrix")
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(ParityCheckMatrix::new(rows)?)
}

/// Loads a codeword set, one codeword per line.
pub fn load_codewords<P: AsRef<Path>>(path: P) -> Result<CodewordSet> {
    let path = path.as_ref();
    let words = parse_bit_rows(&read(path, "codeword")?, "codeword")
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(CodewordSet::new(words))
}

pub fn load_histogram<P: AsRef<Path>>(path: P) -> Result<Histogram> {
    let path = path.as_ref();
    parse_histogram(&read(path, "histogram")?)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Writes a histogram in line form.
pub fn save_histogram<P: AsRef<Path>>(path: P, histogram: &Histogram) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create histogram file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(format_histogram(histogram).as_bytes())?;
    writer.flush()?;
    Ok(())
}
