//! Summary statistics over repeated experiments.
//!
//! Error rates from repeated circuit runs are reported as a mean with a
//! standard error. Both use the sample (n - 1) standard deviation.

use crate::{QecError, Result};

/// Arithmetic mean of `values`.
///
/// # Errors
///
/// [`QecError::Configuration`] for an empty slice.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(QecError::Configuration(
            "the mean needs at least one value".into(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation and standard error of the mean.
///
/// Returns `(standard_deviation, standard_error)` where the error is the
/// deviation divided by `sqrt(n)`.
///
/// # Errors
///
/// [`QecError::Configuration`] for fewer than two values.
pub fn standard_error(values: &[f64]) -> Result<(f64, f64)> {
    if values.len() < 2 {
        return Err(QecError::Configuration(format!(
            "a standard error needs at least two values, got {}",
            values.len()
        )));
    }
    let n = values.len() as f64;
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0);
    let deviation = variance.sqrt();
    Ok((deviation, deviation / n.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_small_list() {
        let m = mean(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((m - 3.0).abs() < 1e-7);
    }

    #[test]
    fn standard_error_matches_reference() {
        let (sd, se) = standard_error(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((sd - 1.58113883).abs() < 1e-7);
        assert!((se - 0.70710678).abs() < 1e-7);
    }

    #[test]
    fn too_few_values_are_rejected() {
        assert!(mean(&[]).is_err());
        assert!(standard_error(&[1.0]).is_err());
    }
}
