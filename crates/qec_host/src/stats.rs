//! Error-rate statistics over repeated experiments.
//!
//! Each repeat of an experiment yields one logical error rate. The tracker
//! collects them and reports the spread with the sample standard deviation
//! and the standard error of the mean.

use anyhow::Result;
use qec_core::stats::{mean, standard_error};

/// Collects per-repeat logical error rates.
///
/// Also keeps the shot totals so the report can show how many shots the
/// rates were computed from.
pub struct ErrorRateStats {
    pub rates: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub shots: u64,
    pub failures: u64,
}

impl ErrorRateStats {
    /// Creates an empty tracker. `min` starts at 1.0 so the first rate
    /// recorded becomes the minimum.
    pub fn new() -> Self {
        Self {
            rates: Vec::new(),
            min: 1.0,
            max: 0.0,
            shots: 0,
            failures: 0,
        }
    }

    /// Records one repeat.
    ///
    /// # Arguments
    ///
    /// * `failures` - Shots classified as logical errors
    /// * `shots` - Shots classified in this repeat
    pub fn update(&mut self, failures: u64, shots: u64) {
        let rate = if shots == 0 {
            0.0
        } else {
            failures as f64 / shots as f64
        };
        self.min = self.min.min(rate);
        self.max = self.max.max(rate);
        self.shots += shots;
        self.failures += failures;
        self.rates.push(rate);
    }

    pub fn count(&self) -> usize {
        self.rates.len()
    }

    /// Mean of the recorded rates.
    pub fn mean(&self) -> Result<f64> {
        Ok(mean(&self.rates)?)
    }

    /// Prints the summary. The deviation lines need at least two repeats.
    pub fn print_report(&self) -> Result<()> {
        println!("\nLogical Error Rate");
        println!("Repeats: {}", self.count());
        println!("Shots:   {} ({} failed)", self.shots, self.failures);
        if self.rates.is_empty() {
            return Ok(());
        }
        println!("Mean:    {:.6}", self.mean()?);
        println!("Min:     {:.6}", self.min);
        println!("Max:     {:.6}", self.max);
        if self.count() > 1 {
            let (deviation, error) = standard_error(&self.rates)?;
            println!("StdDev:  {:.6}", deviation);
            println!("StdErr:  {:.6}", error);
        }
        Ok(())
    }
}

impl Default for ErrorRateStats {
    fn default() -> Self {
        Self::new()
    }
}
