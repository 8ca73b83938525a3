//! Measured samples and their descriptive statistics

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::entities::resistor::ToleranceWindow;

/// Units measured per batch unless configured otherwise
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Errors raised while capturing a sample
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum SampleError {
    #[error("expected {expected} measurements, got {found}")]
    #[diagnostic(code(rqc::sample::size))]
    WrongSize { expected: usize, found: usize },

    #[error("measurement {position} ({value}) must be a finite, non-negative resistance")]
    #[diagnostic(code(rqc::sample::value))]
    InvalidMeasurement { position: usize, value: f64 },

    #[error("sample size must be at least 1")]
    #[diagnostic(code(rqc::sample::empty))]
    EmptySample,
}

/// How the spread of the sample is estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadConvention {
    /// Divide squared deviations by N
    #[default]
    Population,
    /// Bessel-corrected, divide by N - 1
    Sample,
}

impl fmt::Display for SpreadConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpreadConvention::Population => write!(f, "population"),
            SpreadConvention::Sample => write!(f, "sample"),
        }
    }
}

impl std::str::FromStr for SpreadConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "population" | "pop" => Ok(SpreadConvention::Population),
            "sample" | "bessel" => Ok(SpreadConvention::Sample),
            _ => Err(format!(
                "Invalid spread convention: {}. Use population or sample",
                s
            )),
        }
    }
}

/// How the failure rate is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureBasis {
    /// Each failing unit contributes 100 / N points on a 0-100 scale
    #[default]
    Percent,
    /// Raw number of failing units
    Count,
}

impl fmt::Display for FailureBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureBasis::Percent => write!(f, "percent"),
            FailureBasis::Count => write!(f, "count"),
        }
    }
}

impl std::str::FromStr for FailureBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "percent" | "%" => Ok(FailureBasis::Percent),
            "count" => Ok(FailureBasis::Count),
            _ => Err(format!("Invalid failure basis: {}. Use percent or count", s)),
        }
    }
}

/// Knobs for evaluating a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Number of units measured per batch
    pub sample_size: usize,

    /// Variance convention
    pub spread: SpreadConvention,

    /// Failure rate scale
    pub failure_basis: FailureBasis,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            spread: SpreadConvention::default(),
            failure_basis: FailureBasis::default(),
        }
    }
}

/// A captured set of measured resistances, in ohms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    /// Capture exactly `expected` measurements
    pub fn new(values: Vec<f64>, expected: usize) -> Result<Self, SampleError> {
        if expected == 0 {
            return Err(SampleError::EmptySample);
        }
        if values.len() != expected {
            return Err(SampleError::WrongSize {
                expected,
                found: values.len(),
            });
        }
        if let Some((i, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(SampleError::InvalidMeasurement {
                position: i + 1,
                value,
            });
        }

        Ok(Self { values })
    }

    /// Measured values in entry order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arithmetic mean
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Mean, variance and standard deviation under the given convention
    pub fn stats(&self, spread: SpreadConvention) -> SampleStats {
        let n = self.values.len();
        let mean = self.mean();
        let sum_sq: f64 = self.values.iter().map(|x| (x - mean).powi(2)).sum();

        let variance = match spread {
            SpreadConvention::Population => sum_sq / n as f64,
            SpreadConvention::Sample if n > 1 => sum_sq / (n - 1) as f64,
            SpreadConvention::Sample => 0.0,
        };

        SampleStats {
            mean,
            variance,
            std_dev: variance.sqrt(),
        }
    }

    /// Count units outside the window and derive the failure rate
    pub fn conformance(&self, window: &ToleranceWindow, basis: FailureBasis) -> Conformance {
        let failing = self.values.iter().filter(|&&x| !window.contains(x)).count();
        let failure_rate = match basis {
            FailureBasis::Percent => (failing * 100) as f64 / self.values.len() as f64,
            FailureBasis::Count => failing as f64,
        };

        Conformance {
            failing,
            sample_size: self.values.len(),
            failure_rate,
        }
    }
}

/// Descriptive statistics of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

/// Result of checking a sample against a tolerance window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conformance {
    /// Units strictly outside the window
    pub failing: usize,

    /// Units measured
    pub sample_size: usize,

    /// Failure rate on the configured basis
    pub failure_rate: f64,
}

impl Conformance {
    pub fn all_pass(&self) -> bool {
        self.failing == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> ToleranceWindow {
        ToleranceWindow::new(1000.0, 0.05)
    }

    fn scenario_sample() -> Sample {
        let mut values = vec![1000.0; 9];
        values.push(1100.0);
        Sample::new(values, 10).unwrap()
    }

    #[test]
    fn test_identical_values_have_no_spread() {
        for v in [0.0, 4.7, 1000.0, 2.2e6] {
            let sample = Sample::new(vec![v; 10], 10).unwrap();
            let stats = sample.stats(SpreadConvention::Population);
            assert!((stats.mean - v).abs() <= v * 1e-12);
            assert!(stats.variance.abs() <= v * v * 1e-20);
            assert!(stats.std_dev.abs() <= v * 1e-10);

            let w = ToleranceWindow::new(v, 0.01);
            assert_eq!(sample.conformance(&w, FailureBasis::Percent).failure_rate, 0.0);
        }
    }

    #[test]
    fn test_scenario_one_high_unit() {
        let sample = scenario_sample();
        let stats = sample.stats(SpreadConvention::Population);

        assert!((stats.mean - 1010.0).abs() < 1e-9);
        // nine deviations of -10 and one of +90: (900 + 8100) / 10
        assert!((stats.variance - 900.0).abs() < 1e-9);
        assert!((stats.std_dev - 30.0).abs() < 1e-9);

        let conformance = sample.conformance(&window(), FailureBasis::Percent);
        assert_eq!(conformance.failing, 1);
        assert_eq!(conformance.failure_rate, 10.0);
        assert!(!conformance.all_pass());
    }

    #[test]
    fn test_failure_rate_is_ten_per_failing_unit() {
        for failing in 0..=10usize {
            let mut values = vec![1000.0; 10 - failing];
            values.extend(std::iter::repeat(2000.0).take(failing));
            let sample = Sample::new(values, 10).unwrap();

            let c = sample.conformance(&window(), FailureBasis::Percent);
            assert_eq!(c.failing, failing);
            assert_eq!(c.failure_rate, (failing * 10) as f64);
        }
    }

    #[test]
    fn test_boundary_values_conform() {
        let values = vec![950.0, 1050.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0, 1000.0];
        let sample = Sample::new(values, 10).unwrap();
        let w = ToleranceWindow { min: 950.0, max: 1050.0 };
        assert!(sample.conformance(&w, FailureBasis::Percent).all_pass());
    }

    #[test]
    fn test_out_of_tolerance_values_still_count_in_stats() {
        let sample = Sample::new(vec![0.0, 2000.0], 2).unwrap();
        let stats = sample.stats(SpreadConvention::Population);
        assert_eq!(stats.mean, 1000.0);
        assert_eq!(stats.std_dev, 1000.0);
        assert_eq!(sample.conformance(&window(), FailureBasis::Percent).failure_rate, 100.0);
    }

    #[test]
    fn test_count_basis() {
        let c = scenario_sample().conformance(&window(), FailureBasis::Count);
        assert_eq!(c.failure_rate, 1.0);
    }

    #[test]
    fn test_rate_scales_with_sample_size() {
        let sample = Sample::new(vec![1000.0, 1000.0, 1000.0, 5.0], 4).unwrap();
        assert_eq!(sample.conformance(&window(), FailureBasis::Percent).failure_rate, 25.0);
    }

    #[test]
    fn test_bessel_corrected_spread() {
        let stats = scenario_sample().stats(SpreadConvention::Sample);
        assert!((stats.variance - 1000.0).abs() < 1e-9);

        let single = Sample::new(vec![12.0], 1).unwrap();
        assert_eq!(single.stats(SpreadConvention::Sample).variance, 0.0);
    }

    #[test]
    fn test_sample_validation() {
        assert_eq!(
            Sample::new(vec![1.0; 9], 10).unwrap_err(),
            SampleError::WrongSize { expected: 10, found: 9 }
        );
        assert_eq!(
            Sample::new(vec![1.0, -2.0], 2).unwrap_err(),
            SampleError::InvalidMeasurement { position: 2, value: -2.0 }
        );
        assert!(Sample::new(vec![f64::NAN], 1).is_err());
        assert!(Sample::new(vec![f64::INFINITY], 1).is_err());
        assert_eq!(Sample::new(vec![], 0).unwrap_err(), SampleError::EmptySample);
    }

    #[test]
    fn test_option_parsing() {
        assert_eq!("Population".parse::<SpreadConvention>().unwrap(), SpreadConvention::Population);
        assert_eq!("bessel".parse::<SpreadConvention>().unwrap(), SpreadConvention::Sample);
        assert_eq!("count".parse::<FailureBasis>().unwrap(), FailureBasis::Count);
        assert!("median".parse::<SpreadConvention>().is_err());
        assert!("ratio".parse::<FailureBasis>().is_err());
    }
}
