//! Pure validation for prompted input
//!
//! Prompts re-ask until these accept the raw text, so they carry no I/O.

use miette::Diagnostic;
use thiserror::Error;

/// Rejected menu selection
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SelectionError {
    #[error("only defined integer values will be accepted, please try again")]
    #[diagnostic(code(rqc::select::integer))]
    NotAnInteger(String),

    #[error("{value} is not an option, choose {min}-{max}")]
    #[diagnostic(code(rqc::select::range))]
    OutOfRange { value: i64, min: i64, max: i64 },
}

/// Rejected measurement entry
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum MeasurementError {
    #[error("'{0}' is not a resistance value")]
    #[diagnostic(code(rqc::measure::number))]
    NotANumber(String),

    #[error("resistance cannot be negative ({0})")]
    #[diagnostic(code(rqc::measure::negative))]
    Negative(f64),

    #[error("resistance must be a finite number")]
    #[diagnostic(code(rqc::measure::finite))]
    NotFinite,
}

/// Parse an integer and require it to lie in `min..=max`
///
/// Surrounding whitespace is ignored; anything else after the digits
/// (e.g. "2a") is rejected.
pub fn parse_bounded_int(raw: &str, min: i64, max: i64) -> Result<i64, SelectionError> {
    let trimmed = raw.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| SelectionError::NotAnInteger(trimmed.to_string()))?;

    if value < min || value > max {
        return Err(SelectionError::OutOfRange { value, min, max });
    }

    Ok(value)
}

/// Parse a measured resistance in ohms
pub fn parse_measurement(raw: &str) -> Result<f64, MeasurementError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| MeasurementError::NotANumber(trimmed.to_string()))?;

    if !value.is_finite() {
        return Err(MeasurementError::NotFinite);
    }
    if value < 0.0 {
        return Err(MeasurementError::Negative(value));
    }

    Ok(value)
}

/// Parse a comma-separated list of measurements
pub fn parse_measurement_list(raw: &str) -> Result<Vec<f64>, MeasurementError> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(parse_measurement)
        .collect()
}
