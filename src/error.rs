//! Calculation errors
//!
//! Every failure the engine can raise, classified precisely enough for the
//! caller to produce an accurate message.

use serde::Serialize;
use thiserror::Error;

/// Calculation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Blank, non-numeric or non-finite input
    #[error("Invalid number for {field}: '{input}'")]
    InvalidNumber { field: String, input: String },

    /// Unit tag not recognized for the analyte
    #[error("Unsupported unit '{unit}' for {analyte}")]
    InvalidUnit { analyte: String, unit: String },

    /// Non-positive physiological quantity, or a negative concentration
    #[error("{field} must be {requirement} (got {value})")]
    DomainViolation {
        field: String,
        requirement: &'static str,
        value: f64,
    },

    /// Formula-specific safe bound exceeded
    #[error("{field} of {value} {unit} exceeds the {limit} {unit} limit of the {formula} equation")]
    OutOfRange {
        formula: &'static str,
        field: String,
        value: f64,
        limit: f64,
        unit: &'static str,
    },

    /// Near-zero denominator in an inverted formula
    #[error("Unstable {formula} calculation (denominator {denominator:e} is too close to zero)")]
    FormulaUnstable {
        formula: &'static str,
        denominator: f64,
    },

    /// Required categorical input not supplied
    #[error("Missing selection for {field}: expected one of {expected}")]
    MissingSelection {
        field: String,
        expected: &'static str,
    },
}

/// Coarse error classification exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidNumber,
    InvalidUnit,
    DomainViolation,
    OutOfRange,
    FormulaUnstable,
    MissingSelection,
}

impl CalcError {
    pub fn invalid_number(field: impl Into<String>, input: impl Into<String>) -> Self {
        CalcError::InvalidNumber {
            field: field.into(),
            input: input.into(),
        }
    }

    pub fn invalid_unit(analyte: impl Into<String>, unit: impl Into<String>) -> Self {
        CalcError::InvalidUnit {
            analyte: analyte.into(),
            unit: unit.into(),
        }
    }

    pub fn domain(field: impl Into<String>, requirement: &'static str, value: f64) -> Self {
        CalcError::DomainViolation {
            field: field.into(),
            requirement,
            value,
        }
    }

    pub fn missing_selection(field: impl Into<String>, expected: &'static str) -> Self {
        CalcError::MissingSelection {
            field: field.into(),
            expected,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::InvalidNumber { .. } => ErrorKind::InvalidNumber,
            CalcError::InvalidUnit { .. } => ErrorKind::InvalidUnit,
            CalcError::DomainViolation { .. } => ErrorKind::DomainViolation,
            CalcError::OutOfRange { .. } => ErrorKind::OutOfRange,
            CalcError::FormulaUnstable { .. } => ErrorKind::FormulaUnstable,
            CalcError::MissingSelection { .. } => ErrorKind::MissingSelection,
        }
    }
}

/// Result type for calculations
pub type CalcResult<T> = Result<T, CalcError>;

/// Require a strictly positive value
pub fn require_positive(field: &str, value: f64) -> CalcResult<f64> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(CalcError::domain(field, "greater than zero", value))
    }
}

/// Require a finite computed value
///
/// Guards converted values and formula outputs, which can overflow or divide
/// to infinity even when every input parsed as a finite number.
pub fn require_finite(field: &str, value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid_number(field, value.to_string()))
    }
}

/// Require a value of zero or more
pub fn require_non_negative(field: &str, value: f64) -> CalcResult<f64> {
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(CalcError::domain(field, "zero or greater", value))
    }
}
