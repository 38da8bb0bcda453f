//! Unit conversion functions
//!
//! Parses raw inputs and unit tags, and moves values between a family's
//! recognized units and its canonical unit.

use serde::{Deserialize, Serialize};

use super::table::{AnalyteFamily, Unit};
use crate::error::{require_finite, CalcError, CalcResult};

/// A raw input as the presentation layer collected it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// A validated value paired with a unit its family recognizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: Unit,
}

impl Measurement {
    /// Parse a raw value and unit tag for the given family
    pub fn parse(raw: &RawValue, unit: &str, family: AnalyteFamily) -> CalcResult<Self> {
        let value = parse_value(family.name(), raw)?;
        let unit = parse_unit(unit, family)?;
        Ok(Self { value, unit })
    }

    /// The value in the family's canonical unit
    pub fn canonical(&self, family: AnalyteFamily) -> CalcResult<f64> {
        normalize_unit(self.value, self.unit, family)
    }
}

/// Parse a raw value into a finite number
///
/// Blank, non-numeric, NaN and infinite inputs are all rejected.
pub fn parse_value(field: &str, raw: &RawValue) -> CalcResult<f64> {
    let value = match raw {
        RawValue::Number(n) => *n,
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(CalcError::invalid_number(field, s.as_str()));
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| CalcError::invalid_number(field, s.as_str()))?
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid_number(field, value.to_string()))
    }
}

/// Parse a unit tag and check that the family recognizes it
pub fn parse_unit(tag: &str, family: AnalyteFamily) -> CalcResult<Unit> {
    Unit::parse(tag)
        .filter(|unit| family.recognized_units().contains(unit))
        .ok_or_else(|| CalcError::invalid_unit(family.name(), tag))
}

/// Express `value` (given in `unit`) in the family's canonical unit
pub fn normalize(value: f64, unit: &str, family: AnalyteFamily) -> CalcResult<f64> {
    let unit = parse_unit(unit, family)?;
    normalize_unit(value, unit, family)
}

/// Typed form of [`normalize`]
pub fn normalize_unit(value: f64, unit: Unit, family: AnalyteFamily) -> CalcResult<f64> {
    if !value.is_finite() {
        return Err(CalcError::invalid_number(family.name(), value.to_string()));
    }
    let factor = family
        .factor(unit)
        .ok_or_else(|| CalcError::invalid_unit(family.name(), unit.as_str()))?;
    require_finite(family.name(), factor.apply(value))
}

/// Express a canonical `value` in `target_unit`; inverse of [`normalize`]
pub fn denormalize(value: f64, family: AnalyteFamily, target_unit: &str) -> CalcResult<f64> {
    let unit = parse_unit(target_unit, family)?;
    denormalize_unit(value, family, unit)
}

/// Typed form of [`denormalize`]
pub fn denormalize_unit(value: f64, family: AnalyteFamily, target: Unit) -> CalcResult<f64> {
    if !value.is_finite() {
        return Err(CalcError::invalid_number(family.name(), value.to_string()));
    }
    let factor = family
        .factor(target)
        .ok_or_else(|| CalcError::invalid_unit(family.name(), target.as_str()))?;
    require_finite(family.name(), factor.invert(value))
}

/// Convert between two units of the same family
pub fn convert(value: f64, from: &str, to: &str, family: AnalyteFamily) -> CalcResult<f64> {
    let canonical = normalize(value, from, family)?;
    denormalize(canonical, family, to)
}
