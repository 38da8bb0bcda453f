//! Input field configuration
//!
//! Each calculator input is described statically: which analyte family it
//! belongs to, which unit tags the user may pick and which one applies when
//! none is picked.

use serde::Serialize;

use crate::error::{CalcError, CalcResult};
use crate::units::{
    parse_value, AnalyteFamily, BodyDimension, LipidAnalyte, Measurement, RawValue, Unit,
};

/// Static configuration of one input field
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub family: AnalyteFamily,
    pub recognized_units: &'static [Unit],
    pub default_unit: Unit,
}

impl FieldSpec {
    /// Resolve the unit tag for this field, falling back to the default
    pub fn unit(&self, tag: Option<&str>) -> CalcResult<Unit> {
        let tag = match tag.map(str::trim) {
            None | Some("") => return Ok(self.default_unit),
            Some(t) => t,
        };

        Unit::parse(tag)
            .filter(|unit| self.recognized_units.contains(unit))
            .ok_or_else(|| CalcError::invalid_unit(self.label, tag))
    }

    /// Parse and normalize a required input to the family's canonical unit
    pub fn canonical(&self, raw: &RawValue, tag: Option<&str>) -> CalcResult<f64> {
        let measurement = Measurement {
            value: parse_value(self.label, raw)?,
            unit: self.unit(tag)?,
        };
        measurement.canonical(self.family)
    }

    /// Like [`FieldSpec::canonical`], but an absent or blank input yields `None`
    pub fn canonical_optional(
        &self,
        raw: Option<&RawValue>,
        tag: Option<&str>,
    ) -> CalcResult<Option<f64>> {
        match raw {
            None => Ok(None),
            Some(RawValue::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(raw) => self.canonical(raw, tag).map(Some),
        }
    }
}

const CREATININE_UNITS: &[Unit] = &[Unit::UmolPerL, Unit::MgPerDl];
const LIPID_UNITS: &[Unit] = &[Unit::MmolPerL, Unit::MgPerDl];
const SOLUTE_UNITS: &[Unit] = &[Unit::MmolPerL, Unit::MgPerDl];

pub const SERUM_CREATININE: FieldSpec = FieldSpec {
    name: "creatinine",
    label: "Creatinine",
    family: AnalyteFamily::Creatinine,
    recognized_units: CREATININE_UNITS,
    default_unit: Unit::UmolPerL,
};

pub const URINE_CREATININE: FieldSpec = FieldSpec {
    name: "urine_creatinine",
    label: "Creatinine (urine)",
    family: AnalyteFamily::Creatinine,
    recognized_units: &[Unit::UmolPerL, Unit::MgPerDl, Unit::MgPerL],
    default_unit: Unit::UmolPerL,
};

pub const URINE_ALBUMIN: FieldSpec = FieldSpec {
    name: "urine_albumin",
    label: "Albumin (urine)",
    family: AnalyteFamily::AlbuminUrine,
    recognized_units: &[Unit::MgPerDl, Unit::MgPerL],
    default_unit: Unit::MgPerDl,
};

pub const SODIUM: FieldSpec = FieldSpec {
    name: "sodium",
    label: "Sodium",
    family: AnalyteFamily::ElectrolyteNaK,
    recognized_units: &[Unit::MmolPerL],
    default_unit: Unit::MmolPerL,
};

pub const POTASSIUM: FieldSpec = FieldSpec {
    name: "potassium",
    label: "Potassium",
    family: AnalyteFamily::ElectrolyteNaK,
    recognized_units: &[Unit::MmolPerL],
    default_unit: Unit::MmolPerL,
};

pub const SERUM_UREA: FieldSpec = FieldSpec {
    name: "serum_urea",
    label: "Urea (serum)",
    family: AnalyteFamily::Urea,
    recognized_units: SOLUTE_UNITS,
    default_unit: Unit::MmolPerL,
};

pub const SERUM_GLUCOSE: FieldSpec = FieldSpec {
    name: "serum_glucose",
    label: "Glucose (serum)",
    family: AnalyteFamily::Glucose,
    recognized_units: SOLUTE_UNITS,
    default_unit: Unit::MmolPerL,
};

pub const URINE_UREA: FieldSpec = FieldSpec {
    name: "urine_urea",
    label: "Urea (urine)",
    family: AnalyteFamily::Urea,
    recognized_units: SOLUTE_UNITS,
    default_unit: Unit::MmolPerL,
};

pub const URINE_GLUCOSE: FieldSpec = FieldSpec {
    name: "urine_glucose",
    label: "Glucose (urine)",
    family: AnalyteFamily::Glucose,
    recognized_units: SOLUTE_UNITS,
    default_unit: Unit::MmolPerL,
};

pub const TOTAL_CHOLESTEROL: FieldSpec = FieldSpec {
    name: "total_cholesterol",
    label: "Total Cholesterol",
    family: AnalyteFamily::Lipid(LipidAnalyte::TotalCholesterol),
    recognized_units: LIPID_UNITS,
    default_unit: Unit::MmolPerL,
};

pub const TRIGLYCERIDES: FieldSpec = FieldSpec {
    name: "triglycerides",
    label: "Triglyceride",
    family: AnalyteFamily::Lipid(LipidAnalyte::Triglycerides),
    recognized_units: LIPID_UNITS,
    default_unit: Unit::MmolPerL,
};

pub const HDL: FieldSpec = FieldSpec {
    name: "hdl",
    label: "HDL",
    family: AnalyteFamily::Lipid(LipidAnalyte::Hdl),
    recognized_units: LIPID_UNITS,
    default_unit: Unit::MmolPerL,
};

pub const LDL: FieldSpec = FieldSpec {
    name: "ldl",
    label: "LDL",
    family: AnalyteFamily::Lipid(LipidAnalyte::Ldl),
    recognized_units: LIPID_UNITS,
    default_unit: Unit::MmolPerL,
};

pub const HEIGHT: FieldSpec = FieldSpec {
    name: "height",
    label: "Height",
    family: AnalyteFamily::BodySize(BodyDimension::Height),
    recognized_units: &[Unit::Centimeter, Unit::Meter],
    default_unit: Unit::Centimeter,
};

pub const WEIGHT: FieldSpec = FieldSpec {
    name: "weight",
    label: "Weight",
    family: AnalyteFamily::BodySize(BodyDimension::Weight),
    recognized_units: &[Unit::Kilogram, Unit::Pound],
    default_unit: Unit::Kilogram,
};

/// Every configured field
pub static ALL_FIELDS: [FieldSpec; 15] = [
    SERUM_CREATININE,
    URINE_CREATININE,
    URINE_ALBUMIN,
    SODIUM,
    POTASSIUM,
    SERUM_UREA,
    SERUM_GLUCOSE,
    URINE_UREA,
    URINE_GLUCOSE,
    TOTAL_CHOLESTEROL,
    TRIGLYCERIDES,
    HDL,
    LDL,
    HEIGHT,
    WEIGHT,
];

/// Look up a field by name
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    ALL_FIELDS.iter().find(|f| f.name == name)
}
