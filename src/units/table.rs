//! Unit types and conversion constants
//!
//! Provides the recognized laboratory units, the analyte families that own them
//! and the fixed factors that take each unit to its family's canonical unit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A recognized measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "mg/dL")]
    MgPerDl,
    #[serde(rename = "mg/L")]
    MgPerL,
    #[serde(rename = "µmol/L")]
    UmolPerL,
    #[serde(rename = "mmol/L")]
    MmolPerL,
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "lb")]
    Pound,
}

impl Unit {
    /// Display label
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::MgPerDl => "mg/dL",
            Unit::MgPerL => "mg/L",
            Unit::UmolPerL => "µmol/L",
            Unit::MmolPerL => "mmol/L",
            Unit::Centimeter => "cm",
            Unit::Meter => "m",
            Unit::Kilogram => "kg",
            Unit::Pound => "lb",
        }
    }

    /// Parse a unit tag, accepting the usual spellings
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        let trimmed = lower.trim();

        match trimmed {
            "mg/dl" => Some(Unit::MgPerDl),
            "mg/l" => Some(Unit::MgPerL),
            "umol/l" | "umol" | "µmol/l" | "µmol" | "μmol/l" | "μmol" => Some(Unit::UmolPerL),
            "mmol/l" | "mmol" => Some(Unit::MmolPerL),
            "cm" => Some(Unit::Centimeter),
            "m" => Some(Unit::Meter),
            "kg" => Some(Unit::Kilogram),
            "lb" | "lbs" => Some(Unit::Pound),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lipid panel member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LipidAnalyte {
    TotalCholesterol,
    Triglycerides,
    Hdl,
    Ldl,
}

/// Body measurement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyDimension {
    Height,
    Weight,
}

/// Analyte family; each owns its own conversion table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyteFamily {
    Creatinine,
    Glucose,
    Urea,
    Lipid(LipidAnalyte),
    AlbuminUrine,
    ElectrolyteNaK,
    BodySize(BodyDimension),
}

/// How a unit is brought to its family's canonical unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Factor {
    /// Already canonical
    Identity,
    /// canonical = value * factor
    Multiply(f64),
    /// canonical = value / factor
    Divide(f64),
}

impl Factor {
    /// Apply the factor (source unit to canonical)
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Factor::Identity => value,
            Factor::Multiply(f) => value * f,
            Factor::Divide(f) => value / f,
        }
    }

    /// Apply the inverse (canonical to source unit)
    pub fn invert(self, value: f64) -> f64 {
        match self {
            Factor::Identity => value,
            Factor::Multiply(f) => value / f,
            Factor::Divide(f) => value * f,
        }
    }
}

// ============================================================================
// Concentration Conversion Constants
// ============================================================================

/// µmol/L of creatinine per mg/dL
pub const CREATININE_UMOL_L_PER_MG_DL: f64 = 88.4;
/// mg/L per mg/dL
pub const MG_L_PER_MG_DL: f64 = 10.0;
/// mg/dL of glucose per mmol/L
pub const GLUCOSE_MG_DL_PER_MMOL_L: f64 = 18.0;
/// mg/dL of urea per mmol/L (MW 60.06 g/mol)
pub const UREA_MG_DL_PER_MMOL_L: f64 = 6.006;
/// mg/dL of cholesterol (TC, HDL, LDL) per mmol/L
pub const CHOLESTEROL_MG_DL_PER_MMOL_L: f64 = 38.67;
/// mg/dL of triglyceride per mmol/L
pub const TRIGLYCERIDE_MG_DL_PER_MMOL_L: f64 = 88.57;

// ============================================================================
// Body Size Conversion Constants
// ============================================================================

/// Centimeters per meter
pub const CM_PER_M: f64 = 100.0;
/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.45359237;

impl AnalyteFamily {
    /// Human-readable analyte name
    pub fn name(&self) -> &'static str {
        match self {
            AnalyteFamily::Creatinine => "creatinine",
            AnalyteFamily::Glucose => "glucose",
            AnalyteFamily::Urea => "urea",
            AnalyteFamily::Lipid(LipidAnalyte::TotalCholesterol) => "total cholesterol",
            AnalyteFamily::Lipid(LipidAnalyte::Triglycerides) => "triglycerides",
            AnalyteFamily::Lipid(LipidAnalyte::Hdl) => "HDL cholesterol",
            AnalyteFamily::Lipid(LipidAnalyte::Ldl) => "LDL cholesterol",
            AnalyteFamily::AlbuminUrine => "urine albumin",
            AnalyteFamily::ElectrolyteNaK => "sodium/potassium",
            AnalyteFamily::BodySize(BodyDimension::Height) => "height",
            AnalyteFamily::BodySize(BodyDimension::Weight) => "weight",
        }
    }

    /// The unit every formula consumes for this family
    pub fn canonical_unit(&self) -> Unit {
        match self {
            AnalyteFamily::ElectrolyteNaK => Unit::MmolPerL,
            AnalyteFamily::BodySize(BodyDimension::Height) => Unit::Centimeter,
            AnalyteFamily::BodySize(BodyDimension::Weight) => Unit::Kilogram,
            _ => Unit::MgPerDl,
        }
    }

    /// All units this family can convert from
    pub fn recognized_units(&self) -> &'static [Unit] {
        match self {
            AnalyteFamily::Creatinine => &[Unit::MgPerDl, Unit::UmolPerL, Unit::MgPerL],
            AnalyteFamily::Glucose | AnalyteFamily::Urea | AnalyteFamily::Lipid(_) => {
                &[Unit::MgPerDl, Unit::MmolPerL]
            }
            AnalyteFamily::AlbuminUrine => &[Unit::MgPerDl, Unit::MgPerL],
            AnalyteFamily::ElectrolyteNaK => &[Unit::MmolPerL],
            AnalyteFamily::BodySize(BodyDimension::Height) => &[Unit::Centimeter, Unit::Meter],
            AnalyteFamily::BodySize(BodyDimension::Weight) => &[Unit::Kilogram, Unit::Pound],
        }
    }

    /// Conversion factor from `unit` to the canonical unit, if recognized
    pub fn factor(&self, unit: Unit) -> Option<Factor> {
        if unit == self.canonical_unit() {
            return Some(Factor::Identity);
        }

        match (self, unit) {
            (AnalyteFamily::Creatinine, Unit::UmolPerL) => {
                Some(Factor::Divide(CREATININE_UMOL_L_PER_MG_DL))
            }
            (AnalyteFamily::Creatinine, Unit::MgPerL) => Some(Factor::Divide(MG_L_PER_MG_DL)),
            (AnalyteFamily::AlbuminUrine, Unit::MgPerL) => Some(Factor::Divide(MG_L_PER_MG_DL)),
            (AnalyteFamily::Glucose, Unit::MmolPerL) => {
                Some(Factor::Multiply(GLUCOSE_MG_DL_PER_MMOL_L))
            }
            (AnalyteFamily::Urea, Unit::MmolPerL) => Some(Factor::Multiply(UREA_MG_DL_PER_MMOL_L)),
            (AnalyteFamily::Lipid(LipidAnalyte::Triglycerides), Unit::MmolPerL) => {
                Some(Factor::Multiply(TRIGLYCERIDE_MG_DL_PER_MMOL_L))
            }
            (AnalyteFamily::Lipid(_), Unit::MmolPerL) => {
                Some(Factor::Multiply(CHOLESTEROL_MG_DL_PER_MMOL_L))
            }
            (AnalyteFamily::BodySize(BodyDimension::Height), Unit::Meter) => {
                Some(Factor::Multiply(CM_PER_M))
            }
            (AnalyteFamily::BodySize(BodyDimension::Weight), Unit::Pound) => {
                Some(Factor::Multiply(KG_PER_LB))
            }
            _ => None,
        }
    }

    /// Every family, for table-driven checks
    pub const ALL: [AnalyteFamily; 11] = [
        AnalyteFamily::Creatinine,
        AnalyteFamily::Glucose,
        AnalyteFamily::Urea,
        AnalyteFamily::Lipid(LipidAnalyte::TotalCholesterol),
        AnalyteFamily::Lipid(LipidAnalyte::Triglycerides),
        AnalyteFamily::Lipid(LipidAnalyte::Hdl),
        AnalyteFamily::Lipid(LipidAnalyte::Ldl),
        AnalyteFamily::AlbuminUrine,
        AnalyteFamily::ElectrolyteNaK,
        AnalyteFamily::BodySize(BodyDimension::Height),
        AnalyteFamily::BodySize(BodyDimension::Weight),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_concentration_units() {
        assert_eq!(Unit::parse("mg/dL"), Some(Unit::MgPerDl));
        assert_eq!(Unit::parse("MG/DL"), Some(Unit::MgPerDl));
        assert_eq!(Unit::parse("mg/L"), Some(Unit::MgPerL));
        assert_eq!(Unit::parse("µmol/L"), Some(Unit::UmolPerL));
        assert_eq!(Unit::parse("μmol/L"), Some(Unit::UmolPerL));
        assert_eq!(Unit::parse(" umol "), Some(Unit::UmolPerL));
        assert_eq!(Unit::parse("mmol"), Some(Unit::MmolPerL));
    }

    #[test]
    fn test_parse_body_units() {
        assert_eq!(Unit::parse("cm"), Some(Unit::Centimeter));
        assert_eq!(Unit::parse("M"), Some(Unit::Meter));
        assert_eq!(Unit::parse("lbs"), Some(Unit::Pound));
        assert_eq!(Unit::parse("stone"), None);
    }

    #[test]
    fn test_canonical_units() {
        assert_eq!(AnalyteFamily::Creatinine.canonical_unit(), Unit::MgPerDl);
        assert_eq!(AnalyteFamily::ElectrolyteNaK.canonical_unit(), Unit::MmolPerL);
        assert_eq!(
            AnalyteFamily::BodySize(BodyDimension::Weight).canonical_unit(),
            Unit::Kilogram
        );
    }

    #[test]
    fn test_lipid_factors_differ_by_analyte() {
        let tc = AnalyteFamily::Lipid(LipidAnalyte::TotalCholesterol);
        let tg = AnalyteFamily::Lipid(LipidAnalyte::Triglycerides);
        assert_eq!(
            tc.factor(Unit::MmolPerL),
            Some(Factor::Multiply(CHOLESTEROL_MG_DL_PER_MMOL_L))
        );
        assert_eq!(
            tg.factor(Unit::MmolPerL),
            Some(Factor::Multiply(TRIGLYCERIDE_MG_DL_PER_MMOL_L))
        );
    }

    #[test]
    fn test_families_do_not_share_units() {
        assert_eq!(AnalyteFamily::Creatinine.factor(Unit::MmolPerL), None);
        assert_eq!(AnalyteFamily::Glucose.factor(Unit::UmolPerL), None);
        assert_eq!(AnalyteFamily::ElectrolyteNaK.factor(Unit::MgPerDl), None);
        assert_eq!(
            AnalyteFamily::BodySize(BodyDimension::Height).factor(Unit::Kilogram),
            None
        );
    }

    #[test]
    fn test_recognized_units_have_factors() {
        for family in AnalyteFamily::ALL {
            assert!(family.recognized_units().contains(&family.canonical_unit()));
            for unit in family.recognized_units() {
                assert!(family.factor(*unit).is_some(), "{:?} {:?}", family, unit);
            }
        }
    }
}
