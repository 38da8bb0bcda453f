//! Formula result model
//!
//! The value handed to the presentation layer after a successful evaluation.

use serde::Serialize;

use super::category::{Category, Severity};

/// Clinical index identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Formula {
    CkdEpi2021,
    PediatricSchwartz,
    SchwartzBedside,
    CockcroftGault,
    Uacr,
    SerumOsmolality,
    UrineOsmolality,
    LdlSampson,
    HdlReverseSampson,
    Bmi,
    Bsa,
}

impl Formula {
    pub fn display_name(&self) -> &'static str {
        match self {
            Formula::CkdEpi2021 => "CKD-EPI 2021",
            Formula::PediatricSchwartz => "Pediatric eGFR (Schwartz, age-banded k)",
            Formula::SchwartzBedside => "Bedside Schwartz",
            Formula::CockcroftGault => "Cockcroft-Gault",
            Formula::Uacr => "Urine Albumin-Creatinine Ratio",
            Formula::SerumOsmolality => "Serum Osmolality",
            Formula::UrineOsmolality => "Urine Osmolality",
            Formula::LdlSampson => "Sampson LDL",
            Formula::HdlReverseSampson => "Reverse Sampson HDL",
            Formula::Bmi => "Body Mass Index",
            Formula::Bsa => "Body Surface Area",
        }
    }
}

/// Outcome of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaResult {
    pub formula: Formula,
    pub value: f64,
    pub unit: String,
    pub category: Option<Category>,
    pub label: Option<&'static str>,
    pub severity: Option<Severity>,
    pub message: String,
    pub equation: String,
}

impl FormulaResult {
    /// Build a classified result; label, severity and message come from the category
    pub fn classified(
        formula: Formula,
        value: f64,
        unit: impl Into<String>,
        category: Category,
        equation: String,
    ) -> Self {
        Self {
            formula,
            value,
            unit: unit.into(),
            category: Some(category),
            label: Some(category.label()),
            severity: Some(category.severity()),
            message: category.message().to_string(),
            equation,
        }
    }

    /// Build a result that has no interpretation table (e.g. BSA)
    pub fn unclassified(
        formula: Formula,
        value: f64,
        unit: impl Into<String>,
        message: impl Into<String>,
        equation: String,
    ) -> Self {
        Self {
            formula,
            value,
            unit: unit.into(),
            category: None,
            label: None,
            severity: None,
            message: message.into(),
            equation,
        }
    }
}

/// Round to a fixed number of decimal places
///
/// Values too large to scale are already whole and come back unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    let scaled = value * scale;
    if scaled.is_finite() {
        scaled.round() / scale
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(73.6749, 2), 73.67);
        assert_eq!(round_to(300.2166, 1), 300.2);
        assert_eq!(round_to(-12.345, 1), -12.3);
    }

    #[test]
    fn test_round_to_leaves_huge_values_alone() {
        assert_eq!(round_to(1e307, 2), 1e307);
        assert_eq!(round_to(f64::MAX, 1), f64::MAX);
    }

    #[test]
    fn test_classified_result_carries_category_text() {
        let result = FormulaResult::classified(
            Formula::Uacr,
            300.0,
            "mg/g",
            Category::Microalbuminuria,
            String::new(),
        );
        assert_eq!(result.label, Some("Microalbuminuria"));
        assert_eq!(result.severity, Some(Severity::Warning));
        assert_eq!(result.unit, "mg/g");
    }
}
