//! Calculated serum and urine osmolality
//!
//! Na and K are consumed in mmol/L, glucose and urea in mg/dL. Glucose is
//! divided by 18 and urea by 6.006 to bring them back to mmol/L.

use serde::{Deserialize, Serialize};

use super::{optional_canonical, Reading};
use crate::error::{require_finite, require_non_negative, CalcResult};
use crate::fields::{
    POTASSIUM, SERUM_GLUCOSE, SERUM_UREA, SODIUM, URINE_GLUCOSE, URINE_UREA,
};
use crate::models::{
    round_to, Formula, FormulaResult, SERUM_OSMOLALITY_BANDS, URINE_OSMOLALITY_BANDS,
};
use crate::units::table::{GLUCOSE_MG_DL_PER_MMOL_L, UREA_MG_DL_PER_MMOL_L};

pub const OSMOLALITY_UNIT: &str = "mOsm/kg";

struct Solutes {
    sodium: f64,
    potassium: f64,
    glucose_mg_dl: f64,
    urea_mg_dl: f64,
}

impl Solutes {
    fn validate(self) -> CalcResult<Self> {
        require_non_negative("sodium", self.sodium)?;
        require_non_negative("potassium", self.potassium)?;
        require_non_negative("glucose", self.glucose_mg_dl)?;
        require_non_negative("urea", self.urea_mg_dl)?;
        Ok(self)
    }

    fn osmolality(&self) -> f64 {
        2.0 * (self.sodium + self.potassium)
            + self.glucose_mg_dl / GLUCOSE_MG_DL_PER_MMOL_L
            + self.urea_mg_dl / UREA_MG_DL_PER_MMOL_L
    }
}

/// Serum osmolality: 2(Na + K) + glucose/18 + urea/6.006
pub fn serum_osmolality(
    sodium: f64,
    potassium: f64,
    glucose_mg_dl: f64,
    urea_mg_dl: f64,
) -> CalcResult<f64> {
    let solutes = Solutes {
        sodium,
        potassium,
        glucose_mg_dl,
        urea_mg_dl,
    }
    .validate()?;
    require_finite("osmolality", solutes.osmolality())
}

/// Urine osmolality: 2(Na + K) + urea/6.006 + glucose/18
pub fn urine_osmolality(
    sodium: f64,
    potassium: f64,
    urea_mg_dl: f64,
    glucose_mg_dl: f64,
) -> CalcResult<f64> {
    let solutes = Solutes {
        sodium,
        potassium,
        glucose_mg_dl,
        urea_mg_dl,
    }
    .validate()?;
    require_finite("osmolality", solutes.osmolality())
}

/// Serum osmolality inputs; urea may be omitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerumOsmolalityRequest {
    pub sodium: Reading,
    pub potassium: Reading,
    pub glucose: Reading,
    #[serde(default)]
    pub urea: Option<Reading>,
}

pub fn evaluate_serum_osmolality(request: &SerumOsmolalityRequest) -> CalcResult<FormulaResult> {
    let sodium = request.sodium.canonical(&SODIUM)?;
    let potassium = request.potassium.canonical(&POTASSIUM)?;
    let glucose = request.glucose.canonical(&SERUM_GLUCOSE)?;
    let urea = optional_canonical(request.urea.as_ref(), &SERUM_UREA)?.unwrap_or(0.0);

    let value = round_to(serum_osmolality(sodium, potassium, glucose, urea)?, 2);
    let category = SERUM_OSMOLALITY_BANDS.classify(value);
    tracing::debug!(formula = "serum_osmolality", value, ?category, "Serum osmolality evaluated");

    Ok(FormulaResult::classified(
        Formula::SerumOsmolality,
        value,
        OSMOLALITY_UNIT,
        category,
        format!(
            "Equation Used: Calculated Serum Osmolality\n\
             NB: glucose and urea values are first converted to mg/dL\n\
             Serum Osm = 2 x (Na[{}] + K[{}]) + Glucose[{:.2} mg/dL] / 18 + Urea[{:.2} mg/dL] / 6.006\n\
             Serum Osm = {:.2} {}",
            sodium, potassium, glucose, urea, value, OSMOLALITY_UNIT
        ),
    ))
}

/// Urine osmolality inputs; glucose may be omitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrineOsmolalityRequest {
    pub sodium: Reading,
    pub potassium: Reading,
    pub urea: Reading,
    #[serde(default)]
    pub glucose: Option<Reading>,
}

pub fn evaluate_urine_osmolality(request: &UrineOsmolalityRequest) -> CalcResult<FormulaResult> {
    let sodium = request.sodium.canonical(&SODIUM)?;
    let potassium = request.potassium.canonical(&POTASSIUM)?;
    let urea = request.urea.canonical(&URINE_UREA)?;
    let glucose = optional_canonical(request.glucose.as_ref(), &URINE_GLUCOSE)?.unwrap_or(0.0);

    let value = round_to(urine_osmolality(sodium, potassium, urea, glucose)?, 1);
    let category = URINE_OSMOLALITY_BANDS.classify(value);
    tracing::debug!(formula = "urine_osmolality", value, ?category, "Urine osmolality evaluated");

    Ok(FormulaResult::classified(
        Formula::UrineOsmolality,
        value,
        OSMOLALITY_UNIT,
        category,
        format!(
            "Equation Used: Estimated Urine Osmolality\n\
             NB: glucose and urea values are first converted to mg/dL\n\
             Uosm = 2 x (Na[{}] + K[{}]) + Urea[{:.2} mg/dL] / 6.006 + Glucose[{:.2} mg/dL] / 18\n\
             Uosm = {:.1} {}",
            sodium, potassium, urea, glucose, value, OSMOLALITY_UNIT
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::Category;

    #[test]
    fn test_serum_osmolality_high() {
        let request = SerumOsmolalityRequest {
            sodium: Reading::bare(140.0),
            potassium: Reading::bare(4.0),
            glucose: Reading::new(100.0, "mg/dL"),
            urea: Some(Reading::new(40.0, "mg/dL")),
        };
        let result = evaluate_serum_osmolality(&request).unwrap();
        assert_eq!(result.value, 300.22);
        assert_eq!(result.category, Some(Category::SerumOsmHigh));
        assert_eq!(result.label, Some("High Osmolarity (Hyperosmolar)"));
    }

    #[test]
    fn test_serum_osmolality_without_urea() {
        // Default units are mmol/L, so 5 mmol/L glucose contributes 5 mOsm/kg
        let request = SerumOsmolalityRequest {
            sodium: Reading::bare("138"),
            potassium: Reading::bare("4"),
            glucose: Reading::bare("5"),
            urea: None,
        };
        let result = evaluate_serum_osmolality(&request).unwrap();
        assert!((result.value - 289.0).abs() < 1e-9);
        assert_eq!(result.category, Some(Category::SerumOsmNormal));

        let blank = SerumOsmolalityRequest {
            urea: Some(Reading::bare("")),
            ..request
        };
        assert_eq!(evaluate_serum_osmolality(&blank).unwrap().value, 289.0);
    }

    #[test]
    fn test_serum_osmolality_mmol_inputs_are_identity() {
        let osm = serum_osmolality(140.0, 4.0, 5.0 * 18.0, 5.0 * 6.006).unwrap();
        assert!((osm - 298.0).abs() < 1e-9);
    }

    #[test]
    fn test_urine_osmolality() {
        let request = UrineOsmolalityRequest {
            sodium: Reading::bare(100.0),
            potassium: Reading::bare(50.0),
            urea: Reading::new(250.0, "mmol/L"),
            glucose: None,
        };
        let result = evaluate_urine_osmolality(&request).unwrap();
        assert_eq!(result.value, 550.0);
        assert_eq!(result.category, Some(Category::UrineNormal));
    }

    #[test]
    fn test_urine_osmolality_rounds_to_one_place() {
        let value = urine_osmolality(40.0, 20.0, 100.0, 50.0).unwrap();
        let result = round_to(value, 1);
        assert_eq!(result, 139.4);
    }

    #[test]
    fn test_negative_solute_is_rejected() {
        let err = serum_osmolality(140.0, -1.0, 90.0, 30.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainViolation);
        let err = urine_osmolality(40.0, 20.0, -5.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainViolation);
    }

    #[test]
    fn test_osmolality_rejects_overflow() {
        let err = urine_osmolality(f64::MAX, 4.0, 0.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumber);
    }

    #[test]
    fn test_electrolyte_unit_must_be_mmol() {
        let request = UrineOsmolalityRequest {
            sodium: Reading::new(100.0, "mg/dL"),
            potassium: Reading::bare(50.0),
            urea: Reading::bare(250.0),
            glucose: None,
        };
        let err = evaluate_urine_osmolality(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUnit);
    }
}
