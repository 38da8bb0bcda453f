//! Body size formulas
//!
//! Body surface area (Du Bois or Mosteller) and body mass index.

use serde::{Deserialize, Serialize};

use super::Reading;
use crate::error::{require_finite, require_positive, CalcResult};
use crate::fields::{HEIGHT, WEIGHT};
use crate::models::{round_to, BsaMethod, Formula, FormulaResult, BMI_BANDS};

/// Reference body surface area for indexed GFR, in m²
pub const REFERENCE_BSA_M2: f64 = 1.73;

/// Body surface area in m² from height (cm) and weight (kg)
pub fn body_surface_area(height_cm: f64, weight_kg: f64, method: BsaMethod) -> CalcResult<f64> {
    require_positive("height", height_cm)?;
    require_positive("weight", weight_kg)?;

    let bsa = match method {
        BsaMethod::DuBois => 0.007184 * height_cm.powf(0.725) * weight_kg.powf(0.425),
        BsaMethod::Mosteller => (height_cm * weight_kg / 3600.0).sqrt(),
    };
    require_finite("BSA", bsa)
}

/// Equation text for a BSA calculation
pub fn bsa_equation(height_cm: f64, weight_kg: f64, method: BsaMethod) -> String {
    match method {
        BsaMethod::DuBois => format!(
            "BSA (Du Bois) = 0.007184 x Height[{:.1} cm]^0.725 x Weight[{:.1} kg]^0.425",
            height_cm, weight_kg
        ),
        BsaMethod::Mosteller => format!(
            "BSA (Mosteller) = sqrt(Height[{:.1} cm] x Weight[{:.1} kg] / 3600)",
            height_cm, weight_kg
        ),
    }
}

/// Body mass index in kg/m² from weight (kg) and height (cm)
pub fn bmi(weight_kg: f64, height_cm: f64) -> CalcResult<f64> {
    require_positive("height", height_cm)?;
    require_positive("weight", weight_kg)?;

    let height_m = height_cm / 100.0;
    require_finite("BMI", weight_kg / (height_m * height_m))
}

/// Request for BMI and BSA together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyMetricsRequest {
    pub height: Reading,
    pub weight: Reading,
    #[serde(default)]
    pub bsa_method: Option<BsaMethod>,
}

/// BMI and BSA results for one patient
#[derive(Debug, Clone, Serialize)]
pub struct BodyMetrics {
    pub bmi: FormulaResult,
    pub bsa: FormulaResult,
}

/// Evaluate BMI and BSA; `default_method` applies when the request names none
pub fn evaluate_body_metrics(
    request: &BodyMetricsRequest,
    default_method: BsaMethod,
) -> CalcResult<BodyMetrics> {
    let height_cm = request.height.canonical(&HEIGHT)?;
    let weight_kg = request.weight.canonical(&WEIGHT)?;
    let method = request.bsa_method.unwrap_or(default_method);

    let bmi_value = round_to(bmi(weight_kg, height_cm)?, 1);
    let bsa_value = round_to(body_surface_area(height_cm, weight_kg, method)?, 2);

    tracing::debug!(
        bmi = bmi_value,
        bsa = bsa_value,
        method = method.as_str(),
        "Body metrics evaluated"
    );

    let bmi_result = FormulaResult::classified(
        Formula::Bmi,
        bmi_value,
        "kg/m²",
        BMI_BANDS.classify(bmi_value),
        format!(
            "BMI = Weight[{:.1} kg] / (Height[{:.2} m])² = {:.1} kg/m²",
            weight_kg,
            height_cm / 100.0,
            bmi_value
        ),
    );
    let bsa_result = FormulaResult::unclassified(
        Formula::Bsa,
        bsa_value,
        "m²",
        format!("Body surface area by the {} equation.", method.display_name()),
        format!("{} = {:.2} m²", bsa_equation(height_cm, weight_kg, method), bsa_value),
    );

    Ok(BodyMetrics {
        bmi: bmi_result,
        bsa: bsa_result,
    })
}
