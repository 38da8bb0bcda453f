//! Kidney function formulas
//!
//! CKD-EPI 2021 (race-free) eGFR with optional BSA de-indexing, the pediatric
//! Schwartz equations and Cockcroft-Gault creatinine clearance. Creatinine is
//! always consumed in mg/dL, height in cm and weight in kg.

use serde::{Deserialize, Serialize};

use super::body::{body_surface_area, bsa_equation, REFERENCE_BSA_M2};
use super::{plain_value, Reading};
use crate::error::{require_finite, require_positive, CalcError, CalcResult};
use crate::fields::{FieldSpec, HEIGHT, SERUM_CREATININE, WEIGHT};
use crate::models::{
    round_to, BsaMethod, Category, Formula, FormulaResult, Sex, EGFR_STAGES, PEDIATRIC_STAGES,
};
use crate::units::RawValue;

/// Unit of GFR indexed to 1.73 m² body surface area
pub const INDEXED_GFR_UNIT: &str = "mL/min/1.73m²";
/// Unit of absolute (de-indexed) GFR and creatinine clearance
pub const ABSOLUTE_GFR_UNIT: &str = "mL/min";

/// Bedside Schwartz constant
pub const BEDSIDE_SCHWARTZ_K: f64 = 0.413;

// ============================================================================
// Equations
// ============================================================================

struct CkdEpiConstants {
    kappa: f64,
    alpha: f64,
    sex_factor: f64,
}

fn ckd_epi_constants(sex: Sex) -> CkdEpiConstants {
    match sex {
        Sex::Female => CkdEpiConstants {
            kappa: 0.7,
            alpha: -0.241,
            sex_factor: 1.012,
        },
        Sex::Male => CkdEpiConstants {
            kappa: 0.9,
            alpha: -0.302,
            sex_factor: 1.0,
        },
    }
}

/// CKD-EPI 2021 eGFR in mL/min/1.73m² from serum creatinine in mg/dL
pub fn ckd_epi_2021(scr_mg_dl: f64, age_years: f64, sex: Sex) -> CalcResult<f64> {
    require_positive("creatinine", scr_mg_dl)?;
    require_positive("age", age_years)?;

    let c = ckd_epi_constants(sex);
    let x = scr_mg_dl / c.kappa;
    let egfr = 142.0
        * x.min(1.0).powf(c.alpha)
        * x.max(1.0).powf(-1.2)
        * 0.9938_f64.powf(age_years)
        * c.sex_factor;
    require_finite("eGFR", egfr)
}

/// Schwartz k by age band and sex
///
/// Sex only matters from age 13 on, so it is only required there.
pub fn pediatric_k(age_years: f64, sex: Option<Sex>) -> CalcResult<f64> {
    if age_years < 1.0 {
        return Ok(0.45);
    }
    if age_years < 13.0 {
        return Ok(0.55);
    }
    match sex {
        Some(Sex::Male) => Ok(0.70),
        Some(Sex::Female) => Ok(0.55),
        None => Err(CalcError::missing_selection("sex", "male, female")),
    }
}

/// Pediatric eGFR (age-banded Schwartz) in mL/min/1.73m²
pub fn schwartz_pediatric(
    scr_mg_dl: f64,
    height_cm: f64,
    age_years: f64,
    sex: Option<Sex>,
) -> CalcResult<f64> {
    require_positive("creatinine", scr_mg_dl)?;
    require_positive("height", height_cm)?;
    require_positive("age", age_years)?;

    let k = pediatric_k(age_years, sex)?;
    require_finite("eGFR", k * height_cm / scr_mg_dl)
}

/// Bedside Schwartz eGFR (k = 0.413) in mL/min/1.73m²
pub fn schwartz_bedside(scr_mg_dl: f64, height_cm: f64) -> CalcResult<f64> {
    require_positive("creatinine", scr_mg_dl)?;
    require_positive("height", height_cm)?;

    require_finite("eGFR", BEDSIDE_SCHWARTZ_K * height_cm / scr_mg_dl)
}

/// Cockcroft-Gault creatinine clearance in mL/min
pub fn cockcroft_gault(
    age_years: f64,
    weight_kg: f64,
    scr_mg_dl: f64,
    sex: Sex,
) -> CalcResult<f64> {
    require_positive("age", age_years)?;
    require_positive("weight", weight_kg)?;
    require_positive("creatinine", scr_mg_dl)?;

    let crcl = ((140.0 - age_years) * weight_kg) / (72.0 * scr_mg_dl);
    let crcl = match sex {
        Sex::Female => crcl * 0.85,
        Sex::Male => crcl,
    };
    require_finite("creatinine clearance", crcl)
}

/// Fetch a reading that becomes required because of another selection
fn required_reading(reading: Option<&Reading>, field: &FieldSpec) -> CalcResult<f64> {
    match reading {
        Some(r) => r.canonical(field),
        None => Err(CalcError::invalid_number(field.label, "")),
    }
}

// ============================================================================
// CKD-EPI 2021
// ============================================================================

/// Inputs of the adult eGFR calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EgfrRequest {
    pub creatinine: Reading,
    pub age: RawValue,
    pub sex: Option<String>,
    /// De-index the result to the patient's own body surface area
    #[serde(default)]
    pub adjust_to_bsa: bool,
    pub height: Option<Reading>,
    pub weight: Option<Reading>,
    #[serde(default)]
    pub bsa_method: Option<BsaMethod>,
}

pub fn evaluate_ckd_epi(
    request: &EgfrRequest,
    default_method: BsaMethod,
) -> CalcResult<FormulaResult> {
    let scr = request.creatinine.canonical(&SERUM_CREATININE)?;
    let age = plain_value("age", &request.age)?;
    let sex = Sex::require(request.sex.as_deref())?;

    let egfr = ckd_epi_2021(scr, age, sex)?;
    let c = ckd_epi_constants(sex);

    let mut equation = format!(
        "Equation Used: CKD-EPI 2021\n\
         kappa = {} ({}), alpha = {}, sex factor = {}\n\
         x = Creatinine[{:.2} mg/dL] / kappa = {:.3}\n\
         eGFR = 142 x min(x, 1)^alpha x max(x, 1)^-1.200 x 0.9938^Age[{}] x sex factor",
        c.kappa,
        sex.as_str(),
        c.alpha,
        c.sex_factor,
        scr,
        scr / c.kappa,
        age
    );

    let (value, unit) = if request.adjust_to_bsa {
        let height = required_reading(request.height.as_ref(), &HEIGHT)?;
        let weight = required_reading(request.weight.as_ref(), &WEIGHT)?;
        let method = request.bsa_method.unwrap_or(default_method);
        let bsa = body_surface_area(height, weight, method)?;
        let adjusted = round_to(require_finite("eGFR", egfr * bsa / REFERENCE_BSA_M2)?, 2);

        equation.push_str(&format!(
            " = {:.2} {}\n{} = {:.2} m²\nAdjusted eGFR = eGFR x (BSA / 1.73) = {:.2} {}",
            egfr,
            INDEXED_GFR_UNIT,
            bsa_equation(height, weight, method),
            bsa,
            adjusted,
            ABSOLUTE_GFR_UNIT
        ));
        (adjusted, ABSOLUTE_GFR_UNIT)
    } else {
        let indexed = round_to(egfr, 2);
        equation.push_str(&format!(" = {:.2} {}", indexed, INDEXED_GFR_UNIT));
        (indexed, INDEXED_GFR_UNIT)
    };

    let category = EGFR_STAGES.classify(value);
    tracing::debug!(formula = "ckd_epi_2021", value, ?category, "eGFR evaluated");

    Ok(FormulaResult::classified(
        Formula::CkdEpi2021,
        value,
        unit,
        category,
        equation,
    ))
}

// ============================================================================
// Pediatric Schwartz
// ============================================================================

/// Inputs of the pediatric eGFR calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PediatricEgfrRequest {
    pub creatinine: Reading,
    pub height: Reading,
    pub age: RawValue,
    pub sex: Option<String>,
}

pub fn evaluate_pediatric_egfr(request: &PediatricEgfrRequest) -> CalcResult<FormulaResult> {
    let scr = request.creatinine.canonical(&SERUM_CREATININE)?;
    let height = request.height.canonical(&HEIGHT)?;
    let age = plain_value("age", &request.age)?;
    let sex = match request.sex.as_deref().map(str::trim) {
        None | Some("") => None,
        supplied => Some(Sex::require(supplied)?),
    };

    let value = round_to(schwartz_pediatric(scr, height, age, sex)?, 2);
    let k = pediatric_k(age, sex)?;

    let mut category = PEDIATRIC_STAGES.classify(value);
    if category == Category::PediatricMildlyDecreased && age < 2.0 {
        category = Category::PediatricInfantNormal;
    }
    tracing::debug!(
        formula = "pediatric_schwartz",
        value,
        k,
        ?category,
        "Pediatric eGFR evaluated"
    );

    let equation = format!(
        "Equation Used: Schwartz (age-banded k)\n\
         NB: creatinine is first converted to mg/dL and height to cm\n\
         k = 0.45 if age < 1; 0.55 if 1 <= age < 13\n\
         k = 0.70 if age >= 13 and male; 0.55 if age >= 13 and female\n\
         k = {}\n\
         eGFR = k x Height[{:.1} cm] / Creatinine[{:.2} mg/dL] = {:.2} {}",
        k, height, scr, value, INDEXED_GFR_UNIT
    );

    Ok(FormulaResult::classified(
        Formula::PediatricSchwartz,
        value,
        INDEXED_GFR_UNIT,
        category,
        equation,
    ))
}

/// Inputs of the fixed-k bedside Schwartz calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchwartzBedsideRequest {
    pub creatinine: Reading,
    pub height: Reading,
}

pub fn evaluate_schwartz_bedside(request: &SchwartzBedsideRequest) -> CalcResult<FormulaResult> {
    let scr = request.creatinine.canonical(&SERUM_CREATININE)?;
    let height = request.height.canonical(&HEIGHT)?;

    let value = round_to(schwartz_bedside(scr, height)?, 2);
    let category = PEDIATRIC_STAGES.classify(value);
    tracing::debug!(formula = "schwartz_bedside", value, ?category, "Bedside Schwartz evaluated");

    Ok(FormulaResult::classified(
        Formula::SchwartzBedside,
        value,
        INDEXED_GFR_UNIT,
        category,
        format!(
            "Equation Used: Bedside Schwartz\n\
             eGFR = 0.413 x Height[{:.1} cm] / Creatinine[{:.2} mg/dL] = {:.2} {}",
            height, scr, value, INDEXED_GFR_UNIT
        ),
    ))
}

// ============================================================================
// Cockcroft-Gault
// ============================================================================

/// Inputs of the creatinine clearance calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CockcroftGaultRequest {
    pub creatinine: Reading,
    pub age: RawValue,
    pub weight: Reading,
    pub sex: Option<String>,
    /// Index the clearance to 1.73 m² body surface area
    #[serde(default)]
    pub normalize_to_bsa: bool,
    pub height: Option<Reading>,
    #[serde(default)]
    pub bsa_method: Option<BsaMethod>,
}

pub fn evaluate_cockcroft_gault(
    request: &CockcroftGaultRequest,
    default_method: BsaMethod,
) -> CalcResult<FormulaResult> {
    let scr = request.creatinine.canonical(&SERUM_CREATININE)?;
    let age = plain_value("age", &request.age)?;
    let weight = request.weight.canonical(&WEIGHT)?;
    let sex = Sex::require(request.sex.as_deref())?;

    let crcl = cockcroft_gault(age, weight, scr, sex)?;
    let mut equation = format!(
        "Equation Used: Cockcroft-Gault\n\
         CrCl = ((140 - Age[{}]) x Weight[{:.1} kg]) / (72 x Creatinine[{:.2} mg/dL]){}",
        age,
        weight,
        scr,
        if sex == Sex::Female { " x 0.85" } else { "" }
    );

    let (value, unit) = if request.normalize_to_bsa {
        let height = required_reading(request.height.as_ref(), &HEIGHT)?;
        let method = request.bsa_method.unwrap_or(default_method);
        let bsa = body_surface_area(height, weight, method)?;
        let normalized = round_to(
            require_finite("creatinine clearance", crcl * REFERENCE_BSA_M2 / bsa)?,
            2,
        );

        equation.push_str(&format!(
            " = {:.2} {}\n{} = {:.2} m²\nNormalized CrCl = CrCl x (1.73 / BSA) = {:.2} {}",
            crcl,
            ABSOLUTE_GFR_UNIT,
            bsa_equation(height, weight, method),
            bsa,
            normalized,
            INDEXED_GFR_UNIT
        ));
        (normalized, INDEXED_GFR_UNIT)
    } else {
        let absolute = round_to(crcl, 2);
        equation.push_str(&format!(" = {:.2} {}", absolute, ABSOLUTE_GFR_UNIT));
        (absolute, ABSOLUTE_GFR_UNIT)
    };

    let category = EGFR_STAGES.classify(value);
    tracing::debug!(
        formula = "cockcroft_gault",
        value,
        ?category,
        "Creatinine clearance evaluated"
    );

    Ok(FormulaResult::classified(
        Formula::CockcroftGault,
        value,
        unit,
        category,
        equation,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn adult_request(creatinine: Reading, age: f64, sex: &str) -> EgfrRequest {
        EgfrRequest {
            creatinine,
            age: RawValue::Number(age),
            sex: Some(sex.to_string()),
            adjust_to_bsa: false,
            height: None,
            weight: None,
            bsa_method: None,
        }
    }

    #[test]
    fn test_ckd_epi_male_reference_value() {
        let egfr = ckd_epi_2021(1.2, 50.0, Sex::Male).unwrap();
        assert!((egfr - 73.67).abs() < 0.01, "got {}", egfr);
    }

    #[test]
    fn test_ckd_epi_female_below_kappa() {
        // Scr below kappa uses the alpha branch
        let egfr = ckd_epi_2021(0.6, 40.0, Sex::Female).unwrap();
        let expected = 142.0 * (0.6f64 / 0.7).powf(-0.241) * 0.9938f64.powf(40.0) * 1.012;
        assert!((egfr - expected).abs() < 1e-9);
        assert!(egfr > 90.0);
    }

    #[test]
    fn test_ckd_epi_rejects_zero_creatinine_and_age() {
        let err = ckd_epi_2021(0.0, 50.0, Sex::Male).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainViolation);
        let err = ckd_epi_2021(1.0, 0.0, Sex::Male).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainViolation);
    }

    #[test]
    fn test_evaluate_ckd_epi_mg_dl_and_umol_agree() {
        let mg = evaluate_ckd_epi(
            &adult_request(Reading::new(1.2, "mg/dL"), 50.0, "male"),
            BsaMethod::DuBois,
        )
        .unwrap();
        let umol = evaluate_ckd_epi(
            &adult_request(Reading::new("106.1", "µmol/L"), 50.0, "male"),
            BsaMethod::DuBois,
        )
        .unwrap();

        assert!((mg.value - 73.67).abs() < 0.01);
        assert!((mg.value - umol.value).abs() < 0.05);
        assert_eq!(mg.category, Some(Category::EgfrG2));
        assert_eq!(umol.category, Some(Category::EgfrG2));
        assert_eq!(mg.unit, INDEXED_GFR_UNIT);
        assert!(mg.equation.contains("CKD-EPI 2021"));
    }

    #[test]
    fn test_evaluate_ckd_epi_requires_sex() {
        let mut request = adult_request(Reading::new(1.0, "mg/dL"), 60.0, "male");
        request.sex = None;
        let err = evaluate_ckd_epi(&request, BsaMethod::DuBois).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSelection);
    }

    #[test]
    fn test_evaluate_ckd_epi_blank_creatinine() {
        let request = adult_request(Reading::new("", "mg/dL"), 60.0, "female");
        let err = evaluate_ckd_epi(&request, BsaMethod::DuBois).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumber);
    }

    #[test]
    fn test_evaluate_ckd_epi_bsa_adjusted() {
        let mut request = adult_request(Reading::new(1.2, "mg/dL"), 50.0, "male");
        request.adjust_to_bsa = true;
        request.height = Some(Reading::new(170.0, "cm"));
        request.weight = Some(Reading::new(70.0, "kg"));

        let result = evaluate_ckd_epi(&request, BsaMethod::DuBois).unwrap();
        let expected = 73.6735 * 1.8097 / 1.73;
        assert!((result.value - expected).abs() < 0.05, "got {}", result.value);
        assert_eq!(result.unit, ABSOLUTE_GFR_UNIT);
        assert!(result.equation.contains("Du Bois"));

        request.bsa_method = Some(BsaMethod::Mosteller);
        let mosteller = evaluate_ckd_epi(&request, BsaMethod::DuBois).unwrap();
        assert!(mosteller.value > result.value);
    }

    #[test]
    fn test_evaluate_ckd_epi_bsa_needs_body_size() {
        let mut request = adult_request(Reading::new(1.2, "mg/dL"), 50.0, "male");
        request.adjust_to_bsa = true;
        request.weight = Some(Reading::new(70.0, "kg"));
        let err = evaluate_ckd_epi(&request, BsaMethod::DuBois).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumber);

        request.height = Some(Reading::new(0.0, "cm"));
        let err = evaluate_ckd_epi(&request, BsaMethod::DuBois).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainViolation);
    }

    #[test]
    fn test_pediatric_k_bands() {
        assert_eq!(pediatric_k(0.5, None), Ok(0.45));
        assert_eq!(pediatric_k(1.0, None), Ok(0.55));
        assert_eq!(pediatric_k(12.9, Some(Sex::Male)), Ok(0.55));
        assert_eq!(pediatric_k(13.0, Some(Sex::Male)), Ok(0.70));
        assert_eq!(pediatric_k(15.0, Some(Sex::Female)), Ok(0.55));
        assert_eq!(
            pediatric_k(15.0, None).unwrap_err().kind(),
            ErrorKind::MissingSelection
        );
    }

    #[test]
    fn test_schwartz_pediatric() {
        let egfr = schwartz_pediatric(0.5, 120.0, 8.0, None).unwrap();
        assert!((egfr - 132.0).abs() < 1e-9);

        let err = schwartz_pediatric(0.0, 120.0, 8.0, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainViolation);
        let err = schwartz_pediatric(0.5, 0.0, 8.0, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainViolation);
    }

    #[test]
    fn test_evaluate_pediatric_infant_range() {
        // 0.45 x 60 / 0.4 = 67.5, inside the band that is normal under age 2
        let request = PediatricEgfrRequest {
            creatinine: Reading::new(0.4, "mg/dL"),
            height: Reading::new(0.6, "m"),
            age: RawValue::from("0.5"),
            sex: None,
        };
        let result = evaluate_pediatric_egfr(&request).unwrap();
        assert_eq!(result.value, 67.5);
        assert_eq!(result.category, Some(Category::PediatricInfantNormal));

        let request = PediatricEgfrRequest {
            creatinine: Reading::new(1.1, "mg/dL"),
            height: Reading::new(150.0, "cm"),
            age: RawValue::from(10.0),
            sex: Some("female".to_string()),
        };
        let result = evaluate_pediatric_egfr(&request).unwrap();
        assert_eq!(result.value, 75.0);
        assert_eq!(result.category, Some(Category::PediatricMildlyDecreased));
    }

    #[test]
    fn test_evaluate_pediatric_rejects_unknown_sex() {
        let request = PediatricEgfrRequest {
            creatinine: Reading::new(1.1, "mg/dL"),
            height: Reading::new(150.0, "cm"),
            age: RawValue::from(10.0),
            sex: Some("robot".to_string()),
        };
        let err = evaluate_pediatric_egfr(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSelection);

        let request = PediatricEgfrRequest {
            sex: Some("  ".to_string()),
            ..request
        };
        assert_eq!(evaluate_pediatric_egfr(&request).unwrap().value, 75.0);
    }

    #[test]
    fn test_evaluate_pediatric_rejects_overflowing_egfr() {
        let request = PediatricEgfrRequest {
            creatinine: Reading::new("1e-320", "mg/dL"),
            height: Reading::new(150.0, "cm"),
            age: RawValue::from(10.0),
            sex: None,
        };
        let err = evaluate_pediatric_egfr(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumber);

        let err = schwartz_bedside(1e-320, 150.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumber);
    }

    #[test]
    fn test_schwartz_bedside() {
        let request = SchwartzBedsideRequest {
            creatinine: Reading::new(0.413, "mg/dL"),
            height: Reading::new(100.0, "cm"),
        };
        let result = evaluate_schwartz_bedside(&request).unwrap();
        assert_eq!(result.value, 100.0);
        assert_eq!(result.category, Some(Category::PediatricNormal));
    }

    #[test]
    fn test_cockcroft_gault() {
        let crcl = cockcroft_gault(60.0, 72.0, 1.0, Sex::Male).unwrap();
        assert!((crcl - 80.0).abs() < 1e-9);
        let crcl = cockcroft_gault(60.0, 72.0, 1.0, Sex::Female).unwrap();
        assert!((crcl - 68.0).abs() < 1e-9);
    }

    #[test]
    fn test_cockcroft_gault_rejects_overflow() {
        let err = cockcroft_gault(60.0, 72.0, 1e-320, Sex::Male).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumber);
    }

    #[test]
    fn test_evaluate_cockcroft_gault_normalized() {
        let request = CockcroftGaultRequest {
            creatinine: Reading::new(1.0, "mg/dL"),
            age: RawValue::from(60.0),
            weight: Reading::new(72.0, "kg"),
            sex: Some("male".to_string()),
            normalize_to_bsa: true,
            height: Some(Reading::new(180.0, "cm")),
            bsa_method: Some(BsaMethod::Mosteller),
        };
        let result = evaluate_cockcroft_gault(&request, BsaMethod::DuBois).unwrap();
        // BSA = sqrt(180 x 72 / 3600) = 1.897...
        let expected = 80.0 * 1.73 / (180.0f64 * 72.0 / 3600.0).sqrt();
        assert!((result.value - expected).abs() < 0.01);
        assert_eq!(result.unit, INDEXED_GFR_UNIT);
    }
}
