//! Sampson lipid equations
//!
//! LDL from total cholesterol, triglycerides and HDL, and the same equation
//! solved for HDL. All arithmetic happens in mg/dL; results are converted to
//! the requested display unit afterwards, but always classified in mg/dL.

use serde::{Deserialize, Serialize};

use super::Reading;
use crate::error::{require_finite, require_positive, CalcError, CalcResult};
use crate::fields::{FieldSpec, HDL, LDL, TOTAL_CHOLESTEROL, TRIGLYCERIDES};
use crate::models::{round_to, Category, Formula, FormulaResult, HDL_BANDS, LDL_BANDS};
use crate::units::{denormalize_unit, Unit};

/// Highest triglyceride level the Sampson equation is validated for, in mg/dL
pub const SAMPSON_TG_LIMIT_MG_DL: f64 = 800.0;

const MIN_DENOMINATOR: f64 = 1e-6;

fn check_triglycerides(formula: &'static str, tg_mg_dl: f64) -> CalcResult<()> {
    if tg_mg_dl > SAMPSON_TG_LIMIT_MG_DL {
        return Err(CalcError::OutOfRange {
            formula,
            field: "triglycerides".to_string(),
            value: tg_mg_dl,
            limit: SAMPSON_TG_LIMIT_MG_DL,
            unit: "mg/dL",
        });
    }
    Ok(())
}

/// Sampson LDL in mg/dL
pub fn ldl_sampson(tc_mg_dl: f64, tg_mg_dl: f64, hdl_mg_dl: f64) -> CalcResult<f64> {
    require_positive("total cholesterol", tc_mg_dl)?;
    require_positive("triglycerides", tg_mg_dl)?;
    require_positive("HDL", hdl_mg_dl)?;
    check_triglycerides("Sampson LDL", tg_mg_dl)?;

    let non_hdl = tc_mg_dl - hdl_mg_dl;
    let ldl = tc_mg_dl / 0.948
        - hdl_mg_dl / 0.971
        - (tg_mg_dl / 8.56 + tg_mg_dl * non_hdl / 2140.0 - tg_mg_dl * tc_mg_dl / 16100.0)
        - 9.44;
    require_finite("LDL", ldl)
}

/// Reverse Sampson HDL in mg/dL
///
/// The result may be negative; it is returned as-is.
pub fn hdl_reverse_sampson(tc_mg_dl: f64, tg_mg_dl: f64, ldl_mg_dl: f64) -> CalcResult<f64> {
    require_positive("total cholesterol", tc_mg_dl)?;
    require_positive("triglycerides", tg_mg_dl)?;
    require_positive("LDL", ldl_mg_dl)?;
    check_triglycerides("Reverse Sampson HDL", tg_mg_dl)?;

    solve_hdl(tc_mg_dl, tg_mg_dl, ldl_mg_dl)
}

fn solve_hdl(tc: f64, tg: f64, ldl: f64) -> CalcResult<f64> {
    let numerator = ldl - tc / 0.948 + tg / 8.56 + tg * tc / 2140.0 - tg * tg / 16100.0 + 9.44;
    let denominator = tg / 2140.0 - 1.0 / 0.971;
    if denominator.abs() < MIN_DENOMINATOR {
        return Err(CalcError::FormulaUnstable {
            formula: "Reverse Sampson HDL",
            denominator,
        });
    }
    require_finite("HDL", numerator / denominator)
}

/// Display unit: explicit choice, else the unit of the paired reading
fn display_unit(explicit: Option<&str>, paired: &Reading, field: &FieldSpec) -> CalcResult<Unit> {
    field.unit(explicit.or(paired.unit.as_deref()))
}

// ============================================================================
// LDL
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdlRequest {
    pub total_cholesterol: Reading,
    pub triglycerides: Reading,
    pub hdl: Reading,
    /// Result unit; defaults to the unit HDL was entered in
    #[serde(default)]
    pub display_unit: Option<String>,
}

pub fn evaluate_ldl(request: &LdlRequest) -> CalcResult<FormulaResult> {
    let tc = request.total_cholesterol.canonical(&TOTAL_CHOLESTEROL)?;
    let tg = request.triglycerides.canonical(&TRIGLYCERIDES)?;
    let hdl = request.hdl.canonical(&HDL)?;
    let unit = display_unit(request.display_unit.as_deref(), &request.hdl, &LDL)?;

    let ldl_mg_dl = round_to(ldl_sampson(tc, tg, hdl)?, 2);
    let category = LDL_BANDS.classify(ldl_mg_dl);
    let value = round_to(denormalize_unit(ldl_mg_dl, LDL.family, unit)?, 2);
    tracing::debug!(formula = "ldl_sampson", ldl_mg_dl, ?category, "LDL evaluated");

    let non_hdl = tc - hdl;
    Ok(FormulaResult::classified(
        Formula::LdlSampson,
        value,
        unit.as_str(),
        category,
        format!(
            "Equation Used: Sampson Formula\n\
             Values are first converted to mg/dL\n\
             non-HDL = TC[{tc:.2}] - HDL[{hdl:.2}] = {non_hdl:.2}\n\
             LDL = (TC/0.948) - (HDL/0.971) - [(TG[{tg:.2}]/8.56) + (TG x non-HDL/2140) - (TG x TC/16100)] - 9.44\n\
             LDL = {ldl_mg_dl:.2} mg/dL = {value:.2} {unit}"
        ),
    ))
}

// ============================================================================
// HDL
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HdlRequest {
    pub total_cholesterol: Reading,
    pub triglycerides: Reading,
    pub ldl: Reading,
    /// Result unit; defaults to the unit LDL was entered in
    #[serde(default)]
    pub display_unit: Option<String>,
}

pub fn evaluate_hdl(request: &HdlRequest) -> CalcResult<FormulaResult> {
    let tc = request.total_cholesterol.canonical(&TOTAL_CHOLESTEROL)?;
    let tg = request.triglycerides.canonical(&TRIGLYCERIDES)?;
    let ldl = request.ldl.canonical(&LDL)?;
    let unit = display_unit(request.display_unit.as_deref(), &request.ldl, &HDL)?;

    let hdl_mg_dl = round_to(hdl_reverse_sampson(tc, tg, ldl)?, 2);
    let category = HDL_BANDS.classify(hdl_mg_dl);
    let value = round_to(denormalize_unit(hdl_mg_dl, HDL.family, unit)?, 2);

    if category == Category::HdlBelowRange {
        tracing::warn!(hdl_mg_dl, "Estimated HDL is negative; direct measurement recommended");
    } else {
        tracing::debug!(formula = "hdl_reverse_sampson", hdl_mg_dl, ?category, "HDL evaluated");
    }

    Ok(FormulaResult::classified(
        Formula::HdlReverseSampson,
        value,
        unit.as_str(),
        category,
        format!(
            "Equation Used: Reverse Sampson Formula\n\
             Values are first converted to mg/dL\n\
             numerator = LDL[{ldl:.2}] - (TC[{tc:.2}]/0.948) + (TG[{tg:.2}]/8.56) + (TG x TC/2140) - (TG²/16100) + 9.44\n\
             denominator = (TG/2140) - (1/0.971)\n\
             HDL = numerator / denominator = {hdl_mg_dl:.2} mg/dL = {value:.2} {unit}"
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn ldl_request(tc: Reading, tg: Reading, hdl: Reading) -> LdlRequest {
        LdlRequest {
            total_cholesterol: tc,
            triglycerides: tg,
            hdl,
            display_unit: None,
        }
    }

    #[test]
    fn test_ldl_sampson_mg_dl() {
        let ldl = ldl_sampson(200.0, 150.0, 50.0).unwrap();
        assert!((ldl - 123.863).abs() < 0.001, "got {}", ldl);
    }

    #[test]
    fn test_evaluate_ldl_keeps_hdl_unit() {
        let request = ldl_request(
            Reading::new(200.0, "mg/dL"),
            Reading::new(150.0, "mg/dL"),
            Reading::new(50.0, "mg/dL"),
        );
        let result = evaluate_ldl(&request).unwrap();
        assert_eq!(result.value, 123.86);
        assert_eq!(result.unit, "mg/dL");
        assert_eq!(result.category, Some(Category::LdlNearOptimal));
    }

    #[test]
    fn test_evaluate_ldl_mmol_classifies_in_mg_dl() {
        let request = ldl_request(Reading::bare(5.0), Reading::bare(1.5), Reading::bare(1.2));
        let result = evaluate_ldl(&request).unwrap();
        assert_eq!(result.unit, "mmol/L");
        assert_eq!(result.value, 3.2);
        // 3.2 mmol/L would be "Optimal" if compared to mg/dL cut-offs directly
        assert_eq!(result.category, Some(Category::LdlNearOptimal));

        let request = LdlRequest {
            display_unit: Some("mg/dL".to_string()),
            ..request
        };
        assert_eq!(evaluate_ldl(&request).unwrap().value, 123.68);
    }

    #[test]
    fn test_ldl_triglycerides_over_limit() {
        let request = ldl_request(
            Reading::new(200.0, "mg/dL"),
            Reading::new(820.0, "mg/dL"),
            Reading::new(50.0, "mg/dL"),
        );
        let err = evaluate_ldl(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);

        assert_eq!(
            ldl_sampson(200.0, 850.0, 50.0).unwrap_err().kind(),
            ErrorKind::OutOfRange
        );
        assert!(ldl_sampson(200.0, 800.0, 50.0).is_ok());
    }

    #[test]
    fn test_ldl_triglyceride_limit_applies_after_conversion() {
        // 9.5 mmol/L x 88.57 = 841 mg/dL
        let request = ldl_request(Reading::bare(5.0), Reading::bare(9.5), Reading::bare(1.2));
        assert_eq!(
            evaluate_ldl(&request).unwrap_err().kind(),
            ErrorKind::OutOfRange
        );
    }

    #[test]
    fn test_ldl_rejects_zero_hdl() {
        let err = ldl_sampson(200.0, 150.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainViolation);
    }

    #[test]
    fn test_ldl_rejects_non_finite_result() {
        let err = ldl_sampson(f64::MAX, 150.0, 50.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumber);
    }

    #[test]
    fn test_hdl_reverse_sampson() {
        let hdl = hdl_reverse_sampson(200.0, 150.0, 120.0).unwrap();
        assert!((hdl - 53.54).abs() < 0.01, "got {}", hdl);
    }

    #[test]
    fn test_negative_hdl_is_surfaced() {
        let request = HdlRequest {
            total_cholesterol: Reading::new(150.0, "mg/dL"),
            triglycerides: Reading::new(700.0, "mg/dL"),
            ldl: Reading::new(300.0, "mg/dL"),
            display_unit: None,
        };
        let result = evaluate_hdl(&request).unwrap();
        assert_eq!(result.value, -358.04);
        assert_eq!(result.category, Some(Category::HdlBelowRange));
    }

    #[test]
    fn test_hdl_triglycerides_over_limit() {
        let err = hdl_reverse_sampson(200.0, 801.0, 120.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn test_hdl_singular_denominator() {
        let tg = 2140.0 / 0.971;
        let err = solve_hdl(200.0, tg, 120.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormulaUnstable);
    }
}
