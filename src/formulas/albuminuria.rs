//! Urine albumin-creatinine ratio

use serde::{Deserialize, Serialize};

use super::Reading;
use crate::error::{require_finite, require_positive, CalcResult};
use crate::fields::{URINE_ALBUMIN, URINE_CREATININE};
use crate::models::{round_to, Formula, FormulaResult, UACR_CATEGORIES};

pub const UACR_UNIT: &str = "mg/g";

/// UACR in mg/g from albumin and creatinine, both in mg/dL
pub fn uacr(albumin_mg_dl: f64, creatinine_mg_dl: f64) -> CalcResult<f64> {
    require_positive("albumin", albumin_mg_dl)?;
    require_positive("creatinine", creatinine_mg_dl)?;

    require_finite("UACR", albumin_mg_dl / creatinine_mg_dl * 1000.0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UacrRequest {
    pub albumin: Reading,
    pub creatinine: Reading,
}

pub fn evaluate_uacr(request: &UacrRequest) -> CalcResult<FormulaResult> {
    let albumin = request.albumin.canonical(&URINE_ALBUMIN)?;
    let creatinine = request.creatinine.canonical(&URINE_CREATININE)?;

    let value = round_to(uacr(albumin, creatinine)?, 2);
    let category = UACR_CATEGORIES.classify(value);
    tracing::debug!(formula = "uacr", value, ?category, "UACR evaluated");

    Ok(FormulaResult::classified(
        Formula::Uacr,
        value,
        UACR_UNIT,
        category,
        format!(
            "Equation Used: UACR\n\
             NB: creatinine and albumin values are first converted to mg/dL\n\
             UACR = (Albumin[{:.2} mg/dL] / Creatinine[{:.2} mg/dL]) x 1000 = {:.2} {}",
            albumin, creatinine, value, UACR_UNIT
        ),
    ))
}
