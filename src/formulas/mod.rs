//! Clinical formula module
//!
//! One evaluation per clinical index. Each one normalizes its inputs, checks
//! the domain preconditions, applies the closed-form equation and classifies
//! the rounded result.

pub mod albuminuria;
pub mod body;
pub mod kidney;
pub mod lipids;
pub mod osmolality;

use serde::{Deserialize, Serialize};

use crate::error::CalcResult;
use crate::fields::FieldSpec;
use crate::units::{parse_value, RawValue};

pub use albuminuria::{evaluate_uacr, uacr, UacrRequest};
pub use body::{bmi, body_surface_area, evaluate_body_metrics, BodyMetrics, BodyMetricsRequest};
pub use kidney::{
    ckd_epi_2021, cockcroft_gault, evaluate_ckd_epi, evaluate_cockcroft_gault,
    evaluate_pediatric_egfr, evaluate_schwartz_bedside, pediatric_k, schwartz_bedside,
    schwartz_pediatric, CockcroftGaultRequest, EgfrRequest, PediatricEgfrRequest,
    SchwartzBedsideRequest,
};
pub use lipids::{
    evaluate_hdl, evaluate_ldl, hdl_reverse_sampson, ldl_sampson, HdlRequest, LdlRequest,
    SAMPSON_TG_LIMIT_MG_DL,
};
pub use osmolality::{
    evaluate_serum_osmolality, evaluate_urine_osmolality, serum_osmolality, urine_osmolality,
    SerumOsmolalityRequest, UrineOsmolalityRequest,
};

/// A raw value with the unit tag the user selected for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: RawValue,
    #[serde(default)]
    pub unit: Option<String>,
}

impl Reading {
    pub fn new(value: impl Into<RawValue>, unit: &str) -> Self {
        Self {
            value: value.into(),
            unit: Some(unit.to_string()),
        }
    }

    /// A reading in the field's default unit
    pub fn bare(value: impl Into<RawValue>) -> Self {
        Self {
            value: value.into(),
            unit: None,
        }
    }

    /// The reading in the canonical unit of `field`
    pub fn canonical(&self, field: &FieldSpec) -> CalcResult<f64> {
        field.canonical(&self.value, self.unit.as_deref())
    }
}

/// Canonical value of an optional reading; absent or blank readings are `None`
pub(crate) fn optional_canonical(
    reading: Option<&Reading>,
    field: &FieldSpec,
) -> CalcResult<Option<f64>> {
    match reading {
        Some(r) => field.canonical_optional(Some(&r.value), r.unit.as_deref()),
        None => Ok(None),
    }
}

/// Parse a unitless input such as age in years
pub(crate) fn plain_value(field: &str, raw: &RawValue) -> CalcResult<f64> {
    parse_value(field, raw)
}
