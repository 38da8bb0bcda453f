//! Calculator MCP Tools
//!
//! Response shaping for the formula tools, plus the field listing and unit
//! conversion tools.

use serde::Serialize;

use crate::error::{CalcError, CalcResult, ErrorKind};
use crate::fields::{field, ALL_FIELDS};
use crate::models::{round_to, BsaMethod};
use crate::units::{convert, AnalyteFamily, Measurement, RawValue};

/// Body of every calculator tool reply
///
/// Rejected inputs are not protocol errors: they come back with
/// `success: false` so the client can show the message next to the field.
#[derive(Debug, Serialize)]
pub struct CalcResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> CalcResponse<T> {
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            error_kind: None,
            message: None,
        }
    }

    pub fn failure(error: &CalcError) -> Self {
        Self {
            success: false,
            result: None,
            error_kind: Some(error.kind()),
            message: Some(error.to_string()),
        }
    }
}

/// Turn an evaluation outcome into a tool reply, logging rejections
pub fn respond<T>(tool: &str, outcome: CalcResult<T>) -> CalcResponse<T> {
    match outcome {
        Ok(result) => CalcResponse::ok(result),
        Err(e) => {
            tracing::warn!(tool, kind = ?e.kind(), "Rejected input: {}", e);
            CalcResponse::failure(&e)
        }
    }
}

/// Parse an optional BSA method selection
pub fn parse_bsa_method(raw: Option<&str>) -> CalcResult<Option<BsaMethod>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => BsaMethod::from_str(s)
            .map(Some)
            .ok_or_else(|| CalcError::missing_selection("bsa_method", "dubois, mosteller")),
    }
}

// ============================================================================
// Field listing
// ============================================================================

/// One input field as shown to clients
#[derive(Debug, Serialize)]
pub struct FieldSummary {
    pub name: &'static str,
    pub label: &'static str,
    pub analyte: &'static str,
    pub canonical_unit: &'static str,
    pub units: Vec<&'static str>,
    pub default_unit: &'static str,
}

/// Response for list_fields
#[derive(Debug, Serialize)]
pub struct ListFieldsResponse {
    pub fields: Vec<FieldSummary>,
    pub total: usize,
}

pub fn list_fields() -> ListFieldsResponse {
    let fields: Vec<FieldSummary> = ALL_FIELDS
        .iter()
        .map(|spec| FieldSummary {
            name: spec.name,
            label: spec.label,
            analyte: spec.family.name(),
            canonical_unit: spec.family.canonical_unit().as_str(),
            units: spec.recognized_units.iter().map(|u| u.as_str()).collect(),
            default_unit: spec.default_unit.as_str(),
        })
        .collect();

    let total = fields.len();
    ListFieldsResponse { fields, total }
}

// ============================================================================
// Unit conversion
// ============================================================================

/// Response for convert_units
#[derive(Debug, Serialize)]
pub struct ConversionResult {
    pub analyte: &'static str,
    pub input: f64,
    pub from_unit: String,
    pub value: f64,
    pub to_unit: String,
}

/// Resolve an analyte by input field name or by family name
fn resolve_analyte(name: &str) -> CalcResult<AnalyteFamily> {
    let name = name.trim();
    if let Some(spec) = field(name) {
        return Ok(spec.family);
    }
    AnalyteFamily::ALL
        .iter()
        .copied()
        .find(|family| family.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| CalcError::missing_selection("analyte", "a field name from list_fields"))
}

pub fn convert_units(
    analyte: &str,
    value: &RawValue,
    from_unit: &str,
    to_unit: &str,
) -> CalcResult<ConversionResult> {
    let family = resolve_analyte(analyte)?;
    let measurement = Measurement::parse(value, from_unit, family)?;
    let converted = convert(measurement.value, from_unit, to_unit, family)?;

    Ok(ConversionResult {
        analyte: family.name(),
        input: measurement.value,
        from_unit: from_unit.trim().to_string(),
        value: round_to(converted, 4),
        to_unit: to_unit.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulas::{
        evaluate_pediatric_egfr, evaluate_uacr, PediatricEgfrRequest, Reading, UacrRequest,
    };

    #[test]
    fn test_failure_body_shape() {
        let request = UacrRequest {
            albumin: Reading::new("abc", "mg/dL"),
            creatinine: Reading::new(100.0, "mg/dL"),
        };
        let response = respond("uacr", evaluate_uacr(&request));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error_kind"], "invalid_number");
        assert!(json["message"].as_str().unwrap().contains("abc"));
        assert!(json.get("result").is_none());
    }

    #[test]
    fn test_overflowing_result_is_a_rejection() {
        let request = PediatricEgfrRequest {
            creatinine: Reading::new("1e-320", "mg/dL"),
            height: Reading::new(150.0, "cm"),
            age: RawValue::from(10.0),
            sex: None,
        };
        let response = respond("egfr_pediatric", evaluate_pediatric_egfr(&request));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error_kind"], "invalid_number");
        assert!(json.get("result").is_none());
    }

    #[test]
    fn test_success_body_shape() {
        let request = UacrRequest {
            albumin: Reading::new(30.0, "mg/dL"),
            creatinine: Reading::new(100.0, "mg/dL"),
        };
        let response = respond("uacr", evaluate_uacr(&request));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["result"]["formula"], "uacr");
        assert_eq!(json["result"]["value"], 300.0);
        assert_eq!(json["result"]["category"], "microalbuminuria");
        assert!(json.get("error_kind").is_none());
    }

    #[test]
    fn test_parse_bsa_method() {
        assert_eq!(parse_bsa_method(None).unwrap(), None);
        assert_eq!(parse_bsa_method(Some(" ")).unwrap(), None);
        assert_eq!(
            parse_bsa_method(Some("du bois")).unwrap(),
            Some(BsaMethod::DuBois)
        );
        let err = parse_bsa_method(Some("boyd")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSelection);
    }

    #[test]
    fn test_list_fields() {
        let response = list_fields();
        assert_eq!(response.total, ALL_FIELDS.len());

        let creatinine = response
            .fields
            .iter()
            .find(|f| f.name == "creatinine")
            .unwrap();
        assert_eq!(creatinine.default_unit, "µmol/L");
        assert_eq!(creatinine.canonical_unit, "mg/dL");
    }

    #[test]
    fn test_convert_units_by_field_name() {
        let result =
            convert_units("creatinine", &RawValue::from("1.2"), "mg/dL", "µmol/L").unwrap();
        assert!((result.value - 106.08).abs() < 1e-9);
        assert_eq!(result.analyte, "creatinine");
    }

    #[test]
    fn test_convert_units_by_family_name() {
        let result = convert_units("Glucose", &RawValue::from(5.0), "mmol/L", "mg/dL").unwrap();
        assert_eq!(result.value, 90.0);
    }

    #[test]
    fn test_convert_units_rejections() {
        let err = convert_units("bilirubin", &RawValue::from(1.0), "mg/dL", "µmol/L").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSelection);

        let err = convert_units("sodium", &RawValue::from(140.0), "mmol/L", "mg/dL").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUnit);

        let err = convert_units("height", &RawValue::from("1e307"), "m", "cm").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNumber);
    }
}
