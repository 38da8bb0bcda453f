//! ChemCalc MCP Server Implementation
//!
//! Implements the MCP server with all ChemCalc tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::CalcResult;
use crate::formulas::{
    evaluate_body_metrics, evaluate_ckd_epi, evaluate_cockcroft_gault, evaluate_hdl,
    evaluate_ldl, evaluate_pediatric_egfr, evaluate_schwartz_bedside, evaluate_serum_osmolality,
    evaluate_uacr, evaluate_urine_osmolality, BodyMetricsRequest, CockcroftGaultRequest,
    EgfrRequest, HdlRequest, LdlRequest, PediatricEgfrRequest, Reading, SchwartzBedsideRequest,
    SerumOsmolalityRequest, UacrRequest, UrineOsmolalityRequest,
};
use crate::tools::calculators::{self, parse_bsa_method, respond};
use crate::tools::status::StatusTracker;
use crate::units::RawValue;

/// ChemCalc MCP Service
#[derive(Clone)]
pub struct ChemCalcService {
    config: Config,
    status_tracker: Arc<StatusTracker>,
    tool_router: ToolRouter<ChemCalcService>,
}

impl ChemCalcService {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            status_tracker: Arc::new(StatusTracker::new(config.default_bsa_method)),
            tool_router: Self::tool_router(),
        }
    }

    /// Serialize a calculator reply and count it
    fn reply<T: Serialize>(&self, tool: &str, outcome: CalcResult<T>) -> Result<CallToolResult, McpError> {
        self.status_tracker.record_evaluation();
        let response = respond(tool, outcome);
        to_result(&response)
    }
}

fn to_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Reading Parameter Structs
// ============================================================================

/// A lab value as typed by the user: a number or a numeric string
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum ValueParam {
    Number(f64),
    Text(String),
}

impl From<ValueParam> for RawValue {
    fn from(v: ValueParam) -> Self {
        match v {
            ValueParam::Number(n) => RawValue::Number(n),
            ValueParam::Text(s) => RawValue::Text(s),
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadingParam {
    pub value: ValueParam,
    /// Unit tag, e.g. "mg/dL" or "µmol/L"; the field default applies when omitted
    pub unit: Option<String>,
}

impl From<ReadingParam> for Reading {
    fn from(p: ReadingParam) -> Self {
        Reading {
            value: p.value.into(),
            unit: p.unit,
        }
    }
}

fn reading(p: Option<ReadingParam>) -> Option<Reading> {
    p.map(Reading::from)
}

// ============================================================================
// Kidney Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EgfrCkdEpiParams {
    pub creatinine: ReadingParam,
    pub age: ValueParam,
    /// "male" or "female"
    pub sex: Option<String>,
    #[serde(default)]
    pub adjust_to_bsa: bool,
    pub height: Option<ReadingParam>,
    pub weight: Option<ReadingParam>,
    /// "dubois" or "mosteller"
    pub bsa_method: Option<String>,
}

impl EgfrCkdEpiParams {
    fn into_request(self) -> CalcResult<EgfrRequest> {
        Ok(EgfrRequest {
            bsa_method: parse_bsa_method(self.bsa_method.as_deref())?,
            creatinine: self.creatinine.into(),
            age: self.age.into(),
            sex: self.sex,
            adjust_to_bsa: self.adjust_to_bsa,
            height: reading(self.height),
            weight: reading(self.weight),
        })
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EgfrPediatricParams {
    pub creatinine: ReadingParam,
    pub height: ReadingParam,
    pub age: ValueParam,
    /// "male" or "female"; required from age 13
    pub sex: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SchwartzBedsideParams {
    pub creatinine: ReadingParam,
    pub height: ReadingParam,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreatinineClearanceParams {
    pub creatinine: ReadingParam,
    pub age: ValueParam,
    pub weight: ReadingParam,
    /// "male" or "female"
    pub sex: Option<String>,
    #[serde(default)]
    pub normalize_to_bsa: bool,
    pub height: Option<ReadingParam>,
    /// "dubois" or "mosteller"
    pub bsa_method: Option<String>,
}

impl CreatinineClearanceParams {
    fn into_request(self) -> CalcResult<CockcroftGaultRequest> {
        Ok(CockcroftGaultRequest {
            bsa_method: parse_bsa_method(self.bsa_method.as_deref())?,
            creatinine: self.creatinine.into(),
            age: self.age.into(),
            weight: self.weight.into(),
            sex: self.sex,
            normalize_to_bsa: self.normalize_to_bsa,
            height: reading(self.height),
        })
    }
}

// ============================================================================
// Urine and Serum Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UacrParams {
    pub albumin: ReadingParam,
    pub creatinine: ReadingParam,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SerumOsmolalityParams {
    pub sodium: ReadingParam,
    pub potassium: ReadingParam,
    pub glucose: ReadingParam,
    pub urea: Option<ReadingParam>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UrineOsmolalityParams {
    pub sodium: ReadingParam,
    pub potassium: ReadingParam,
    pub urea: ReadingParam,
    pub glucose: Option<ReadingParam>,
}

// ============================================================================
// Lipid and Body Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LdlSampsonParams {
    pub total_cholesterol: ReadingParam,
    pub triglycerides: ReadingParam,
    pub hdl: ReadingParam,
    /// "mmol/L" or "mg/dL"; defaults to the HDL unit
    pub display_unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct HdlReverseSampsonParams {
    pub total_cholesterol: ReadingParam,
    pub triglycerides: ReadingParam,
    pub ldl: ReadingParam,
    /// "mmol/L" or "mg/dL"; defaults to the LDL unit
    pub display_unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BodyMetricsParams {
    pub height: ReadingParam,
    pub weight: ReadingParam,
    /// "dubois" or "mosteller"
    pub bsa_method: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertUnitsParams {
    /// Field name from list_fields (e.g. "creatinine") or analyte name (e.g. "glucose")
    pub analyte: String,
    pub value: ValueParam,
    pub from_unit: String,
    pub to_unit: String,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl ChemCalcService {
    // --- Status ---

    #[tool(description = "Get the current status of the ChemCalc service including build info, default BSA method, process information and evaluations served")]
    fn chemcalc_status(&self) -> Result<CallToolResult, McpError> {
        to_result(&self.status_tracker.get_status())
    }

    #[tool(description = "Get instructions for using the ChemCalc calculators: reading format, accepted units, and how to interpret replies. Call this before the first calculation.")]
    fn calculator_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::CALCULATOR_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(CALCULATOR_INSTRUCTIONS)]))
    }

    #[tool(description = "List every calculator input field with its accepted units and default unit")]
    fn list_fields(&self) -> Result<CallToolResult, McpError> {
        to_result(&calculators::list_fields())
    }

    #[tool(description = "Convert a lab value between units of one analyte (e.g. creatinine mg/dL to µmol/L)")]
    fn convert_units(&self, Parameters(p): Parameters<ConvertUnitsParams>) -> Result<CallToolResult, McpError> {
        let value = RawValue::from(p.value);
        let outcome = calculators::convert_units(&p.analyte, &value, &p.from_unit, &p.to_unit);
        self.reply("convert_units", outcome)
    }

    // --- Kidney ---

    #[tool(description = "Adult eGFR by CKD-EPI 2021 (race-free). Optionally de-indexed to the patient's BSA (needs height and weight).")]
    fn egfr_ckd_epi(&self, Parameters(p): Parameters<EgfrCkdEpiParams>) -> Result<CallToolResult, McpError> {
        let outcome = p
            .into_request()
            .and_then(|r| evaluate_ckd_epi(&r, self.config.default_bsa_method));
        self.reply("egfr_ckd_epi", outcome)
    }

    #[tool(description = "Pediatric eGFR by the Schwartz equation with age-banded k. Sex is required from age 13.")]
    fn egfr_pediatric(&self, Parameters(p): Parameters<EgfrPediatricParams>) -> Result<CallToolResult, McpError> {
        let request = PediatricEgfrRequest {
            creatinine: p.creatinine.into(),
            height: p.height.into(),
            age: p.age.into(),
            sex: p.sex,
        };
        self.reply("egfr_pediatric", evaluate_pediatric_egfr(&request))
    }

    #[tool(description = "Pediatric eGFR by the bedside Schwartz equation (k = 0.413)")]
    fn egfr_schwartz_bedside(&self, Parameters(p): Parameters<SchwartzBedsideParams>) -> Result<CallToolResult, McpError> {
        let request = SchwartzBedsideRequest {
            creatinine: p.creatinine.into(),
            height: p.height.into(),
        };
        self.reply("egfr_schwartz_bedside", evaluate_schwartz_bedside(&request))
    }

    #[tool(description = "Creatinine clearance by Cockcroft-Gault in mL/min. Optionally indexed to 1.73 m² (needs height).")]
    fn creatinine_clearance(&self, Parameters(p): Parameters<CreatinineClearanceParams>) -> Result<CallToolResult, McpError> {
        let outcome = p
            .into_request()
            .and_then(|r| evaluate_cockcroft_gault(&r, self.config.default_bsa_method));
        self.reply("creatinine_clearance", outcome)
    }

    // --- Urine and Serum ---

    #[tool(description = "Urine albumin-creatinine ratio in mg/g with albuminuria category")]
    fn uacr(&self, Parameters(p): Parameters<UacrParams>) -> Result<CallToolResult, McpError> {
        let request = UacrRequest {
            albumin: p.albumin.into(),
            creatinine: p.creatinine.into(),
        };
        self.reply("uacr", evaluate_uacr(&request))
    }

    #[tool(description = "Calculated serum osmolality from Na, K, glucose and optional urea")]
    fn serum_osmolality(&self, Parameters(p): Parameters<SerumOsmolalityParams>) -> Result<CallToolResult, McpError> {
        let request = SerumOsmolalityRequest {
            sodium: p.sodium.into(),
            potassium: p.potassium.into(),
            glucose: p.glucose.into(),
            urea: reading(p.urea),
        };
        self.reply("serum_osmolality", evaluate_serum_osmolality(&request))
    }

    #[tool(description = "Estimated urine osmolality from Na, K, urea and optional glucose")]
    fn urine_osmolality(&self, Parameters(p): Parameters<UrineOsmolalityParams>) -> Result<CallToolResult, McpError> {
        let request = UrineOsmolalityRequest {
            sodium: p.sodium.into(),
            potassium: p.potassium.into(),
            urea: p.urea.into(),
            glucose: reading(p.glucose),
        };
        self.reply("urine_osmolality", evaluate_urine_osmolality(&request))
    }

    // --- Lipids ---

    #[tool(description = "LDL cholesterol by the Sampson equation. Triglycerides above 800 mg/dL are rejected.")]
    fn ldl_sampson(&self, Parameters(p): Parameters<LdlSampsonParams>) -> Result<CallToolResult, McpError> {
        let request = LdlRequest {
            total_cholesterol: p.total_cholesterol.into(),
            triglycerides: p.triglycerides.into(),
            hdl: p.hdl.into(),
            display_unit: p.display_unit,
        };
        self.reply("ldl_sampson", evaluate_ldl(&request))
    }

    #[tool(description = "HDL cholesterol estimated by solving the Sampson equation for HDL. Negative estimates are reported as below range.")]
    fn hdl_reverse_sampson(&self, Parameters(p): Parameters<HdlReverseSampsonParams>) -> Result<CallToolResult, McpError> {
        let request = HdlRequest {
            total_cholesterol: p.total_cholesterol.into(),
            triglycerides: p.triglycerides.into(),
            ldl: p.ldl.into(),
            display_unit: p.display_unit,
        };
        self.reply("hdl_reverse_sampson", evaluate_hdl(&request))
    }

    // --- Body ---

    #[tool(description = "Body mass index and body surface area (Du Bois or Mosteller)")]
    fn body_metrics(&self, Parameters(p): Parameters<BodyMetricsParams>) -> Result<CallToolResult, McpError> {
        let outcome = parse_bsa_method(p.bsa_method.as_deref()).and_then(|bsa_method| {
            let request = BodyMetricsRequest {
                height: p.height.into(),
                weight: p.weight.into(),
                bsa_method,
            };
            evaluate_body_metrics(&request, self.config.default_bsa_method)
        });
        self.reply("body_metrics", outcome)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for ChemCalcService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "chemcalc".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("ChemCalc".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "ChemCalc - Clinical chemistry calculators. \
                 IMPORTANT: Call calculator_instructions before the first calculation. \
                 Each lab input is {value, unit}; call list_fields for accepted units and defaults. \
                 Kidney: egfr_ckd_epi, egfr_pediatric, egfr_schwartz_bedside, creatinine_clearance. \
                 Urine/Serum: uacr, serum_osmolality, urine_osmolality. \
                 Lipids: ldl_sampson, hdl_reverse_sampson. \
                 Body: body_metrics. \
                 Utilities: convert_units, chemcalc_status. \
                 Rejected inputs return success=false with error_kind and message."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params<T: for<'de> Deserialize<'de>>(json: serde_json::Value) -> T {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_reading_param_accepts_number_or_string() {
        let p: ReadingParam = params(serde_json::json!({ "value": 1.2, "unit": "mg/dL" }));
        let r = Reading::from(p);
        assert_eq!(r.value, RawValue::Number(1.2));

        let p: ReadingParam = params(serde_json::json!({ "value": "106.1" }));
        let r = Reading::from(p);
        assert_eq!(r.value, RawValue::Text("106.1".to_string()));
        assert_eq!(r.unit, None);
    }

    #[test]
    fn test_egfr_params_into_request() {
        let p: EgfrCkdEpiParams = params(serde_json::json!({
            "creatinine": { "value": 1.2, "unit": "mg/dL" },
            "age": 50,
            "sex": "male",
            "bsa_method": "Mosteller"
        }));
        let request = p.into_request().unwrap();
        assert!(!request.adjust_to_bsa);
        assert_eq!(request.bsa_method, Some(crate::models::BsaMethod::Mosteller));

        let result = evaluate_ckd_epi(&request, crate::models::BsaMethod::DuBois).unwrap();
        assert_eq!(result.value, 73.67);
    }

    #[test]
    fn test_unknown_bsa_method_is_rejected() {
        let p: CreatinineClearanceParams = params(serde_json::json!({
            "creatinine": { "value": 1.0, "unit": "mg/dL" },
            "age": 40,
            "weight": { "value": 70 },
            "sex": "female",
            "bsa_method": "haycock"
        }));
        assert!(p.into_request().is_err());
    }

    #[test]
    fn test_reply_counts_evaluations() {
        let service = ChemCalcService::new(Config::default());
        let request = UacrRequest {
            albumin: Reading::new(30.0, "mg/dL"),
            creatinine: Reading::new(100.0, "mg/dL"),
        };
        service.reply("uacr", evaluate_uacr(&request)).unwrap();
        assert_eq!(service.status_tracker.get_status().evaluations, 1);
    }
}
