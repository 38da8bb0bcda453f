//! ChemCalc Status Tool
//!
//! Provides runtime status information about the ChemCalc service.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::models::BsaMethod;

/// Calculator usage instructions for AI assistants
pub const CALCULATOR_INSTRUCTIONS: &str = r#"
# ChemCalc Calculator Instructions

ChemCalc derives clinical indices from routine chemistry results. Every tool
validates its inputs, converts them to the units the equation needs, applies
the equation and classifies the result.

## Readings

Each laboratory input is a reading: `{ "value": <number or string>, "unit": "<tag>" }`.

- `value` may be a number or a numeric string. Blank or non-numeric strings are rejected.
- `unit` is optional. When omitted, the field's default unit applies.
- Call `list_fields` to see every field, its accepted units and its default.

| Field | Accepted units | Default |
|-------|----------------|---------|
| creatinine (serum) | µmol/L, mg/dL | µmol/L |
| urine creatinine | µmol/L, mg/dL, mg/L | µmol/L |
| urine albumin | mg/dL, mg/L | mg/dL |
| sodium, potassium | mmol/L | mmol/L |
| urea, glucose | mmol/L, mg/dL | mmol/L |
| total cholesterol, triglycerides, HDL, LDL | mmol/L, mg/dL | mmol/L |
| height | cm, m | cm |
| weight | kg, lb | kg |

`umol/L` is accepted as a spelling of `µmol/L`.

**Do not guess units.** If the report does not state the unit, ask the user.
A creatinine of 1.2 means mg/dL; a creatinine of 106 means µmol/L. Sending
1.2 with no unit is read as 1.2 µmol/L and gives a meaningless eGFR.

---

## Tools

| Tool | Equation | Result unit |
|------|----------|-------------|
| `egfr_ckd_epi` | CKD-EPI 2021 (race-free), adults | mL/min/1.73m² (mL/min when `adjust_to_bsa`) |
| `egfr_pediatric` | Schwartz with age-banded k | mL/min/1.73m² |
| `egfr_schwartz_bedside` | Bedside Schwartz, k = 0.413 | mL/min/1.73m² |
| `creatinine_clearance` | Cockcroft-Gault | mL/min (mL/min/1.73m² when `normalize_to_bsa`) |
| `uacr` | Albumin / creatinine x 1000 | mg/g |
| `serum_osmolality` | 2(Na + K) + glucose/18 + urea/6.006 | mOsm/kg |
| `urine_osmolality` | 2(Na + K) + urea/6.006 + glucose/18 | mOsm/kg |
| `ldl_sampson` | Sampson LDL | unit of the HDL input unless `display_unit` is set |
| `hdl_reverse_sampson` | Sampson solved for HDL | unit of the LDL input unless `display_unit` is set |
| `body_metrics` | BMI and BSA (Du Bois or Mosteller) | kg/m², m² |
| `convert_units` | Converts one value between units of an analyte | |

- `sex` is `"male"` or `"female"`. Pediatric eGFR only needs it from age 13.
- BSA adjustment in `egfr_ckd_epi` and `creatinine_clearance` needs height and weight.
- `bsa_method` is `"dubois"` or `"mosteller"`; the server default is shown by `chemcalc_status`.
- Urea is optional for serum osmolality and glucose is optional for urine osmolality.

---

## Reading Replies

Successful replies:

```json
{ "success": true, "result": { "formula": "ckd_epi2021", "value": 73.67, "unit": "mL/min/1.73m²",
  "category": "egfr_g2", "label": "...", "severity": "info", "message": "...", "equation": "..." } }
```

Rejected inputs are not tool errors. They come back as:

```json
{ "success": false, "error_kind": "out_of_range", "message": "..." }
```

| error_kind | Meaning | What to do |
|------------|---------|------------|
| `invalid_number` | Blank or non-numeric value | Ask for the value again |
| `invalid_unit` | Unit not accepted for that field | Use one of the listed units |
| `domain_violation` | Zero/negative where a positive value is required | Check the value |
| `out_of_range` | Outside the equation's validated range (e.g. TG > 800 mg/dL for Sampson) | Recommend direct measurement |
| `formula_unstable` | Equation cannot be solved for these values | Recommend direct measurement |
| `missing_selection` | Sex or another choice was not given | Ask the user |

Always show the `equation` text when the user asks how a value was obtained.
A negative estimated HDL is reported as "below range"; do not present it as a real HDL.
"#;

/// Runtime status of the ChemCalc service
#[derive(Debug, Clone, Serialize)]
pub struct ChemCalcStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Configuration
    pub default_bsa_method: &'static str,

    /// Process information
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,

    /// Calculator tool calls served since startup
    pub evaluations: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: DateTime<Utc>,
    default_bsa_method: BsaMethod,
    evaluations: AtomicU64,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(default_bsa_method: BsaMethod) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            default_bsa_method,
            evaluations: AtomicU64::new(0),
        }
    }

    /// Count one calculator tool call
    pub fn record_evaluation(&self) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current status
    pub fn get_status(&self) -> ChemCalcStatus {
        let build_info = BuildInfo::current();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ChemCalcStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            default_bsa_method: self.default_bsa_method.as_str(),
            started_at: self.started_at,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
            evaluations: self.evaluations.load(Ordering::Relaxed),
        }
    }
}
