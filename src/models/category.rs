//! Interpretation categories
//!
//! Every bucket a result can be classified into, plus the ordered threshold
//! tables used to pick one.

use serde::{Deserialize, Serialize};

/// Display severity of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
}

/// Interpretation bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    // Adult eGFR / creatinine clearance
    EgfrG1,
    EgfrG2,
    EgfrG3a,
    EgfrG3b,
    EgfrG4,
    EgfrG5,
    // Pediatric eGFR
    PediatricNormal,
    PediatricInfantNormal,
    PediatricMildlyDecreased,
    PediatricMildModerate,
    PediatricModerateSevere,
    PediatricSevere,
    PediatricKidneyFailure,
    // Albuminuria
    AlbuminuriaNormal,
    Microalbuminuria,
    Macroalbuminuria,
    // Serum osmolality
    SerumOsmLow,
    SerumOsmNormal,
    SerumOsmHigh,
    // Urine osmolality
    UrineVeryDilute,
    UrineNormal,
    UrineConcentrated,
    UrineHighlyConcentrated,
    // LDL
    LdlOptimal,
    LdlNearOptimal,
    LdlBorderlineHigh,
    LdlHigh,
    LdlVeryHigh,
    // HDL
    HdlBelowRange,
    HdlLow,
    HdlBorderline,
    HdlOptimal,
    // Body mass index
    BmiUnderweight,
    BmiNormal,
    BmiOverweight,
    BmiObese,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::EgfrG1 => "G1 (Normal)",
            Category::EgfrG2 => "G2 (Mildly decreased)",
            Category::EgfrG3a => "G3a (Mild-Moderate)",
            Category::EgfrG3b => "G3b (Moderate-Severe)",
            Category::EgfrG4 => "G4 (Severe)",
            Category::EgfrG5 => "G5 (Kidney Failure)",
            Category::PediatricNormal => "Normal",
            Category::PediatricInfantNormal => "Likely Normal (Infant Range)",
            Category::PediatricMildlyDecreased => "Mildly Decreased",
            Category::PediatricMildModerate => "Mild-Moderate Decrease",
            Category::PediatricModerateSevere => "Moderate-Severe Decrease",
            Category::PediatricSevere => "Severe Decrease",
            Category::PediatricKidneyFailure => "Kidney Failure",
            Category::AlbuminuriaNormal => "Normal",
            Category::Microalbuminuria => "Microalbuminuria",
            Category::Macroalbuminuria => "Macroalbuminuria",
            Category::SerumOsmLow => "Low Osmolarity (Hypoosmolar)",
            Category::SerumOsmNormal => "Normal Osmolarity",
            Category::SerumOsmHigh => "High Osmolarity (Hyperosmolar)",
            Category::UrineVeryDilute => "Very Dilute Urine",
            Category::UrineNormal => "Normal Range",
            Category::UrineConcentrated => "Concentrated Urine",
            Category::UrineHighlyConcentrated => "Highly Concentrated / Glycosuria",
            Category::LdlOptimal => "Optimal",
            Category::LdlNearOptimal => "Near Optimal",
            Category::LdlBorderlineHigh => "Borderline High",
            Category::LdlHigh => "High",
            Category::LdlVeryHigh => "Very High",
            Category::HdlBelowRange => "Below Range",
            Category::HdlLow => "Low HDL (High Risk)",
            Category::HdlBorderline => "Borderline HDL",
            Category::HdlOptimal => "Optimal HDL (Protective)",
            Category::BmiUnderweight => "Underweight",
            Category::BmiNormal => "Normal Weight",
            Category::BmiOverweight => "Overweight",
            Category::BmiObese => "Obese",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Category::EgfrG1 => "Normal kidney function.",
            Category::EgfrG2 => "Slightly reduced kidney function.",
            Category::EgfrG3a => "Mild to moderate reduction in GFR.",
            Category::EgfrG3b => "Moderate to severe kidney damage.",
            Category::EgfrG4 => "Severe kidney damage. Nephrology care required.",
            Category::EgfrG5 => "End-stage renal disease. Dialysis likely needed.",
            Category::PediatricNormal => "Kidney function is normal for age.",
            Category::PediatricInfantNormal => "Slightly lower GFR may be normal under age 2.",
            Category::PediatricMildlyDecreased => {
                "Slightly reduced kidney function; monitor if persistent."
            }
            Category::PediatricMildModerate => {
                "Possible CKD Stage 3a; evaluate underlying causes."
            }
            Category::PediatricModerateSevere => {
                "CKD Stage 3b; nephrology assessment recommended."
            }
            Category::PediatricSevere => "Advanced CKD (Stage 4); close monitoring required.",
            Category::PediatricKidneyFailure => {
                "End-stage kidney disease (Stage 5); dialysis likely indicated."
            }
            Category::AlbuminuriaNormal => "Normal albumin excretion.",
            Category::Microalbuminuria => "Early sign of kidney damage (moderately increased).",
            Category::Macroalbuminuria => "Severe kidney damage (overt nephropathy).",
            Category::SerumOsmLow => "Serum is hypoosmolar.",
            Category::SerumOsmNormal => "Serum osmolality within the reference range.",
            Category::SerumOsmHigh => "Serum is hyperosmolar.",
            Category::UrineVeryDilute => "Possible diabetes insipidus or water intoxication.",
            Category::UrineNormal => "Typical urine concentration (normal hydration).",
            Category::UrineConcentrated => "Suggests dehydration or increased ADH activity.",
            Category::UrineHighlyConcentrated => {
                "Strongly concentrated urine or solute load (e.g. high glucose)."
            }
            Category::LdlOptimal => "Low risk of ASCVD.",
            Category::LdlNearOptimal => "Acceptable for most individuals.",
            Category::LdlBorderlineHigh => "Lifestyle modification recommended.",
            Category::LdlHigh => "Consider medication if persistent.",
            Category::LdlVeryHigh => "Aggressive lipid-lowering therapy advised.",
            Category::HdlBelowRange => {
                "Estimated HDL is negative and likely invalid. Direct measurement recommended."
            }
            Category::HdlLow => "Low protective cholesterol; higher heart disease risk.",
            Category::HdlBorderline => "Average protection.",
            Category::HdlOptimal => "Good HDL level.",
            Category::BmiUnderweight => "Body weight is below the healthy range.",
            Category::BmiNormal => "Body weight is within the healthy range.",
            Category::BmiOverweight => "Body weight is above the healthy range.",
            Category::BmiObese => "Body weight is well above the healthy range.",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Category::EgfrG1
            | Category::PediatricNormal
            | Category::AlbuminuriaNormal
            | Category::SerumOsmNormal
            | Category::UrineNormal
            | Category::LdlOptimal
            | Category::HdlOptimal
            | Category::BmiNormal => Severity::Success,

            Category::EgfrG2
            | Category::PediatricInfantNormal
            | Category::PediatricMildlyDecreased
            | Category::SerumOsmLow
            | Category::UrineVeryDilute
            | Category::LdlNearOptimal => Severity::Info,

            Category::EgfrG3a
            | Category::EgfrG3b
            | Category::PediatricMildModerate
            | Category::PediatricModerateSevere
            | Category::Microalbuminuria
            | Category::UrineConcentrated
            | Category::LdlBorderlineHigh
            | Category::HdlBorderline
            | Category::BmiUnderweight
            | Category::BmiOverweight => Severity::Warning,

            Category::EgfrG4
            | Category::EgfrG5
            | Category::PediatricSevere
            | Category::PediatricKidneyFailure
            | Category::Macroalbuminuria
            | Category::SerumOsmHigh
            | Category::UrineHighlyConcentrated
            | Category::LdlHigh
            | Category::LdlVeryHigh
            | Category::HdlBelowRange
            | Category::HdlLow
            | Category::BmiObese => Severity::Danger,
        }
    }
}

// ============================================================================
// Threshold Tables
// ============================================================================

/// Upper edge of a band
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// value < limit
    Below(f64),
    /// value <= limit
    AtMost(f64),
}

impl Bound {
    fn contains(self, value: f64) -> bool {
        match self {
            Bound::Below(limit) => value < limit,
            Bound::AtMost(limit) => value <= limit,
        }
    }
}

/// One band of an ordered threshold table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub upper: Bound,
    pub category: Category,
}

const fn below(limit: f64, category: Category) -> Band {
    Band {
        upper: Bound::Below(limit),
        category,
    }
}

const fn at_most(limit: f64, category: Category) -> Band {
    Band {
        upper: Bound::AtMost(limit),
        category,
    }
}

/// An ordered range lookup: the first band whose upper edge admits the value
/// wins, otherwise the value is above every band
#[derive(Debug, Clone, Copy)]
pub struct ThresholdTable {
    pub bands: &'static [Band],
    pub above: Category,
}

impl ThresholdTable {
    pub fn classify(&self, value: f64) -> Category {
        self.bands
            .iter()
            .find(|band| band.upper.contains(value))
            .map(|band| band.category)
            .unwrap_or(self.above)
    }
}

/// KDIGO GFR categories, in mL/min/1.73m²
pub const EGFR_STAGES: ThresholdTable = ThresholdTable {
    bands: &[
        below(15.0, Category::EgfrG5),
        below(30.0, Category::EgfrG4),
        below(45.0, Category::EgfrG3b),
        below(60.0, Category::EgfrG3a),
        below(90.0, Category::EgfrG2),
    ],
    above: Category::EgfrG1,
};

pub const PEDIATRIC_STAGES: ThresholdTable = ThresholdTable {
    bands: &[
        below(15.0, Category::PediatricKidneyFailure),
        below(30.0, Category::PediatricSevere),
        below(45.0, Category::PediatricModerateSevere),
        below(60.0, Category::PediatricMildModerate),
        below(90.0, Category::PediatricMildlyDecreased),
    ],
    above: Category::PediatricNormal,
};

/// mg/g
pub const UACR_CATEGORIES: ThresholdTable = ThresholdTable {
    bands: &[
        below(30.0, Category::AlbuminuriaNormal),
        at_most(300.0, Category::Microalbuminuria),
    ],
    above: Category::Macroalbuminuria,
};

/// mOsm/kg
pub const SERUM_OSMOLALITY_BANDS: ThresholdTable = ThresholdTable {
    bands: &[
        below(275.0, Category::SerumOsmLow),
        at_most(295.0, Category::SerumOsmNormal),
    ],
    above: Category::SerumOsmHigh,
};

/// mOsm/kg
pub const URINE_OSMOLALITY_BANDS: ThresholdTable = ThresholdTable {
    bands: &[
        below(100.0, Category::UrineVeryDilute),
        at_most(600.0, Category::UrineNormal),
        at_most(800.0, Category::UrineConcentrated),
    ],
    above: Category::UrineHighlyConcentrated,
};

/// mg/dL
pub const LDL_BANDS: ThresholdTable = ThresholdTable {
    bands: &[
        below(100.0, Category::LdlOptimal),
        below(130.0, Category::LdlNearOptimal),
        below(160.0, Category::LdlBorderlineHigh),
        below(190.0, Category::LdlHigh),
    ],
    above: Category::LdlVeryHigh,
};

/// mg/dL
pub const HDL_BANDS: ThresholdTable = ThresholdTable {
    bands: &[
        below(0.0, Category::HdlBelowRange),
        below(40.0, Category::HdlLow),
        below(60.0, Category::HdlBorderline),
    ],
    above: Category::HdlOptimal,
};

/// kg/m²
pub const BMI_BANDS: ThresholdTable = ThresholdTable {
    bands: &[
        below(18.5, Category::BmiUnderweight),
        below(25.0, Category::BmiNormal),
        below(30.0, Category::BmiOverweight),
    ],
    above: Category::BmiObese,
};
