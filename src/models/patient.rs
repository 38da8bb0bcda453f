//! Patient selections
//!
//! Categorical inputs the calculators need besides measurements.

use serde::{Deserialize, Serialize};

use crate::error::{CalcError, CalcResult};

/// Biological sex as used by the kidney equations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Sex::Male),
            "female" | "f" => Some(Sex::Female),
            _ => None,
        }
    }

    /// Resolve a required selection; absent or unrecognized input is a missing selection
    pub fn require(s: Option<&str>) -> CalcResult<Self> {
        s.and_then(Self::from_str)
            .ok_or_else(|| CalcError::missing_selection("sex", "male, female"))
    }
}

/// Body surface area equation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BsaMethod {
    #[default]
    DuBois,
    Mosteller,
}

impl BsaMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BsaMethod::DuBois => "dubois",
            BsaMethod::Mosteller => "mosteller",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BsaMethod::DuBois => "Du Bois",
            BsaMethod::Mosteller => "Mosteller",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "dubois" => Some(BsaMethod::DuBois),
            "mosteller" => Some(BsaMethod::Mosteller),
            _ => None,
        }
    }
}
