//! ChemCalc Library
//!
//! Clinical chemistry index engine: unit normalization plus the eGFR,
//! albuminuria, osmolality, lipid and body size formulas.

pub mod build_info;
pub mod config;
pub mod error;
pub mod fields;
pub mod formulas;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod units;
