//! ChemCalc Tools module
//!
//! MCP tool implementations for the ChemCalc calculators.

pub mod calculators;
pub mod status;
