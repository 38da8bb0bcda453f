//! Unit conversion module
//!
//! Handles laboratory unit recognition and normalization to canonical units.

pub mod converter;
pub mod table;

pub use converter::{
    convert, denormalize, denormalize_unit, normalize, normalize_unit, parse_unit, parse_value,
    Measurement, RawValue,
};
pub use table::{AnalyteFamily, BodyDimension, Factor, LipidAnalyte, Unit};
