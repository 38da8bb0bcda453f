//! Data models
//!
//! Result, interpretation and selection types shared by the formulas.

mod category;
mod patient;
mod result;

pub use category::{
    Band, Bound, Category, Severity, ThresholdTable, BMI_BANDS, EGFR_STAGES, HDL_BANDS,
    LDL_BANDS, PEDIATRIC_STAGES, SERUM_OSMOLALITY_BANDS, UACR_CATEGORIES,
    URINE_OSMOLALITY_BANDS,
};
pub use patient::{BsaMethod, Sex};
pub use result::{round_to, Formula, FormulaResult};
