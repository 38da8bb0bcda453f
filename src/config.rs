//! Runtime configuration
//!
//! Read once at startup from the environment.

use crate::models::BsaMethod;

/// Selects the BSA equation used when a request does not name one
pub const BSA_METHOD_VAR: &str = "CHEMCALC_BSA_METHOD";

#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    pub default_bsa_method: BsaMethod,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_bsa_method = match lookup(BSA_METHOD_VAR) {
            None => BsaMethod::default(),
            Some(raw) => BsaMethod::from_str(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    value = %raw,
                    "Unrecognized {}; falling back to {}",
                    BSA_METHOD_VAR,
                    BsaMethod::default().display_name()
                );
                BsaMethod::default()
            }),
        };

        Self { default_bsa_method }
    }
}
