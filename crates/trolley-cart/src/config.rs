//! Cart formatting configuration.

use serde::{Deserialize, Serialize};

/// Formatting options applied to item and cart totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Whether totals render as formatted display strings.
    pub format_numbers: bool,
    /// Number of decimal places.
    pub decimals: u32,
    /// Decimal point character.
    pub dec_point: String,
    /// Thousands separator character.
    pub thousands_sep: String,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            format_numbers: false,
            decimals: 2,
            dec_point: ".".to_string(),
            thousands_sep: ",".to_string(),
        }
    }
}

impl CartConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable formatted display strings for totals.
    pub fn with_format_numbers(mut self, format_numbers: bool) -> Self {
        self.format_numbers = format_numbers;
        self
    }

    /// Set the number of decimal places.
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    /// Set the decimal point and thousands separator characters.
    pub fn with_separators(
        mut self,
        dec_point: impl Into<String>,
        thousands_sep: impl Into<String>,
    ) -> Self {
        self.dec_point = dec_point.into();
        self.thousands_sep = thousands_sep.into();
        self
    }
}
