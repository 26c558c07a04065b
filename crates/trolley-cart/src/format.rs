//! Price normalization and display formatting.

use crate::config::CartConfig;
use crate::error::CartError;
use crate::value::FieldValue;
use serde::Serialize;
use std::fmt;

/// A monetary amount, raw or rendered for display.
///
/// Whether a formatted operation yields `Raw` or `Display` is decided by
/// [`format_value`] from the per-call flag and the cart configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Amount {
    /// Unformatted numeric value.
    Raw(f64),
    /// Display string rendered per the cart configuration.
    Display(String),
}

impl Amount {
    /// Numeric value, if unformatted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Amount::Raw(value) => Some(*value),
            Amount::Display(_) => None,
        }
    }

    /// Display string, if formatted.
    pub fn as_display(&self) -> Option<&str> {
        match self {
            Amount::Raw(_) => None,
            Amount::Display(value) => Some(value),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Raw(value) => write!(f, "{}", value),
            Amount::Display(value) => write!(f, "{}", value),
        }
    }
}

/// Normalize a price input to a float.
///
/// Numbers pass through; numeric strings may carry `,` thousands
/// separators and a `.` decimal point. Anything else is a
/// [`CartError::Format`].
pub fn normalize_price(value: &FieldValue) -> Result<f64, CartError> {
    match value {
        FieldValue::Float(price) => Ok(*price),
        FieldValue::Int(price) => Ok(*price as f64),
        FieldValue::Str(raw) => {
            let cleaned = raw.trim().replace(',', "");
            cleaned
                .parse::<f64>()
                .map_err(|_| CartError::Format(raw.clone()))
        }
        other => Err(CartError::Format(other.to_string())),
    }
}

/// Format a numeric value per the cart configuration.
///
/// Returns `Amount::Display` only when both the per-call `formatted` flag
/// and `config.format_numbers` are set; otherwise the raw value passes
/// through unchanged.
pub fn format_value(value: f64, formatted: bool, config: &CartConfig) -> Amount {
    if formatted && config.format_numbers {
        Amount::Display(number_format(value, config))
    } else {
        Amount::Raw(value)
    }
}

/// Render a float with fixed decimals, a decimal point character, and
/// grouped thousands.
fn number_format(value: f64, config: &CartConfig) -> String {
    let decimals = config.decimals as usize;
    let rounded = format!("{:.decimals$}", value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rounded.as_str(), None),
    };

    let digits = int_part.as_bytes();
    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    for (position, digit) in digits.iter().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            out.push_str(&config.thousands_sep);
        }
        out.push(*digit as char);
    }
    if let Some(frac) = frac_part {
        out.push_str(&config.dec_point);
        out.push_str(frac);
    }
    out
}
