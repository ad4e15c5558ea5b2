//! Dialog input checks
//!
//! Preset names, pins and output display names. Output names are limited by
//! how wide they render on a three-column button group, approximated by a
//! per-character weight.

use crate::constants::validation::*;
use crate::error::ValidationError;

fn is_printable_ascii(c: char) -> bool {
    (' '..='~').contains(&c)
}

/// 1-20 printable ASCII characters
pub fn validate_preset_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) && name.chars().all(is_printable_ascii) {
        Ok(())
    } else {
        Err(ValidationError::PresetName { len })
    }
}

/// 4-8 ASCII digits
pub fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    if (PIN_MIN_DIGITS..=PIN_MAX_DIGITS).contains(&pin.len())
        && pin.bytes().all(|b| b.is_ascii_digit())
    {
        Ok(())
    } else {
        Err(ValidationError::PinFormat)
    }
}

fn char_weight(c: char) -> f64 {
    if HEAVY_CHARS.contains(c) {
        HEAVY_WEIGHT
    } else if c.is_whitespace() || LIGHT_CHARS.contains(c) {
        LIGHT_WEIGHT
    } else {
        STANDARD_WEIGHT
    }
}

pub fn output_name_weight(name: &str) -> f64 {
    name.chars().map(char_weight).sum()
}

/// Printable ASCII whose rendered weight stays within the button width.
/// Returns the computed weight on success so callers can log it.
pub fn validate_output_name(name: &str) -> Result<f64, ValidationError> {
    if !name.chars().all(is_printable_ascii) {
        return Err(ValidationError::OutputNameCharset);
    }
    let weight = output_name_weight(name);
    // Sums of 0.3 drift slightly above their decimal value
    if weight > MAX_OUTPUT_NAME_WEIGHT + 1e-9 {
        return Err(ValidationError::OutputNameWeight {
            weight,
            max: MAX_OUTPUT_NAME_WEIGHT,
        });
    }
    Ok(weight)
}
