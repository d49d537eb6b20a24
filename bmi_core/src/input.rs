//! Validation of raw user input.
//!
//! The BMI engine only ever sees values that passed through here.

use crate::{Error, Result};

/// Upper bound accepted for weight, in kilograms
pub const MAX_WEIGHT_KG: f64 = 500.0;
/// Upper bound accepted for height, in centimetres
pub const MAX_HEIGHT_CM: f64 = 300.0;

/// A validated measurement request
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementInput {
    pub username: String,
    pub weight_kg: f64,
    pub height_cm: f64,
}

impl MeasurementInput {
    /// Validate all three fields, reporting the first one that fails
    pub fn parse(username: &str, weight: &str, height: &str) -> Result<Self> {
        Ok(Self {
            username: validate_username(username)?,
            weight_kg: parse_weight(weight)?,
            height_cm: parse_height(height)?,
        })
    }
}

/// Trim and require a non-empty username
pub fn validate_username(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("username", "please enter a username"));
    }
    Ok(trimmed.to_string())
}

pub fn parse_weight(raw: &str) -> Result<f64> {
    check_weight(parse_number(raw, "weight")?)
}

pub fn parse_height(raw: &str) -> Result<f64> {
    check_height(parse_number(raw, "height")?)
}

/// Range check for a weight that is already numeric
pub fn check_weight(value: f64) -> Result<f64> {
    check_bounded(value, "weight", MAX_WEIGHT_KG, "kg")
}

/// Range check for a height that is already numeric
pub fn check_height(value: f64) -> Result<f64> {
    check_bounded(value, "height", MAX_HEIGHT_CM, "cm")
}

fn parse_number(raw: &str, field: &'static str) -> Result<f64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::validation(field, format!("please enter a valid {}", field)))
}

fn check_bounded(value: f64, field: &'static str, max: f64, unit: &str) -> Result<f64> {
    // NaN fails both comparisons, so test for the accepted range instead
    if !(value > 0.0 && value <= max) {
        return Err(Error::validation(
            field,
            format!("must be between 0 and {} {}", max, unit),
        ));
    }
    Ok(value)
}
