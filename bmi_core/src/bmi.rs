//! BMI computation and classification.
//!
//! Thresholds are half-open and inclusive on the lower bound:
//! - `[0, 18.5)` → Underweight
//! - `[18.5, 25)` → Normal weight
//! - `[25, 30)` → Overweight
//! - `[30, ∞)` → Obese

use crate::Category;

/// Lower bound of the Normal weight band
pub const NORMAL_THRESHOLD: f64 = 18.5;
/// Lower bound of the Overweight band
pub const OVERWEIGHT_THRESHOLD: f64 = 25.0;
/// Lower bound of the Obese band
pub const OBESE_THRESHOLD: f64 = 30.0;

/// A row of the BMI reference legend
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceBand {
    pub category: Category,
    pub range: &'static str,
    pub color: &'static str,
}

/// Reference legend, lightest category first
pub const REFERENCE_BANDS: [ReferenceBand; 4] = [
    ReferenceBand {
        category: Category::Underweight,
        range: "< 18.5",
        color: "#3498db",
    },
    ReferenceBand {
        category: Category::Normal,
        range: "18.5 - 24.9",
        color: "#2ecc71",
    },
    ReferenceBand {
        category: Category::Overweight,
        range: "25 - 29.9",
        color: "#f39c12",
    },
    ReferenceBand {
        category: Category::Obese,
        range: "≥ 30",
        color: "#e74c3c",
    },
];

/// BMI from weight in kilograms and height in centimetres. Not rounded.
pub fn compute(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / height_m.powi(2)
}

/// Classify a BMI value
pub fn categorize(bmi: f64) -> Category {
    if bmi < NORMAL_THRESHOLD {
        Category::Underweight
    } else if bmi < OVERWEIGHT_THRESHOLD {
        Category::Normal
    } else if bmi < OBESE_THRESHOLD {
        Category::Overweight
    } else {
        Category::Obese
    }
}

/// Classify a BMI value along with the colour its result is shown in
pub fn classify(bmi: f64) -> (Category, &'static str) {
    let category = categorize(bmi);
    (category, category.reference_color())
}

/// Round to two decimals for storage and display
///
/// Exact binary ties (e.g. `0.125`) round away from zero, so they can differ
/// from a ties-to-even rounding by one in the last place. Values produced by
/// [`compute`] are almost never exact ties.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
