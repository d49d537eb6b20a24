//! Core domain types for the BMI tracker.
//!
//! This module defines:
//! - BMI categories
//! - Measurement records as persisted on disk
//! - The per-user store of record histories

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamp layout used in the persisted document (`YYYY-MM-DD HH:MM:SS`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Day-granularity layout used for trend labels
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Category
// ============================================================================

/// BMI health category
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Underweight,
    #[serde(rename = "Normal weight")]
    Normal,
    Overweight,
    Obese,
}

impl Category {
    /// Display name, identical to the persisted string
    pub fn name(&self) -> &'static str {
        match self {
            Category::Underweight => "Underweight",
            Category::Normal => "Normal weight",
            Category::Overweight => "Overweight",
            Category::Obese => "Obese",
        }
    }

    /// Colour used when presenting a result in this category
    pub fn reference_color(&self) -> &'static str {
        match self {
            Category::Underweight => "#3498db",
            Category::Normal => "#193ab1",
            Category::Overweight => "#f39c12",
            Category::Obese => "#e74c3c",
        }
    }

    /// Short guidance shown alongside a freshly computed result
    pub fn advice(&self) -> &'static str {
        match self {
            Category::Underweight => {
                "You may need to gain weight. Consult a healthcare provider."
            }
            Category::Normal => "Great! You're at a healthy weight. Keep it up!",
            Category::Overweight => "Consider a balanced diet and regular exercise.",
            Category::Obese => "Please consult a healthcare provider for guidance.",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Records
// ============================================================================

/// One weight/height measurement with its derived BMI
///
/// Field names match the on-disk document exactly. Deserialization goes
/// through [`RawMeasurementRecord`] so out-of-range values are rejected.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawMeasurementRecord")]
pub struct MeasurementRecord {
    #[serde(rename = "date", serialize_with = "timestamp::serialize")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "weight")]
    pub weight_kg: f64,
    #[serde(rename = "height")]
    pub height_cm: f64,
    pub bmi: f64,
    pub category: Category,
}

/// Persisted record shape before range checks
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMeasurementRecord {
    #[serde(with = "timestamp")]
    date: NaiveDateTime,
    weight: f64,
    height: f64,
    bmi: f64,
    category: Category,
}

impl TryFrom<RawMeasurementRecord> for MeasurementRecord {
    type Error = crate::Error;

    fn try_from(raw: RawMeasurementRecord) -> crate::Result<Self> {
        let weight_kg = crate::input::check_weight(raw.weight)?;
        let height_cm = crate::input::check_height(raw.height)?;
        if !(raw.bmi.is_finite() && raw.bmi > 0.0) {
            return Err(crate::Error::validation("bmi", "must be a positive number"));
        }

        Ok(Self {
            timestamp: raw.date,
            weight_kg,
            height_cm,
            bmi: raw.bmi,
            category: raw.category,
        })
    }
}

impl MeasurementRecord {
    /// Build a record from already-validated inputs.
    ///
    /// The category is taken from the unrounded BMI; the stored BMI is rounded
    /// to two decimals and the timestamp truncated to whole seconds.
    pub fn new(weight_kg: f64, height_cm: f64, at: NaiveDateTime) -> Self {
        let bmi = crate::bmi::compute(weight_kg, height_cm);
        let category = crate::bmi::categorize(bmi);
        Self {
            timestamp: at.with_nanosecond(0).unwrap_or(at),
            weight_kg,
            height_cm,
            bmi: crate::bmi::round2(bmi),
            category,
        }
    }

    /// Timestamp rendered as persisted
    pub fn timestamp_label(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Date portion of the timestamp, used as a trend x-label
    pub fn date_label(&self) -> String {
        self.timestamp.format(DATE_FORMAT).to_string()
    }
}

/// One user's records, oldest first
pub type UserHistory = Vec<MeasurementRecord>;

/// All users' histories keyed by username
///
/// Serializes as a bare JSON object: `{ "alice": [ {record}, ... ] }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Store {
    pub(crate) users: BTreeMap<String, UserHistory>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// History for a user, if present. Surrounding whitespace is ignored.
    pub fn history(&self, username: &str) -> Option<&UserHistory> {
        self.users.get(username.trim())
    }

    pub fn contains_user(&self, username: &str) -> bool {
        self.users.contains_key(username.trim())
    }

    /// Usernames in sorted order
    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Serde adapter for the `YYYY-MM-DD HH:MM:SS` timestamp layout
pub(crate) mod timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Parse a timestamp in the persisted layout
pub fn parse_timestamp(raw: &str) -> crate::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        crate::Error::validation("date", format!("expected YYYY-MM-DD HH:MM:SS ({})", e))
    })
}
