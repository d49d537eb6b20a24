//! Summary statistics and trend series over a user's history.
//!
//! Histories are trusted to already be in chronological (insertion) order;
//! nothing here re-sorts by timestamp.

use crate::bmi::{NORMAL_THRESHOLD, OBESE_THRESHOLD, OVERWEIGHT_THRESHOLD, REFERENCE_BANDS};
use crate::{Category, Error, MeasurementRecord, Result};
use std::fmt;

/// Minimum number of records for a trend
pub const MIN_TREND_POINTS: usize = 2;

/// Aggregates over a non-empty history
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub latest_bmi: f64,
    pub latest_category: Category,
    pub average_bmi: f64,
    pub min_bmi: f64,
    pub max_bmi: f64,
    pub average_weight: f64,
    /// Last weight minus first weight, in kg
    pub weight_change: f64,
}

/// One point of the BMI-over-time series
#[derive(Clone, Debug, PartialEq)]
pub struct TrendPoint {
    /// Day of the measurement (`YYYY-MM-DD`); same-day entries repeat
    pub date_label: String,
    pub bmi: f64,
}

/// Horizontal guide drawn across a trend chart
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceLine {
    pub bmi: f64,
    /// Category that ends at this line
    pub below: Category,
    pub color: &'static str,
}

/// Compute summary statistics. `None` when the history is empty.
pub fn summarize(history: &[MeasurementRecord]) -> Option<Summary> {
    let first = history.first()?;
    let last = history.last()?;
    let count = history.len();
    let n = count as f64;

    let (min_bmi, max_bmi) = history
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r.bmi), hi.max(r.bmi))
        });
    let bmi_total: f64 = history.iter().map(|r| r.bmi).sum();
    let weight_total: f64 = history.iter().map(|r| r.weight_kg).sum();

    let weight_change = if count > 1 {
        last.weight_kg - first.weight_kg
    } else {
        0.0
    };

    Some(Summary {
        count,
        latest_bmi: last.bmi,
        latest_category: last.category,
        average_bmi: bmi_total / n,
        min_bmi,
        max_bmi,
        average_weight: weight_total / n,
        weight_change,
    })
}

/// BMI series for charting, one point per record in insertion order
pub fn trend_series(history: &[MeasurementRecord]) -> Result<Vec<TrendPoint>> {
    if history.len() < MIN_TREND_POINTS {
        return Err(Error::InsufficientData {
            required: MIN_TREND_POINTS,
            actual: history.len(),
        });
    }

    Ok(history
        .iter()
        .map(|r| TrendPoint {
            date_label: r.date_label(),
            bmi: r.bmi,
        })
        .collect())
}

/// Threshold lines at the category boundaries, coloured like the band below
pub fn reference_lines() -> [ReferenceLine; 3] {
    let line = |bmi: f64, band: usize| ReferenceLine {
        bmi,
        below: REFERENCE_BANDS[band].category,
        color: REFERENCE_BANDS[band].color,
    };
    [
        line(NORMAL_THRESHOLD, 0),
        line(OVERWEIGHT_THRESHOLD, 1),
        line(OBESE_THRESHOLD, 2),
    ]
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Entries: {}", self.count)?;
        writeln!(f, "Latest BMI: {:.2} ({})", self.latest_bmi, self.latest_category)?;
        writeln!(f, "Average BMI: {:.2}", self.average_bmi)?;
        writeln!(f, "Lowest BMI: {:.2}", self.min_bmi)?;
        writeln!(f, "Highest BMI: {:.2}", self.max_bmi)?;
        writeln!(f)?;
        writeln!(f, "Average Weight: {:.2} kg", self.average_weight)?;
        write!(f, "Weight Change: {:+.2} kg", self.weight_change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(day: u32, hour: u32, weight: f64) -> MeasurementRecord {
        MeasurementRecord::new(weight, 170.0, at(day, hour))
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn test_summarize_single_record() {
        let history = vec![record(1, 8, 72.0)];
        let summary = summarize(&history).unwrap();

        assert_eq!(summary.count, 1);
        assert_eq!(summary.weight_change, 0.0);
        assert_eq!(summary.average_bmi, summary.latest_bmi);
        assert_eq!(summary.min_bmi, summary.latest_bmi);
        assert_eq!(summary.max_bmi, summary.latest_bmi);
        assert_eq!(summary.average_weight, 72.0);
    }

    #[test]
    fn test_weight_change_and_average() {
        let history = vec![record(1, 8, 80.0), record(2, 8, 75.0)];
        let summary = summarize(&history).unwrap();

        assert_eq!(summary.weight_change, -5.0);
        assert_eq!(summary.average_weight, 77.5);
        assert_eq!(summary.latest_bmi, history[1].bmi);
    }

    #[test]
    fn test_extrema_follow_insertion_order_not_timestamps() {
        // Out-of-order timestamps are trusted as given
        let history = vec![record(5, 8, 90.0), record(1, 8, 60.0), record(3, 8, 75.0)];
        let summary = summarize(&history).unwrap();

        assert_eq!(summary.min_bmi, history[1].bmi);
        assert_eq!(summary.max_bmi, history[0].bmi);
        assert_eq!(summary.latest_bmi, history[2].bmi);
        assert_eq!(summary.weight_change, -15.0);
    }

    #[test]
    fn test_trend_requires_two_points() {
        assert!(matches!(
            trend_series(&[]),
            Err(Error::InsufficientData { required: 2, actual: 0 })
        ));
        assert!(matches!(
            trend_series(&[record(1, 8, 70.0)]),
            Err(Error::InsufficientData { required: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_trend_one_point_per_record_with_repeated_days() {
        let history = vec![record(1, 8, 70.0), record(1, 20, 70.5), record(2, 8, 71.0)];
        let series = trend_series(&history).unwrap();

        assert_eq!(series.len(), 3);
        let labels: Vec<&str> = series.iter().map(|p| p.date_label.as_str()).collect();
        assert_eq!(labels, vec!["2024-07-01", "2024-07-01", "2024-07-02"]);
        for (point, record) in series.iter().zip(&history) {
            assert_eq!(point.bmi, record.bmi);
        }
    }

    #[test]
    fn test_reference_lines_match_thresholds() {
        let lines: Vec<f64> = reference_lines().iter().map(|l| l.bmi).collect();
        assert_eq!(lines, vec![18.5, 25.0, 30.0]);
        let colors: Vec<&str> = reference_lines().iter().map(|l| l.color).collect();
        assert_eq!(colors, vec!["#3498db", "#2ecc71", "#f39c12"]);
        for line in reference_lines() {
            assert_ne!(crate::bmi::categorize(line.bmi), line.below);
        }
    }

    #[test]
    fn test_summary_display() {
        let history = vec![record(1, 8, 80.0), record(2, 8, 75.0)];
        let text = summarize(&history).unwrap().to_string();

        assert!(text.contains("Total Entries: 2"));
        assert!(text.contains("Average Weight: 77.50 kg"));
        assert!(text.contains("Weight Change: -5.00 kg"));
    }
}
