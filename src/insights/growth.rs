//! Growth-trend analyzer
//!
//! Classifies weight and height direction from the first and last retained
//! measurement. The rate is the change divided by the number of samples, not
//! by elapsed time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::insights::normalizer::GrowthSample;
use crate::insights::{round_to, LOW_DATA_CONFIDENCE};

pub const MIN_GROWTH_SAMPLES: usize = 2;
pub const GROWTH_CONFIDENCE: f64 = 0.85;

/// Change in kg beyond which weight is no longer "stable"
pub const WEIGHT_THRESHOLD_KG: f64 = 0.1;
/// Change in cm beyond which height is no longer "stable"
pub const HEIGHT_THRESHOLD_CM: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    fn classify(change: f64, threshold: f64) -> Self {
        if change > threshold {
            TrendDirection::Increasing
        } else if change < -threshold {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "increasing"),
            TrendDirection::Decreasing => write!(f, "decreasing"),
            TrendDirection::Stable => write!(f, "stable"),
        }
    }
}

/// Direction of one measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementTrend {
    pub trend: TrendDirection,
    /// Change per sample, two decimals
    pub rate: f64,
    /// Last minus first, two decimals
    pub total_change: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthInsight {
    pub weight_trend: Option<MeasurementTrend>,
    pub height_trend: Option<MeasurementTrend>,
    pub confidence: f64,
    pub message: String,
}

impl GrowthInsight {
    fn low_data(message: &str) -> Self {
        Self {
            weight_trend: None,
            height_trend: None,
            confidence: LOW_DATA_CONFIDENCE,
            message: message.to_string(),
        }
    }
}

/// Analyze growth samples in any order
pub fn analyze_growth(samples: &[GrowthSample]) -> GrowthInsight {
    if samples.len() < MIN_GROWTH_SAMPLES {
        return GrowthInsight::low_data("Need more growth measurements for trend analysis");
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by_key(|s| s.measured_at);

    let weights = retained(sorted.iter().map(|s| s.weight_kg));
    let heights = retained(sorted.iter().map(|s| s.height_cm));

    let weight_trend = measurement_trend(&weights, WEIGHT_THRESHOLD_KG);
    let height_trend = measurement_trend(&heights, HEIGHT_THRESHOLD_CM);

    let mut parts = Vec::new();
    if let Some(w) = &weight_trend {
        parts.push(format!("weight {} ({:+.2} kg)", w.trend, w.total_change));
    }
    if let Some(h) = &height_trend {
        parts.push(format!("height {} ({:+.2} cm)", h.trend, h.total_change));
    }

    if parts.is_empty() {
        return GrowthInsight::low_data("Not enough weight or height measurements for a trend");
    }

    GrowthInsight {
        weight_trend,
        height_trend,
        confidence: GROWTH_CONFIDENCE,
        message: capitalize(&parts.join("; ")),
    }
}

/// Keep only usable readings; a missing or zero reading was not taken
fn retained(values: impl Iterator<Item = Option<f64>>) -> Vec<f64> {
    values
        .flatten()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect()
}

fn measurement_trend(values: &[f64], threshold: f64) -> Option<MeasurementTrend> {
    let (first, last) = match values {
        [first, .., last] => (*first, *last),
        _ => return None,
    };

    let change = last - first;
    let rate = change / values.len() as f64;

    Some(MeasurementTrend {
        trend: TrendDirection::classify(change, threshold),
        rate: round_to(rate, 2),
        total_change: round_to(change, 2),
        confidence: GROWTH_CONFIDENCE,
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_fewer_than_two_samples() {
        let insight = analyze_growth(&[GrowthSample::new(day(0)).weight(4.0)]);
        assert_eq!(insight.confidence, 0.3);
        assert!(insight.weight_trend.is_none());
        assert!(insight.height_trend.is_none());
    }

    #[test]
    fn test_weight_threshold_is_strict() {
        let stable = analyze_growth(&[
            GrowthSample::new(day(0)).weight(10.0),
            GrowthSample::new(day(7)).weight(10.05),
        ]);
        let weight = stable.weight_trend.unwrap();
        assert_eq!(weight.trend, TrendDirection::Stable);
        assert_eq!(weight.confidence, 0.85);

        let increasing = analyze_growth(&[
            GrowthSample::new(day(0)).weight(10.0),
            GrowthSample::new(day(7)).weight(10.2),
        ]);
        let weight = increasing.weight_trend.unwrap();
        assert_eq!(weight.trend, TrendDirection::Increasing);
        assert_eq!(weight.total_change, 0.2);
        assert_eq!(weight.rate, 0.1);
    }

    #[test]
    fn test_height_uses_wider_threshold() {
        let insight = analyze_growth(&[
            GrowthSample::new(day(0)).height(51.0),
            GrowthSample::new(day(7)).height(51.4),
            GrowthSample::new(day(14)).height(50.4),
        ]);
        let height = insight.height_trend.unwrap();
        assert_eq!(height.trend, TrendDirection::Decreasing);
        assert_eq!(height.total_change, -0.6);
        assert_eq!(height.rate, -0.2);
        assert!(insight.weight_trend.is_none());
    }

    #[test]
    fn test_endpoints_only() {
        // a dip in the middle does not matter
        let insight = analyze_growth(&[
            GrowthSample::new(day(0)).weight(4.0),
            GrowthSample::new(day(7)).weight(3.0),
            GrowthSample::new(day(14)).weight(4.05),
        ]);
        assert_eq!(insight.weight_trend.unwrap().trend, TrendDirection::Stable);
    }

    #[test]
    fn test_sorted_before_comparing() {
        let insight = analyze_growth(&[
            GrowthSample::new(day(14)).weight(4.2).height(52.0),
            GrowthSample::new(day(0)).weight(3.9).height(51.0),
            GrowthSample::new(day(7)).weight(4.1).height(51.5),
        ]);

        let weight = insight.weight_trend.unwrap();
        assert_eq!(weight.trend, TrendDirection::Increasing);
        assert_eq!(weight.total_change, 0.3);

        let height = insight.height_trend.unwrap();
        assert_eq!(height.trend, TrendDirection::Increasing);
        assert_eq!(insight.confidence, 0.85);
        assert_eq!(
            insight.message,
            "Weight increasing (+0.30 kg); height increasing (+1.00 cm)"
        );
    }

    #[test]
    fn test_missing_field_skips_sub_trend() {
        let insight = analyze_growth(&[
            GrowthSample::new(day(0)).weight(4.0),
            GrowthSample::new(day(7)).height(51.0),
        ]);
        assert!(insight.weight_trend.is_none());
        assert!(insight.height_trend.is_none());
        assert_eq!(insight.confidence, 0.3);
    }

    #[test]
    fn test_tie_keeps_input_order() {
        let insight = analyze_growth(&[
            GrowthSample::new(day(0)).weight(4.0),
            GrowthSample::new(day(0)).weight(4.5),
        ]);
        assert_eq!(insight.weight_trend.unwrap().total_change, 0.5);
    }
}
