//! Feeding-interval analyzer
//!
//! Predicts the next feeding as the last feeding plus the mean gap between
//! consecutive feedings. Confidence drops linearly with the relative spread
//! of those gaps and is held inside [0.3, 0.95].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::insights::{round_to, LOW_DATA_CONFIDENCE};

/// Fewest feedings that give at least two gaps
pub const MIN_FEEDINGS: usize = 3;

/// Confidence ceiling; zero spread never reports certainty
pub const MAX_FEEDING_CONFIDENCE: f64 = 0.95;

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingInsight {
    pub next_feeding: Option<DateTime<Utc>>,
    pub confidence: f64,
    /// Mean gap in hours, one decimal
    pub avg_interval_hours: Option<f64>,
    pub message: String,
}

impl FeedingInsight {
    fn low_data(message: &str) -> Self {
        Self {
            next_feeding: None,
            confidence: LOW_DATA_CONFIDENCE,
            avg_interval_hours: None,
            message: message.to_string(),
        }
    }
}

/// Analyze feeding times ordered oldest to newest
pub fn analyze_feedings(times: &[DateTime<Utc>]) -> FeedingInsight {
    let last = match times.last() {
        Some(last) if times.len() >= MIN_FEEDINGS => *last,
        _ => return FeedingInsight::low_data("Need more feeding data for accurate predictions"),
    };

    let gaps: Vec<f64> = times
        .windows(2)
        .map(|w| (w[1] - w[0]).num_milliseconds() as f64 / MS_PER_HOUR)
        .collect();

    let avg = gaps.iter().sum::<f64>() / gaps.len() as f64;
    if !avg.is_finite() || avg <= 0.0 {
        return FeedingInsight::low_data("Feeding times are too close together to predict an interval");
    }

    let variance = gaps.iter().map(|g| (g - avg).powi(2)).sum::<f64>() / gaps.len() as f64;
    let std_dev = variance.sqrt();

    let confidence = (1.0 - std_dev / avg).clamp(LOW_DATA_CONFIDENCE, MAX_FEEDING_CONFIDENCE);
    let next_feeding = last + Duration::milliseconds((avg * MS_PER_HOUR).round() as i64);
    let rounded = round_to(avg, 1);

    FeedingInsight {
        next_feeding: Some(next_feeding),
        confidence,
        avg_interval_hours: Some(rounded),
        message: format!("Next feeding predicted in {} hours", rounded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_hours(hours: &[f64]) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        hours
            .iter()
            .map(|h| base + Duration::milliseconds((h * MS_PER_HOUR).round() as i64))
            .collect()
    }

    #[test]
    fn test_below_minimum_is_low_data() {
        for times in [vec![], at_hours(&[0.0]), at_hours(&[0.0, 3.0])] {
            let insight = analyze_feedings(&times);
            assert_eq!(insight.confidence, 0.3);
            assert!(insight.next_feeding.is_none());
            assert!(insight.avg_interval_hours.is_none());
        }
    }

    #[test]
    fn test_equal_gaps_cap_at_ceiling() {
        let times = at_hours(&[0.0, 3.0, 6.0, 9.0]);
        let insight = analyze_feedings(&times);

        assert_eq!(insight.confidence, 0.95);
        assert_eq!(insight.avg_interval_hours, Some(3.0));
        assert_eq!(insight.next_feeding, Some(times[3] + Duration::hours(3)));
        assert_eq!(insight.message, "Next feeding predicted in 3 hours");
    }

    #[test]
    fn test_zero_average_does_not_divide() {
        let times = at_hours(&[2.0, 2.0, 2.0]);
        let insight = analyze_feedings(&times);

        assert_eq!(insight.confidence, 0.3);
        assert!(insight.next_feeding.is_none());
        assert!(insight.avg_interval_hours.is_none());
    }

    #[test]
    fn test_variable_gaps_reduce_confidence() {
        // gaps 2h and 4h: mean 3, population sd 1
        let times = at_hours(&[0.0, 2.0, 6.0]);
        let insight = analyze_feedings(&times);

        assert!((insight.confidence - (1.0 - 1.0 / 3.0)).abs() < 1e-9);
        assert_eq!(insight.avg_interval_hours, Some(3.0));
        assert_eq!(insight.next_feeding, Some(times[2] + Duration::hours(3)));
    }

    #[test]
    fn test_wild_gaps_floor_at_minimum() {
        let times = at_hours(&[0.0, 0.1, 10.0]);
        let insight = analyze_feedings(&times);
        assert_eq!(insight.confidence, 0.3);
        assert!(insight.next_feeding.is_some());
    }

    #[test]
    fn test_interval_rounded_to_one_decimal() {
        // gaps 2h and 2.5h, mean 2.25
        let times = at_hours(&[0.0, 2.0, 4.5]);
        let insight = analyze_feedings(&times);
        assert_eq!(insight.avg_interval_hours, Some(2.3));
        assert_eq!(insight.message, "Next feeding predicted in 2.3 hours");
        assert_eq!(
            insight.next_feeding,
            Some(times[2] + Duration::minutes(135))
        );
    }
}
