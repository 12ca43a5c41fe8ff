//! Nap-time analyzer
//!
//! Averages the local start hour of tagged naps and proposes the next time
//! that hour comes around. Confidence is a fixed 0.8; nap regularity is not
//! measured.

use chrono::{DateTime, Days, Duration, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::insights::normalizer::SleepSample;
use crate::insights::LOW_DATA_CONFIDENCE;

pub const MIN_SLEEP_ENTRIES: usize = 2;
pub const MIN_NAPS: usize = 2;
pub const NAP_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepInsight {
    pub next_nap: Option<DateTime<Utc>>,
    pub confidence: f64,
    /// Average nap start as zero-padded "HH:MM" local time
    pub avg_nap_time: Option<String>,
    pub message: String,
}

impl SleepInsight {
    fn low_data(message: &str) -> Self {
        Self {
            next_nap: None,
            confidence: LOW_DATA_CONFIDENCE,
            avg_nap_time: None,
            message: message.to_string(),
        }
    }
}

/// Analyze sleep samples against `now`, read in the subject's timezone.
///
/// The returned nap time is strictly after `now`.
pub fn analyze_naps<Tz: TimeZone>(samples: &[SleepSample], now: &DateTime<Tz>) -> SleepInsight {
    if samples.len() < MIN_SLEEP_ENTRIES {
        return SleepInsight::low_data("Need more sleep data for predictions");
    }

    let tz = now.timezone();
    let nap_hours: Vec<f64> = samples
        .iter()
        .filter(|s| s.is_nap)
        .map(|s| {
            let local = s.started_at.with_timezone(&tz);
            local.hour() as f64 + local.minute() as f64 / 60.0
        })
        .collect();

    if nap_hours.is_empty() {
        return SleepInsight::low_data("No nap data available");
    }
    if nap_hours.len() < MIN_NAPS {
        return SleepInsight::low_data("Need at least two naps to estimate a nap window");
    }

    let avg_hour = nap_hours.iter().sum::<f64>() / nap_hours.len() as f64;
    let hour = (avg_hour.floor() as u32).min(23);
    let minute = ((avg_hour.fract() * 60.0).floor() as u32).min(59);

    let time = match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => time,
        None => return SleepInsight::low_data("No nap data available"),
    };

    let next_nap = next_local_occurrence(now, time);
    let label = format!("{:02}:{:02}", hour, minute);

    SleepInsight {
        next_nap: Some(next_nap.with_timezone(&Utc)),
        confidence: NAP_CONFIDENCE,
        message: format!("Optimal nap window: {}", label),
        avg_nap_time: Some(label),
    }
}

/// Today at `time` if that is still ahead of `now`, otherwise the same wall
/// time one calendar day later.
fn next_local_occurrence<Tz: TimeZone>(now: &DateTime<Tz>, time: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let wall = now.date_naive().and_time(time);

    // A wall time skipped by a DST jump resolves to the hour after it.
    let today = tz
        .from_local_datetime(&wall)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(wall + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&wall));

    if today > *now {
        return today;
    }

    today
        .clone()
        .checked_add_days(Days::new(1))
        .unwrap_or_else(|| today + Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn sample(h: u32, m: u32, is_nap: bool) -> SleepSample {
        SleepSample {
            started_at: Utc.with_ymd_and_hms(2024, 2, 27, h, m, 0).unwrap(),
            is_nap,
        }
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_too_few_entries() {
        let insight = analyze_naps(&[sample(13, 0, true)], &Utc::now());
        assert_eq!(insight.confidence, 0.3);
        assert!(insight.next_nap.is_none());
        assert_eq!(insight.message, "Need more sleep data for predictions");
    }

    #[test]
    fn test_no_naps_matches_empty_shape() {
        let night_only = [sample(20, 0, false), sample(21, 0, false)];
        let insight = analyze_naps(&night_only, &Utc::now());
        let empty = analyze_naps(&[], &Utc::now());

        assert_eq!(insight.confidence, 0.3);
        assert_eq!(insight.confidence, empty.confidence);
        assert!(insight.next_nap.is_none());
        assert!(insight.avg_nap_time.is_none());
        assert_eq!(insight.message, "No nap data available");
        assert_ne!(insight.message, empty.message);
    }

    #[test]
    fn test_single_nap_is_not_enough() {
        let samples = [sample(13, 0, true), sample(20, 0, false)];
        let insight = analyze_naps(&samples, &Utc::now());
        assert_eq!(insight.confidence, 0.3);
        assert!(insight.next_nap.is_none());
    }

    #[test]
    fn test_average_time_later_today() {
        // naps at 13:00 and 14:00 average to 13:30
        let samples = [sample(13, 0, true), sample(14, 0, true), sample(20, 0, false)];
        let now = utc(2024, 3, 1, 9, 0);
        let insight = analyze_naps(&samples, &now);

        assert_eq!(insight.confidence, 0.8);
        assert_eq!(insight.avg_nap_time.as_deref(), Some("13:30"));
        assert_eq!(insight.message, "Optimal nap window: 13:30");
        assert_eq!(insight.next_nap, Some(utc(2024, 3, 1, 13, 30)));
    }

    #[test]
    fn test_passed_time_rolls_to_tomorrow() {
        let samples = [sample(9, 5, true), sample(9, 5, true)];
        let now = utc(2024, 3, 1, 15, 0);
        let insight = analyze_naps(&samples, &now);

        assert_eq!(insight.avg_nap_time.as_deref(), Some("09:05"));
        assert_eq!(insight.next_nap, Some(utc(2024, 3, 2, 9, 5)));
    }

    #[test]
    fn test_exactly_now_rolls_forward() {
        let samples = [sample(12, 0, true), sample(12, 0, true)];
        let now = utc(2024, 3, 1, 12, 0);
        let insight = analyze_naps(&samples, &now);
        assert_eq!(insight.next_nap, Some(utc(2024, 3, 2, 12, 0)));
    }

    #[test]
    fn test_prediction_always_in_future() {
        let samples = [sample(13, 20, true), sample(15, 50, true)];
        for hour in 0..24 {
            let now = utc(2024, 3, 1, hour, 37);
            let next = analyze_naps(&samples, &now).next_nap.unwrap();
            assert!(next > now, "next nap {} not after {}", next, now);
            assert!(next - now <= Duration::days(1));
        }
    }

    #[test]
    fn test_hours_read_in_subject_timezone() {
        // 07:30 UTC is 13:00 in UTC+05:30
        let samples = [sample(7, 30, true), sample(7, 30, true)];
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let now = utc(2024, 3, 1, 2, 0).with_timezone(&ist);

        let insight = analyze_naps(&samples, &now);
        assert_eq!(insight.avg_nap_time.as_deref(), Some("13:00"));
        assert_eq!(insight.next_nap, Some(utc(2024, 3, 1, 7, 30)));
    }

    #[test]
    fn test_minutes_are_floored() {
        // 13:00 and 13:01 average to 13:00.5
        let samples = [sample(13, 0, true), sample(13, 1, true)];
        let insight = analyze_naps(&samples, &utc(2024, 3, 1, 0, 0));
        assert_eq!(insight.avg_nap_time.as_deref(), Some("13:00"));
    }

    #[test]
    fn test_skipped_wall_time_moves_past_dst_gap() {
        use chrono_tz::America::New_York;

        // New York skips 02:00-03:00 on 2024-03-10; 07:30 UTC is 02:30 EST
        let samples = [
            SleepSample { started_at: utc(2024, 3, 7, 7, 30), is_nap: true },
            SleepSample { started_at: utc(2024, 3, 8, 7, 30), is_nap: true },
        ];
        let gap_morning = utc(2024, 3, 10, 5, 30).with_timezone(&New_York);

        let insight = analyze_naps(&samples, &gap_morning);
        assert_eq!(insight.avg_nap_time.as_deref(), Some("02:30"));
        // 03:30 EDT
        assert_eq!(insight.next_nap, Some(utc(2024, 3, 10, 7, 30)));

        // Rolling over from the day before lands in the same gap
        let day_before = utc(2024, 3, 9, 8, 0).with_timezone(&New_York);
        let time = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let next = next_local_occurrence(&day_before, time);
        assert_eq!(next.with_timezone(&Utc), utc(2024, 3, 10, 7, 30));
        assert!(next > day_before);
    }
}
