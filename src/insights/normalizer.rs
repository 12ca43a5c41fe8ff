//! Time-series normalization
//!
//! Turns stored events, in whatever order the store returned them, into the
//! three ascending series the analyzers read. Events of one kind never leak
//! into another series.

use chrono::{DateTime, Utc};

use crate::storage::{Event, EventPayload, SleepType};

/// Start of one sleep and whether it was tagged as a nap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepSample {
    pub started_at: DateTime<Utc>,
    pub is_nap: bool,
}

/// One growth measurement; either field may be missing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthSample {
    pub measured_at: DateTime<Utc>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
}

impl GrowthSample {
    pub fn new(measured_at: DateTime<Utc>) -> Self {
        Self {
            measured_at,
            weight_kg: None,
            height_cm: None,
        }
    }

    pub fn weight(mut self, kg: f64) -> Self {
        self.weight_kg = Some(kg);
        self
    }

    pub fn height(mut self, cm: f64) -> Self {
        self.height_cm = Some(cm);
        self
    }
}

/// Per-kind series, each sorted oldest to newest
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CareSeries {
    pub feeding: Vec<DateTime<Utc>>,
    pub sleep: Vec<SleepSample>,
    pub growth: Vec<GrowthSample>,
}

impl CareSeries {
    /// Partition events by kind and sort each series by time.
    ///
    /// Sorting is stable: events sharing a timestamp keep the order they
    /// were given in.
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut series = CareSeries::default();

        for event in events {
            match &event.payload {
                EventPayload::Feeding(_) => series.feeding.push(event.occurred_at),
                EventPayload::Sleep(details) => series.sleep.push(SleepSample {
                    started_at: event.occurred_at,
                    is_nap: details.sleep_type == Some(SleepType::Nap),
                }),
                EventPayload::Growth(details) => series.growth.push(GrowthSample {
                    measured_at: event.occurred_at,
                    weight_kg: details.weight_kg,
                    height_cm: details.height_cm,
                }),
            }
        }

        series.feeding.sort();
        series.sleep.sort_by_key(|s| s.started_at);
        series.growth.sort_by_key(|g| g.measured_at);
        series
    }
}
