//! Benchmarks for the Smart Care analyzers and store
//!
//! Run with: cargo bench

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use smartcare::insights::{aggregate, analyze_feedings, CareSeries, GrowthSample, SleepSample};
use smartcare::seed::{demo_events, demo_subject};
use smartcare::storage::{Event, EventKind, SqliteStore};
use tempfile::tempdir;

fn create_series(count: usize) -> CareSeries {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

    CareSeries {
        feeding: (0..count)
            .map(|i| base + Duration::minutes(170 + (i as i64 % 7) * 5) * i as i32)
            .collect(),
        sleep: (0..count)
            .map(|i| SleepSample {
                started_at: base + Duration::hours(13) + Duration::days(i as i64),
                is_nap: i % 3 != 0,
            })
            .collect(),
        growth: (0..count)
            .map(|i| {
                GrowthSample::new(base + Duration::weeks(i as i64))
                    .weight(3.5 + 0.15 * i as f64)
                    .height(50.0 + 0.6 * i as f64)
            })
            .collect(),
    }
}

fn bench_analyzers(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyzers");
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();

    for size in [10, 20, 1000] {
        let series = create_series(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("feeding_{}", size), |b| {
            b.iter(|| analyze_feedings(black_box(&series.feeding)))
        });

        group.bench_function(format!("aggregate_{}", size), |b| {
            b.iter(|| aggregate("baby_001", black_box(&series), &now))
        });
    }

    group.finish();
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");

    group.bench_function("insert_event", |b| {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        store.insert_subject(&demo_subject()).unwrap();
        let (occurred_at, payload) = demo_events(Utc::now()).remove(0);

        b.iter(|| {
            let event = Event::new("baby_001", occurred_at, payload.clone());
            store.insert_event(black_box(&event)).unwrap()
        });
    });

    group.bench_function("recent_feedings_20", |b| {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_subject(&demo_subject()).unwrap();
        let now = Utc::now();
        for _ in 0..100 {
            for (occurred_at, payload) in demo_events(now) {
                store
                    .insert_event(&Event::new("baby_001", occurred_at, payload))
                    .unwrap();
            }
        }

        b.iter(|| {
            store
                .recent_events(black_box("baby_001"), Some(EventKind::Feeding), 20)
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_analyzers, bench_store);
criterion_main!(benches);
