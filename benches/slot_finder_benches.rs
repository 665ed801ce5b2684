use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slot_finder::{
    find_available_slots_batch, Event, SearchRequest, SlotFinder, SlotPolicy,
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap()
}

/// A half-hour meeting every 90 minutes, around the clock, for `days`.
fn busy_calendar(days: i64) -> Vec<Event> {
    (0..days * 16)
        .rev()
        .map(|i| {
            let begin = start() + Duration::minutes(i * 90);
            Event::new(begin, begin + Duration::minutes(30))
        })
        .collect()
}

fn find_slots(c: &mut Criterion) {
    c.bench_function("first_fit_two_weeks", |b| {
        let request = SearchRequest::new(45, start(), start() + Duration::days(14));
        let busy = busy_calendar(14);
        let finder = SlotFinder::default();

        b.iter(|| black_box(finder.find(&request, &busy)));
    });

    c.bench_function("exhaustive_two_weeks", |b| {
        let request = SearchRequest::new(45, start(), start() + Duration::days(14));
        let busy = busy_calendar(14);
        let finder = SlotFinder::default()
            .with_policy(SlotPolicy::Exhaustive)
            .with_max_results(usize::MAX);

        b.iter(|| black_box(finder.find(&request, &busy)));
    });

    c.bench_function("uncapped_quarter", |b| {
        let request = SearchRequest::new(30, start(), start() + Duration::days(90));
        let busy = busy_calendar(90);
        let finder = SlotFinder::default().with_max_results(usize::MAX);

        b.iter(|| black_box(finder.find(&request, &busy)));
    });

    c.bench_function("batch_of_calendars", |b| {
        let request = SearchRequest::new(60, start(), start() + Duration::days(30));
        let searches = (1..=32)
            .map(|days| (request.clone(), busy_calendar(days)))
            .collect::<Vec<_>>();
        let finder = SlotFinder::default();

        b.iter(|| black_box(find_available_slots_batch(&finder, &searches)));
    });
}

criterion_group!(benches, find_slots);
criterion_main!(benches);
