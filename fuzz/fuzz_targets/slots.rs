#![no_main]
use chrono::Datelike;
use libfuzzer_sys::fuzz_target;
use slot_finder::{Event, SearchRequest, SlotFinder, SlotPolicy, DEFAULT_MAX_SLOTS};

fuzz_target!(|data: (SearchRequest, Vec<Event>, bool)| {
    #[cfg(feature = "log")]
    let _ = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Debug)
        .chain(std::io::stdout())
        .apply();

    let (request, busy, exhaustive) = data;
    let policy = if exhaustive {
        SlotPolicy::Exhaustive
    } else {
        SlotPolicy::FirstFit
    };
    let finder = SlotFinder::default().with_policy(policy);
    let slots = finder.find(&request, &busy);

    if request.validate().is_err() {
        assert!(slots.is_empty(), "Invalid request produced {:?}", slots);
        return;
    }

    assert!(slots.len() <= DEFAULT_MAX_SLOTS);
    assert_eq!(slots, finder.find(&request, &busy), "Search is not deterministic");

    let days = finder.working_windows(&request).collect::<Vec<_>>();

    for slot in slots.iter() {
        assert_eq!(slot.duration(), request.duration(), "Wrong length: {}", slot);

        let day = days
            .iter()
            .find(|day| day.contains(slot))
            .unwrap_or_else(|| panic!("{} is outside every working window", slot));

        let weekday = day.start().with_timezone(&request.time_zone).weekday();
        assert!(
            !finder.non_working_days.contains(&weekday),
            "{} falls on {}",
            slot,
            weekday
        );

        if let Some(event) = busy.iter().find(|event| {
            event.start_time >= day.start()
                && event.start_time < day.end()
                && event.window().overlaps(slot)
        }) {
            panic!("{} overlaps busy event {}", slot, event.window());
        }
    }

    assert!(
        slots.iter().zip(slots.iter().skip(1)).all(|(l, r)| l.end() <= r.start()),
        "Slots are not ordered and disjoint: {:?}",
        slots
    );
});
