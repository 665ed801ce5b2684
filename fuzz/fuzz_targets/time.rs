#![no_main]
use chrono::Duration;
use libfuzzer_sys::fuzz_target;
use slot_finder::time::{Available, Event, TimeMerge, TimeWindow, Windowed};

fuzz_target!(|data: (Event, Vec<Event>, u16)| {
    let bound = data.0.window();
    let mut blocks = data.1.iter().map(Event::window).collect::<Vec<_>>();
    blocks.sort();
    let duration = Duration::minutes(i64::from(data.2.max(1)));

    let merged = blocks.iter().time_merge();
    assert!(
        merged.iter().zip(merged.iter().skip(1)).all(|(l, r)| l.end() < r.start()),
        "Merged windows should be disjoint and separated"
    );

    let free = blocks.iter().get_availability(bound);
    assert_eq!(free, merged.iter().get_availability(bound));

    for gap in free.iter() {
        assert!(bound.contains(gap), "{} escapes {}", gap, bound);
        assert!(
            !blocks.iter().any(|block| block.overlaps(gap)),
            "{} overlaps a block",
            gap
        );
    }

    let windows: Vec<TimeWindow> = free.iter().windowed(duration);
    assert!(
        windows.iter().all(|w| w.duration() == duration),
        "Duration should be the same for all windows"
    );
    assert!(
        windows.iter().zip(windows.iter().skip(1)).all(|(l, r)| l.end() <= r.start()),
        "Each window should end before the following one starts"
    );
});
