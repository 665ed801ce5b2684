use crate::request::{SearchRequest, WorkingHours};
use crate::time::{Available, Event, TimeMerge, TimeWindow, Windowed};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use itertools::Itertools;
use log::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Most slots a single search hands back. Callers wanting more narrow the
/// range and search again.
pub const DEFAULT_MAX_SLOTS: usize = 10;

/// Days on which no slot is ever offered by default.
pub const WEEKEND: [Weekday; 2] = [Weekday::Sat, Weekday::Sun];

/// How many slots a single free gap may produce.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SlotPolicy {
    /// At most one slot per gap, placed at the start of the gap.
    FirstFit,
    /// Back-to-back slots filling every gap.
    Exhaustive,
}

/// Which busy events count against a day's working window.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ConflictFilter {
    /// Any event overlapping the window, including ones that started the
    /// previous evening.
    Overlapping,
    /// Only events whose start lies inside `[day_start, day_end)`.
    StartsWithinDay,
}

impl ConflictFilter {
    fn applies(self, event: &Event, day: &TimeWindow) -> bool {
        let starts_within = day.start() <= event.start_time && event.start_time < day.end();

        match self {
            ConflictFilter::StartsWithinDay => starts_within,
            ConflictFilter::Overlapping => starts_within || event.window().overlaps(day),
        }
    }
}

/// Computes open meeting slots from a list of busy events.
///
/// The default finder offers at most [`DEFAULT_MAX_SLOTS`] first-fit slots on
/// weekdays, and treats every event overlapping a working window as busy.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlotFinder {
    pub max_results: usize,
    pub non_working_days: Vec<Weekday>,
    pub policy: SlotPolicy,
    pub conflicts: ConflictFilter,
}

impl Default for SlotFinder {
    fn default() -> Self {
        SlotFinder {
            max_results: DEFAULT_MAX_SLOTS,
            non_working_days: WEEKEND.to_vec(),
            policy: SlotPolicy::FirstFit,
            conflicts: ConflictFilter::Overlapping,
        }
    }
}

impl SlotFinder {
    pub fn new() -> SlotFinder {
        SlotFinder::default()
    }

    pub fn with_max_results(mut self, max_results: usize) -> SlotFinder {
        self.max_results = max_results;
        self
    }

    pub fn with_non_working_days(mut self, days: impl IntoIterator<Item = Weekday>) -> SlotFinder {
        self.non_working_days = days.into_iter().collect();
        self
    }

    pub fn with_policy(mut self, policy: SlotPolicy) -> SlotFinder {
        self.policy = policy;
        self
    }

    pub fn with_conflicts(mut self, conflicts: ConflictFilter) -> SlotFinder {
        self.conflicts = conflicts;
        self
    }

    /// Finds open slots for `request` around `busy_events`.
    ///
    /// Days are visited from `range_start`, one calendar day at a time, while
    /// the stepped instant is still before `range_end`. Non-working days are
    /// skipped and each remaining day is swept from the start of working
    /// hours. Invalid requests produce no slots rather than an error.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use slot_finder::{Event, SearchRequest, SlotFinder, TimeWindow};
    ///
    /// let at = |h: u32| Utc.with_ymd_and_hms(2024, 1, 8, h, 0, 0).unwrap();
    ///
    /// // Monday, 09:00..17:00, one meeting from 10:00 to 11:00
    /// let request = SearchRequest::new(60, at(0), at(23));
    /// let busy = vec![Event::new(at(10), at(11))];
    ///
    /// assert_eq!(
    ///     SlotFinder::default().find(&request, &busy),
    ///     vec![TimeWindow::new(at(9), at(10)), TimeWindow::new(at(11), at(12))]
    /// );
    /// ```
    pub fn find(&self, request: &SearchRequest, busy_events: &[Event]) -> Vec<TimeWindow> {
        if let Err(err) = request.validate() {
            debug!("Rejected slot search: {}", err);
            return vec![];
        }

        let duration = request.duration();
        let events = busy_events
            .iter()
            .filter(|event| {
                if event.is_well_formed() {
                    true
                } else {
                    warn!(
                        "Ignoring event {:?} ending before it starts: {}",
                        event.id,
                        event.window()
                    );
                    false
                }
            })
            .sorted_by_key(|event| event.start_time)
            .collect_vec();

        let mut slots = Vec::with_capacity(self.max_results);
        let mut days_visited = 0_usize;

        for day in self.working_windows(request) {
            if slots.len() >= self.max_results {
                break;
            }
            days_visited += 1;

            let busy = events
                .iter()
                .copied()
                .filter(|event| self.conflicts.applies(event, &day))
                .collect_vec();

            trace!("Sweeping {} against {} busy events", day, busy.len());

            match self.policy {
                SlotPolicy::FirstFit => slots.extend(first_fit(day, &busy, duration)),
                SlotPolicy::Exhaustive => slots.extend(exhaustive(day, &busy, duration)),
            }
        }

        slots.truncate(self.max_results);

        debug!(
            "Found {} slots of {} minutes across {} working days",
            slots.len(),
            request.duration_minutes,
            days_visited
        );

        slots
    }

    /// The span from the first visited working window's start to the last
    /// one's end. Fetching busy events over this span is enough to run
    /// [`SlotFinder::find`]. `None` when the request is invalid or visits no
    /// working day.
    pub fn search_bounds(&self, request: &SearchRequest) -> Option<TimeWindow> {
        request.validate().ok()?;

        let mut days = self.working_windows(request);
        let first = days.next()?;
        let last = days.last().unwrap_or(first);

        Some(TimeWindow::new(first.start(), last.end()))
    }

    /// Working-hours windows of every visited day that is not skipped.
    pub fn working_windows<'a>(
        &'a self,
        request: &'a SearchRequest,
    ) -> impl Iterator<Item = TimeWindow> + 'a {
        let tz = request.time_zone;
        let local_start = request.range_start.with_timezone(&tz).naive_local();
        let local_end = request.range_end.with_timezone(&tz).naive_local();

        (0_i64..)
            .map(move |offset| local_start + Duration::days(offset))
            .take_while(move |day| *day < local_end)
            .filter(move |day| !self.non_working_days.contains(&day.weekday()))
            .filter_map(move |day| day_window(tz, day.date(), request.working_hours))
    }
}

/// Finds open slots with the default [`SlotFinder`].
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use slot_finder::{find_available_slots, SearchRequest};
///
/// // Saturday and Sunday only
/// let request = SearchRequest::new(
///     30,
///     Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap(),
/// );
///
/// assert!(find_available_slots(&request, &[]).is_empty());
/// ```
pub fn find_available_slots(request: &SearchRequest, busy_events: &[Event]) -> Vec<TimeWindow> {
    SlotFinder::default().find(request, busy_events)
}

/// Sweeps a cursor across `busy` (sorted by start), emitting a slot whenever
/// one fits before the next event, then one more after the last event.
fn first_fit(day: TimeWindow, busy: &[&Event], duration: Duration) -> Vec<TimeWindow> {
    let mut slots = vec![];
    let mut slot_start = day.start();

    for event in busy {
        if let Some(slot) = fitting_slot(slot_start, duration, event.start_time) {
            slots.push(slot);
        }
        slot_start = slot_start.max(event.end_time);
    }

    if let Some(slot) = fitting_slot(slot_start, duration, day.end()) {
        slots.push(slot);
    }

    slots
}

/// `[start, start + duration)` when it ends no later than `limit`. An event
/// ending at the edge of representable time leaves no room at all.
fn fitting_slot(
    start: DateTime<Utc>,
    duration: Duration,
    limit: DateTime<Utc>,
) -> Option<TimeWindow> {
    start
        .checked_add_signed(duration)
        .filter(|end| *end <= limit)
        .map(|end| TimeWindow::new(start, end))
}

fn exhaustive(day: TimeWindow, busy: &[&Event], duration: Duration) -> Vec<TimeWindow> {
    let blocked = busy.iter().map(|event| event.window()).collect_vec();

    blocked
        .iter()
        .time_merge()
        .iter()
        .get_availability(day)
        .iter()
        .windowed(duration)
}

fn day_window(tz: Tz, date: NaiveDate, hours: WorkingHours) -> Option<TimeWindow> {
    let start = local_instant(tz, date, hours.start_hour)?;
    let end = local_instant(tz, date, hours.end_hour)?;

    Some(TimeWindow::new(start, end))
}

fn local_instant(tz: Tz, date: NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
    let local = date.and_hms_opt(hour, 0, 0)?;

    match tz.from_local_datetime(&local).earliest() {
        Some(instant) => Some(instant.with_timezone(&Utc)),
        None => {
            warn!("Skipping {}: {}:00 does not exist in {}", date, hour, tz);
            None
        }
    }
}
