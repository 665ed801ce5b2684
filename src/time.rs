use chrono::{DateTime, Duration, Utc};
use core::cmp::Ordering;
use itertools::Itertools;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` interval between two UTC instants.
///
/// Used both for candidate slots handed back to callers and for the
/// working-hours bound of a single day.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl TimeWindow {
    /// Construct a new window.
    /// No ordering check is made; see [`TimeWindow::is_empty`].
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use slot_finder::time::TimeWindow;
    ///
    /// let start = Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap();
    /// let end = Utc.with_ymd_and_hms(2024, 1, 8, 10, 0, 0).unwrap();
    /// let window = TimeWindow::new(start, end);
    ///
    /// assert_eq!(window.start(), start);
    /// assert_eq!(window.end(), end);
    /// ```
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> TimeWindow {
        TimeWindow {
            start_time,
            end_time,
        }
    }

    /// A window of `duration` beginning at `start_time`.
    pub fn starting_at(start_time: DateTime<Utc>, duration: Duration) -> TimeWindow {
        TimeWindow::new(start_time, start_time + duration)
    }

    /// Convenience function for readability
    pub fn start(self) -> DateTime<Utc> {
        self.start_time
    }

    /// Convenience function for readability
    pub fn end(self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn duration(self) -> Duration {
        self.end_time - self.start_time
    }

    /// True when the window covers no time at all (or runs backwards).
    pub fn is_empty(self) -> bool {
        self.end_time <= self.start_time
    }

    /// Two half-open windows overlap when each starts before the other ends.
    /// Touching windows (`a.end == b.start`) do not overlap.
    ///
    /// # Examples
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use slot_finder::time::TimeWindow;
    ///
    /// let nine = Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap();
    /// let a = TimeWindow::starting_at(nine, Duration::hours(1));
    /// let b = TimeWindow::starting_at(nine + Duration::hours(1), Duration::hours(1));
    /// let c = TimeWindow::starting_at(nine + Duration::minutes(30), Duration::hours(1));
    ///
    /// assert!(!a.overlaps(&b));
    /// assert!(a.overlaps(&c));
    /// assert!(c.overlaps(&b));
    /// ```
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &TimeWindow) -> bool {
        self.start_time <= other.start_time && other.end_time <= self.end_time
    }
}

impl Ord for TimeWindow {
    /// Windows order chronologically by start, then by end.
    fn cmp(&self, other: &Self) -> Ordering {
        self.start_time
            .cmp(&other.start_time)
            .then_with(|| self.end_time.cmp(&other.end_time))
    }
}

impl PartialOrd for TimeWindow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start_time.to_rfc3339(),
            self.end_time.to_rfc3339()
        )
    }
}

/// A busy entry on a calendar. Owned by the event source; the finder only
/// reads it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Event {
    /// Constructs an anonymous busy event.
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Event {
        Event {
            id: None,
            start_time,
            end_time,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Event {
        self.id = Some(id.into());
        self
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    /// Zero-length events are allowed; events that end before they start
    /// are not.
    pub fn is_well_formed(&self) -> bool {
        self.end_time >= self.start_time
    }
}

impl From<&Event> for TimeWindow {
    fn from(event: &Event) -> Self {
        event.window()
    }
}

pub trait Available {
    fn get_availability(self, available_time: TimeWindow) -> Vec<TimeWindow>;
}

impl<'a, T> Available for T
where
    T: Iterator<Item = &'a TimeWindow>,
{
    /// Self is blocked times that cannot be scheduled.
    /// This performs a set exclusion `available_time - self`, returning the
    /// free gaps in chronological order.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use slot_finder::time::{Available, TimeWindow};
    ///
    /// let t = |m: i64| Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap() + Duration::minutes(m);
    ///
    /// let blocked = vec![
    ///     TimeWindow::new(t(60), t(120)),
    ///     TimeWindow::new(t(-30), t(15)),
    /// ];
    ///
    /// assert_eq!(
    ///     blocked.iter().get_availability(TimeWindow::new(t(0), t(180))),
    ///     vec![TimeWindow::new(t(15), t(60)), TimeWindow::new(t(120), t(180))]
    /// );
    /// ```
    fn get_availability(self, available_time: TimeWindow) -> Vec<TimeWindow> {
        let mut start = available_time.start();
        let mut sub_times = vec![];

        for block in self.sorted_by_key(|block| block.start()) {
            if block.start() >= available_time.end() {
                break;
            }

            if block.start() > start {
                sub_times.push(TimeWindow::new(start, block.start()));
            }

            start = start.max(block.end());
        }

        if start < available_time.end() {
            sub_times.push(TimeWindow::new(start, available_time.end()));
        }

        sub_times
    }
}

pub trait TimeMerge {
    fn time_merge(self) -> Vec<TimeWindow>;
}

impl<'a, T> TimeMerge for T
where
    T: Iterator<Item = &'a TimeWindow>,
{
    /// Combines overlapping or touching windows together.
    /// Input must already be sorted by start.
    ///
    /// # Examples
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use slot_finder::time::{TimeMerge, TimeWindow};
    ///
    /// let t = |m: i64| Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap() + Duration::minutes(m);
    ///
    /// let busy = vec![
    ///     TimeWindow::new(t(0), t(30)),
    ///     TimeWindow::new(t(30), t(60)),
    ///     TimeWindow::new(t(45), t(50)),
    ///     TimeWindow::new(t(90), t(120)),
    /// ];
    ///
    /// assert_eq!(
    ///     busy.iter().time_merge(),
    ///     vec![TimeWindow::new(t(0), t(60)), TimeWindow::new(t(90), t(120))]
    /// );
    /// ```
    fn time_merge(self) -> Vec<TimeWindow> {
        let size_hint = self.size_hint().1.unwrap_or(0);
        let (last, mut acc) = self.fold(
            (None, Vec::with_capacity(size_hint)),
            |(last, mut acc): (Option<TimeWindow>, Vec<TimeWindow>), &curr| match last {
                None => (Some(curr), acc),
                Some(time) => {
                    if curr.start() <= time.end() {
                        (
                            Some(TimeWindow::new(time.start(), time.end().max(curr.end()))),
                            acc,
                        )
                    } else {
                        acc.push(time);
                        (Some(curr), acc)
                    }
                }
            },
        );

        if let Some(time) = last {
            acc.push(time);
        }

        acc
    }
}

pub trait Windowed {
    fn windowed(self, duration: Duration) -> Vec<TimeWindow>;
}

impl<'a, T> Windowed for T
where
    T: Iterator<Item = &'a TimeWindow>,
{
    /// Splits each window into back-to-back windows of exactly `duration`.
    /// Any remainder shorter than `duration` is dropped.
    ///
    /// # Example
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use slot_finder::time::{TimeWindow, Windowed};
    ///
    /// let t = |m: i64| Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap() + Duration::minutes(m);
    /// let gaps = vec![TimeWindow::new(t(0), t(100))];
    ///
    /// assert_eq!(
    ///     gaps.iter().windowed(Duration::minutes(30)),
    ///     vec![
    ///         TimeWindow::new(t(0), t(30)),
    ///         TimeWindow::new(t(30), t(60)),
    ///         TimeWindow::new(t(60), t(90)),
    ///     ]
    /// );
    /// ```
    fn windowed(self, duration: Duration) -> Vec<TimeWindow> {
        let mut windows: Vec<TimeWindow> = Vec::with_capacity(self.size_hint().1.unwrap_or(0));

        if duration <= Duration::zero() {
            return windows;
        }

        for time in self {
            let mut start = time.start();

            while let Some(end) = start.checked_add_signed(duration) {
                if end > time.end() {
                    break;
                }
                windows.push(TimeWindow::new(start, end));
                start = end;
            }
        }

        windows
    }
}

#[cfg(feature = "arbitrary")]
pub(crate) fn arbitrary_instant(
    u: &mut arbitrary::Unstructured<'_>,
) -> arbitrary::Result<DateTime<Utc>> {
    // Monday 2024-01-01T00:00:00Z, plus up to a year of minutes so both
    // DST transitions are reachable
    let base = DateTime::from_timestamp(1_704_067_200, 0)
        .ok_or(arbitrary::Error::IncorrectFormat)?;
    let offset = u.int_in_range(0..=366 * 24 * 60_u32)?;
    Ok(base + Duration::minutes(i64::from(offset)))
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for Event {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let start = arbitrary_instant(u)?;
        let length = u.int_in_range(0..=24 * 60_u32)?;
        Ok(Event::new(start, start + Duration::minutes(i64::from(length))))
    }
}
