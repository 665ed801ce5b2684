use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Working day bounds used when no others are given, `09:00..17:00`.
pub const DEFAULT_WORKING_HOURS: WorkingHours = WorkingHours {
    start_hour: 9,
    end_hour: 17,
};

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum RequestError {
    #[error("Search range is empty: {start} is not before {end}")]
    EmptyRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("Meeting duration must be positive and fit within working hours, got {0} minutes")]
    InvalidDuration(i64),
    #[error("Working hours must satisfy start < end within 0..=23, got {start_hour}..{end_hour}")]
    InvalidWorkingHours { start_hour: u32, end_hour: u32 },
}

/// Daily `[start_hour, end_hour)` bound within which slots may be offered.
/// Hours are interpreted in the search's time zone.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct WorkingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl WorkingHours {
    /// # Examples
    /// ```
    /// use slot_finder::request::{RequestError, WorkingHours};
    ///
    /// assert!(WorkingHours::new(9, 17).is_ok());
    /// assert_eq!(
    ///     WorkingHours::new(17, 9),
    ///     Err(RequestError::InvalidWorkingHours { start_hour: 17, end_hour: 9 })
    /// );
    /// ```
    pub fn new(start_hour: u32, end_hour: u32) -> Result<WorkingHours, RequestError> {
        let hours = WorkingHours {
            start_hour,
            end_hour,
        };
        hours.validate()?;
        Ok(hours)
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.start_hour < self.end_hour && self.end_hour <= 23 {
            Ok(())
        } else {
            Err(RequestError::InvalidWorkingHours {
                start_hour: self.start_hour,
                end_hour: self.end_hour,
            })
        }
    }

    /// Length of the working day in minutes.
    pub fn minutes(&self) -> i64 {
        (i64::from(self.end_hour) - i64::from(self.start_hour)) * 60
    }
}

impl Default for WorkingHours {
    fn default() -> Self {
        DEFAULT_WORKING_HOURS
    }
}

/// What to look for: how long the meeting is, which days to consider and
/// which hours of those days are bookable.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SearchRequest {
    pub duration_minutes: i64,
    pub range_start: DateTime<Utc>,
    pub range_end: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub working_hours: WorkingHours,
    #[cfg_attr(feature = "serde", serde(default = "default_time_zone"))]
    pub time_zone: Tz,
}

#[cfg(feature = "serde")]
fn default_time_zone() -> Tz {
    Tz::UTC
}

impl SearchRequest {
    /// A request using [`DEFAULT_WORKING_HOURS`] in UTC.
    pub fn new(
        duration_minutes: i64,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> SearchRequest {
        SearchRequest {
            duration_minutes,
            range_start,
            range_end,
            working_hours: WorkingHours::default(),
            time_zone: Tz::UTC,
        }
    }

    pub fn with_working_hours(mut self, working_hours: WorkingHours) -> SearchRequest {
        self.working_hours = working_hours;
        self
    }

    /// Zone in which days and working hours are reckoned.
    pub fn with_time_zone(mut self, time_zone: Tz) -> SearchRequest {
        self.time_zone = time_zone;
        self
    }

    /// The meeting length. Saturates for lengths no request could ever
    /// satisfy; [`SearchRequest::validate`] rejects those.
    pub fn duration(&self) -> Duration {
        Duration::try_minutes(self.duration_minutes).unwrap_or(Duration::MAX)
    }

    /// Reports why a request cannot produce any slot.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use slot_finder::request::{RequestError, SearchRequest};
    ///
    /// let start = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
    ///
    /// assert!(matches!(
    ///     SearchRequest::new(60, start, start).validate(),
    ///     Err(RequestError::EmptyRange { .. })
    /// ));
    /// ```
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.range_end <= self.range_start {
            Err(RequestError::EmptyRange {
                start: self.range_start,
                end: self.range_end,
            })
        } else {
            self.working_hours.validate()?;

            // A meeting longer than the working day can never fit
            if self.duration_minutes <= 0 || self.duration_minutes > self.working_hours.minutes() {
                Err(RequestError::InvalidDuration(self.duration_minutes))
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for SearchRequest {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let range_start = crate::time::arbitrary_instant(u)?;
        // Occasionally produce empty or inverted ranges
        let span = u.int_in_range(-600..=30 * 24 * 60_i64)?;
        let start_hour = u.int_in_range(0..=23_u32)?;
        let end_hour = u.int_in_range(0..=23_u32)?;
        Ok(SearchRequest {
            duration_minutes: u.int_in_range(-5..=8 * 60_i64)?,
            range_start,
            range_end: range_start + Duration::minutes(span),
            working_hours: WorkingHours {
                start_hour,
                end_hour,
            },
            time_zone: *u.choose(&[Tz::UTC, Tz::Europe__Berlin, Tz::America__New_York])?,
        })
    }
}
