//! Calendar providers the finder reads busy events from.
//!
//! Real providers (hosted calendar APIs) implement [`EventSource`] outside
//! this crate. [`InMemoryEventSource`] keeps events in memory and is what the
//! tests and embedding hosts without a provider use.

use crate::time::{Event, TimeWindow};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum SourceError {
    #[error("Invalid event: {0}")]
    InvalidEvent(String),
    #[error("Event source unavailable: {0}")]
    Unavailable(String),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Calendar {calendar_id} is already busy at {start}")]
    Busy {
        calendar_id: String,
        start: DateTime<Utc>,
    },
}

/// What a caller supplies to put a new event on a calendar.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EventDetails {
    pub calendar_id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub participants: Vec<String>,
}

impl EventDetails {
    pub fn new(calendar_id: &str, title: &str, window: TimeWindow) -> EventDetails {
        EventDetails {
            calendar_id: calendar_id.to_string(),
            title: title.to_string(),
            start_time: window.start(),
            end_time: window.end(),
            participants: vec![],
        }
    }

    pub fn with_participant(mut self, participant: &str) -> EventDetails {
        self.participants.push(participant.to_string());
        self
    }
}

/// A calendar provider.
pub trait EventSource: Send + Sync {
    /// Every event on `calendar_id` overlapping `[range_start, range_end)`.
    fn list_events(
        &self,
        calendar_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<Event>, SourceError>;

    fn create_event(&self, details: EventDetails) -> Result<Event, SourceError>;

    /// Creates the event only if nothing on the calendar overlaps it,
    /// otherwise fails with [`SourceError::Busy`]. The check and the insert
    /// must be atomic with respect to other writers.
    fn create_event_if_free(&self, details: EventDetails) -> Result<Event, SourceError>;
}

#[derive(Debug, Clone)]
struct StoredEvent {
    event: Event,
    title: String,
    participants: Vec<String>,
}

/// Events held in memory, keyed by calendar id.
#[derive(Debug, Default)]
pub struct InMemoryEventSource {
    calendars: RwLock<HashMap<String, Vec<StoredEvent>>>,
}

impl InMemoryEventSource {
    pub fn new() -> InMemoryEventSource {
        InMemoryEventSource::default()
    }

    /// Seeds `calendar_id` with already-busy events.
    pub fn with_events(
        self,
        calendar_id: &str,
        events: impl IntoIterator<Item = Event>,
    ) -> Result<InMemoryEventSource, SourceError> {
        {
            let mut calendars = self
                .calendars
                .write()
                .map_err(|e| SourceError::Unavailable(e.to_string()))?;
            let calendar = calendars.entry(calendar_id.to_string()).or_default();
            for event in events {
                if !event.is_well_formed() {
                    return Err(SourceError::InvalidEvent(format!(
                        "{} ends before it starts",
                        event.window()
                    )));
                }
                calendar.push(StoredEvent {
                    event,
                    title: String::new(),
                    participants: vec![],
                });
            }
        }
        Ok(self)
    }

    /// Title and participants recorded for the event with `id`.
    pub fn describe(&self, id: &str) -> Result<Option<(String, Vec<String>)>, SourceError> {
        let calendars = self
            .calendars
            .read()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        Ok(calendars
            .values()
            .flatten()
            .find(|stored| stored.event.id.as_deref() == Some(id))
            .map(|stored| (stored.title.clone(), stored.participants.clone())))
    }

    /// Adds an event under a single write guard, so a `require_free` check
    /// cannot race another writer.
    fn insert(&self, details: EventDetails, require_free: bool) -> Result<Event, SourceError> {
        if details.end_time <= details.start_time {
            return Err(SourceError::InvalidEvent(format!(
                "{} must end after it starts",
                details.title
            )));
        }

        let mut calendars = self
            .calendars
            .write()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        let calendar = calendars.entry(details.calendar_id.clone()).or_default();

        let window = TimeWindow::new(details.start_time, details.end_time);
        if require_free
            && calendar
                .iter()
                .any(|stored| stored.event.window().overlaps(&window))
        {
            debug!("Refusing {} on busy calendar {}", window, details.calendar_id);
            return Err(SourceError::Busy {
                calendar_id: details.calendar_id,
                start: details.start_time,
            });
        }

        let event = Event::new(details.start_time, details.end_time)
            .with_id(Uuid::new_v4().to_string());

        calendar.push(StoredEvent {
            event: event.clone(),
            title: details.title,
            participants: details.participants,
        });

        info!(
            "Created event {:?} on {} at {}",
            event.id,
            details.calendar_id,
            event.window()
        );

        Ok(event)
    }
}

impl EventSource for InMemoryEventSource {
    fn list_events(
        &self,
        calendar_id: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<Event>, SourceError> {
        let calendars = self
            .calendars
            .read()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        let range = TimeWindow::new(range_start, range_end);

        let events: Vec<Event> = calendars
            .get(calendar_id)
            .map(|calendar| {
                calendar
                    .iter()
                    .map(|stored| &stored.event)
                    .filter(|event| {
                        event.window().overlaps(&range)
                            || (event.start_time >= range_start && event.start_time < range_end)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            "Listed {} events on {} within {}",
            events.len(),
            calendar_id,
            range
        );

        Ok(events)
    }

    fn create_event(&self, details: EventDetails) -> Result<Event, SourceError> {
        self.insert(details, false)
    }

    fn create_event_if_free(&self, details: EventDetails) -> Result<Event, SourceError> {
        self.insert(details, true)
    }
}
