use crate::finder::SlotFinder;
use crate::request::SearchRequest;
use crate::source::{EventDetails, EventSource, SourceError};
use crate::time::{Event, TimeWindow};
use chrono::{DateTime, Utc};
use log::{debug, info};
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum BookingError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Slot starting at {start} is no longer free")]
    Conflict { start: DateTime<Utc> },
    #[error("Slot {0} is empty")]
    InvalidSlot(TimeWindow),
}

/// Fetches busy events from an [`EventSource`], offers slots, and books the
/// one a user picks.
pub struct Scheduler<S>
where
    S: EventSource,
{
    source: S,
    finder: SlotFinder,
}

impl<S> Scheduler<S>
where
    S: EventSource,
{
    pub fn new(source: S) -> Scheduler<S> {
        Scheduler {
            source,
            finder: SlotFinder::default(),
        }
    }

    pub fn with_finder(mut self, finder: SlotFinder) -> Scheduler<S> {
        self.finder = finder;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn finder(&self) -> &SlotFinder {
        &self.finder
    }

    /// Open slots on `calendar_id` for `request`.
    ///
    /// Only the provider fetch can fail. A request that visits no working
    /// day never reaches the provider.
    pub fn available_slots(
        &self,
        calendar_id: &str,
        request: &SearchRequest,
    ) -> Result<Vec<TimeWindow>, SourceError> {
        let bounds = match self.finder.search_bounds(request) {
            Some(bounds) => bounds,
            None => {
                debug!("Nothing to search on {} for {:?}", calendar_id, request);
                return Ok(vec![]);
            }
        };

        let events = self
            .source
            .list_events(calendar_id, bounds.start(), bounds.end())?;

        Ok(self.finder.find(request, &events))
    }

    /// Books `slot` on `calendar_id`. The slot may have been taken since it
    /// was offered, so the source checks and inserts in one step.
    pub fn book(
        &self,
        calendar_id: &str,
        slot: TimeWindow,
        title: &str,
    ) -> Result<Event, BookingError> {
        if slot.is_empty() {
            return Err(BookingError::InvalidSlot(slot));
        }

        let event = match self
            .source
            .create_event_if_free(EventDetails::new(calendar_id, title, slot))
        {
            Ok(event) => event,
            Err(SourceError::Busy { start, .. }) => return Err(BookingError::Conflict { start }),
            Err(err) => return Err(err.into()),
        };

        info!("Booked {} on {}", slot, calendar_id);

        Ok(event)
    }
}
