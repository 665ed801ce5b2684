pub mod batch;
pub mod finder;
pub mod request;
pub mod scheduler;
pub mod source;
pub mod time;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use batch::find_available_slots_batch;
pub use finder::{
    find_available_slots, ConflictFilter, SlotFinder, SlotPolicy, DEFAULT_MAX_SLOTS, WEEKEND,
};
pub use request::{RequestError, SearchRequest, WorkingHours, DEFAULT_WORKING_HOURS};
pub use scheduler::{BookingError, Scheduler};
pub use source::{EventDetails, EventSource, InMemoryEventSource, SourceError};
pub use time::{Event, TimeWindow};
