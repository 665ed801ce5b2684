use crate::finder::SlotFinder;
use crate::request::SearchRequest;
use crate::time::{Event, TimeWindow};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Runs one search per `(request, busy_events)` pair, keeping input order.
///
/// With the `rayon` feature the searches run in parallel; the output is the
/// same either way.
pub fn find_available_slots_batch(
    finder: &SlotFinder,
    searches: &[(SearchRequest, Vec<Event>)],
) -> Vec<Vec<TimeWindow>> {
    #[cfg(feature = "rayon")]
    let iter = searches.par_iter();
    #[cfg(not(feature = "rayon"))]
    let iter = searches.iter();

    iter.map(|(request, busy_events)| finder.find(request, busy_events))
        .collect()
}
