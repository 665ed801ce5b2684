//! Browser bindings for scheduling front ends.

use crate::finder::SlotFinder;
use crate::request::SearchRequest;
use crate::time::Event;
use wasm_bindgen::prelude::*;

/// `findAvailableSlots(request, events)` with the default finder.
///
/// `request` and `events` use the camelCase JSON shapes of
/// [`SearchRequest`] and [`Event`]; instants are RFC 3339 strings.
#[wasm_bindgen(js_name = findAvailableSlots)]
pub fn find_available_slots(request: JsValue, events: JsValue) -> Result<JsValue, JsValue> {
    find_with(SlotFinder::default(), request, events)
}

/// Same as `findAvailableSlots` with an explicit finder configuration
/// (`maxResults`, `nonWorkingDays`, `policy`, `conflicts`).
#[wasm_bindgen(js_name = findAvailableSlotsWith)]
pub fn find_available_slots_with(
    finder: JsValue,
    request: JsValue,
    events: JsValue,
) -> Result<JsValue, JsValue> {
    let finder: SlotFinder = serde_wasm_bindgen::from_value(finder)?;
    find_with(finder, request, events)
}

fn find_with(finder: SlotFinder, request: JsValue, events: JsValue) -> Result<JsValue, JsValue> {
    let request: SearchRequest = serde_wasm_bindgen::from_value(request)?;
    let events: Vec<Event> = serde_wasm_bindgen::from_value(events)?;

    let slots = finder.find(&request, &events);

    Ok(serde_wasm_bindgen::to_value(&slots)?)
}
