use serde_json::{Map, Value};

use super::entities::AnalyticsEvent;

/// Queue length cap; the oldest events are evicted first.
pub const MAX_QUEUE_LEN: usize = 500;

/// What a flush attempt did. Flushing never reports an error: failed
/// deliveries stay queued for the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Analytics is turned off in configuration.
    Disabled,
    /// Nothing was queued; no request was made.
    Empty,
    /// The batch was acknowledged and removed from the queue.
    Delivered(usize),
    /// Delivery failed; the events are still queued.
    Retained(usize),
    /// The queue could not be read.
    Unavailable,
}

/// Event properties from a JSON object literal; anything else means none.
pub fn properties(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) if !map.is_empty() => Some(map),
        _ => None,
    }
}

/// Parse a stored queue document, dropping entries that no longer
/// deserialize.
pub fn normalize_queue(document: Value) -> Vec<AnalyticsEvent> {
    let Value::Array(items) = document else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

/// Drop the oldest events until at most `cap` remain.
pub fn enforce_cap(queue: &mut Vec<AnalyticsEvent>, cap: usize) {
    if queue.len() > cap {
        let excess = queue.len() - cap;
        queue.drain(..excess);
    }
}
