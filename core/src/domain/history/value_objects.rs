use serde_json::Value;

use super::entities::HistoryEntry;

pub const MAX_HISTORY_LEN: usize = 80;
pub const MAX_SUMMARIES: usize = 10;

/// Parse a stored history document, dropping malformed entries.
pub fn normalize_history(document: Value) -> Vec<HistoryEntry> {
    let Value::Array(items) = document else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<HistoryEntry>(item).ok())
        .filter(|entry| !entry.id.trim().is_empty())
        .take(MAX_HISTORY_LEN)
        .map(|mut entry| {
            entry.recipe_summaries.truncate(MAX_SUMMARIES);
            entry
        })
        .collect()
}
