use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::common::entities::app_errors::CoreError;

use super::{ports::KeyValueStore, value_objects::StorageKey};

/// Parse a stored payload; a missing or unparseable payload reads as an
/// empty collection.
pub fn parse_document(raw: Option<&str>) -> Value {
    raw.and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_else(|| Value::Array(Vec::new()))
}

/// Raw payload under `key` plus its parsed form.
pub async fn read_document<S: KeyValueStore>(
    store: &S,
    key: StorageKey,
) -> Result<(Option<String>, Value), CoreError> {
    let raw = store.get(key.as_str()).await?;
    let document = parse_document(raw.as_deref());
    Ok((raw, document))
}

pub async fn write_document<S, T>(store: &S, key: StorageKey, value: &T) -> Result<(), CoreError>
where
    S: KeyValueStore,
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string(value)?;
    debug!(key = %key, bytes = payload.len(), "writing collection");
    store.set(key.as_str(), payload).await
}

/// Write `value` back only when its serialization differs from what was
/// read, so legacy or damaged payloads are replaced by their normalized form.
pub async fn heal_document<S, T>(
    store: &S,
    key: StorageKey,
    raw: Option<&str>,
    value: &T,
) -> Result<(), CoreError>
where
    S: KeyValueStore,
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string(value)?;
    if raw == Some(payload.as_str()) {
        return Ok(());
    }
    if raw.is_none() && payload == "[]" {
        return Ok(());
    }
    debug!(key = %key, "rewriting normalized collection");
    store.set(key.as_str(), payload).await
}
