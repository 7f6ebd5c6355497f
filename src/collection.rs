// Whole-collection load/save over a key-value store

use crate::record::Record;
use crate::storage::KeyValueStore;
use eyre::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{error, info, warn};

/// Result of reading a stored collection
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    /// Stored value as read, kept so a lossy load can be backed up
    pub raw: String,
    /// Stored value was not an array, or some elements were dropped
    pub lossy: bool,
}

/// Key a lossy collection's raw value is copied to before it is overwritten
pub fn backup_key(key: &str) -> String {
    format!("{}-backup", key)
}

/// Read the collection stored under `T::storage_key()`
///
/// Returns `Ok(None)` when the key is absent. Malformed data never fails:
/// a value that is not a JSON array loads as empty, and array elements that
/// don't deserialize to `T` are skipped. When an id repeats, the first
/// occurrence wins. Only backing-store errors propagate.
pub fn load<T, S>(storage: &S) -> Result<Option<Loaded<T>>>
where
    T: Record,
    S: KeyValueStore + ?Sized,
{
    let key = T::storage_key();
    let Some(raw) = storage.get(key).context("Failed to read collection from storage")? else {
        return Ok(None);
    };

    let (records, lossy) = parse(key, &raw);
    Ok(Some(Loaded { records, raw, lossy }))
}

/// Parse a serialized collection, skipping anything malformed
///
/// The flag is true when anything in `raw` did not make it into the result.
pub fn parse<T: Record>(key: &str, raw: &str) -> (Vec<T>, bool) {
    let elements = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(elements)) => elements,
        Ok(other) => {
            error!(key, kind = value_kind(&other), "Stored value is not an array, treating as empty");
            return (Vec::new(), true);
        }
        Err(e) => {
            error!(key, error = ?e, "Failed to parse stored JSON, treating as empty");
            return (Vec::new(), true);
        }
    };

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(elements.len());
    let mut lossy = false;

    for (index, element) in elements.into_iter().enumerate() {
        let record: T = match serde_json::from_value(element) {
            Ok(r) => r,
            Err(e) => {
                error!(key, index, error = ?e, "Failed to parse record, skipping");
                lossy = true;
                continue;
            }
        };

        if !seen.insert(record.id().to_string()) {
            warn!(key, index, id = record.id(), "Duplicate id, keeping first occurrence");
            lossy = true;
            continue;
        }

        records.push(record);
    }

    info!(key, count = records.len(), lossy, "Loaded collection");
    (records, lossy)
}

/// Overwrite the collection stored under `T::storage_key()`
pub fn save<T, S>(storage: &mut S, records: &[T]) -> Result<()>
where
    T: Record,
    S: KeyValueStore + ?Sized,
{
    let key = T::storage_key();
    let json = serde_json::to_string(records).context("Failed to serialize collection")?;
    storage
        .set(key, &json)
        .with_context(|| format!("Failed to write collection {}", key))?;
    Ok(())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
