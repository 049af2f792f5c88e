//! Generic list-of-objects flattening for listing endpoints such as
//! `/institutions/get`.

use serde_json::Value;
use tracing::warn;

use crate::model::kind_of;
use crate::record::FlatRecord;

/// One row per object under `body[key]`. Nested values become compact JSON
/// text. `None` when `key` is missing or is not a list.
pub fn flatten_listing(body: &Value, key: &str) -> Option<Vec<FlatRecord>> {
    let entries = body.get(key)?.as_array()?;

    let records = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let Some(fields) = entry.as_object() else {
                warn!(key, index, found = kind_of(entry), "skipping listing entry that is not an object");
                return None;
            };
            let mut row = FlatRecord::new();
            for (column, value) in fields {
                match value {
                    Value::Object(_) | Value::Array(_) => row.set(column.as_str(), value.to_string()),
                    scalar => row.set(column.as_str(), scalar.clone()),
                }
            }
            Some(row)
        })
        .collect();

    Some(records)
}
