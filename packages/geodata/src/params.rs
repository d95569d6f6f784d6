//! Parameter-map cleaning shared by every entity normalizer.

use std::collections::BTreeMap;

use geojson::JsonObject;
use serde_json::Value;

/// Cleans a raw metadata map.
///
/// Entries whose value is `null` or an empty string are dropped. Remaining
/// keys are rewritten by replacing every character outside `[A-Za-z0-9_]`
/// with `_` and lower-casing. Key collisions after rewriting resolve
/// last-write-wins in the raw map's iteration order.
#[must_use]
pub fn clean_parameters(raw: &JsonObject) -> BTreeMap<String, Value> {
    let mut cleaned = BTreeMap::new();

    for (key, value) in raw {
        if value.is_null() {
            continue;
        }
        if value.as_str().is_some_and(str::is_empty) {
            continue;
        }
        cleaned.insert(sanitize_key(key), value.clone());
    }

    cleaned
}

/// Rewrites a metadata key: `[A-Za-z0-9_]` survives (lower-cased),
/// everything else becomes `_`.
#[must_use]
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Trims surrounding whitespace from the keys of a nested object field.
///
/// Border records carry a `border_posts` sub-map whose keys were entered
/// by hand upstream and occasionally contain stray spaces.
pub fn trim_nested_keys(map: &mut JsonObject, field: &str) {
    if let Some(Value::Object(nested)) = map.get_mut(field) {
        let trimmed: JsonObject = nested
            .iter()
            .map(|(key, value)| (key.trim().to_string(), value.clone()))
            .collect();
        *nested = trimmed;
    }
}
