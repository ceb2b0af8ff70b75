//! Property enumeration order for JSON objects.

use serde_json::{Map, Value};

/// Entries of `fields` in property order: array-index keys (`"0"`, `"2"`,
/// `"10"`, ..) first in ascending numeric order, then every other key in
/// document order.
///
/// Relies on `serde_json/preserve_order` for the document order of the rest.
pub fn property_order(fields: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut indexed = Vec::new();
    let mut named = Vec::new();
    for (key, value) in fields {
        match array_index(key) {
            Some(index) => indexed.push((index, key, value)),
            None => named.push((key, value)),
        }
    }
    indexed.sort_by_key(|(index, _, _)| *index);

    indexed
        .into_iter()
        .map(|(_, key, value)| (key, value))
        .chain(named)
        .collect()
}

/// A canonical decimal in `0..u32::MAX`, with no sign and no leading zeros.
fn array_index(key: &str) -> Option<u32> {
    let index = key.parse::<u32>().ok()?;
    (index != u32::MAX && index.to_string() == key).then_some(index)
}
