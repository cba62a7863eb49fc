//! Generic record grouping
//!
//! One grouping primitive replaces per-view hand-rolled loops. Key
//! extraction returning `None` excludes the record from every group, which
//! is what time-keyed views want for unparseable dates. Categorical views
//! use [`group_by_or`] so blank dimensions land in a visible catch-all
//! bucket instead of disappearing.

use std::collections::HashMap;

/// Catch-all bucket for records with a blank categorical dimension
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Group records by an optional key; `None` keys are excluded
pub fn group_by<T, F>(records: impl IntoIterator<Item = T>, key_fn: F) -> HashMap<String, Vec<T>>
where
    F: Fn(&T) -> Option<String>,
{
    let mut groups: HashMap<String, Vec<T>> = HashMap::new();
    for record in records {
        if let Some(key) = key_fn(&record) {
            groups.entry(key).or_default().push(record);
        }
    }
    groups
}

/// Group records by a categorical key, mapping blanks to [`UNKNOWN_GROUP`]
pub fn group_by_or<T, F>(records: impl IntoIterator<Item = T>, key_fn: F) -> HashMap<String, Vec<T>>
where
    F: Fn(&T) -> String,
{
    group_by(records, |record| {
        let key = key_fn(record);
        let trimmed = key.trim();
        if trimmed.is_empty() {
            Some(UNKNOWN_GROUP.to_string())
        } else {
            Some(trimmed.to_string())
        }
    })
}
