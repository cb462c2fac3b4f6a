//! Shared utility functions used across multiple modules.

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Lowercase form stored next to searchable text.
///
/// `SQLite` `LIKE` only folds ASCII, so search compares these Unicode-aware
/// lowercased copies instead of the original columns.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Current Unix timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
