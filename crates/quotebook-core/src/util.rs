//! Small helpers shared by the store, config and sync modules.

/// Trim optional text, treating blank strings as missing.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Wall-clock time as Unix milliseconds, the unit of `lastUpdated` and
/// `lastSync`.
pub fn unix_millis_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
