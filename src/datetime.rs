//! Date/time utilities for Depot.

/// Convert a database datetime string (YYYY-MM-DD HH:MM:SS) to RFC3339 format.
///
/// This is useful for Web API responses where the frontend expects RFC3339 timestamps.
/// The database stores times in UTC, so this function appends 'Z' to indicate UTC.
///
/// # Arguments
///
/// * `datetime_str` - DateTime string in SQLite format (YYYY-MM-DD HH:MM:SS)
///
/// # Returns
///
/// RFC3339 formatted string (e.g., "2024-01-15T10:30:00Z")
pub fn to_rfc3339(datetime_str: &str) -> String {
    // Replace space with 'T' and append 'Z' for UTC
    format!("{}Z", datetime_str.replace(' ', "T"))
}
