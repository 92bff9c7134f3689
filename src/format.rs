// Shared date formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format an ISO-8601 timestamp (as the server emits them) as a short
/// human-readable date, e.g. "Mar 5, 2024". Input that doesn't parse is
/// passed through unchanged so a server-side format change degrades to raw
/// text instead of hiding the value.
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%b %-d, %Y").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%b %-d, %Y").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%b %-d, %Y").to_string();
    }
    raw.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
