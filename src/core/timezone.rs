use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Placeholder rendered wherever a value is missing or unreadable
pub const NOT_AVAILABLE: &str = "N/A";

/// India Standard Time, UTC+05:30. Business dates are bucketed in this zone.
pub fn home_offset() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("Valid offset")
}

/// Convert UTC timestamp to the institute's local time
pub fn utc_to_home(utc_time: DateTime<Utc>) -> DateTime<FixedOffset> {
    utc_time.with_timezone(&home_offset())
}

/// Calendar date of a UTC instant as seen by the institute
pub fn home_date(utc_time: DateTime<Utc>) -> NaiveDate {
    utc_to_home(utc_time).date_naive()
}

/// Parse a stored record date.
///
/// Documents written by different dashboard versions carry plain dates, RFC 3339
/// timestamps, naive timestamps, or `dd/mm/yyyy`. Returns `None` for anything else.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&home_offset()).date_naive());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(ts.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}

/// Long human-readable date, e.g. `15 January 2025`
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Long date for an optional raw record value; `N/A` when absent or unparseable
pub fn format_record_date(raw: Option<&str>) -> String {
    raw.and_then(parse_record_date)
        .map(format_long_date)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Generation stamp for printed documents, e.g. `15 January 2025, 16:00 IST`
pub fn format_generated_at(utc_time: DateTime<Utc>) -> String {
    utc_to_home(utc_time)
        .format("%-d %B %Y, %H:%M IST")
        .to_string()
}

/// Format timestamp as ISO 8601 UTC for API responses
pub fn format_iso8601(utc_time: DateTime<Utc>) -> String {
    utc_time.to_rfc3339()
}
