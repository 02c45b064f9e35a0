use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parses a stored timestamp into a UTC wall-clock value.
///
/// Accepts RFC 3339 (offsets are normalised to UTC), ISO date-times with a
/// `T` or a space separator and optional fractional seconds, and bare
/// `YYYY-MM-DD` dates (midnight). Anything else is `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    // Postgres style offsets without minutes, e.g. `+00`.
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
