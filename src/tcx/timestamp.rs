use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an ISO-8601 timestamp and converts it to local time.
///
/// Timestamps without a zone designator are taken to be UTC, which is what
/// devices write when they drop the trailing `Z`.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Local>> {
    let trimmed = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Local));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive).with_timezone(&Local))
}

/// Whole seconds from `from` to `to`, truncating any sub-second part.
pub fn secs_between(from: &DateTime<Local>, to: &DateTime<Local>) -> i64 {
    (*to - *from).num_seconds()
}
