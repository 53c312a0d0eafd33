// Field validation for raw log records
//
// Every check fails closed: anything that does not parse is invalid.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::constants::SOURCE_HEADER_TOKEN;
use crate::store::PositionEntry;

/// The fields of one log row the bridge cares about, exactly as read.
/// `None` means the row was too short to carry the column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub isotime: Option<String>,
    pub source: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub comment: Option<String>,
}

/// Offset-carrying layouts, tried after a trailing `Z` has become `+00:00`.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Zone-less layouts. Dire Wolf logs UTC, so these are read as UTC.
const NAIVE_FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// A bare calendar date is midnight UTC.
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn source_valid(source: Option<&str>) -> bool {
    match source {
        Some(s) => !s.trim().is_empty() && s != SOURCE_HEADER_TOKEN,
        None => false,
    }
}

pub fn latitude_valid(latitude: Option<&str>) -> bool {
    parse_latitude(latitude).is_some()
}

pub fn longitude_valid(longitude: Option<&str>) -> bool {
    parse_longitude(longitude).is_some()
}

pub fn isotime_valid(isotime: Option<&str>) -> bool {
    isotime.and_then(parse_isotime).is_some()
}

/// Parse a latitude strictly inside (-90, 90).
pub fn parse_latitude(latitude: Option<&str>) -> Option<f64> {
    parse_within(latitude?, 90.0)
}

/// Parse a longitude strictly inside (-180, 180).
pub fn parse_longitude(longitude: Option<&str>) -> Option<f64> {
    parse_within(longitude?, 180.0)
}

fn parse_within(text: &str, limit: f64) -> Option<f64> {
    let value: f64 = text.trim().parse().ok()?;
    // NaN fails both comparisons, infinities fail one.
    (value > -limit && value < limit).then_some(value)
}

/// Parse an ISO-8601 date-time into UTC.
///
/// A trailing `Z` is normalized to `+00:00` here, at the boundary; everything
/// past this point works with `DateTime<Utc>`. Seconds may be omitted, and a
/// bare date is read as midnight UTC.
pub fn parse_isotime(isotime: &str) -> Option<DateTime<Utc>> {
    let text = isotime.trim();
    let normalized = match text.strip_suffix('Z') {
        Some(stem) => format!("{}+00:00", stem),
        None => text.to_string(),
    };

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(dt.and_utc());
        }
    }
    let date = NaiveDate::parse_from_str(text.strip_suffix('Z').unwrap_or(text), DATE_FORMAT).ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// True when all four required fields pass. The comment is never checked.
pub fn validate(record: &RawRecord) -> bool {
    source_valid(record.source.as_deref())
        && latitude_valid(record.latitude.as_deref())
        && longitude_valid(record.longitude.as_deref())
        && isotime_valid(record.isotime.as_deref())
}

/// Validate a record and build the entry it describes.
pub fn admit(record: &RawRecord) -> Option<PositionEntry> {
    let source = record.source.as_deref()?;
    if !source_valid(Some(source)) {
        return None;
    }
    let latitude = parse_latitude(record.latitude.as_deref())?;
    let longitude = parse_longitude(record.longitude.as_deref())?;
    let isotime = record.isotime.as_deref()?;
    let timestamp = parse_isotime(isotime)?;

    Some(PositionEntry {
        source: source.to_string(),
        timestamp,
        isotime: isotime.to_string(),
        latitude,
        longitude,
        comment: record.comment.as_deref().unwrap_or("").trim().to_string(),
    })
}
