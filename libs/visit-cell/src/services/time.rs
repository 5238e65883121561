use chrono::{DateTime, FixedOffset, NaiveDateTime};
use chrono_tz::Tz;

use crate::models::VisitError;

/// Wire format of booking timestamps, e.g. `2025-02-20 10:00:00+02:00`.
/// A zero offset may also be written as `Z`.
pub const OFFSET_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

pub fn parse_instant(raw: &str) -> Result<DateTime<FixedOffset>, VisitError> {
    let invalid = |reason: &str| VisitError::InvalidTimestamp(format!("{}: {}", raw, reason));

    let with_offset = match raw.strip_suffix('Z') {
        Some(local) => format!("{}+00:00", local),
        None if has_colon_offset(raw) => raw.to_string(),
        None => return Err(invalid("offset must be Z, +HH:mm or -HH:mm")),
    };

    DateTime::parse_from_str(&with_offset, OFFSET_TIMESTAMP_FORMAT)
        .map_err(|e| invalid(&e.to_string()))
}

/// `%:z` also accepts `+0200`; only `+02:00` is allowed on the wire.
fn has_colon_offset(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.len() < 6 {
        return false;
    }

    let offset = &bytes[bytes.len() - 6..];
    matches!(offset[0], b'+' | b'-')
        && offset[1].is_ascii_digit()
        && offset[2].is_ascii_digit()
        && offset[3] == b':'
        && offset[4].is_ascii_digit()
        && offset[5].is_ascii_digit()
}

pub fn resolve_zone(zone: &str) -> Result<Tz, VisitError> {
    zone.trim()
        .parse::<Tz>()
        .map_err(|_| VisitError::UnknownTimeZone(zone.to_string()))
}

/// Re-expresses the instant in `raw` as wall-clock time in `zone`.
pub fn normalize(raw: &str, zone: &str) -> Result<NaiveDateTime, VisitError> {
    let instant = parse_instant(raw)?;
    let tz = resolve_zone(zone)?;
    Ok(instant.with_timezone(&tz).naive_local())
}
