//! Timestamp parsing and calendar-day arithmetic in server-local time

use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};

/// Parse an ISO 8601 timestamp.
///
/// Accepts RFC 3339 (`2024-01-15T09:30:00Z`, with offset), a naive
/// date-time (`2024-01-15T09:30:00[.fff]`, server-local) or a bare date
/// (`2024-01-15`, server-local midnight).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return local_to_utc(naive);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return local_to_utc(date.and_time(NaiveTime::MIN));
    }
    Err(format!("'{}' is not a valid ISO 8601 date", raw))
}

/// Half-open `[start, end)` bounds of the local calendar day named by `raw`.
///
/// A bare date names that day directly; a full timestamp names the local
/// day it falls on.
pub fn local_day_bounds(raw: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
    let raw = raw.trim();
    let day = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(day) => day,
        Err(_) => parse_timestamp(raw)?.with_timezone(&Local).date_naive(),
    };
    let next = day
        .succ_opt()
        .ok_or_else(|| format!("'{}' is out of range", raw))?;

    Ok((
        local_to_utc(day.and_time(NaiveTime::MIN))?,
        local_to_utc(next.and_time(NaiveTime::MIN))?,
    ))
}

fn local_to_utc(naive: NaiveDateTime) -> Result<DateTime<Utc>, String> {
    resolve_local(naive, |candidate| Local.from_local_datetime(candidate))
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("'{}' does not exist in the server time zone", naive))
}

/// Longest DST gap searched past a nonexistent local time
const MAX_GAP_MINUTES: i64 = 180;

/// Resolve a local wall-clock time. An overlap takes the earlier instant; a
/// time inside a DST gap moves forward to the first minute that exists.
fn resolve_local<T>(
    naive: NaiveDateTime,
    lookup: impl Fn(&NaiveDateTime) -> LocalResult<T>,
) -> Option<T> {
    (0..=MAX_GAP_MINUTES).find_map(|minutes| {
        let candidate = naive.checked_add_signed(Duration::minutes(minutes))?;
        lookup(&candidate).earliest()
    })
}
