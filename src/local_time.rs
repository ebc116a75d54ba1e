//! Offset-less local date-times read in a configured zone

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

const LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Interprets `YYYY-MM-DDTHH:MM[:SS[.fff]]` in `zone`
///
/// Ambiguous wall-clock times (DST fall-back) resolve to the earlier
/// instant; times skipped by a DST jump return `None`.
pub fn parse_local_date_time(input: &str, zone: &Tz) -> Option<DateTime<Utc>> {
    let input = input.trim();
    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .and_then(|naive| zone.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
}
