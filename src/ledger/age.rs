// Age - Relative "time ago" labels for ledger timestamps

use chrono::{DateTime, Utc};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const MONTH: u64 = 30 * DAY;
const YEAR: u64 = 365 * DAY;

/// Label a unix timestamp relative to `now`, e.g. "about 5 hours ago".
///
/// A zero timestamp (never set on chain) yields an empty label.
pub fn format_time_ago(timestamp: u64, now: DateTime<Utc>) -> String {
    if timestamp == 0 {
        return String::new();
    }
    let Some(then) = i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    else {
        return String::new();
    };

    let elapsed = now.signed_duration_since(then).num_seconds();
    let distance = describe(elapsed.unsigned_abs());
    if elapsed >= 0 {
        format!("{} ago", distance)
    } else {
        format!("in {}", distance)
    }
}

fn rounded(secs: u64, unit: u64) -> u64 {
    (secs + unit / 2) / unit
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Distance buckets; each boundary sits half a unit before the next label
fn describe(secs: u64) -> String {
    match secs {
        s if s < 30 => "less than a minute".to_string(),
        s if s < 90 => "1 minute".to_string(),
        s if s < 44 * MINUTE + 30 => plural(rounded(s, MINUTE), "minute"),
        s if s < 89 * MINUTE + 30 => "about 1 hour".to_string(),
        s if s < DAY - 30 => format!("about {}", plural(rounded(s, HOUR), "hour")),
        s if s < 42 * HOUR - 30 => "1 day".to_string(),
        s if s < 30 * DAY - 30 => plural(rounded(s, DAY), "day"),
        s if s < 45 * DAY - 30 => "about 1 month".to_string(),
        s if s < 60 * DAY - 30 => "about 2 months".to_string(),
        s if s < YEAR => plural(rounded(s, MONTH).min(11), "month"),
        s => {
            let years = s / YEAR;
            let months = (s % YEAR) / MONTH;
            if months < 3 {
                format!("about {}", plural(years, "year"))
            } else if months < 9 {
                format!("over {}", plural(years, "year"))
            } else {
                format!("almost {} years", years + 1)
            }
        }
    }
}
