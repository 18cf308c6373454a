//! Git-style dates for `before:` and `after:` parameters.
//!
//! Accepts absolute dates (RFC 3339, `YYYY-MM-DD`, `YYYY/MM/DD`,
//! `YYYY-MM-DD HH:MM:SS`), the keywords `now`, `today` and `yesterday`, and
//! relative forms such as `3 days ago` or `2.weeks.ago`. Everything is UTC.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GitDateError {
    #[error("unrecognized date: {0:?}")]
    Unrecognized(String),
    #[error("date out of range: {0:?}")]
    OutOfRange(String),
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

pub fn parse_git_date(value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, GitDateError> {
    let trimmed = value.trim();
    let lowered = trimmed.to_ascii_lowercase();

    match lowered.as_str() {
        "now" => return Ok(now),
        "today" => return Ok(start_of_day(now)),
        "yesterday" => return Ok(start_of_day(now) - Duration::days(1)),
        _ => {}
    }

    if let Some(t) = parse_relative(&lowered, now, trimmed)? {
        return Ok(t);
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(t.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(Utc.from_utc_datetime(&t));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)));
        }
    }

    Err(GitDateError::Unrecognized(trimmed.to_string()))
}

fn start_of_day(t: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&t.date_naive().and_time(NaiveTime::MIN))
}

/// `<n> <unit>[s] ago`, words separated by spaces or dots.
fn parse_relative(
    lowered: &str,
    now: DateTime<Utc>,
    original: &str,
) -> Result<Option<DateTime<Utc>>, GitDateError> {
    let words: Vec<&str> = lowered
        .split(|c: char| c == ' ' || c == '.')
        .filter(|w| !w.is_empty())
        .collect();

    let [amount, unit, "ago"] = words.as_slice() else {
        return Ok(None);
    };
    let Ok(amount) = amount.parse::<u32>() else {
        return Ok(None);
    };

    let out_of_range = || GitDateError::OutOfRange(original.to_string());
    let n = i64::from(amount);
    let t = match unit.trim_end_matches('s') {
        "second" | "sec" => Duration::try_seconds(n).and_then(|d| now.checked_sub_signed(d)),
        "minute" | "min" => Duration::try_minutes(n).and_then(|d| now.checked_sub_signed(d)),
        "hour" => Duration::try_hours(n).and_then(|d| now.checked_sub_signed(d)),
        "day" => Duration::try_days(n).and_then(|d| now.checked_sub_signed(d)),
        "week" => Duration::try_weeks(n).and_then(|d| now.checked_sub_signed(d)),
        "month" => now.checked_sub_months(Months::new(amount)),
        "year" => amount
            .checked_mul(12)
            .and_then(|m| now.checked_sub_months(Months::new(m))),
        _ => return Ok(None),
    };

    t.map(Some).ok_or_else(out_of_range)
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/git_date.rs"]
mod tests;
