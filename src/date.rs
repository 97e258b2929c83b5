use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::error::{ModelError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Format used when writing dates back out (data file, display)
pub const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse event date text.
///
/// Accepts `YYYY-MM-DD` (midnight) or `YYYY-MM-DD HH:MM`, with an optional
/// `T` separator or seconds. Seconds are dropped.
pub fn parse_date(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(truncate_to_minute(parsed));
        }
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ModelError::Parse {
            input: input.to_string(),
        })
}

/// Clear seconds and sub-seconds; event dates have minute precision
pub fn truncate_to_minute(date: NaiveDateTime) -> NaiveDateTime {
    date.with_nanosecond(0)
        .and_then(|d| d.with_second(0))
        .unwrap_or(date)
}

pub fn format_date(date: &NaiveDateTime) -> String {
    date.format(OUTPUT_FORMAT).to_string()
}
