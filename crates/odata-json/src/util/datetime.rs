//! ISO 8601 date/time parsing and formatting utilities.
//!
//! Converts between the textual OData forms and the internal representations
//! used by the temporal scalars:
//! - Date: days since Unix epoch (1970-01-01)
//! - DateTimeOffset: seconds since Unix epoch (UTC) + nanoseconds
//! - TimeOfDay: seconds since midnight + nanoseconds
//! - Duration: sign + whole seconds + nanoseconds

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Error type for date/time parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeParseError {
    pub message: String,
}

impl DateTimeParseError {
    fn new(what: &str, input: &str) -> Self {
        Self {
            message: format!("Invalid {}: {}", what, input),
        }
    }
}

impl std::fmt::Display for DateTimeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DateTimeParseError {}

/// Parses a timezone offset string (Z, +HH:MM, -HH:MM) and returns offset in minutes.
fn parse_timezone_offset(offset: &str) -> Result<i64, DateTimeParseError> {
    if offset == "Z" || offset == "z" {
        return Ok(0);
    }

    if offset.len() != 6 || offset.as_bytes()[3] != b':' {
        return Err(DateTimeParseError::new("timezone offset", offset));
    }

    let sign = match offset.as_bytes()[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(DateTimeParseError::new("timezone offset", offset)),
    };

    let hours = parse_digits(&offset[1..3], "timezone offset", offset)?;
    let minutes = parse_digits(&offset[4..6], "timezone offset", offset)?;

    if hours > 24 || (hours == 24 && minutes != 0) || minutes > 59 {
        return Err(DateTimeParseError::new("timezone offset", offset));
    }

    Ok(sign * (hours * 60 + minutes))
}

/// Parses a run of ASCII digits, rejecting signs and whitespace.
fn parse_digits(s: &str, what: &str, input: &str) -> Result<i64, DateTimeParseError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateTimeParseError::new(what, input));
    }
    s.parse().map_err(|_| DateTimeParseError::new(what, input))
}

/// Parses a fractional seconds string (digits after the dot) into nanoseconds.
///
/// Digits beyond nanosecond precision are truncated.
fn parse_fractional_seconds(frac: &str, input: &str) -> Result<u32, DateTimeParseError> {
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateTimeParseError::new("fractional seconds", input));
    }
    let mut nanos: u32 = 0;
    for (i, b) in frac.bytes().take(9).enumerate() {
        nanos += (b - b'0') as u32 * 10u32.pow(8 - i as u32);
    }
    Ok(nanos)
}

/// Formats nanoseconds as a fractional seconds suffix, omitted if zero.
///
/// Trailing zeros are trimmed: 123_456_700 becomes ".1234567".
pub fn format_fraction(nanos: u32) -> String {
    if nanos == 0 {
        return String::new();
    }
    let digits = format!("{:09}", nanos);
    format!(".{}", digits.trim_end_matches('0'))
}

/// Splits `rest` into an optional fraction (without the dot) and the remainder.
fn split_fraction(rest: &str) -> (Option<&str>, &str) {
    match rest.strip_prefix('.') {
        Some(after) => {
            let end = after
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after.len());
            (Some(&after[..end]), &after[end..])
        }
        None => (None, rest),
    }
}

/// Returns true if the given year is a leap year.
fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Returns the number of days in a given month (1-indexed).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Calculates days since Unix epoch for a civil date (Howard Hinnant's algorithm).
pub fn days_from_civil(year: i32, month: u32, day: u32) -> i32 {
    let y = if month <= 2 { year - 1 } else { year } as i64;
    let m = if month <= 2 {
        month as i64 + 9
    } else {
        month as i64 - 3
    };

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u32; // year of era
    let doy = (153 * m as u32 + 2) / 5 + day - 1; // day of year
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // day of era

    (era * 146097 + doe as i64 - 719468) as i32
}

/// Converts days since Unix epoch to (year, month, day).
pub fn civil_from_days(days: i32) -> (i32, u32, u32) {
    let z = days as i64 + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32; // day of era
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365; // year of era
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // day of year
    let mp = (5 * doy + 2) / 153; // month index
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };

    let year = if m <= 2 { y + 1 } else { y } as i32;
    (year, m, d)
}

/// Splits seconds since epoch into (days since epoch, seconds of day).
fn split_epoch_seconds(epoch_seconds: i64) -> (i32, i64) {
    let days = epoch_seconds.div_euclid(SECONDS_PER_DAY);
    let secs = epoch_seconds.rem_euclid(SECONDS_PER_DAY);
    (days as i32, secs)
}

// =====================
// DATE functions
// =====================

/// Parses a date string (YYYY-MM-DD) and returns days since Unix epoch.
pub fn parse_date(date_str: &str) -> Result<i32, DateTimeParseError> {
    let b = date_str.as_bytes();
    if b.len() != 10 || b[4] != b'-' || b[7] != b'-' {
        return Err(DateTimeParseError::new("date", date_str));
    }

    let year = parse_digits(&date_str[..4], "year in date", date_str)? as i32;
    let month = parse_digits(&date_str[5..7], "month in date", date_str)? as u32;
    let day = parse_digits(&date_str[8..10], "day in date", date_str)? as u32;

    if !(1..=12).contains(&month) {
        return Err(DateTimeParseError::new("month in date", date_str));
    }
    if day < 1 || day > days_in_month(year, month) {
        return Err(DateTimeParseError::new("day in date", date_str));
    }

    Ok(days_from_civil(year, month, day))
}

/// Formats days since Unix epoch as a date string (YYYY-MM-DD).
pub fn format_date(days: i32) -> String {
    let (year, month, day) = civil_from_days(days);
    format!("{:04}-{:02}-{:02}", year, month, day)
}

// =====================
// TIME OF DAY functions
// =====================

/// Parses a time of day (HH:MM:SS[.fffffffff]) and returns seconds since midnight
/// and nanoseconds.
pub fn parse_time_of_day(time_str: &str) -> Result<(u32, u32), DateTimeParseError> {
    let b = time_str.as_bytes();
    if b.len() < 8 || b[2] != b':' || b[5] != b':' || !time_str.is_char_boundary(8) {
        return Err(DateTimeParseError::new("time of day", time_str));
    }

    let hours = parse_digits(&time_str[..2], "hours in time", time_str)?;
    let minutes = parse_digits(&time_str[3..5], "minutes in time", time_str)?;
    let seconds = parse_digits(&time_str[6..8], "seconds in time", time_str)?;

    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(DateTimeParseError::new("time of day", time_str));
    }

    let (fraction, rest) = split_fraction(&time_str[8..]);
    if !rest.is_empty() {
        return Err(DateTimeParseError::new("time of day", time_str));
    }
    let nanos = match fraction {
        Some(f) => parse_fractional_seconds(f, time_str)?,
        None => 0,
    };

    let secs = hours * SECONDS_PER_HOUR + minutes * SECONDS_PER_MINUTE + seconds;
    Ok((secs as u32, nanos))
}

/// Formats seconds since midnight plus nanoseconds as HH:MM:SS[.f].
pub fn format_time_of_day(seconds_of_day: u32, nanos: u32) -> String {
    let secs = seconds_of_day as i64;
    let hours = secs / SECONDS_PER_HOUR;
    let minutes = (secs % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = secs % SECONDS_PER_MINUTE;

    format!(
        "{:02}:{:02}:{:02}{}",
        hours,
        minutes,
        seconds,
        format_fraction(nanos)
    )
}

// =====================
// DATETIME functions
// =====================

/// Parses an RFC 3339 datetime string and returns UTC seconds since Unix epoch
/// and nanoseconds.
///
/// The offset is applied and discarded; the result is always normalized to UTC.
pub fn parse_datetime_offset(datetime_str: &str) -> Result<(i64, u32), DateTimeParseError> {
    let b = datetime_str.as_bytes();
    if b.len() < 19 || (b[10] != b'T' && b[10] != b't') || !datetime_str.is_char_boundary(19) {
        return Err(DateTimeParseError::new("datetime", datetime_str));
    }

    let days = parse_date(&datetime_str[..10])
        .map_err(|_| DateTimeParseError::new("date in datetime", datetime_str))?;

    let time_part = &datetime_str[11..];
    let (time_main, rest) = time_part.split_at(8);
    let (secs_of_day, _) = parse_time_of_day(time_main)
        .map_err(|_| DateTimeParseError::new("time in datetime", datetime_str))?;

    let (fraction, offset_str) = split_fraction(rest);
    let nanos = match fraction {
        Some(f) => parse_fractional_seconds(f, datetime_str)?,
        None => 0,
    };
    if offset_str.is_empty() {
        return Err(DateTimeParseError::new("datetime (missing offset)", datetime_str));
    }
    let offset_min = parse_timezone_offset(offset_str)?;

    // local time = UTC + offset, so UTC = local - offset
    let local = days as i64 * SECONDS_PER_DAY + secs_of_day as i64;
    Ok((local - offset_min * SECONDS_PER_MINUTE, nanos))
}

/// Formats UTC seconds since Unix epoch as an ISO 8601 datetime with a `Z` suffix.
pub fn format_datetime_offset(epoch_seconds: i64, nanos: u32) -> String {
    let (days, secs) = split_epoch_seconds(epoch_seconds);
    let (year, month, day) = civil_from_days(days);

    format!(
        "{:04}-{:02}-{:02}T{}Z",
        year,
        month,
        day,
        format_time_of_day(secs as u32, nanos)
    )
}

// =====================
// DURATION functions
// =====================

/// Parses an ISO 8601 day-time duration (`[-]P[nD][T[nH][nM][n[.f]S]]`).
///
/// Returns (negative, whole seconds, nanoseconds).
pub fn parse_duration(duration_str: &str) -> Result<(bool, u64, u32), DateTimeParseError> {
    let (negative, body) = match duration_str.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, duration_str),
    };
    let body = body
        .strip_prefix('P')
        .ok_or_else(|| DateTimeParseError::new("duration", duration_str))?;

    let (date_part, time_part) = match body.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (body, None),
    };

    let mut total: u64 = 0;
    let mut nanos: u32 = 0;

    if !date_part.is_empty() {
        let days = date_part
            .strip_suffix('D')
            .ok_or_else(|| DateTimeParseError::new("duration", duration_str))?;
        total += parse_digits(days, "days in duration", duration_str)? as u64 * SECONDS_PER_DAY as u64;
    }

    if let Some(mut t) = time_part {
        if t.is_empty() {
            return Err(DateTimeParseError::new("duration", duration_str));
        }
        for (unit, factor) in [('H', SECONDS_PER_HOUR), ('M', SECONDS_PER_MINUTE)] {
            if let Some((n, rest)) = t.split_once(unit) {
                total += parse_digits(n, "duration", duration_str)? as u64 * factor as u64;
                t = rest;
            }
        }
        if !t.is_empty() {
            let secs = t
                .strip_suffix('S')
                .ok_or_else(|| DateTimeParseError::new("duration", duration_str))?;
            let (whole, fraction) = match secs.split_once('.') {
                Some((w, f)) => (w, Some(f)),
                None => (secs, None),
            };
            total += parse_digits(whole, "seconds in duration", duration_str)? as u64;
            if let Some(f) = fraction {
                nanos = parse_fractional_seconds(f, duration_str)?;
            }
        }
    } else if date_part.is_empty() {
        return Err(DateTimeParseError::new("duration", duration_str));
    }

    Ok((negative, total, nanos))
}

/// Formats a duration as `[-]P[nD]T[nH][nM]n[.f]S`.
///
/// Days, hours and minutes are written only when nonzero; seconds are always
/// written, so zero is `PT0S` and one hour is `PT1H0S`.
pub fn format_duration(negative: bool, seconds: u64, nanos: u32) -> String {
    let days = seconds / SECONDS_PER_DAY as u64;
    let rem = seconds % SECONDS_PER_DAY as u64;
    let hours = rem / SECONDS_PER_HOUR as u64;
    let minutes = (rem % SECONDS_PER_HOUR as u64) / SECONDS_PER_MINUTE as u64;
    let secs = rem % SECONDS_PER_MINUTE as u64;

    let mut out = String::with_capacity(16);
    if negative && (seconds != 0 || nanos != 0) {
        out.push('-');
    }
    out.push('P');
    if days != 0 {
        out.push_str(&format!("{}D", days));
    }
    out.push('T');
    if hours != 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes != 0 {
        out.push_str(&format!("{}M", minutes));
    }
    out.push_str(&format!("{}{}S", secs, format_fraction(nanos)));
    out
}

/// Validates a nanosecond count.
pub(crate) fn valid_nanos(nanos: u32) -> bool {
    nanos < NANOS_PER_SECOND
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_date_basic() {
        assert_eq!(parse_date("1970-01-01").unwrap(), 0);
        assert_eq!(parse_date("2024-03-15").unwrap(), 19797);
        assert_eq!(parse_date("2000-02-29").unwrap(), 11016);
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("2024-3-15").is_err());
        assert!(parse_date("+024-03-15").is_err());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(0), "1970-01-01");
        assert_eq!(format_date(19797), "2024-03-15");
        assert_eq!(format_date(days_from_civil(1958, 12, 3)), "1958-12-03");
    }

    #[test]
    fn test_format_datetime_offset() {
        let (secs, nanos) = parse_datetime_offset("2012-12-03T07:16:23Z").unwrap();
        assert_eq!(format_datetime_offset(secs, nanos), "2012-12-03T07:16:23Z");

        let (secs, nanos) = parse_datetime_offset("2012-10-03T07:16:23.1234567Z").unwrap();
        assert_eq!(nanos, 123_456_700);
        assert_eq!(format_datetime_offset(secs, nanos), "2012-10-03T07:16:23.1234567Z");
    }

    #[test]
    fn test_datetime_offset_normalized_to_utc() {
        let (secs, _) = parse_datetime_offset("2024-03-15T14:30:00+05:30").unwrap();
        assert_eq!(format_datetime_offset(secs, 0), "2024-03-15T09:00:00Z");

        let (secs, _) = parse_datetime_offset("1948-02-17T09:09:09Z").unwrap();
        assert!(secs < 0);
        assert_eq!(format_datetime_offset(secs, 0), "1948-02-17T09:09:09Z");
    }

    #[test]
    fn test_datetime_requires_offset() {
        assert!(parse_datetime_offset("2012-12-03T07:16:23").is_err());
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(parse_time_of_day("03:26:05").unwrap(), (12365, 0));
        assert_eq!(format_time_of_day(12365, 0), "03:26:05");
        assert_eq!(format_time_of_day(86399, 500_000_000), "23:59:59.5");
        assert!(parse_time_of_day("24:00:00").is_err());
        assert!(parse_time_of_day("03:26:05Z").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(false, 6, 0), "PT6S");
        assert_eq!(format_duration(false, 0, 0), "PT0S");
        assert_eq!(format_duration(false, 3600, 0), "PT1H0S");
        assert_eq!(format_duration(false, 5 * 3600 + 28 * 60, 0), "PT5H28M0S");
        assert_eq!(format_duration(false, 86400 + 61, 250_000_000), "P1DT1M1.25S");
        assert_eq!(format_duration(true, 13, 0), "-PT13S");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("PT6S").unwrap(), (false, 6, 0));
        assert_eq!(parse_duration("PT5H28M0S").unwrap(), (false, 19680, 0));
        assert_eq!(parse_duration("-P1DT0.5S").unwrap(), (true, 86400, 500_000_000));
        assert_eq!(parse_duration("P2D").unwrap(), (false, 172800, 0));
        assert!(parse_duration("PT").is_err());
        assert!(parse_duration("6S").is_err());
    }

    proptest! {
        #[test]
        fn test_date_roundtrip(days in -719_468i32..2_932_896) {
            prop_assert_eq!(parse_date(&format_date(days)).unwrap(), days);
        }

        #[test]
        fn test_datetime_roundtrip(secs in -62_135_596_800i64..253_402_300_799, nanos in 0u32..1_000_000_000) {
            let text = format_datetime_offset(secs, nanos);
            prop_assert_eq!(parse_datetime_offset(&text).unwrap(), (secs, nanos));
        }

        #[test]
        fn test_duration_roundtrip(neg in any::<bool>(), secs in 1u64..10_000_000, nanos in 0u32..1_000_000_000) {
            let text = format_duration(neg, secs, nanos);
            prop_assert_eq!(parse_duration(&text).unwrap(), (neg, secs, nanos));
        }
    }
}
