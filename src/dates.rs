use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

// Anything the dashboard stores or receives as a date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateInput<'a> {
    DateTime(NaiveDateTime),
    // Unix milliseconds
    Timestamp(i64),
    Text(&'a str),
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(value: &'a str) -> Self {
        DateInput::Text(value)
    }
}

impl<'a> From<&'a String> for DateInput<'a> {
    fn from(value: &'a String) -> Self {
        DateInput::Text(value.as_str())
    }
}

impl From<i64> for DateInput<'_> {
    fn from(value: i64) -> Self {
        DateInput::Timestamp(value)
    }
}

impl From<NaiveDateTime> for DateInput<'_> {
    fn from(value: NaiveDateTime) -> Self {
        DateInput::DateTime(value)
    }
}

impl From<NaiveDate> for DateInput<'_> {
    fn from(value: NaiveDate) -> Self {
        DateInput::DateTime(value.and_time(chrono::NaiveTime::MIN))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateComparison {
    Before,
    Equal,
    After,
    Invalid,
}

impl From<Ordering> for DateComparison {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => DateComparison::Before,
            Ordering::Equal => DateComparison::Equal,
            Ordering::Greater => DateComparison::After,
        }
    }
}

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

cached_regex!(day_month_year_re, r"^(\d{2})[-/](\d{2})[-/](\d{4})$");

fn parse_text(input: &str) -> Option<NaiveDateTime> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    // Offsets are folded into local time
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(chrono::NaiveTime::MIN));
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    let caps = day_month_year_re().captures(s)?;
    let day = caps[1].parse::<u32>().ok()?;
    let month = caps[2].parse::<u32>().ok()?;
    let year = caps[3].parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.and_time(chrono::NaiveTime::MIN))
}

/// Normalizes `input` into a local instant, `None` when it cannot be parsed.
pub fn to_date<'a>(input: impl Into<DateInput<'a>>) -> Option<NaiveDateTime> {
    match input.into() {
        DateInput::DateTime(dt) => Some(dt),
        DateInput::Timestamp(millis) => DateTime::from_timestamp_millis(millis)
            .map(|dt| dt.with_timezone(&Local).naive_local()),
        DateInput::Text(text) => parse_text(text),
    }
}

pub fn is_valid_date<'a>(input: impl Into<DateInput<'a>>) -> bool {
    to_date(input).is_some()
}

/// Whether the calendar date of `input` falls strictly before `today`.
pub fn is_before_today<'a>(input: impl Into<DateInput<'a>>, today: NaiveDate) -> Option<bool> {
    to_date(input).map(|dt| dt.date() < today)
}

/// Whether the calendar date of `input` falls strictly after `today`.
pub fn is_after_today<'a>(input: impl Into<DateInput<'a>>, today: NaiveDate) -> Option<bool> {
    to_date(input).map(|dt| dt.date() > today)
}

pub fn is_before_now<'a>(input: impl Into<DateInput<'a>>) -> Option<bool> {
    is_before_today(input, today())
}

pub fn is_after_now<'a>(input: impl Into<DateInput<'a>>) -> Option<bool> {
    is_after_today(input, today())
}

pub fn compare_dates<'a, 'b>(
    a: impl Into<DateInput<'a>>,
    b: impl Into<DateInput<'b>>,
) -> DateComparison {
    match (to_date(a), to_date(b)) {
        (Some(a), Some(b)) => a.cmp(&b).into(),
        _ => DateComparison::Invalid,
    }
}

// Full precision, unlike is_before_today/is_after_today.
pub fn compare_to<'a>(input: impl Into<DateInput<'a>>, now: NaiveDateTime) -> DateComparison {
    compare_dates(input, now)
}

pub fn compare_to_now<'a>(input: impl Into<DateInput<'a>>) -> DateComparison {
    compare_to(input, now())
}

pub fn format_day_month_year(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_date_and_midnight_are_equal() {
        assert_eq!(
            compare_dates("2023-01-01", "2023-01-01T00:00:00"),
            DateComparison::Equal
        );
    }

    #[test]
    fn test_parse_day_month_year_forms() {
        let expected = date(2025, 11, 28).and_hms_opt(0, 0, 0);
        assert_eq!(to_date("28-11-2025"), expected);
        assert_eq!(to_date("28/11/2025"), expected);
    }

    #[test]
    fn test_parse_space_separated_time() {
        assert_eq!(
            to_date("2023-01-01 12:30:00"),
            date(2023, 1, 1).and_hms_opt(12, 30, 0)
        );
        assert_eq!(
            to_date("2023-01-01T12:30"),
            date(2023, 1, 1).and_hms_opt(12, 30, 0)
        );
    }

    #[test]
    fn test_invalid_inputs_yield_none() {
        assert_eq!(to_date("31-02-2023"), None);
        assert_eq!(to_date("not a date"), None);
        assert_eq!(to_date(""), None);
        assert_eq!(to_date("2023-13-01"), None);
        assert_eq!(to_date(i64::MAX), None);
    }

    #[test]
    fn test_is_valid_date_matches_to_date() {
        let inputs = [
            "2023-01-01",
            "01/01/2023",
            "2023-01-01T10:00:00Z",
            "garbage",
            "32-01-2023",
            "  ",
        ];
        for input in inputs {
            assert_eq!(is_valid_date(input), to_date(input).is_some(), "{input}");
        }
        assert!(is_valid_date(0_i64));
    }

    #[test]
    fn test_timestamp_matches_rfc3339() {
        let millis = 1_672_531_200_000_i64; // 2023-01-01T00:00:00Z
        assert_eq!(
            compare_dates(millis, "2023-01-01T00:00:00Z"),
            DateComparison::Equal
        );
    }

    #[test]
    fn test_compare_dates_is_antisymmetric() {
        let pairs = [
            ("2020-01-01", "2021-01-01"),
            ("01-06-2024", "2024-05-31T23:59:59"),
            ("2024-01-01 00:00:01", "2024-01-01"),
        ];
        for (a, b) in pairs {
            let forward = compare_dates(a, b);
            let backward = compare_dates(b, a);
            match forward {
                DateComparison::Before => assert_eq!(backward, DateComparison::After),
                DateComparison::After => assert_eq!(backward, DateComparison::Before),
                other => panic!("unexpected {other:?} for {a} / {b}"),
            }
        }
    }

    #[test]
    fn test_compare_dates_invalid() {
        assert_eq!(compare_dates("2020-01-01", "nope"), DateComparison::Invalid);
        assert_eq!(compare_dates("nope", "2020-01-01"), DateComparison::Invalid);
    }

    #[test]
    fn test_before_and_after_today_ignore_time() {
        let today = date(2025, 6, 15);
        assert_eq!(is_before_today("2025-06-14", today), Some(true));
        assert_eq!(is_before_today("2025-06-15T00:00:00", today), Some(false));
        assert_eq!(is_after_today("2025-06-15T23:59:59", today), Some(false));
        assert_eq!(is_after_today("16-06-2025", today), Some(true));
        assert_eq!(is_after_today("bad", today), None);
        assert_eq!(is_before_today("bad", today), None);
    }

    #[test]
    fn test_compare_to_uses_full_precision() {
        let now = date(2025, 6, 15).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(compare_to("2025-06-15", now), DateComparison::Before);
        assert_eq!(compare_to("2025-06-15 13:00", now), DateComparison::After);
        assert_eq!(compare_to(now, now), DateComparison::Equal);
        assert_eq!(compare_to("??", now), DateComparison::Invalid);
    }

    #[test]
    fn test_far_future_is_after_now() {
        assert_eq!(is_after_now("2999-01-01"), Some(true));
        assert_eq!(is_before_now("2999-01-01"), Some(false));
    }

    #[test]
    fn test_compare_to_now() {
        assert_eq!(compare_to_now("2999-01-01"), DateComparison::After);
        assert_eq!(compare_to_now("01/01/1999"), DateComparison::Before);
        assert_eq!(compare_to_now("mañana"), DateComparison::Invalid);
    }

    #[test]
    fn test_format_day_month_year() {
        assert_eq!(format_day_month_year(date(2025, 3, 7)), "07-03-2025");
    }
}
