//! Timestamp parsing and rendering.
//!
//! Input files carry publication times in many shapes. Parsing is best
//! effort: a value that matches none of the known layouts is kept verbatim.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Timelike};

/// Layout used for every timestamp this crate writes.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout used in generated file names.
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y年%m月%d日 %H:%M:%S",
    "%Y年%m月%d日 %H:%M",
    "%Y年%m月%d日%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日", "%Y%m%d"];

/// Parses a timestamp in any of the accepted layouts.
///
/// Accepted inputs are RFC 3339 (offset dropped, local wall time kept),
/// common date-time layouts with `-`, `/`, `.` or CJK separators, bare dates
/// (midnight) and 10/13 digit Unix epochs.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return parse_epoch(raw);
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn parse_epoch(digits: &str) -> Option<NaiveDateTime> {
    match digits.len() {
        8 => NaiveDate::parse_from_str(digits, "%Y%m%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0)),
        10 => {
            let secs: i64 = digits.parse().ok()?;
            DateTime::from_timestamp(secs, 0).map(|dt| dt.with_timezone(&Local).naive_local())
        },
        13 => {
            let millis: i64 = digits.parse().ok()?;
            DateTime::from_timestamp_millis(millis)
                .map(|dt| dt.with_timezone(&Local).naive_local())
        },
        _ => None,
    }
}

/// Normalizes a timestamp to [`DISPLAY_FORMAT`].
///
/// Returns the parsed flag alongside the value so callers can count values
/// kept verbatim.
#[must_use]
pub fn normalize_timestamp(raw: &str) -> (String, bool) {
    parse_timestamp(raw).map_or_else(
        || (raw.trim().to_string(), false),
        |dt| (format_timestamp(dt), true),
    )
}

/// Renders a timestamp in [`DISPLAY_FORMAT`].
#[must_use]
pub fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

/// Current local wall-clock time, truncated to whole seconds.
#[must_use]
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Renders a timestamp for use in file names.
#[must_use]
pub fn file_stamp(dt: NaiveDateTime) -> String {
    dt.format(FILE_STAMP_FORMAT).to_string()
}

/// Words that mark a column as a timestamp when they end its name.
const TIMESTAMP_WORDS: [&str; 4] = ["time", "date", "timestamp", "datetime"];

/// Returns true for column names that hold timestamps.
///
/// The name is split into words on `_`, `-`, `.`, spaces and camelCase
/// boundaries. It is a timestamp column when its last word is one of
/// [`TIMESTAMP_WORDS`], or `at` after at least one other word
/// (`processed_at`). `validated`, `timeline` and `update_notes` are not.
#[must_use]
pub fn is_timestamp_field(name: &str) -> bool {
    let words = field_words(name);
    match words.as_slice() {
        [] => false,
        [only] => TIMESTAMP_WORDS.contains(&only.as_str()),
        [.., last] => last == "at" || TIMESTAMP_WORDS.contains(&last.as_str()),
    }
}

fn field_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut after_lower = false;
    for c in name.chars() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            after_lower = false;
            continue;
        }
        if c.is_uppercase() && after_lower {
            words.push(std::mem::take(&mut current));
        }
        after_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2023-07-01 08:30:00", "2023-07-01 08:30:00"; "canonical")]
    #[test_case("2023-07-01T08:30:00", "2023-07-01 08:30:00"; "iso t separator")]
    #[test_case("2023-07-01 08:30:00.250", "2023-07-01 08:30:00"; "fractional seconds")]
    #[test_case("2023-07-01 08:30", "2023-07-01 08:30:00"; "minute precision")]
    #[test_case("2023/07/01 08:30:00", "2023-07-01 08:30:00"; "slashes")]
    #[test_case("2023年07月01日 08:30", "2023-07-01 08:30:00"; "cjk")]
    #[test_case("2023-07-01", "2023-07-01 00:00:00"; "bare date")]
    #[test_case("20230701", "2023-07-01 00:00:00"; "compact date")]
    #[test_case("2023-07-01T08:30:00+08:00", "2023-07-01 08:30:00"; "rfc3339 keeps wall time")]
    fn test_normalize_known_layouts(raw: &str, expected: &str) {
        let (value, parsed) = normalize_timestamp(raw);
        assert!(parsed);
        assert_eq!(value, expected);
    }

    #[test]
    fn test_unparseable_kept_verbatim() {
        let (value, parsed) = normalize_timestamp(" yesterday evening ");
        assert!(!parsed);
        assert_eq!(value, "yesterday evening");
    }

    #[test]
    fn test_epoch_values() {
        let expected = DateTime::from_timestamp(1_688_200_000, 0)
            .unwrap()
            .with_timezone(&Local)
            .naive_local();
        assert_eq!(parse_timestamp("1688200000"), Some(expected));
        assert_eq!(parse_timestamp("1688200000000"), Some(expected));
        assert_eq!(parse_timestamp("12345"), None);
    }

    #[test]
    fn test_file_stamp() {
        let dt = parse_timestamp("2024-01-02 03:04:05").unwrap();
        assert_eq!(file_stamp(dt), "20240102_030405");
    }

    #[test]
    fn test_now_has_no_fraction() {
        assert_eq!(now().nanosecond(), 0);
    }

    #[test_case("publish_time", true; "snake time")]
    #[test_case("publishTime", true; "camel time")]
    #[test_case("UpdateDate", true; "pascal date")]
    #[test_case("processed_at", true; "at suffix")]
    #[test_case("event-timestamp", true; "kebab timestamp")]
    #[test_case("date", true; "bare date")]
    #[test_case("title", false; "plain")]
    #[test_case("validated", false; "date inside word")]
    #[test_case("timeline", false; "time prefix")]
    #[test_case("update_notes", false; "date substring across words")]
    #[test_case("at", false; "bare at")]
    #[test_case("time_zone", false; "time not last")]
    fn test_timestamp_field_names(name: &str, expected: bool) {
        assert_eq!(is_timestamp_field(name), expected);
    }
}
