// src/utils/convert.rs
//! Primitive converters from raw site strings to typed values.
//!
//! Optional converters return `None` on any format drift and never fail; the
//! `_strict` variants exist for the few fields a document cannot be valid
//! without. Callers holding an `Option<&str>` short-circuit with `and_then`.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::error::FieldError;

static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*(k*|m)$").expect("Failed to compile MONEY_RE")
});

static RANK_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)(?:\s*-\s*(\d+))?").expect("Failed to compile RANK_RANGE_RE")
});

/// Replaces non-breaking spaces, collapses runs of whitespace and trims.
pub fn clean_text(raw: &str) -> String {
    raw.replace("&#160;", " ")
        .replace("&nbsp;", " ")
        .replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case and whitespace insensitive key used for enum lookups.
pub fn normalize_key(raw: &str) -> String {
    clean_text(raw).to_lowercase()
}

/// Turns a row label such as `"Achievement Points:"` into `"achievement_points"`.
pub fn normalize_label(raw: &str) -> String {
    clean_text(&raw.replace(':', ""))
        .to_lowercase()
        .replace(['/', ' '], "_")
}

/// Parses an integer ignoring thousands separators and decoration (`"1,234"` -> `1234`).
pub fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(if trimmed.starts_with('-') { -value } else { value })
}

/// Like [`parse_integer`], falling back to `default` for empty or non-numeric input.
pub fn parse_integer_or(raw: &str, default: i64) -> i64 {
    parse_integer(raw).unwrap_or(default)
}

pub fn parse_integer_strict(raw: &str, field: &'static str) -> Result<i64, FieldError> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(FieldError::Format { field, value: raw.to_string() });
    }
    let value: i64 = digits.parse().map_err(|source| FieldError::Integer {
        value: raw.to_string(),
        source,
    })?;
    Ok(if trimmed.starts_with('-') { -value } else { value })
}

/// Parses a decimal decorated with a multiplier or percent sign (`"1.5x"`, `"50%"`).
pub fn parse_float(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, 'x' | 'X' | '%' | ',') && !c.is_whitespace())
        .collect();
    cleaned.parse().ok()
}

/// Parses gold amounts with `k` (thousands, repeatable) or `m` (millions) suffixes.
pub fn parse_money(raw: &str) -> Option<i64> {
    let cleaned = raw.replace(',', "").trim().to_lowercase();
    if let Ok(value) = cleaned.parse::<i64>() {
        return Some(value);
    }
    let caps = MONEY_RE.captures(&cleaned)?;
    let number: f64 = caps[1].parse().ok()?;
    let suffix = &caps[2];
    let multiplier = if suffix == "m" {
        1_000_000f64
    } else {
        1000f64.powi(suffix.len() as i32)
    };
    Some((number * multiplier).round() as i64)
}

/// Fixed UTC offset, in hours, of the timezone abbreviations the site and the JSON API print.
pub(crate) fn zone_offset_hours(zone: &str) -> Option<i32> {
    match zone {
        "CET" => Some(1),
        "CEST" => Some(2),
        "UTC" => Some(0),
        _ => None,
    }
}

/// Parses `"Mon DD YYYY, HH:MM:SS TZ"`, `"Mon DD YYYY, HH:MM TZ"` or RFC 3339 into UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = clean_text(raw);
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&cleaned) {
        return Some(parsed.with_timezone(&Utc));
    }
    let (stamp, zone) = cleaned.rsplit_once(' ')?;
    let offset = FixedOffset::east_opt(zone_offset_hours(zone)? * 3600)?;
    let stamp = stamp.replace(',', "");
    let naive = NaiveDateTime::parse_from_str(&stamp, "%b %d %Y %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&stamp, "%b %d %Y %H:%M"))
        .ok()?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn parse_datetime_strict(raw: &str) -> Result<DateTime<Utc>, FieldError> {
    parse_datetime(raw).ok_or_else(|| FieldError::Date(raw.to_string()))
}

/// Parses `"Mon DD YYYY"`, `"Mon DD, YYYY"`, `"Month DD, YYYY"` or `"YYYY-MM-DD"`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = clean_text(raw);
    if cleaned.is_empty() {
        return None;
    }
    ["%b %d %Y", "%b %d, %Y", "%B %d, %Y", "%B %d %Y", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(&cleaned)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

pub fn parse_date_strict(raw: &str) -> Result<NaiveDate, FieldError> {
    parse_date(raw).ok_or_else(|| FieldError::Date(raw.to_string()))
}

/// Parses an `HH:MM:SS` interval.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let parts: Vec<u64> = raw
        .trim()
        .split(':')
        .map(|p| p.trim().parse().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [h, m, s] if *m < 60 && *s < 60 => Some(Duration::from_secs(h * 3600 + m * 60 + s)),
        _ => None,
    }
}

/// Parses `"1-5"` into `(1, 5)` and `"10"` into `(10, 10)`. Reversed ranges are rejected.
pub fn parse_rank_range(raw: &str) -> Option<(u32, u32)> {
    let caps = RANK_RANGE_RE.captures(raw)?;
    let first: u32 = caps[1].parse().ok()?;
    let last = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => first,
    };
    (first <= last).then_some((first, last))
}

/// Splits `"A, B and C"` into `["A", "B", "C"]`.
///
/// Only the final element is split again on `last_separator`, at its last
/// occurrence. `None` stays `None` and a blank string yields an empty list.
pub fn split_list(items: Option<&str>, separator: &str, last_separator: &str) -> Option<Vec<String>> {
    let items = items?;
    if items.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut parts: Vec<&str> = items.split(separator).collect();
    if let Some(last) = parts.pop() {
        match last.rsplit_once(last_separator) {
            Some((head, tail)) => {
                parts.push(head);
                parts.push(tail);
            }
            None => parts.push(last),
        }
    }
    Some(parts.into_iter().map(|p| p.trim().to_string()).collect())
}

/// [`split_list`] with the site's usual `", "` / `" and "` separators.
pub fn split_names(items: Option<&str>) -> Option<Vec<String>> {
    split_list(items, ",", " and ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_split_list_laws() {
        assert_eq!(
            split_names(Some("A, B and C")),
            Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
        );
        assert_eq!(split_names(Some("")), Some(vec![]));
        assert_eq!(split_names(None), None);
        assert_eq!(split_names(Some("Solo")), Some(vec!["Solo".to_string()]));
    }

    #[test]
    fn test_split_list_uses_last_separator_occurrence() {
        let parts = split_list(Some("a dragon, Bread and Butter and a rat"), ",", " and ").unwrap();
        assert_eq!(parts, vec!["a dragon", "Bread and Butter", "a rat"]);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("1,234"), Some(1234));
        assert_eq!(parse_integer(" 2.500.000 "), Some(2_500_000));
        assert_eq!(parse_integer("-150"), Some(-150));
        assert_eq!(parse_integer("n/a"), None);
        assert_eq!(parse_integer_or("", 7), 7);
        assert!(parse_integer_strict("none", "level").is_err());
        assert_eq!(parse_integer_strict("1,000", "level").unwrap(), 1000);
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("500"), Some(500));
        assert_eq!(parse_money("1,500k"), Some(1_500_000));
        assert_eq!(parse_money("2kk"), Some(2_000_000));
        assert_eq!(parse_money("1.5k"), Some(1500));
        assert_eq!(parse_money("3m"), Some(3_000_000));
        assert_eq!(parse_money("lots"), None);
    }

    #[test]
    fn test_parse_datetime_zones() {
        let summer = parse_datetime("Aug 02 2018, 03:50:40 CEST").unwrap();
        assert_eq!((summer.month(), summer.day(), summer.hour()), (8, 2, 1));

        let winter = parse_datetime("Dec 10 2018, 21:53\u{a0}CET").unwrap();
        assert_eq!((winter.hour(), winter.minute(), winter.second()), (20, 53, 0));

        let iso = parse_datetime("2020-05-01T10:00:00Z").unwrap();
        assert_eq!(iso.hour(), 10);
    }

    #[test]
    fn test_date_fallback_never_fails() {
        for raw in ["", "Jul 20", "yesterday", "Foo 99 2018", "Aug 02 2018, 03:50:40 PST"] {
            assert!(parse_datetime(raw).is_none(), "{raw} should not parse");
        }
        assert!(parse_date("Jul 20").is_none());
        assert!(parse_date_strict("Jul 20").is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2015, 7, 23).unwrap();
        assert_eq!(parse_date("Jul 23 2015"), Some(expected));
        assert_eq!(parse_date("July 23, 2015"), Some(expected));
        assert_eq!(parse_date("2015-07-23"), Some(expected));
    }

    #[test]
    fn test_rank_range_and_duration() {
        assert_eq!(parse_rank_range("1-5"), Some((1, 5)));
        assert_eq!(parse_rank_range("10"), Some((10, 10)));
        assert_eq!(parse_rank_range("6 - 10"), Some((6, 10)));
        assert_eq!(parse_rank_range("none"), None);
        assert_eq!(parse_rank_range("5-1"), None);
        assert_eq!(parse_rank_range("3-3"), Some((3, 3)));
        assert_eq!(parse_duration("02:30:00"), Some(Duration::from_secs(9000)));
        assert_eq!(parse_duration("2h"), None);
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Achievement\u{a0}Points:"), "achievement_points");
        assert_eq!(normalize_label(" Level Gain/Loss: "), "level_gain_loss");
        assert_eq!(parse_float("1.5x"), Some(1.5));
        assert_eq!(parse_float("50%"), Some(50.0));
    }
}
