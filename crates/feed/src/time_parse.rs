// ABOUTME: Lenient date parsing for free-text date fragments scraped from listing pages.
// ABOUTME: Tries strict RFC forms, month-name forms, then dateparser; naive values are read as UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap());

/// A year, a numeric day/month pair, or a month name.
static DATE_PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b\d{4}\b|\b\d{1,2}[/.\-]\d{1,2}\b|\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\b|\d年",
    )
    .unwrap()
});

/// Month-name and numeric date-only layouts seen on listing pages.
/// Tried before dateparser so a bare date never shifts through the local zone.
const DATE_ONLY_FORMATS: &[&str] = &[
    "%B %d, %Y", // April 15, 2024 (also Apr 15, 2024)
    "%B %d %Y",  // April 15 2024
    "%d %B %Y",  // 15 April 2024
    "%d %B, %Y", // 15 April, 2024
    "%A, %B %d, %Y",
    "%b. %d, %Y", // Apr. 15, 2024
    "%m/%d/%Y",   // 04/15/2024
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d %b %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
];

/// Zone abbreviations that show up at the end of RFC 822 style dates.
const NAMED_ZONES: &[(&str, i32)] = &[
    ("GMT", 0),
    ("UTC", 0),
    ("EST", -5 * 3600),
    ("EDT", -4 * 3600),
    ("CST", -6 * 3600),
    ("CDT", -5 * 3600),
    ("MST", -7 * 3600),
    ("MDT", -6 * 3600),
    ("PST", -8 * 3600),
    ("PDT", -7 * 3600),
    ("CET", 3600),
    ("CEST", 2 * 3600),
    ("BST", 3600),
];

/// Parses a free-text date, returning it as UTC.
/// Returns None for empty input or when no layout matches.
pub fn parse_flexible_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Before RFC 2822: chrono reads unknown zone names there as +0000.
    if let Some(dt) = parse_with_named_zone(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // "15th" and friends trip up chrono's day parser.
    let cleaned = strip_ordinal_suffixes(s);

    for fmt in DATE_ONLY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return midnight_utc(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    // dateparser fills a missing date from the clock, so a bare time would land on today.
    if !DATE_PART_RE.is_match(&cleaned) {
        return None;
    }
    let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
    dateparser::parse_with(&cleaned, &Utc, midnight).ok()
}

/// Midnight UTC on the given calendar date.
pub fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

fn parse_with_named_zone(s: &str) -> Option<DateTime<Utc>> {
    const BASE_FORMATS: &[&str] = &[
        "%a, %d %b %Y %H:%M:%S",
        "%d %b %Y %H:%M:%S",
        "%a, %d %b %Y %H:%M",
    ];

    let (base, zone) = s.rsplit_once(' ')?;
    let (_, offset_secs) = NAMED_ZONES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(zone))?;
    let base = base.trim_end();
    let offset = FixedOffset::east_opt(*offset_secs)?;

    BASE_FORMATS.iter().find_map(|fmt| {
        let naive = NaiveDateTime::parse_from_str(base, fmt).ok()?;
        let dt = offset.from_local_datetime(&naive).single()?;
        Some(dt.with_timezone(&Utc))
    })
}

/// Turns "April 1st, 2024" into "April 1, 2024".
fn strip_ordinal_suffixes(s: &str) -> String {
    ORDINAL_RE.replace_all(s, "$1").into_owned()
}
