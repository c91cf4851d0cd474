// ABOUTME: Publication date resolution for episode stubs with ordered fallback tiers.
// ABOUTME: Listing date fragment first, then dates embedded in the title, then the current instant.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::time_parse::{midnight_utc, parse_flexible_time};

/// `[2023.11.02]`
static BRACKETED_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d{4})\.(\d{1,2})\.(\d{1,2})\]").unwrap());

/// `(3-4-24)` or `(03-04-2024)`, day first.
static PAREN_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d{1,2})-(\d{1,2})-(\d{4}|\d{2})\)").unwrap());

/// Inputs every date tier sees.
#[derive(Debug, Clone, Copy)]
pub struct DateClues<'a> {
    pub fragment: Option<&'a str>,
    pub title: &'a str,
}

type DateTier = fn(&DateClues<'_>) -> Option<DateTime<Utc>>;

/// Tiers in priority order; the first one to return a date wins.
const DATE_TIERS: &[(&str, DateTier)] = &[
    ("listing fragment", from_fragment),
    ("bracketed title date", from_bracketed_title),
    ("parenthesized title date", from_parenthesized_title),
];

/// Resolves a publication date, falling back to the current instant.
pub fn resolve_pub_date(fragment: Option<&str>, title: &str) -> DateTime<Utc> {
    resolve_pub_date_at(fragment, title, Utc::now())
}

/// Like [`resolve_pub_date`], with the fallback instant supplied by the caller.
pub fn resolve_pub_date_at(
    fragment: Option<&str>,
    title: &str,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let clues = DateClues { fragment, title };
    for (name, tier) in DATE_TIERS {
        if let Some(dt) = tier(&clues) {
            debug!(title, tier = name, date = %dt, "resolved publication date");
            return dt;
        }
    }
    debug!(title, "no date found, using current time");
    now
}

/// Tier 1: the listing's own date element.
pub fn from_fragment(clues: &DateClues<'_>) -> Option<DateTime<Utc>> {
    parse_flexible_time(clues.fragment?)
}

/// Tier 2a: `[YYYY.MM.DD]` anywhere in the title.
pub fn from_bracketed_title(clues: &DateClues<'_>) -> Option<DateTime<Utc>> {
    BRACKETED_DATE_RE.captures_iter(clues.title).find_map(|caps| {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        midnight_utc(NaiveDate::from_ymd_opt(year, month, day)?)
    })
}

/// Tier 2b: `(D-M-YY)` / `(DD-MM-YYYY)` anywhere in the title.
pub fn from_parenthesized_title(clues: &DateClues<'_>) -> Option<DateTime<Utc>> {
    PAREN_DATE_RE.captures_iter(clues.title).find_map(|caps| {
        let day = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let year_text = &caps[3];
        let mut year: i32 = year_text.parse().ok()?;
        if year_text.len() == 2 {
            year = expand_two_digit_year(year);
        }
        midnight_utc(NaiveDate::from_ymd_opt(year, month, day)?)
    })
}

/// Reads `YY` as 19YY, rolling anything before 1970 into the next century.
pub fn expand_two_digit_year(yy: i32) -> i32 {
    let year = 1900 + yy;
    if year < 1970 {
        year + 100
    } else {
        year
    }
}
