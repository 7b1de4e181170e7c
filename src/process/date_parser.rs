use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::process::utils::clean_str;

/// Plain date layouts, tried in order after the fast ISO path.
const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y", // September 9, 2019
    "%b %d, %Y", // Sep 9, 2019
    "%d-%b-%y",  // 9-Sep-19
    "%d %B %Y",  // 9 September 2019
    "%m/%d/%Y",  // 09/09/2019
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Fast parse of `"YYYY-MM-DD"` / `"YYYY/MM/DD"`, ignoring anything after the day.
fn parse_iso_prefix(s: &str) -> Option<NaiveDate> {
    let b = s.as_bytes();
    if b.len() < 10 || !matches!(b[4], b'-' | b'/') || b[7] != b[4] {
        return None;
    }
    if b.len() > 10 && !matches!(b[10], b' ' | b'T') {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[5..7].parse().ok()?;
    let day: u32 = s[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a `date_added` cell into a calendar date.
/// Returns None for blank or unrecognised input.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }
    if let Some(d) = parse_iso_prefix(&s) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&s, fmt).ok())
}
