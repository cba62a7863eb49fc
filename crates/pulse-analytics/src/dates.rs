//! Date normalization for spreadsheet cells
//!
//! Source sheets write dates day-first ("05/03/2024" is the 5th of March),
//! so slash-separated values are parsed with an explicit day-first rule
//! before any generic fallback runs. Unparseable values map to `None` and
//! are dropped from time series rather than guessed at.

use chrono::{Datelike, DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static DAY_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})(?:[ ,T].*)?$").expect("day-first pattern is valid")
});

static MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Calendar fields derived from one normalized date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarParts {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub quarter: u32,
}

impl CalendarParts {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            date,
            year: date.year(),
            month: date.month(),
            quarter: (date.month() - 1) / 3 + 1,
        }
    }

    /// Zero-padded "YYYY-MM" key; lexicographic order matches chronology
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn year_key(&self) -> String {
        format!("{:04}", self.year)
    }

    pub fn quarter_key(&self) -> String {
        format!("{:04}-Q{}", self.year, self.quarter)
    }

    /// "Mon YYYY" display label
    pub fn month_label(&self) -> String {
        format!(
            "{} {}",
            MONTH_ABBREVIATIONS[(self.month - 1) as usize],
            self.year
        )
    }
}

/// Parse one raw date cell into a normalized date
///
/// Slash-separated values are always read day-first. Anything else falls
/// through a short list of known formats; a value matching none of them
/// returns `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(captures) = DAY_FIRST.captures(trimmed) {
        let day: u32 = captures[1].parse().ok()?;
        let month: u32 = captures[2].parse().ok()?;
        let year: i32 = captures[3].parse().ok()?;
        let parsed = NaiveDate::from_ymd_opt(year, month, day);
        if parsed.is_none() {
            debug!("Rejected out-of-range day-first date '{}'", trimmed);
        }
        return parsed;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d-%m-%Y") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%b %d, %Y") {
        return Some(date);
    }

    debug!("Failed to parse date cell '{}'", trimmed);
    None
}

/// Calendar parts for one raw cell, or `None` when it does not parse
pub fn parse_parts(raw: &str) -> Option<CalendarParts> {
    parse_date(raw).map(CalendarParts::from_date)
}

/// Parse a payroll-style "Mon-YYYY" label into a "YYYY-MM" key
pub fn parse_month_year(raw: &str) -> Option<String> {
    month_year_to_date(raw).map(|date| CalendarParts::from_date(date).month_key())
}

/// Parse a payroll-style "Mon-YYYY" label into the first day of that month
pub fn month_year_to_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let (month_part, year_part) = trimmed.split_once('-')?;
    let month = MONTH_ABBREVIATIONS
        .iter()
        .position(|abbr| abbr.eq_ignore_ascii_case(month_part.trim()))?
        + 1;
    let year: i32 = year_part.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month as u32, 1)
}
