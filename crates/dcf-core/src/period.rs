//! Reporting period definitions and period-label parsing.
//!
//! This module defines [`Period`], the column key of a canonical statement.
//! Period labels from every provider go through the same parser so that the
//! same fiscal year gets the same label no matter where it came from.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reporting period on the axis of a canonical statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// End date of the reporting period.
    pub end: NaiveDate,
    /// Display label, the period end year.
    pub label: String,
}

impl Period {
    /// Creates a period ending on `end`.
    #[must_use]
    pub fn new(end: NaiveDate) -> Self {
        Self {
            end,
            label: end.year().to_string(),
        }
    }

    /// Parses a raw provider column/row label into a period.
    ///
    /// Returns `None` if the label carries no recognizable date or year.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        parse_period_end(label).map(Self::new)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Returns true if a label looks like a reporting period.
///
/// Only the first ten characters are inspected: a four-digit year in
/// 1900-2099 or a fiscal quarter token (`Q1`-`Q4`) marks a period.
#[must_use]
pub fn looks_like_period(label: &str) -> bool {
    let head: String = label.trim().chars().take(10).collect();
    find_year(&head).is_some() || find_quarter(&head).is_some()
}

/// Parses the end date of a period label.
///
/// Accepts `YYYY-MM-DD` prefixes (including timestamps such as
/// `2023-09-30 00:00:00`), bare years and fiscal-year tokens (`2023`, `FY2023`)
/// which map to 31 December, and quarter labels (`2023Q3`, `Q3 2023`) which
/// map to the calendar quarter end.
#[must_use]
pub fn parse_period_end(label: &str) -> Option<NaiveDate> {
    let label = label.trim();

    if let Some(prefix) = label.get(..10)
        && let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
    {
        return Some(date);
    }

    let year = find_year(label)?;
    let (month, day) = match find_quarter(label) {
        Some(1) => (3, 31),
        Some(2) => (6, 30),
        Some(3) => (9, 30),
        _ => (12, 31),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Finds the first standalone four-digit year in 1900-2099.
fn find_year(s: &str) -> Option<i32> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i - start == 4 {
            let year: i32 = s[start..i].parse().ok()?;
            if (1900..2100).contains(&year) {
                return Some(year);
            }
        }
    }
    None
}

/// Finds a fiscal quarter token `Q1`-`Q4`.
fn find_quarter(s: &str) -> Option<u32> {
    s.as_bytes().windows(2).find_map(|w| match (w[0], w[1]) {
        (b'Q', d @ b'1'..=b'4') => Some(u32::from(d - b'0')),
        _ => None,
    })
}
