// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sheet date normalization.
//!
//! Sheet cells hold dates in whatever format the sheet's author typed. Each
//! cell is tried against [`DATE_PATTERNS`] in order and the first pattern
//! that parses wins. Order matters: an ambiguous slash date such as
//! `03/04/2024` always resolves month-first, because the day-first pattern
//! is only reached when month-first fails.

use chrono::NaiveDate;

/// Parser for one textual date pattern.
pub type DateParser = fn(&str) -> Option<NaiveDate>;

/// Supported cell formats, in resolution order.
pub const DATE_PATTERNS: &[(&str, DateParser)] = &[
    ("YYYY-MM-DD", parse_iso),
    ("M/D/YYYY", parse_month_first_full_year),
    ("M/D/YY", parse_month_first_short_year),
    ("D/M/YYYY", parse_day_first_full_year),
    ("Month D, YYYY", parse_long_month_name),
    ("Mon D, YYYY", parse_short_month_name),
];

const LONG_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const SHORT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Canonical `YYYY-MM-DD` form of a date.
pub fn canonical_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a sheet cell with the first matching pattern.
pub fn parse_sheet_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_PATTERNS.iter().find_map(|(_, parse)| parse(value))
}

/// Normalize a sheet cell to `YYYY-MM-DD`.
///
/// Cells no pattern understands come back trimmed but otherwise unchanged,
/// so they simply never equal a canonical date.
pub fn normalize_date(value: &str) -> String {
    match parse_sheet_date(value) {
        Some(date) => canonical_date(date),
        None => value.trim().to_string(),
    }
}

/// ASCII digits only, with a length in `min..=max`.
fn digits(s: &str, min: usize, max: usize) -> Option<u32> {
    if s.len() < min || s.len() > max || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn three_parts(value: &str, sep: char) -> Option<(&str, &str, &str)> {
    let mut parts = value.split(sep);
    let first = parts.next()?;
    let second = parts.next()?;
    let third = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((first, second, third))
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// Two-digit years: 69-99 are 19xx, 00-68 are 20xx.
fn expand_short_year(year: u32) -> u32 {
    if year >= 69 {
        1900 + year
    } else {
        2000 + year
    }
}

fn parse_iso(value: &str) -> Option<NaiveDate> {
    let (y, m, d) = three_parts(value, '-')?;
    ymd(digits(y, 4, 4)?, digits(m, 1, 2)?, digits(d, 1, 2)?)
}

fn parse_month_first_full_year(value: &str) -> Option<NaiveDate> {
    let (m, d, y) = three_parts(value, '/')?;
    ymd(digits(y, 4, 4)?, digits(m, 1, 2)?, digits(d, 1, 2)?)
}

fn parse_month_first_short_year(value: &str) -> Option<NaiveDate> {
    let (m, d, y) = three_parts(value, '/')?;
    ymd(
        expand_short_year(digits(y, 2, 2)?),
        digits(m, 1, 2)?,
        digits(d, 1, 2)?,
    )
}

fn parse_day_first_full_year(value: &str) -> Option<NaiveDate> {
    let (d, m, y) = three_parts(value, '/')?;
    ymd(digits(y, 4, 4)?, digits(m, 1, 2)?, digits(d, 1, 2)?)
}

fn parse_long_month_name(value: &str) -> Option<NaiveDate> {
    parse_named_month(value, &LONG_MONTHS)
}

fn parse_short_month_name(value: &str) -> Option<NaiveDate> {
    parse_named_month(value, &SHORT_MONTHS)
}

/// `<Month> <D>, <YYYY>` with a case-insensitive month name.
fn parse_named_month(value: &str, names: &[&str; 12]) -> Option<NaiveDate> {
    let (name, rest) = value.split_once(char::is_whitespace)?;
    let month = names.iter().position(|n| n.eq_ignore_ascii_case(name))? as u32 + 1;

    let (day, year) = rest.trim_start().split_once(',')?;
    if !year.starts_with(char::is_whitespace) {
        return None;
    }
    ymd(digits(year.trim_start(), 4, 4)?, month, digits(day, 1, 2)?)
}
