//! Portuguese date text.
//!
//! Three shapes are understood, case-insensitive:
//!
//! - `22 de dezembro de 2025`
//! - `22 de dezembro de 2025 a 2 de janeiro de 2026` (inclusive; reversed ends are swapped)
//! - `16 e 17 de fevereiro de 2026`

use chrono::{Days, NaiveDate};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateTextError {
    #[error("Unrecognised Portuguese date: {0:?}")]
    Format(String),
    #[error("Unknown Portuguese month: {0:?}")]
    Month(String),
    #[error("Day {day} does not exist in {month:02}/{year}")]
    Day { day: u32, month: u32, year: i32 },
}

const MONTHS: [(&str, u32); 13] = [
    ("janeiro", 1),
    ("fevereiro", 2),
    ("março", 3),
    ("marco", 3),
    ("abril", 4),
    ("maio", 5),
    ("junho", 6),
    ("julho", 7),
    ("agosto", 8),
    ("setembro", 9),
    ("outubro", 10),
    ("novembro", 11),
    ("dezembro", 12),
];

fn month_number(name: &str) -> Result<u32, DateTextError> {
    MONTHS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|(_, number)| *number)
        .ok_or_else(|| DateTextError::Month(name.to_string()))
}

fn build_date(year: i32, month: u32, day: u32) -> Result<NaiveDate, DateTextError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(DateTextError::Day { day, month, year })
}

fn number<T: std::str::FromStr>(token: &str, original: &str) -> Result<T, DateTextError> {
    token
        .parse()
        .map_err(|_| DateTextError::Format(original.to_string()))
}

/// Parses a single date: `"22 de dezembro de 2025"`.
pub fn parse_pt_date(text: &str) -> Result<NaiveDate, DateTextError> {
    let lowered = text.trim().to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();
    match tokens.as_slice() {
        [day, "de", month, "de", year] if day.len() <= 2 && year.len() == 4 => build_date(
            number(year, text)?,
            month_number(month)?,
            number(day, text)?,
        ),
        _ => Err(DateTextError::Format(text.to_string())),
    }
}

/// Every day from `start` to `end`, inclusive. Empty when `end < start`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        match current.checked_add_days(Days::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }
    days
}

/// Expands date text into its days, ascending.
pub fn expand_date_text(text: &str) -> Result<Vec<NaiveDate>, DateTextError> {
    let lowered = text.trim().to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    if let [d1, "e", d2, "de", month, "de", year] = tokens.as_slice() {
        let year: i32 = number(year, text)?;
        let month = month_number(month)?;
        let mut days = vec![
            build_date(year, month, number(d1, text)?)?,
            build_date(year, month, number(d2, text)?)?,
        ];
        days.sort();
        days.dedup();
        return Ok(days);
    }

    if let Some(at) = tokens.iter().position(|token| *token == "a") {
        let left = parse_pt_date(&tokens[..at].join(" "))?;
        let right = parse_pt_date(&tokens[at + 1..].join(" "))?;
        let (start, end) = if right < left { (right, left) } else { (left, right) };
        return Ok(days_between(start, end));
    }

    parse_pt_date(text).map(|date| vec![date])
}
