//! School-day predicate of a school year.

use crate::pt_dates::{DateTextError, days_between, expand_date_text};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// Days covered by an interruption. Text wins over the date range; a lone
/// start date is a single day.
pub fn interruption_days(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    text: Option<&str>,
) -> Result<Vec<NaiveDate>, DateTextError> {
    if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
        return expand_date_text(text);
    }
    Ok(match (start, end) {
        (Some(start), Some(end)) => days_between(start, end),
        (Some(start), None) => vec![start],
        _ => Vec::new(),
    })
}

/// Days covered by a holiday. The date wins over the text.
pub fn holiday_days(
    date: Option<NaiveDate>,
    text: Option<&str>,
) -> Result<Vec<NaiveDate>, DateTextError> {
    if let Some(date) = date {
        return Ok(vec![date]);
    }
    match text.filter(|t| !t.trim().is_empty()) {
        Some(text) => expand_date_text(text),
        None => Ok(Vec::new()),
    }
}

/// Interruption and holiday days of one school year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NonSchoolDays {
    interruptions: BTreeSet<NaiveDate>,
    holidays: BTreeSet<NaiveDate>,
}

impl NonSchoolDays {
    pub fn add_interruption(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        text: Option<&str>,
    ) -> Result<(), DateTextError> {
        self.interruptions
            .extend(interruption_days(start, end, text)?);
        Ok(())
    }

    pub fn add_holiday(
        &mut self,
        date: Option<NaiveDate>,
        text: Option<&str>,
    ) -> Result<(), DateTextError> {
        self.holidays.extend(holiday_days(date, text)?);
        Ok(())
    }

    pub fn is_interruption(&self, date: NaiveDate) -> bool {
        self.interruptions.contains(&date)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.is_interruption(date) || self.is_holiday(date)
    }

    pub fn len(&self) -> usize {
        self.interruptions.union(&self.holidays).count()
    }

    pub fn is_empty(&self) -> bool {
        self.interruptions.is_empty() && self.holidays.is_empty()
    }
}

/// A school year's bounds with its non-school days.
#[derive(Debug, Clone)]
pub struct SchoolCalendar {
    start: NaiveDate,
    end: NaiveDate,
    non_school: NonSchoolDays,
}

impl SchoolCalendar {
    pub fn new(start: NaiveDate, end: NaiveDate, non_school: NonSchoolDays) -> Self {
        Self {
            start,
            end,
            non_school,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inside the year, Monday to Friday, and neither a break nor a holiday.
    pub fn is_school_day(&self, date: NaiveDate) -> bool {
        if date < self.start || date > self.end {
            return false;
        }
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        !self.non_school.contains(date)
    }

    pub fn school_days_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        days_between(from.max(self.start), to.min(self.end))
            .into_iter()
            .filter(|date| self.is_school_day(*date))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> SchoolCalendar {
        let mut non_school = NonSchoolDays::default();
        non_school
            .add_interruption(
                None,
                None,
                Some("22 de dezembro de 2025 a 2 de janeiro de 2026"),
            )
            .unwrap();
        non_school
            .add_interruption(Some(date(2026, 3, 30)), Some(date(2026, 4, 10)), None)
            .unwrap();
        non_school.add_holiday(Some(date(2025, 12, 8)), None).unwrap();
        non_school
            .add_holiday(None, Some("1 de dezembro de 2025"))
            .unwrap();
        SchoolCalendar::new(date(2025, 9, 12), date(2026, 6, 30), non_school)
    }

    #[test]
    fn test_weekday_inside_year_is_school_day() {
        assert!(calendar().is_school_day(date(2025, 9, 15)));
    }

    #[test]
    fn test_outside_year_is_not_school_day() {
        let cal = calendar();
        assert!(!cal.is_school_day(date(2025, 9, 11)));
        assert!(!cal.is_school_day(date(2026, 7, 1)));
    }

    #[test]
    fn test_weekend_is_not_school_day() {
        assert!(!calendar().is_school_day(date(2025, 9, 13)));
        assert!(!calendar().is_school_day(date(2025, 9, 14)));
    }

    #[test]
    fn test_breaks_and_holidays_are_not_school_days() {
        let cal = calendar();
        assert!(!cal.is_school_day(date(2025, 12, 22)));
        assert!(!cal.is_school_day(date(2026, 1, 2)));
        assert!(!cal.is_school_day(date(2026, 4, 6)));
        assert!(!cal.is_school_day(date(2025, 12, 1)));
        assert!(!cal.is_school_day(date(2025, 12, 8)));
        assert!(cal.is_school_day(date(2026, 1, 5)));
    }

    #[test]
    fn test_text_takes_precedence_over_dates() {
        let days = interruption_days(
            Some(date(2026, 1, 5)),
            Some(date(2026, 1, 9)),
            Some("16 e 17 de fevereiro de 2026"),
        )
        .unwrap();
        assert_eq!(days, vec![date(2026, 2, 16), date(2026, 2, 17)]);
    }

    #[test]
    fn test_holiday_date_takes_precedence_over_text() {
        let days = holiday_days(Some(date(2025, 10, 5)), Some("texto inválido")).unwrap();
        assert_eq!(days, vec![date(2025, 10, 5)]);
    }

    #[test]
    fn test_lone_start_date_is_one_day() {
        assert_eq!(
            interruption_days(Some(date(2026, 2, 16)), None, None).unwrap(),
            vec![date(2026, 2, 16)]
        );
        assert!(interruption_days(None, None, Some("  ")).unwrap().is_empty());
    }

    #[test]
    fn test_school_days_between_clamps_to_year() {
        let days = calendar().school_days_between(date(2025, 9, 1), date(2025, 9, 19));
        assert_eq!(days.first(), Some(&date(2025, 9, 12)));
        assert_eq!(days.len(), 6);
    }
}
