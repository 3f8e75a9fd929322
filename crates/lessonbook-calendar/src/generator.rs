//! Lesson day generation for a class.
//!
//! Walks the class's period one day at a time and emits a lesson day for
//! every school day with a non-zero load. When modules are planned the
//! walk stops once their combined capacity is spent, truncating the last
//! day to what is left.

use crate::school_days::SchoolCalendar;
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use tracing::debug;

/// Lessons per weekday, Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeeklyLoad([u32; 5]);

impl WeeklyLoad {
    pub fn new(load: [u32; 5]) -> Self {
        Self(load)
    }

    /// Builds a load from stored counts, treating negatives as zero.
    pub fn from_counts(load: [i64; 5]) -> Self {
        Self(load.map(|count| u32::try_from(count).unwrap_or(0)))
    }

    /// Load for a weekday index (0 = Monday). Weekends carry none.
    pub fn for_weekday(&self, weekday: u32) -> u32 {
        self.0.get(weekday as usize).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|count| *count == 0)
    }
}

/// A module's place in the class plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModulePlan {
    pub id: i64,
    pub total_lessons: u32,
    pub tolerance: u32,
}

impl ModulePlan {
    /// Lessons the module absorbs before the next one starts.
    pub fn capacity(&self) -> u32 {
        self.total_lessons.saturating_add(self.tolerance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlannedLesson {
    pub date: NaiveDate,
    /// 0 = Monday
    pub weekday: u32,
    pub lesson_count: u32,
}

/// Lesson days of `period_start..=period_end`, chronological.
///
/// Without modules the whole period is covered.
pub fn generate(
    calendar: &SchoolCalendar,
    period_start: NaiveDate,
    period_end: NaiveDate,
    load: &WeeklyLoad,
    modules: &[ModulePlan],
) -> Vec<PlannedLesson> {
    let mut remaining: Option<u64> = if modules.is_empty() {
        None
    } else {
        Some(modules.iter().map(|m| u64::from(m.capacity())).sum())
    };

    let mut lessons = Vec::new();
    let mut current = period_start;

    while current <= period_end {
        if remaining == Some(0) {
            break;
        }

        let weekday = current.weekday().num_days_from_monday();
        let day_load = load.for_weekday(weekday);

        if day_load > 0 && calendar.is_school_day(current) {
            let lesson_count = match remaining.as_mut() {
                Some(left) => {
                    let taken = u64::from(day_load).min(*left);
                    *left -= taken;
                    taken as u32
                }
                None => day_load,
            };
            lessons.push(PlannedLesson {
                date: current,
                weekday,
                lesson_count,
            });
        }

        match current.checked_add_days(Days::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }

    debug!(
        period_start = %period_start,
        period_end = %period_end,
        lessons = lessons.len(),
        "generated lesson days"
    );

    lessons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::school_days::NonSchoolDays;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> SchoolCalendar {
        let mut non_school = NonSchoolDays::default();
        non_school
            .add_interruption(None, None, Some("16 e 17 de fevereiro de 2026"))
            .unwrap();
        non_school
            .add_interruption(
                None,
                None,
                Some("22 de dezembro de 2025 a 2 de janeiro de 2026"),
            )
            .unwrap();
        non_school.add_holiday(Some(date(2025, 10, 6)), None).unwrap();
        SchoolCalendar::new(date(2025, 9, 15), date(2026, 6, 30), non_school)
    }

    #[test]
    fn test_one_entry_per_lesson_day_with_load() {
        let load = WeeklyLoad::new([2, 0, 1, 0, 0]);
        let lessons = generate(&calendar(), date(2025, 9, 15), date(2025, 9, 28), &load, &[]);

        assert_eq!(
            lessons,
            vec![
                PlannedLesson { date: date(2025, 9, 15), weekday: 0, lesson_count: 2 },
                PlannedLesson { date: date(2025, 9, 17), weekday: 2, lesson_count: 1 },
                PlannedLesson { date: date(2025, 9, 22), weekday: 0, lesson_count: 2 },
                PlannedLesson { date: date(2025, 9, 24), weekday: 2, lesson_count: 1 },
            ]
        );
    }

    #[test]
    fn test_never_lands_on_non_school_days() {
        let cal = calendar();
        let load = WeeklyLoad::new([1, 1, 1, 1, 1]);
        let lessons = generate(&cal, cal.start(), cal.end(), &load, &[]);

        assert!(!lessons.is_empty());
        for lesson in &lessons {
            assert!(cal.is_school_day(lesson.date), "{} is not a school day", lesson.date);
        }
        let dates: Vec<_> = lessons.iter().map(|l| l.date).collect();
        assert!(!dates.contains(&date(2025, 10, 6)));
        assert!(!dates.contains(&date(2026, 2, 16)));
        assert!(!dates.contains(&date(2025, 12, 29)));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_modules_bound_generation_and_truncate_last_day() {
        let load = WeeklyLoad::new([3, 0, 0, 0, 0]);
        let modules = [
            ModulePlan { id: 1, total_lessons: 4, tolerance: 0 },
            ModulePlan { id: 2, total_lessons: 1, tolerance: 2 },
        ];
        let lessons = generate(&calendar(), date(2025, 9, 15), date(2026, 6, 30), &load, &modules);

        let counts: Vec<_> = lessons.iter().map(|l| l.lesson_count).collect();
        assert_eq!(counts, vec![3, 3, 1]);
        assert_eq!(lessons.last().map(|l| l.date), Some(date(2025, 9, 29)));
    }

    #[test]
    fn test_empty_load_generates_nothing() {
        let lessons = generate(
            &calendar(),
            date(2025, 9, 15),
            date(2026, 6, 30),
            &WeeklyLoad::default(),
            &[],
        );
        assert!(lessons.is_empty());
    }

    #[test]
    fn test_from_counts_clamps_negatives() {
        let load = WeeklyLoad::from_counts([-1, 2, 0, 0, 4]);
        assert_eq!(load.for_weekday(0), 0);
        assert_eq!(load.for_weekday(1), 2);
        assert_eq!(load.for_weekday(4), 4);
        assert_eq!(load.for_weekday(5), 0);
    }
}
