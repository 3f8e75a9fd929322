//! Portuguese national holidays.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NationalHoliday {
    pub date: NaiveDate,
    pub name: &'static str,
}

/// Easter Sunday (anonymous Gregorian algorithm, Meeus/Jones/Butcher).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = ((h + l - 7 * m + 114) % 31) + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// National holidays of a calendar year, by date.
pub fn national_holidays(year: i32) -> Vec<NationalHoliday> {
    let fixed = [
        (1, 1, "Ano Novo"),
        (4, 25, "Dia da Liberdade"),
        (5, 1, "Dia do Trabalhador"),
        (6, 10, "Dia de Portugal"),
        (8, 15, "Assunção de Nossa Senhora"),
        (10, 5, "Implantação da República"),
        (11, 1, "Dia de Todos-os-Santos"),
        (12, 1, "Restauração da Independência"),
        (12, 8, "Imaculada Conceição"),
        (12, 25, "Natal"),
    ];

    let mut holidays: Vec<NationalHoliday> = fixed
        .into_iter()
        .filter_map(|(month, day, name)| {
            NaiveDate::from_ymd_opt(year, month, day).map(|date| NationalHoliday { date, name })
        })
        .collect();

    if let Some(easter) = easter_sunday(year) {
        let movable = [
            (easter.checked_sub_days(Days::new(47)), "Carnaval"),
            (easter.checked_sub_days(Days::new(2)), "Sexta-feira Santa"),
            (Some(easter), "Páscoa"),
            (easter.checked_add_days(Days::new(60)), "Corpo de Deus"),
        ];
        holidays.extend(
            movable
                .into_iter()
                .filter_map(|(date, name)| date.map(|date| NationalHoliday { date, name })),
        );
    }

    holidays.sort_by_key(|holiday| holiday.date);
    holidays
}

/// National holidays falling inside `start..=end`.
pub fn national_holidays_between(start: NaiveDate, end: NaiveDate) -> Vec<NationalHoliday> {
    (start.year()..=end.year())
        .flat_map(national_holidays)
        .filter(|holiday| holiday.date >= start && holiday.date <= end)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_easter_known_years() {
        assert_eq!(easter_sunday(2024), Some(date(2024, 3, 31)));
        assert_eq!(easter_sunday(2025), Some(date(2025, 4, 20)));
        assert_eq!(easter_sunday(2026), Some(date(2026, 4, 5)));
        assert_eq!(easter_sunday(2038), Some(date(2038, 4, 25)));
    }

    #[test]
    fn test_movable_holidays_2026() {
        let holidays = national_holidays(2026);
        let find = |name: &str| holidays.iter().find(|h| h.name == name).unwrap().date;

        assert_eq!(find("Carnaval"), date(2026, 2, 17));
        assert_eq!(find("Sexta-feira Santa"), date(2026, 4, 3));
        assert_eq!(find("Corpo de Deus"), date(2026, 6, 4));
    }

    #[test]
    fn test_fourteen_holidays_sorted() {
        let holidays = national_holidays(2025);
        assert_eq!(holidays.len(), 14);
        assert!(holidays.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_between_school_year() {
        let holidays = national_holidays_between(date(2025, 9, 12), date(2026, 6, 30));
        let names: Vec<_> = holidays.iter().map(|h| h.name).collect();

        assert_eq!(holidays.first().map(|h| h.date), Some(date(2025, 10, 5)));
        assert_eq!(holidays.last().map(|h| h.date), Some(date(2026, 6, 10)));
        assert!(names.contains(&"Natal"));
        assert!(!names.contains(&"Assunção de Nossa Senhora"));
    }
}
