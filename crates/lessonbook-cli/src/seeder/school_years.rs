//! School year seeding: the year itself, its breaks and national holidays.

use chrono::NaiveDate;
use lessonbook_calendar::{expand_date_text, national_holidays_between};
use lessonbook_models::ids::SchoolYearId;
use lessonbook_models::school_calendar::InterruptionKind;
use sqlx::SqlitePool;
use std::time::Instant;

use super::models::{InterruptionSeed, SchoolYearSeed};

pub const SEED_YEAR_NAME: &str = "2025/2026";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

pub fn default_school_year() -> SchoolYearSeed {
    SchoolYearSeed {
        name: SEED_YEAR_NAME.to_string(),
        start_date: date(2025, 9, 12),
        end_date: date(2026, 6, 30),
        first_semester_end: date(2026, 1, 30),
        second_semester_start: date(2026, 2, 2),
    }
}

pub fn default_interruptions() -> Vec<InterruptionSeed> {
    vec![
        InterruptionSeed {
            kind: InterruptionKind::Natal,
            date_text: "22 de dezembro de 2025 a 2 de janeiro de 2026",
            description: "Interrupção do Natal",
        },
        InterruptionSeed {
            kind: InterruptionKind::Intercalar1,
            date_text: "2 e 3 de fevereiro de 2026",
            description: "Interrupção intercalar do 1.º semestre",
        },
        InterruptionSeed {
            kind: InterruptionKind::Carnaval,
            date_text: "16 e 17 de fevereiro de 2026",
            description: "Interrupção do Carnaval",
        },
        InterruptionSeed {
            kind: InterruptionKind::Pascoa,
            date_text: "30 de março de 2026 a 10 de abril de 2026",
            description: "Interrupção da Páscoa",
        },
    ]
}

/// Seeds the school year with its breaks and national holidays.
///
/// Fails when a year with the same name already exists.
pub async fn seed_school_year(
    db: &SqlitePool,
    year: &SchoolYearSeed,
    activate: bool,
) -> Result<SchoolYearId, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📅 Seeding school year {}...", year.name);

    let mut tx = db.begin().await?;

    if activate {
        sqlx::query("UPDATE school_years SET is_active = 0")
            .execute(&mut *tx)
            .await?;
    }

    let year_id = sqlx::query_scalar::<_, SchoolYearId>(
        r#"INSERT INTO school_years
               (name, start_date, end_date, first_semester_end, second_semester_start, is_active)
           VALUES (?, ?, ?, ?, ?, ?)
           ON CONFLICT (name) DO NOTHING
           RETURNING id"#,
    )
    .bind(&year.name)
    .bind(year.start_date)
    .bind(year.end_date)
    .bind(year.first_semester_end)
    .bind(year.second_semester_start)
    .bind(activate)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(year_id) = year_id else {
        tx.rollback().await?;
        return Err(format!("School year {} already exists", year.name).into());
    };

    let interruptions = default_interruptions();
    for interruption in &interruptions {
        expand_date_text(interruption.date_text)?;
        sqlx::query(
            "INSERT INTO interruptions (school_year_id, kind, date_text, description) VALUES (?, ?, ?, ?)",
        )
        .bind(year_id)
        .bind(interruption.kind)
        .bind(interruption.date_text)
        .bind(interruption.description)
        .execute(&mut *tx)
        .await?;
    }

    let holidays = national_holidays_between(year.start_date, year.end_date);
    for holiday in &holidays {
        sqlx::query("INSERT INTO holidays (school_year_id, date, name) VALUES (?, ?, ?)")
            .bind(year_id)
            .bind(holiday.date)
            .bind(holiday.name)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted 1 year, {} interruptions and {} holidays in {:?}",
        interruptions.len(),
        holidays.len(),
        start_time.elapsed()
    );

    Ok(year_id)
}

/// Deletes the seeded year. Classes, entries and students cascade.
pub async fn clear_school_year(db: &SqlitePool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing school year {}...", SEED_YEAR_NAME);

    let result = sqlx::query("DELETE FROM school_years WHERE name = ?")
        .bind(SEED_YEAR_NAME)
        .execute(db)
        .await?
        .rows_affected();

    println!("   ✓ Deleted {} years in {:?}", result, start_time.elapsed());

    Ok(result)
}
