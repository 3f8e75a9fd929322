//! Development data seeding.
//!
//! `seed_all` creates the 2025/2026 school year with its breaks and national
//! holidays, a regular and a professional class, and fake rosters.

pub mod classes;
pub mod models;
pub mod school_years;
pub mod students;

use sqlx::SqlitePool;
use std::time::Instant;

pub use models::SeedConfig;

/// Summary of a seeding run.
pub struct SeedSummary {
    pub school_year_id: lessonbook_models::ids::SchoolYearId,
    pub classes: usize,
    pub students: usize,
}

pub async fn seed_all(
    db: &SqlitePool,
    config: SeedConfig,
) -> Result<SeedSummary, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🌱 Seeding lessonbook database...\n");

    let year = school_years::default_school_year();
    let school_year_id = school_years::seed_school_year(db, &year, config.activate).await?;

    let class_ids = classes::seed_classes(db, school_year_id, &classes::default_classes()).await?;
    let students = students::seed_students(db, &class_ids, config.students_per_class).await?;

    println!("\n✅ Seeding completed in {:?}", start_time.elapsed());

    Ok(SeedSummary {
        school_year_id,
        classes: class_ids.len(),
        students,
    })
}

pub async fn clear_all(db: &SqlitePool) -> Result<u64, Box<dyn std::error::Error>> {
    school_years::clear_school_year(db).await
}
