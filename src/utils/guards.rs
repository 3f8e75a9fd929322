//! Closed school years are read-only for calendars, classes and evaluations.

use anyhow::anyhow;
use lessonbook_core::AppError;
use lessonbook_models::classes::Class;
use lessonbook_models::ids::{ClassId, SchoolYearId};
use lessonbook_models::school_years::SchoolYear;
use sqlx::SqlitePool;

/// A class together with its school year.
#[derive(Debug, Clone)]
pub struct ClassContext {
    pub class: Class,
    pub school_year: SchoolYear,
}

impl ClassContext {
    pub fn ensure_open(&self) -> Result<(), AppError> {
        ensure_open(&self.school_year)
    }
}

pub fn ensure_open(school_year: &SchoolYear) -> Result<(), AppError> {
    if school_year.is_closed {
        return Err(AppError::conflict(anyhow!(
            "School year {} is closed",
            school_year.name
        )));
    }
    Ok(())
}

pub async fn find_school_year(db: &SqlitePool, id: SchoolYearId) -> Result<SchoolYear, AppError> {
    sqlx::query_as::<_, SchoolYear>("SELECT * FROM school_years WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("School year not found")))
}

pub async fn open_school_year(db: &SqlitePool, id: SchoolYearId) -> Result<SchoolYear, AppError> {
    let school_year = find_school_year(db, id).await?;
    ensure_open(&school_year)?;
    Ok(school_year)
}

pub async fn class_context(db: &SqlitePool, class_id: ClassId) -> Result<ClassContext, AppError> {
    let class = sqlx::query_as::<_, Class>("SELECT * FROM classes WHERE id = ?")
        .bind(class_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Class not found")))?;
    let school_year = find_school_year(db, class.school_year_id).await?;

    Ok(ClassContext { class, school_year })
}

pub async fn open_class_context(
    db: &SqlitePool,
    class_id: ClassId,
) -> Result<ClassContext, AppError> {
    let context = class_context(db, class_id).await?;
    context.ensure_open()?;
    Ok(context)
}
