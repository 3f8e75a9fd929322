use anyhow::anyhow;
use lessonbook_core::{AppError, PaginationMeta, PaginationParams};
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::modules::school_years::model::{
    CreateSchoolYearDto, PaginatedSchoolYearsResponse, SchoolYear, SchoolYearFilterParams,
    UpdateSchoolYearDto, check_year_dates,
};
use crate::utils::guards::find_school_year;
use lessonbook_models::ids::SchoolYearId;

fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::bad_request(anyhow!("A school year with this name already exists"));
    }
    AppError::from(e)
}

pub struct SchoolYearService;

impl SchoolYearService {
    #[instrument(skip(db))]
    pub async fn create_school_year(
        db: &SqlitePool,
        dto: CreateSchoolYearDto,
    ) -> Result<SchoolYear, AppError> {
        let mut tx = db.begin().await?;

        if dto.is_active {
            sqlx::query("UPDATE school_years SET is_active = 0 WHERE is_active = 1")
                .execute(&mut *tx)
                .await?;
        }

        let school_year = sqlx::query_as::<_, SchoolYear>(
            r#"INSERT INTO school_years
                   (name, description, start_date, end_date, first_semester_end,
                    second_semester_start, is_active)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(dto.name.trim())
        .bind(&dto.description)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(dto.first_semester_end)
        .bind(dto.second_semester_start)
        .bind(dto.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        tx.commit().await?;
        info!(school_year_id = %school_year.id, name = %school_year.name, "School year created");

        Ok(school_year)
    }

    #[instrument(skip(db))]
    pub async fn get_school_years(
        db: &SqlitePool,
        pagination: PaginationParams,
        filters: SchoolYearFilterParams,
    ) -> Result<PaginatedSchoolYearsResponse, AppError> {
        let mut where_clause = String::from(" WHERE 1 = 1");
        let mut flags = Vec::new();

        if let Some(active) = filters.is_active() {
            where_clause.push_str(" AND is_active = ?");
            flags.push(active);
        }
        if let Some(closed) = filters.is_closed() {
            where_clause.push_str(" AND is_closed = ?");
            flags.push(closed);
        }

        let count_query = format!("SELECT COUNT(*) FROM school_years{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for flag in &flags {
            count_sql = count_sql.bind(*flag);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT * FROM school_years{where_clause} ORDER BY start_date DESC, id DESC LIMIT ? OFFSET ?"
        );
        let mut data_sql = sqlx::query_as::<_, SchoolYear>(&data_query);
        for flag in flags {
            data_sql = data_sql.bind(flag);
        }
        let data = data_sql
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(PaginatedSchoolYearsResponse {
            data,
            meta: PaginationMeta::new(&pagination, total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_school_year(db: &SqlitePool, id: SchoolYearId) -> Result<SchoolYear, AppError> {
        find_school_year(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_active_school_year(db: &SqlitePool) -> Result<SchoolYear, AppError> {
        sqlx::query_as::<_, SchoolYear>("SELECT * FROM school_years WHERE is_active = 1 LIMIT 1")
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("No active school year")))
    }

    /// The explicit year, else the active one, else the one starting last.
    #[instrument(skip(db))]
    pub async fn resolve_current(
        db: &SqlitePool,
        id: Option<SchoolYearId>,
    ) -> Result<Option<SchoolYear>, AppError> {
        if let Some(id) = id {
            return find_school_year(db, id).await.map(Some);
        }

        let school_year = sqlx::query_as::<_, SchoolYear>(
            "SELECT * FROM school_years ORDER BY is_active DESC, start_date DESC, id DESC LIMIT 1",
        )
        .fetch_optional(db)
        .await?;

        Ok(school_year)
    }

    #[instrument(skip(db))]
    pub async fn update_school_year(
        db: &SqlitePool,
        id: SchoolYearId,
        dto: UpdateSchoolYearDto,
    ) -> Result<SchoolYear, AppError> {
        let existing = find_school_year(db, id).await?;

        let name = dto.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);
        let description = dto.description.or(existing.description);
        let start_date = dto.start_date.unwrap_or(existing.start_date);
        let end_date = dto.end_date.unwrap_or(existing.end_date);
        let first_semester_end = dto.first_semester_end.or(existing.first_semester_end);
        let second_semester_start = dto.second_semester_start.or(existing.second_semester_start);

        check_year_dates(start_date, end_date, first_semester_end, second_semester_start)
            .map_err(|e| {
                AppError::unprocessable(anyhow!(
                    "{}",
                    e.message.unwrap_or_else(|| "Invalid school year dates".into())
                ))
            })?;

        let school_year = sqlx::query_as::<_, SchoolYear>(
            r#"UPDATE school_years
               SET name = ?, description = ?, start_date = ?, end_date = ?,
                   first_semester_end = ?, second_semester_start = ?,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = ?
               RETURNING *"#,
        )
        .bind(name)
        .bind(description)
        .bind(start_date)
        .bind(end_date)
        .bind(first_semester_end)
        .bind(second_semester_start)
        .bind(id)
        .fetch_one(db)
        .await
        .map_err(map_unique_violation)?;

        Ok(school_year)
    }

    /// Deleting cascades to classes, calendars, students and evaluations.
    #[instrument(skip(db))]
    pub async fn delete_school_year(db: &SqlitePool, id: SchoolYearId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM school_years WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("School year not found")));
        }

        info!(school_year_id = %id, "School year deleted");
        Ok(())
    }

    /// Makes `id` the only active year.
    #[instrument(skip(db))]
    pub async fn activate_school_year(
        db: &SqlitePool,
        id: SchoolYearId,
    ) -> Result<SchoolYear, AppError> {
        find_school_year(db, id).await?;

        let mut tx = db.begin().await?;
        sqlx::query("UPDATE school_years SET is_active = 0, updated_at = CURRENT_TIMESTAMP WHERE is_active = 1 AND id <> ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let school_year = sqlx::query_as::<_, SchoolYear>(
            "UPDATE school_years SET is_active = 1, updated_at = CURRENT_TIMESTAMP WHERE id = ? RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(school_year_id = %id, "School year activated");
        Ok(school_year)
    }

    #[instrument(skip(db))]
    pub async fn set_closed(
        db: &SqlitePool,
        id: SchoolYearId,
        closed: bool,
    ) -> Result<SchoolYear, AppError> {
        let school_year = sqlx::query_as::<_, SchoolYear>(
            "UPDATE school_years SET is_closed = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? RETURNING *",
        )
        .bind(closed)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("School year not found")))?;

        info!(school_year_id = %id, closed, "School year open/closed state changed");
        Ok(school_year)
    }
}
