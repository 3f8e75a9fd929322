use std::collections::BTreeSet;

use anyhow::anyhow;
use chrono::NaiveDate;
use lessonbook_calendar::{NonSchoolDays, holiday_days, interruption_days, national_holidays_between};
use lessonbook_core::AppError;
use lessonbook_models::ids::{HolidayId, InterruptionId, SchoolYearId};
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::modules::school_calendar::model::{
    Holiday, HolidayDays, HolidayDto, Interruption, InterruptionDays, InterruptionDto,
    SchoolCalendarExport,
};
use crate::modules::school_years::service::SchoolYearService;
use crate::utils::guards::{find_school_year, open_school_year};

fn non_blank(text: &Option<String>) -> Option<&str> {
    text.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

/// Expands the interruption's days, rejecting empty or unparsable input.
fn interruption_days_of(dto: &InterruptionDto) -> Result<Vec<NaiveDate>, AppError> {
    let text = non_blank(&dto.date_text);
    if text.is_none() && dto.start_date.is_none() {
        return Err(AppError::unprocessable(anyhow!(
            "An interruption needs a start date or a date text"
        )));
    }
    if let (Some(start), Some(end)) = (dto.start_date, dto.end_date)
        && text.is_none()
        && end < start
    {
        return Err(AppError::unprocessable(anyhow!(
            "Interruption end date is before its start date"
        )));
    }
    interruption_days(dto.start_date, dto.end_date, text).map_err(AppError::unprocessable)
}

fn holiday_days_of(dto: &HolidayDto) -> Result<Vec<NaiveDate>, AppError> {
    let text = non_blank(&dto.date_text);
    if dto.date.is_none() && text.is_none() {
        return Err(AppError::unprocessable(anyhow!(
            "A holiday needs a date or a date text"
        )));
    }
    holiday_days(dto.date, text).map_err(AppError::unprocessable)
}

pub struct SchoolCalendarService;

impl SchoolCalendarService {
    #[instrument(skip(db))]
    pub async fn get_interruptions(
        db: &SqlitePool,
        school_year_id: SchoolYearId,
    ) -> Result<Vec<Interruption>, AppError> {
        find_school_year(db, school_year_id).await?;

        let interruptions = sqlx::query_as::<_, Interruption>(
            "SELECT * FROM interruptions WHERE school_year_id = ? ORDER BY COALESCE(start_date, date_text), id",
        )
        .bind(school_year_id)
        .fetch_all(db)
        .await?;

        Ok(interruptions)
    }

    #[instrument(skip(db))]
    pub async fn create_interruption(
        db: &SqlitePool,
        school_year_id: SchoolYearId,
        dto: InterruptionDto,
    ) -> Result<Interruption, AppError> {
        open_school_year(db, school_year_id).await?;
        interruption_days_of(&dto)?;

        let interruption = sqlx::query_as::<_, Interruption>(
            r#"INSERT INTO interruptions
                   (school_year_id, kind, start_date, end_date, date_text, description)
               VALUES (?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(school_year_id)
        .bind(dto.kind)
        .bind(dto.start_date)
        .bind(dto.end_date.or(dto.start_date))
        .bind(non_blank(&dto.date_text))
        .bind(&dto.description)
        .fetch_one(db)
        .await?;

        info!(interruption_id = %interruption.id, school_year_id = %school_year_id, "Interruption created");
        Ok(interruption)
    }

    #[instrument(skip(db))]
    pub async fn update_interruption(
        db: &SqlitePool,
        id: InterruptionId,
        dto: InterruptionDto,
    ) -> Result<Interruption, AppError> {
        let existing = Self::find_interruption(db, id).await?;
        open_school_year(db, existing.school_year_id).await?;
        interruption_days_of(&dto)?;

        let interruption = sqlx::query_as::<_, Interruption>(
            r#"UPDATE interruptions
               SET kind = ?, start_date = ?, end_date = ?, date_text = ?, description = ?
               WHERE id = ?
               RETURNING *"#,
        )
        .bind(dto.kind)
        .bind(dto.start_date)
        .bind(dto.end_date.or(dto.start_date))
        .bind(non_blank(&dto.date_text))
        .bind(&dto.description)
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(interruption)
    }

    #[instrument(skip(db))]
    pub async fn delete_interruption(db: &SqlitePool, id: InterruptionId) -> Result<(), AppError> {
        let existing = Self::find_interruption(db, id).await?;
        open_school_year(db, existing.school_year_id).await?;

        sqlx::query("DELETE FROM interruptions WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }

    async fn find_interruption(
        db: &SqlitePool,
        id: InterruptionId,
    ) -> Result<Interruption, AppError> {
        sqlx::query_as::<_, Interruption>("SELECT * FROM interruptions WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Interruption not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_holidays(
        db: &SqlitePool,
        school_year_id: SchoolYearId,
    ) -> Result<Vec<Holiday>, AppError> {
        find_school_year(db, school_year_id).await?;

        let holidays = sqlx::query_as::<_, Holiday>(
            "SELECT * FROM holidays WHERE school_year_id = ? ORDER BY COALESCE(date, date_text), id",
        )
        .bind(school_year_id)
        .fetch_all(db)
        .await?;

        Ok(holidays)
    }

    #[instrument(skip(db))]
    pub async fn create_holiday(
        db: &SqlitePool,
        school_year_id: SchoolYearId,
        dto: HolidayDto,
    ) -> Result<Holiday, AppError> {
        open_school_year(db, school_year_id).await?;
        holiday_days_of(&dto)?;

        let holiday = sqlx::query_as::<_, Holiday>(
            "INSERT INTO holidays (school_year_id, date, date_text, name) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(school_year_id)
        .bind(dto.date)
        .bind(non_blank(&dto.date_text))
        .bind(dto.name.trim())
        .fetch_one(db)
        .await?;

        info!(holiday_id = %holiday.id, school_year_id = %school_year_id, "Holiday created");
        Ok(holiday)
    }

    #[instrument(skip(db))]
    pub async fn update_holiday(
        db: &SqlitePool,
        id: HolidayId,
        dto: HolidayDto,
    ) -> Result<Holiday, AppError> {
        let existing = Self::find_holiday(db, id).await?;
        open_school_year(db, existing.school_year_id).await?;
        holiday_days_of(&dto)?;

        let holiday = sqlx::query_as::<_, Holiday>(
            "UPDATE holidays SET date = ?, date_text = ?, name = ? WHERE id = ? RETURNING *",
        )
        .bind(dto.date)
        .bind(non_blank(&dto.date_text))
        .bind(dto.name.trim())
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(holiday)
    }

    #[instrument(skip(db))]
    pub async fn delete_holiday(db: &SqlitePool, id: HolidayId) -> Result<(), AppError> {
        let existing = Self::find_holiday(db, id).await?;
        open_school_year(db, existing.school_year_id).await?;

        sqlx::query("DELETE FROM holidays WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }

    async fn find_holiday(db: &SqlitePool, id: HolidayId) -> Result<Holiday, AppError> {
        sqlx::query_as::<_, Holiday>("SELECT * FROM holidays WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Holiday not found")))
    }

    /// Inserts the national holidays inside the year, skipping days that
    /// already are holidays. Returns the rows created.
    #[instrument(skip(db))]
    pub async fn add_national_holidays(
        db: &SqlitePool,
        school_year_id: SchoolYearId,
    ) -> Result<Vec<Holiday>, AppError> {
        let school_year = open_school_year(db, school_year_id).await?;
        let existing = Self::get_holidays(db, school_year_id).await?;

        let mut taken = BTreeSet::new();
        for holiday in &existing {
            taken.extend(
                holiday_days(holiday.date, holiday.date_text.as_deref())
                    .map_err(AppError::unprocessable)?,
            );
        }

        let mut tx = db.begin().await?;
        let mut created = Vec::new();
        for national in national_holidays_between(school_year.start_date, school_year.end_date) {
            if !taken.insert(national.date) {
                continue;
            }
            let holiday = sqlx::query_as::<_, Holiday>(
                "INSERT INTO holidays (school_year_id, date, name) VALUES (?, ?, ?) RETURNING *",
            )
            .bind(school_year_id)
            .bind(national.date)
            .bind(national.name)
            .fetch_one(&mut *tx)
            .await?;
            created.push(holiday);
        }
        tx.commit().await?;

        info!(school_year_id = %school_year_id, created = created.len(), "National holidays added");
        Ok(created)
    }

    /// Interruption and holiday days of a year, ready for the generator.
    #[instrument(skip(db))]
    pub async fn load_non_school_days(
        db: &SqlitePool,
        school_year_id: SchoolYearId,
    ) -> Result<NonSchoolDays, AppError> {
        let interruptions = sqlx::query_as::<_, Interruption>(
            "SELECT * FROM interruptions WHERE school_year_id = ?",
        )
        .bind(school_year_id)
        .fetch_all(db)
        .await?;
        let holidays = sqlx::query_as::<_, Holiday>("SELECT * FROM holidays WHERE school_year_id = ?")
            .bind(school_year_id)
            .fetch_all(db)
            .await?;

        let mut non_school = NonSchoolDays::default();
        for interruption in &interruptions {
            non_school
                .add_interruption(
                    interruption.start_date,
                    interruption.end_date,
                    interruption.date_text.as_deref(),
                )
                .map_err(AppError::unprocessable)?;
        }
        for holiday in &holidays {
            non_school
                .add_holiday(holiday.date, holiday.date_text.as_deref())
                .map_err(AppError::unprocessable)?;
        }

        Ok(non_school)
    }

    /// The year with its breaks and holidays, each expanded to days.
    #[instrument(skip(db))]
    pub async fn export(
        db: &SqlitePool,
        school_year_id: Option<SchoolYearId>,
    ) -> Result<SchoolCalendarExport, AppError> {
        let school_year = SchoolYearService::resolve_current(db, school_year_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("No school year found")))?;

        let interruptions = Self::get_interruptions(db, school_year.id)
            .await?
            .into_iter()
            .map(|interruption| {
                let days = interruption_days(
                    interruption.start_date,
                    interruption.end_date,
                    interruption.date_text.as_deref(),
                )
                .map_err(AppError::unprocessable)?;
                Ok(InterruptionDays { interruption, days })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        let holidays = Self::get_holidays(db, school_year.id)
            .await?
            .into_iter()
            .map(|holiday| {
                let days = holiday_days(holiday.date, holiday.date_text.as_deref())
                    .map_err(AppError::unprocessable)?;
                Ok(HolidayDays { holiday, days })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(SchoolCalendarExport {
            school_year,
            interruptions,
            holidays,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::school_calendar::model::InterruptionKind;
    use axum::http::StatusCode;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn create_year(pool: &SqlitePool) -> SchoolYearId {
        sqlx::query_scalar::<_, SchoolYearId>(
            "INSERT INTO school_years (name, start_date, end_date) VALUES ('2025/2026', '2025-09-12', '2026-06-30') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap()
    }

    fn text_interruption(text: &str) -> InterruptionDto {
        InterruptionDto {
            kind: InterruptionKind::Carnaval,
            start_date: None,
            end_date: None,
            date_text: Some(text.to_string()),
            description: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_interruption_from_text(pool: SqlitePool) {
        let year_id = create_year(&pool).await;
        let interruption = SchoolCalendarService::create_interruption(
            &pool,
            year_id,
            text_interruption("16 e 17 de fevereiro de 2026"),
        )
        .await
        .unwrap();

        assert_eq!(interruption.kind, InterruptionKind::Carnaval);
        let days = SchoolCalendarService::load_non_school_days(&pool, year_id)
            .await
            .unwrap();
        assert!(days.is_interruption(date(2026, 2, 16)));
        assert!(days.is_interruption(date(2026, 2, 17)));
        assert_eq!(days.len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_invalid_text_is_unprocessable(pool: SqlitePool) {
        let year_id = create_year(&pool).await;
        let err = SchoolCalendarService::create_interruption(
            &pool,
            year_id,
            text_interruption("no próximo mês"),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_closed_year_blocks_holiday(pool: SqlitePool) {
        let year_id = create_year(&pool).await;
        SchoolYearService::set_closed(&pool, year_id, true)
            .await
            .unwrap();

        let err = SchoolCalendarService::create_holiday(
            &pool,
            year_id,
            HolidayDto {
                date: Some(date(2025, 12, 8)),
                date_text: None,
                name: "Imaculada Conceição".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_national_holidays_are_idempotent(pool: SqlitePool) {
        let year_id = create_year(&pool).await;
        SchoolCalendarService::create_holiday(
            &pool,
            year_id,
            HolidayDto {
                date: None,
                date_text: Some("25 de dezembro de 2025".to_string()),
                name: "Natal".to_string(),
            },
        )
        .await
        .unwrap();

        let first = SchoolCalendarService::add_national_holidays(&pool, year_id)
            .await
            .unwrap();
        assert!(!first.is_empty());
        assert!(first.iter().all(|h| h.date != Some(date(2025, 12, 25))));

        let second = SchoolCalendarService::add_national_holidays(&pool, year_id)
            .await
            .unwrap();
        assert!(second.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_export_expands_days(pool: SqlitePool) {
        let year_id = create_year(&pool).await;
        SchoolCalendarService::create_interruption(
            &pool,
            year_id,
            InterruptionDto {
                kind: InterruptionKind::Pascoa,
                start_date: Some(date(2026, 3, 30)),
                end_date: Some(date(2026, 4, 3)),
                date_text: None,
                description: None,
            },
        )
        .await
        .unwrap();

        let export = SchoolCalendarService::export(&pool, None).await.unwrap();
        assert_eq!(export.school_year.id, year_id);
        assert_eq!(export.interruptions.len(), 1);
        assert_eq!(export.interruptions[0].days.len(), 5);
        assert!(export.holidays.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_export_without_years_is_not_found(pool: SqlitePool) {
        let err = SchoolCalendarService::export(&pool, None).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
