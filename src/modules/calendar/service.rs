use anyhow::anyhow;
use chrono::{Datelike, NaiveDate};
use lessonbook_calendar::{
    ModulePlan, NumberingInput, SchoolCalendar, WeeklyLoad, generate, number_entries,
};
use lessonbook_core::AppError;
use lessonbook_models::classes::{Class, Module, PeriodType};
use lessonbook_models::ids::{ClassId, LessonEntryId};
use lessonbook_models::school_years::{DateRange, SchoolYear};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument};

use crate::metrics::{track_calendar_generated, track_calendar_renumbered};
use crate::modules::calendar::model::{
    CalendarFilterParams, CreateLessonEntryDto, DayFilterParams, GenerateCalendarResponse,
    LessonEntry, LessonEntryWithClass, LessonKind, RenumberResponse, ResetCalendarResponse,
    UpdateLessonEntryDto, UpdateSummaryDto, parse_kind_filter,
};
use crate::modules::school_calendar::service::SchoolCalendarService;
use crate::utils::guards::{class_context, open_class_context};

/// Period of the school year a class runs in.
pub fn class_period(class: &Class, school_year: &SchoolYear) -> Result<DateRange, AppError> {
    let semester = match class.period_type {
        PeriodType::Annual => return Ok(school_year.full_range()),
        PeriodType::FirstSemester => 1,
        PeriodType::SecondSemester => 2,
    };
    school_year.semester_range(semester).ok_or_else(|| {
        AppError::unprocessable(anyhow!(
            "School year {} has no semester {} boundaries",
            school_year.name,
            semester
        ))
    })
}

pub fn module_plans(modules: &[Module]) -> Vec<ModulePlan> {
    modules
        .iter()
        .map(|module| ModulePlan {
            id: module.id.into_inner(),
            total_lessons: u32::try_from(module.total_lessons).unwrap_or(0),
            tolerance: u32::try_from(module.tolerance).unwrap_or(0),
        })
        .collect()
}

pub fn ensure_in_year(school_year: &SchoolYear, date: NaiveDate) -> Result<(), AppError> {
    if date < school_year.start_date || date > school_year.end_date {
        return Err(AppError::unprocessable(anyhow!(
            "{} is outside school year {}",
            date,
            school_year.name
        )));
    }
    Ok(())
}

pub fn weekday_of(date: NaiveDate) -> i64 {
    i64::from(date.weekday().num_days_from_monday())
}

/// A provided blank text clears the field; an absent one keeps it.
pub fn merge_text(update: Option<String>, current: Option<String>) -> Option<String> {
    match update {
        Some(text) if text.trim().is_empty() => None,
        Some(text) => Some(text),
        None => current,
    }
}

pub struct CalendarService;

impl CalendarService {
    /// Recomputes summary and module numbers of every live entry of the
    /// class. Runs on the caller's connection so it joins its transaction.
    #[instrument(skip(conn))]
    pub async fn renumber(
        conn: &mut SqliteConnection,
        class_id: ClassId,
    ) -> Result<RenumberResponse, AppError> {
        let modules = sqlx::query_as::<_, Module>(
            "SELECT * FROM modules WHERE class_id = ? ORDER BY position, id",
        )
        .bind(class_id)
        .fetch_all(&mut *conn)
        .await?;

        let entries = sqlx::query_as::<_, (LessonEntryId, LessonKind, i64, i64)>(
            r#"SELECT id, kind, lesson_count, non_lesson_time
               FROM lesson_entries
               WHERE class_id = ? AND is_deleted = 0
               ORDER BY date, id"#,
        )
        .bind(class_id)
        .fetch_all(&mut *conn)
        .await?;

        let inputs: Vec<NumberingInput> = entries
            .iter()
            .map(|(_, kind, lesson_count, non_lesson_time)| NumberingInput {
                counts: kind.counts(),
                lesson_count: *lesson_count,
                non_lesson_time: *non_lesson_time,
            })
            .collect();
        let numbering = number_entries(&inputs, &module_plans(&modules));

        for ((id, _, _, _), numbers) in entries.iter().zip(&numbering) {
            sqlx::query(
                r#"UPDATE lesson_entries
                   SET module_id = ?, module_number = ?, total_number = ?, summary_numbers = ?
                   WHERE id = ?"#,
            )
            .bind(numbers.module_id)
            .bind(numbers.module_number)
            .bind(numbers.total_number)
            .bind(&numbers.summary_numbers)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        }

        let last_number = numbering.iter().rev().find_map(|n| n.total_number);
        track_calendar_renumbered();
        debug!(class_id = %class_id, entries = entries.len(), ?last_number, "Calendar renumbered");

        Ok(RenumberResponse {
            class_id,
            entries: entries.len() as i64,
            last_number,
        })
    }

    #[instrument(skip(db))]
    pub async fn renumber_class(
        db: &SqlitePool,
        class_id: ClassId,
    ) -> Result<RenumberResponse, AppError> {
        open_class_context(db, class_id).await?;

        let mut tx = db.begin().await?;
        let response = Self::renumber(&mut *tx, class_id).await?;
        tx.commit().await?;

        Ok(response)
    }

    /// Builds the class calendar from its weekly load. Refuses to run while
    /// the class has live entries.
    #[instrument(skip(db))]
    pub async fn generate_calendar(
        db: &SqlitePool,
        class_id: ClassId,
    ) -> Result<GenerateCalendarResponse, AppError> {
        let context = open_class_context(db, class_id).await?;

        let period = class_period(&context.class, &context.school_year)?;
        let non_school =
            SchoolCalendarService::load_non_school_days(db, context.school_year.id).await?;
        let calendar = SchoolCalendar::new(
            context.school_year.start_date,
            context.school_year.end_date,
            non_school,
        );
        let modules = sqlx::query_as::<_, Module>(
            "SELECT * FROM modules WHERE class_id = ? ORDER BY position, id",
        )
        .bind(class_id)
        .fetch_all(db)
        .await?;

        let planned = generate(
            &calendar,
            period.start,
            period.end,
            &WeeklyLoad::from_counts(context.class.weekly_load()),
            &module_plans(&modules),
        );

        let mut tx = db.begin().await?;
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM lesson_entries WHERE class_id = ? AND is_deleted = 0",
        )
        .bind(class_id)
        .fetch_one(&mut *tx)
        .await?;
        if existing > 0 {
            return Err(AppError::conflict(anyhow!(
                "Class {} already has {} calendar entries; reset the calendar first",
                context.class.name,
                existing
            )));
        }

        for lesson in &planned {
            sqlx::query(
                r#"INSERT INTO lesson_entries (class_id, date, weekday, kind, lesson_count)
                   VALUES (?, ?, ?, ?, ?)"#,
            )
            .bind(class_id)
            .bind(lesson.date)
            .bind(i64::from(lesson.weekday))
            .bind(LessonKind::Normal)
            .bind(i64::from(lesson.lesson_count))
            .execute(&mut *tx)
            .await?;
        }
        Self::renumber(&mut *tx, class_id).await?;
        tx.commit().await?;

        let created = planned.len() as i64;
        track_calendar_generated(created);
        info!(
            class_id = %class_id,
            class = %context.class.name,
            created,
            period_start = %period.start,
            period_end = %period.end,
            "Calendar generated"
        );

        Ok(GenerateCalendarResponse {
            class_id,
            created,
            first_date: planned.first().map(|l| l.date),
            last_date: planned.last().map(|l| l.date),
        })
    }

    /// Hard-deletes every entry of the class, soft-deleted ones included.
    #[instrument(skip(db))]
    pub async fn reset_calendar(
        db: &SqlitePool,
        class_id: ClassId,
    ) -> Result<ResetCalendarResponse, AppError> {
        open_class_context(db, class_id).await?;

        let result = sqlx::query("DELETE FROM lesson_entries WHERE class_id = ?")
            .bind(class_id)
            .execute(db)
            .await?;
        let deleted = result.rows_affected() as i64;

        info!(class_id = %class_id, deleted, "Calendar reset");
        Ok(ResetCalendarResponse { class_id, deleted })
    }

    #[instrument(skip(db))]
    pub async fn get_entries(
        db: &SqlitePool,
        class_id: ClassId,
        filters: CalendarFilterParams,
    ) -> Result<Vec<LessonEntry>, AppError> {
        let context = class_context(db, class_id).await?;
        let kind = parse_kind_filter(filters.kind.as_deref()).map_err(AppError::bad_request)?;

        let semester = match filters.semester {
            None => None,
            Some(s @ (1 | 2)) => Some(
                context
                    .school_year
                    .semester_range(s as u8)
                    .ok_or_else(|| {
                        AppError::unprocessable(anyhow!(
                            "School year {} has no semester {} boundaries",
                            context.school_year.name,
                            s
                        ))
                    })?,
            ),
            Some(other) => {
                return Err(AppError::bad_request(anyhow!(
                    "Semester must be 1 or 2, got {}",
                    other
                )));
            }
        };

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT * FROM lesson_entries WHERE is_deleted = 0 AND class_id = ",
        );
        query.push_bind(class_id);
        if let Some(from) = filters.from {
            query.push(" AND date >= ").push_bind(from);
        }
        if let Some(to) = filters.to {
            query.push(" AND date <= ").push_bind(to);
        }
        if let Some(range) = semester {
            query
                .push(" AND date BETWEEN ")
                .push_bind(range.start)
                .push(" AND ")
                .push_bind(range.end);
        }
        if let Some(kind) = kind {
            query.push(" AND kind = ").push_bind(kind);
        }
        query.push(" ORDER BY date, id");

        let entries = query.build_query_as::<LessonEntry>().fetch_all(db).await?;
        Ok(entries)
    }

    pub async fn fetch_entry(
        conn: &mut SqliteConnection,
        id: LessonEntryId,
    ) -> Result<LessonEntry, AppError> {
        sqlx::query_as::<_, LessonEntry>(
            "SELECT * FROM lesson_entries WHERE id = ? AND is_deleted = 0",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Calendar entry not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_entry(db: &SqlitePool, id: LessonEntryId) -> Result<LessonEntry, AppError> {
        let mut conn = db.acquire().await?;
        Self::fetch_entry(&mut *conn, id).await
    }

    #[instrument(skip(db))]
    pub async fn create_entry(
        db: &SqlitePool,
        class_id: ClassId,
        dto: CreateLessonEntryDto,
    ) -> Result<LessonEntry, AppError> {
        let context = open_class_context(db, class_id).await?;
        ensure_in_year(&context.school_year, dto.date)?;

        let mut tx = db.begin().await?;
        let id = sqlx::query_scalar::<_, LessonEntryId>(
            r#"INSERT INTO lesson_entries
                   (class_id, date, weekday, kind, lesson_count, summary, forecast,
                    non_lesson_time, observations, activity, activity_name)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING id"#,
        )
        .bind(class_id)
        .bind(dto.date)
        .bind(weekday_of(dto.date))
        .bind(dto.kind)
        .bind(dto.lesson_count)
        .bind(&dto.summary)
        .bind(&dto.forecast)
        .bind(dto.non_lesson_time)
        .bind(&dto.observations)
        .bind(dto.activity)
        .bind(&dto.activity_name)
        .fetch_one(&mut *tx)
        .await?;

        Self::renumber(&mut *tx, class_id).await?;
        let entry = Self::fetch_entry(&mut *tx, id).await?;
        tx.commit().await?;

        info!(entry_id = %id, class_id = %class_id, date = %entry.date, "Calendar entry created");
        Ok(entry)
    }

    #[instrument(skip(db))]
    pub async fn update_entry(
        db: &SqlitePool,
        id: LessonEntryId,
        dto: UpdateLessonEntryDto,
    ) -> Result<LessonEntry, AppError> {
        let existing = Self::get_entry(db, id).await?;
        let context = open_class_context(db, existing.class_id).await?;

        let date = dto.date.unwrap_or(existing.date);
        ensure_in_year(&context.school_year, date)?;

        let mut tx = db.begin().await?;
        sqlx::query(
            r#"UPDATE lesson_entries
               SET date = ?, weekday = ?, kind = ?, lesson_count = ?, summary = ?,
                   forecast = ?, non_lesson_time = ?, observations = ?, activity = ?,
                   activity_name = ?, updated_at = CURRENT_TIMESTAMP
               WHERE id = ?"#,
        )
        .bind(date)
        .bind(weekday_of(date))
        .bind(dto.kind.unwrap_or(existing.kind))
        .bind(dto.lesson_count.unwrap_or(existing.lesson_count))
        .bind(merge_text(dto.summary, existing.summary))
        .bind(merge_text(dto.forecast, existing.forecast))
        .bind(dto.non_lesson_time.unwrap_or(existing.non_lesson_time))
        .bind(merge_text(dto.observations, existing.observations))
        .bind(dto.activity.unwrap_or(existing.activity))
        .bind(merge_text(dto.activity_name, existing.activity_name))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        Self::renumber(&mut *tx, existing.class_id).await?;
        let entry = Self::fetch_entry(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Soft delete; the entry leaves the numbering.
    #[instrument(skip(db))]
    pub async fn delete_entry(db: &SqlitePool, id: LessonEntryId) -> Result<(), AppError> {
        let existing = Self::get_entry(db, id).await?;
        open_class_context(db, existing.class_id).await?;

        let mut tx = db.begin().await?;
        sqlx::query(
            r#"UPDATE lesson_entries
               SET is_deleted = 1, module_id = NULL, module_number = NULL,
                   total_number = NULL, summary_numbers = NULL,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = ?"#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        Self::renumber(&mut *tx, existing.class_id).await?;
        tx.commit().await?;

        info!(entry_id = %id, class_id = %existing.class_id, "Calendar entry deleted");
        Ok(())
    }

    /// Inline edit of the lesson text. Renumbers only when the kind changes.
    #[instrument(skip(db))]
    pub async fn update_summary(
        db: &SqlitePool,
        id: LessonEntryId,
        dto: UpdateSummaryDto,
    ) -> Result<LessonEntry, AppError> {
        let existing = Self::get_entry(db, id).await?;
        open_class_context(db, existing.class_id).await?;

        let kind = dto.kind.unwrap_or(existing.kind);
        let kind_changed = kind != existing.kind;

        let mut tx = db.begin().await?;
        sqlx::query(
            r#"UPDATE lesson_entries
               SET summary = ?, forecast = ?, observations = ?, kind = ?,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = ?"#,
        )
        .bind(merge_text(dto.summary, existing.summary))
        .bind(merge_text(dto.forecast, existing.forecast))
        .bind(merge_text(dto.observations, existing.observations))
        .bind(kind)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if kind_changed {
            Self::renumber(&mut *tx, existing.class_id).await?;
        }
        let entry = Self::fetch_entry(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Live entries of every class on one date.
    #[instrument(skip(db))]
    pub async fn get_day_entries(
        db: &SqlitePool,
        filters: DayFilterParams,
    ) -> Result<Vec<LessonEntryWithClass>, AppError> {
        let date = filters
            .date
            .ok_or_else(|| AppError::bad_request(anyhow!("date is required")))?;

        let mut query = QueryBuilder::<Sqlite>::new(
            r#"SELECT e.*, c.name AS class_name
               FROM lesson_entries e
               JOIN classes c ON c.id = e.class_id
               WHERE e.is_deleted = 0 AND e.date = "#,
        );
        query.push_bind(date);
        if let Some(class_id) = filters.class_id {
            query.push(" AND e.class_id = ").push_bind(class_id);
        }
        query.push(" ORDER BY c.name, e.id");

        let entries = query
            .build_query_as::<LessonEntryWithClass>()
            .fetch_all(db)
            .await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::classes::model::{ClassKind, CreateClassDto, ModuleDto};
    use crate::modules::classes::service::ClassService;
    use crate::modules::school_calendar::model::{InterruptionDto, InterruptionKind};
    use crate::modules::school_years::model::CreateSchoolYearDto;
    use crate::modules::school_years::service::SchoolYearService;
    use axum::http::StatusCode;
    use lessonbook_models::ids::SchoolYearId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn create_year(pool: &SqlitePool, semesters: bool) -> SchoolYearId {
        SchoolYearService::create_school_year(
            pool,
            CreateSchoolYearDto {
                name: "2025/2026".to_string(),
                description: None,
                start_date: date(2025, 9, 15),
                end_date: date(2026, 6, 30),
                first_semester_end: semesters.then(|| date(2026, 1, 30)),
                second_semester_start: semesters.then(|| date(2026, 2, 2)),
                is_active: true,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn create_class(
        pool: &SqlitePool,
        school_year_id: SchoolYearId,
        period_type: PeriodType,
    ) -> Class {
        ClassService::create_class(
            pool,
            CreateClassDto {
                school_year_id,
                name: "10.º B".to_string(),
                kind: ClassKind::Regular,
                period_type,
                load_monday: 2,
                load_tuesday: 0,
                load_wednesday: 1,
                load_thursday: 0,
                load_friday: 0,
            },
        )
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_generate_skips_non_school_days(pool: SqlitePool) {
        let year = create_year(&pool, true).await;
        SchoolCalendarService::create_interruption(
            &pool,
            year,
            InterruptionDto {
                kind: InterruptionKind::Natal,
                start_date: None,
                end_date: None,
                date_text: Some("22 de dezembro de 2025 a 2 de janeiro de 2026".to_string()),
                description: None,
            },
        )
        .await
        .unwrap();
        let class = create_class(&pool, year, PeriodType::Annual).await;

        let response = CalendarService::generate_calendar(&pool, class.id)
            .await
            .unwrap();
        assert!(response.created > 0);
        assert_eq!(response.first_date, Some(date(2025, 9, 15)));

        let entries = CalendarService::get_entries(&pool, class.id, CalendarFilterParams::default())
            .await
            .unwrap();
        assert_eq!(entries.len() as i64, response.created);
        assert!(entries.iter().all(|e| e.date < date(2025, 12, 22) || e.date > date(2026, 1, 2)));
        assert!(entries.iter().all(|e| e.weekday == 0 || e.weekday == 2));
        assert_eq!(entries[0].summary_numbers.as_deref(), Some("1,2"));
        assert_eq!(entries[1].summary_numbers.as_deref(), Some("3"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_regenerate_is_conflict(pool: SqlitePool) {
        let year = create_year(&pool, true).await;
        let class = create_class(&pool, year, PeriodType::Annual).await;

        CalendarService::generate_calendar(&pool, class.id)
            .await
            .unwrap();
        let err = CalendarService::generate_calendar(&pool, class.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let reset = CalendarService::reset_calendar(&pool, class.id).await.unwrap();
        assert!(reset.deleted > 0);
        CalendarService::generate_calendar(&pool, class.id)
            .await
            .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_generation_writes_one_calendar(pool: SqlitePool) {
        let year = create_year(&pool, true).await;
        let class = create_class(&pool, year, PeriodType::Annual).await;

        let (first, second) = tokio::join!(
            CalendarService::generate_calendar(&pool, class.id),
            CalendarService::generate_calendar(&pool, class.id),
        );
        let created: Vec<i64> = [first, second]
            .into_iter()
            .filter_map(|r| r.ok().map(|r| r.created))
            .collect();
        assert_eq!(created.len(), 1);

        let entries = CalendarService::get_entries(&pool, class.id, CalendarFilterParams::default())
            .await
            .unwrap();
        assert_eq!(entries.len() as i64, created[0]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_semester_class_needs_boundaries(pool: SqlitePool) {
        let year = create_year(&pool, false).await;
        let class = create_class(&pool, year, PeriodType::SecondSemester).await;

        let err = CalendarService::generate_calendar(&pool, class.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_second_semester_class_starts_at_semester(pool: SqlitePool) {
        let year = create_year(&pool, true).await;
        let class = create_class(&pool, year, PeriodType::SecondSemester).await;

        let response = CalendarService::generate_calendar(&pool, class.id)
            .await
            .unwrap();
        assert_eq!(response.first_date, Some(date(2026, 2, 2)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_closed_year_blocks_generation(pool: SqlitePool) {
        let year = create_year(&pool, true).await;
        let class = create_class(&pool, year, PeriodType::Annual).await;
        SchoolYearService::set_closed(&pool, year, true)
            .await
            .unwrap();

        let err = CalendarService::generate_calendar(&pool, class.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_modules_bound_generation(pool: SqlitePool) {
        let year = create_year(&pool, true).await;
        let class = create_class(&pool, year, PeriodType::Annual).await;
        ClassService::create_module(
            &pool,
            class.id,
            ModuleDto {
                name: "M1".to_string(),
                total_lessons: 4,
                tolerance: 0,
                position: None,
            },
        )
        .await
        .unwrap();

        let response = CalendarService::generate_calendar(&pool, class.id)
            .await
            .unwrap();
        assert_eq!(response.created, 3);

        let entries = CalendarService::get_entries(&pool, class.id, CalendarFilterParams::default())
            .await
            .unwrap();
        let counts: Vec<_> = entries.iter().map(|e| e.lesson_count).collect();
        assert_eq!(counts, vec![2, 1, 1]);
        assert_eq!(entries[2].module_number, Some(4));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_kind_change_renumbers_later_entries(pool: SqlitePool) {
        let year = create_year(&pool, true).await;
        let class = create_class(&pool, year, PeriodType::Annual).await;
        CalendarService::generate_calendar(&pool, class.id)
            .await
            .unwrap();

        let entries = CalendarService::get_entries(&pool, class.id, CalendarFilterParams::default())
            .await
            .unwrap();
        assert_eq!(entries[2].total_number, Some(5));

        let changed = CalendarService::update_summary(
            &pool,
            entries[0].id,
            UpdateSummaryDto {
                summary: None,
                forecast: None,
                observations: Some("Greve nacional".to_string()),
                kind: Some(LessonKind::Strike),
            },
        )
        .await
        .unwrap();
        assert_eq!(changed.total_number, None);
        assert_eq!(changed.summary_numbers, None);

        let later = CalendarService::get_entry(&pool, entries[2].id).await.unwrap();
        assert_eq!(later.total_number, Some(3));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_soft_delete_hides_and_renumbers(pool: SqlitePool) {
        let year = create_year(&pool, true).await;
        let class = create_class(&pool, year, PeriodType::Annual).await;
        CalendarService::generate_calendar(&pool, class.id)
            .await
            .unwrap();
        let entries = CalendarService::get_entries(&pool, class.id, CalendarFilterParams::default())
            .await
            .unwrap();

        CalendarService::delete_entry(&pool, entries[1].id)
            .await
            .unwrap();
        let err = CalendarService::get_entry(&pool, entries[1].id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let next = CalendarService::get_entry(&pool, entries[2].id).await.unwrap();
        assert_eq!(next.summary_numbers.as_deref(), Some("3,4"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_filters(pool: SqlitePool) {
        let year = create_year(&pool, true).await;
        let class = create_class(&pool, year, PeriodType::Annual).await;
        CalendarService::generate_calendar(&pool, class.id)
            .await
            .unwrap();

        let second_semester = CalendarService::get_entries(
            &pool,
            class.id,
            CalendarFilterParams {
                semester: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(second_semester.iter().all(|e| e.date >= date(2026, 2, 2)));

        let september = CalendarService::get_entries(
            &pool,
            class.id,
            CalendarFilterParams {
                from: Some(date(2025, 9, 1)),
                to: Some(date(2025, 9, 30)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(september.len(), 5);

        let err = CalendarService::get_entries(
            &pool,
            class.id,
            CalendarFilterParams {
                kind: Some("feriado".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_entry_outside_year(pool: SqlitePool) {
        let year = create_year(&pool, true).await;
        let class = create_class(&pool, year, PeriodType::Annual).await;

        let dto: CreateLessonEntryDto =
            serde_json::from_value(serde_json::json!({"date": "2026-08-03"})).unwrap();
        let err = CalendarService::create_entry(&pool, class.id, dto)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_day_view_lists_classes(pool: SqlitePool) {
        let year = create_year(&pool, true).await;
        let class = create_class(&pool, year, PeriodType::Annual).await;
        CalendarService::generate_calendar(&pool, class.id)
            .await
            .unwrap();

        let day = CalendarService::get_day_entries(
            &pool,
            DayFilterParams {
                date: Some(date(2025, 9, 17)),
                class_id: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].class_name, "10.º B");
        assert_eq!(day[0].entry.lesson_count, 1);

        let err = CalendarService::get_day_entries(&pool, DayFilterParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
