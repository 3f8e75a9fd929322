use anyhow::anyhow;
use lessonbook_core::AppError;
use lessonbook_core::spreadsheet::SpreadsheetWriter;
use lessonbook_models::ids::{ClassId, LessonEntryId};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{info, instrument, warn};

use crate::modules::calendar::model::parse_kind_filter;
use crate::modules::calendar::service::{CalendarService, ensure_in_year, weekday_of};
use crate::modules::other_dates::model::{
    AddExtraLessonDto, ChangeKindDto, ChangeKindResponse, LessonEntry, LessonEntryWithClass,
    LessonKind, OTHER_DATES_HEADERS, OtherDateRecord, OtherDatesFilterParams,
};
use crate::utils::guards::open_class_context;

pub struct OtherDatesService;

impl OtherDatesService {
    /// Live entries whose kind is not `normal`.
    #[instrument(skip(db))]
    pub async fn get_other_dates(
        db: &SqlitePool,
        filters: &OtherDatesFilterParams,
    ) -> Result<Vec<LessonEntryWithClass>, AppError> {
        let kind = parse_kind_filter(filters.kind.as_deref()).map_err(AppError::bad_request)?;

        let mut query = QueryBuilder::<Sqlite>::new(
            r#"SELECT e.*, c.name AS class_name
               FROM lesson_entries e
               JOIN classes c ON c.id = e.class_id
               WHERE e.is_deleted = 0 AND e.kind <> "#,
        );
        query.push_bind(LessonKind::Normal);
        if let Some(kind) = kind {
            query.push(" AND e.kind = ").push_bind(kind);
        }
        if let Some(class_id) = filters.class_id {
            query.push(" AND e.class_id = ").push_bind(class_id);
        }
        if let Some(from) = filters.from {
            query.push(" AND e.date >= ").push_bind(from);
        }
        if let Some(to) = filters.to {
            query.push(" AND e.date <= ").push_bind(to);
        }
        query.push(" ORDER BY e.date, c.name, e.id");

        let entries = query
            .build_query_as::<LessonEntryWithClass>()
            .fetch_all(db)
            .await?;
        Ok(entries)
    }

    #[instrument(skip(db))]
    pub async fn add_extra_lesson(
        db: &SqlitePool,
        dto: AddExtraLessonDto,
    ) -> Result<LessonEntry, AppError> {
        let context = open_class_context(db, dto.class_id).await?;
        ensure_in_year(&context.school_year, dto.date)?;

        let mut tx = db.begin().await?;
        let id = sqlx::query_scalar::<_, LessonEntryId>(
            r#"INSERT INTO lesson_entries
                   (class_id, date, weekday, kind, lesson_count, summary, observations)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               RETURNING id"#,
        )
        .bind(dto.class_id)
        .bind(dto.date)
        .bind(weekday_of(dto.date))
        .bind(LessonKind::Extra)
        .bind(dto.lesson_count)
        .bind(&dto.summary)
        .bind(&dto.observations)
        .fetch_one(&mut *tx)
        .await?;

        CalendarService::renumber(&mut *tx, dto.class_id).await?;
        let entry = CalendarService::fetch_entry(&mut *tx, id).await?;
        tx.commit().await?;

        info!(entry_id = %id, class_id = %dto.class_id, date = %dto.date, "Extra lesson added");
        Ok(entry)
    }

    /// Changes the kind of every live non-extra entry on a date, across
    /// classes. Classes of closed years are skipped and reported.
    #[instrument(skip(db))]
    pub async fn change_kind(
        db: &SqlitePool,
        dto: ChangeKindDto,
    ) -> Result<ChangeKindResponse, AppError> {
        if dto.kind == LessonKind::Extra {
            return Err(AppError::bad_request(anyhow!(
                "Lessons cannot be turned into extra lessons; add an extra lesson instead"
            )));
        }

        let classes = sqlx::query_as::<_, (ClassId, String, bool)>(
            r#"SELECT DISTINCT c.id, c.name, y.is_closed
               FROM lesson_entries e
               JOIN classes c ON c.id = e.class_id
               JOIN school_years y ON y.id = c.school_year_id
               WHERE e.is_deleted = 0 AND e.date = ? AND e.kind <> ?
               ORDER BY c.name, c.id"#,
        )
        .bind(dto.date)
        .bind(LessonKind::Extra)
        .fetch_all(db)
        .await?;

        if classes.is_empty() {
            return Err(AppError::not_found(anyhow!("No lessons on {}", dto.date)));
        }

        let mut changed = 0i64;
        let mut blocked_classes = Vec::new();
        let mut renumbered_classes = Vec::new();

        let mut tx = db.begin().await?;
        for (class_id, class_name, is_closed) in classes {
            if is_closed {
                blocked_classes.push(class_name);
                continue;
            }

            let result = sqlx::query(
                r#"UPDATE lesson_entries
                   SET kind = ?, updated_at = CURRENT_TIMESTAMP
                   WHERE class_id = ? AND date = ? AND is_deleted = 0
                     AND kind <> ? AND kind <> ?"#,
            )
            .bind(dto.kind)
            .bind(class_id)
            .bind(dto.date)
            .bind(LessonKind::Extra)
            .bind(dto.kind)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                changed += result.rows_affected() as i64;
                CalendarService::renumber(&mut *tx, class_id).await?;
                renumbered_classes.push(class_id);
            }
        }
        tx.commit().await?;

        if !blocked_classes.is_empty() {
            warn!(date = %dto.date, blocked = ?blocked_classes, "Closed school years skipped");
        }
        info!(date = %dto.date, kind = %dto.kind, changed, "Lesson kind changed");

        Ok(ChangeKindResponse {
            date: dto.date,
            kind: dto.kind,
            changed,
            blocked_classes,
            renumbered_classes,
        })
    }

    pub fn to_records(entries: Vec<LessonEntryWithClass>) -> Vec<OtherDateRecord> {
        entries
            .into_iter()
            .map(|row| OtherDateRecord {
                data: row.entry.date,
                turma: row.class_name,
                tipo: row.entry.kind,
                numero_aulas: row.entry.lesson_count,
                sumario: row.entry.summary,
                observacoes: row.entry.observations,
            })
            .collect()
    }

    pub fn render_csv(records: &[OtherDateRecord]) -> Result<String, AppError> {
        let mut writer = SpreadsheetWriter::new(&OTHER_DATES_HEADERS)?;
        for record in records {
            writer.write_row([
                record.data.format("%d/%m/%Y").to_string(),
                record.turma.clone(),
                record.tipo.label().to_string(),
                record.numero_aulas.to_string(),
                record.sumario.clone().unwrap_or_default(),
                record.observacoes.clone().unwrap_or_default(),
            ])?;
        }
        Ok(writer.finish()?)
    }
}
