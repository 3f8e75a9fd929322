use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use chrono::NaiveDate;
use lessonbook_core::AppError;
use lessonbook_core::serde::parse_flexible_date;
use lessonbook_core::spreadsheet::{SpreadsheetWriter, excel_text, read_sheet, unwrap_excel_text};
use lessonbook_models::classes::{Class, Module};
use lessonbook_models::ids::{ClassId, LessonEntryId};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, instrument, warn};

use crate::metrics::track_import;
use crate::modules::calendar::model::{LessonEntry, LessonKind};
use crate::modules::calendar::service::{CalendarService, weekday_of};
use crate::modules::calendar_io::model::{
    ClassImportBlock, ClassImportOutcome, ClassRef, ClassSummariesExport, ImportReport,
    LessonRecord, LessonRecordInput, MultiImportParams, MultiImportPayload, MultiImportReport,
    SUMMARY_HEADERS,
};
use crate::utils::guards::{class_context, ensure_open, find_school_year, open_class_context};

/// Unknown kinds on import fall back to `normal`.
fn import_kind(tipo: Option<&str>) -> Option<LessonKind> {
    tipo.map(|value| value.parse().unwrap_or(LessonKind::Normal))
}

fn column(headers: &[String], name: &str, fallback: usize) -> usize {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
        .unwrap_or(fallback)
}

pub struct CalendarIoService;

impl CalendarIoService {
    /// Live entries of the class with their module names.
    async fn lessons(db: &SqlitePool, class_id: ClassId) -> Result<Vec<LessonRecord>, AppError> {
        let modules = sqlx::query_as::<_, Module>("SELECT * FROM modules WHERE class_id = ?")
            .bind(class_id)
            .fetch_all(db)
            .await?;
        let names: HashMap<_, _> = modules.into_iter().map(|m| (m.id, m.name)).collect();

        let entries = sqlx::query_as::<_, LessonEntry>(
            r#"SELECT * FROM lesson_entries
               WHERE class_id = ? AND is_deleted = 0
               ORDER BY date, id"#,
        )
        .bind(class_id)
        .fetch_all(db)
        .await?;

        Ok(entries
            .into_iter()
            .map(|entry| LessonRecord {
                data: entry.date,
                tipo: entry.kind,
                numero_aulas: entry.lesson_count,
                modulo_nome: entry.module_id.and_then(|id| names.get(&id).cloned()),
                numero_modulo: entry.module_number,
                total_geral: entry.total_number,
                sumarios: entry.summary_numbers,
                sumario: entry.summary,
                previsao: entry.forecast,
                tempos_sem_aula: entry.non_lesson_time,
                observacoes: entry.observations,
                atividade: entry.activity,
                atividade_nome: entry.activity_name,
            })
            .collect())
    }

    #[instrument(skip(db))]
    pub async fn export_json(
        db: &SqlitePool,
        class_id: ClassId,
    ) -> Result<(Class, ClassSummariesExport), AppError> {
        let context = class_context(db, class_id).await?;
        let aulas = Self::lessons(db, class_id).await?;

        let export = ClassSummariesExport {
            turma: ClassRef {
                id: context.class.id,
                nome: context.class.name.clone(),
            },
            aulas,
        };
        Ok((context.class, export))
    }

    /// Normal and extra lessons as a summaries spreadsheet.
    #[instrument(skip(db))]
    pub async fn export_csv(db: &SqlitePool, class_id: ClassId) -> Result<(Class, String), AppError> {
        let context = class_context(db, class_id).await?;
        let lessons = Self::lessons(db, class_id).await?;

        let mut writer = SpreadsheetWriter::new(&SUMMARY_HEADERS)?;
        for lesson in lessons
            .iter()
            .filter(|l| matches!(l.tipo, LessonKind::Normal | LessonKind::Extra))
        {
            writer.write_row([
                lesson.data.format("%d/%m/%Y").to_string(),
                lesson.modulo_nome.clone().unwrap_or_default(),
                excel_text(lesson.sumarios.as_deref()),
                lesson.sumario.clone().unwrap_or_default(),
            ])?;
        }

        Ok((context.class, writer.finish()?))
    }

    /// Applies lesson objects to a class. Each object updates the first
    /// live entry on its date not matched yet, or creates a new one.
    /// Absent fields keep what is stored. Does not renumber.
    pub async fn apply_lessons(
        conn: &mut SqliteConnection,
        class_id: ClassId,
        lessons: Vec<LessonRecordInput>,
    ) -> Result<ImportReport, AppError> {
        let live = sqlx::query_as::<_, (LessonEntryId, NaiveDate)>(
            r#"SELECT id, date FROM lesson_entries
               WHERE class_id = ? AND is_deleted = 0
               ORDER BY date, id"#,
        )
        .bind(class_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut report = ImportReport::default();
        let mut matched = HashSet::new();

        for lesson in lessons {
            let Some(date) = lesson.data.as_deref().and_then(parse_flexible_date) else {
                report.ignored += 1;
                continue;
            };
            if !lesson.counts_in_range() {
                warn!(%date, numero_aulas = ?lesson.numero_aulas, tempos_sem_aula = ?lesson.tempos_sem_aula, "Lesson counts out of range, row ignored");
                report.ignored += 1;
                continue;
            }
            let kind = import_kind(lesson.tipo.as_deref());
            let lesson_count = lesson.numero_aulas;
            let non_lesson_time = lesson.tempos_sem_aula;

            let target = live
                .iter()
                .find(|(id, entry_date)| *entry_date == date && !matched.contains(id))
                .map(|(id, _)| *id);

            match target {
                Some(id) => {
                    sqlx::query(
                        r#"UPDATE lesson_entries SET
                               kind = COALESCE(?, kind),
                               summary = COALESCE(?, summary),
                               forecast = COALESCE(?, forecast),
                               observations = COALESCE(?, observations),
                               non_lesson_time = COALESCE(?, non_lesson_time),
                               activity = COALESCE(?, activity),
                               activity_name = COALESCE(?, activity_name),
                               lesson_count = COALESCE(?, lesson_count),
                               updated_at = CURRENT_TIMESTAMP
                           WHERE id = ?"#,
                    )
                    .bind(kind)
                    .bind(&lesson.sumario)
                    .bind(&lesson.previsao)
                    .bind(&lesson.observacoes)
                    .bind(non_lesson_time)
                    .bind(lesson.atividade)
                    .bind(&lesson.atividade_nome)
                    .bind(lesson_count)
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;

                    matched.insert(id);
                    report.updated += 1;
                }
                None => {
                    sqlx::query(
                        r#"INSERT INTO lesson_entries
                               (class_id, date, weekday, kind, lesson_count, summary, forecast,
                                non_lesson_time, observations, activity, activity_name)
                           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
                    )
                    .bind(class_id)
                    .bind(date)
                    .bind(weekday_of(date))
                    .bind(kind.unwrap_or_default())
                    .bind(lesson_count.unwrap_or(1))
                    .bind(&lesson.sumario)
                    .bind(&lesson.previsao)
                    .bind(non_lesson_time.unwrap_or(0))
                    .bind(&lesson.observacoes)
                    .bind(lesson.atividade.unwrap_or(false))
                    .bind(&lesson.atividade_nome)
                    .execute(&mut *conn)
                    .await?;

                    report.created += 1;
                }
            }
        }

        Ok(report)
    }

    async fn import_into(
        db: &SqlitePool,
        class_id: ClassId,
        lessons: Vec<LessonRecordInput>,
    ) -> Result<ImportReport, AppError> {
        let mut tx = db.begin().await?;
        let report = Self::apply_lessons(&mut *tx, class_id, lessons).await?;
        CalendarService::renumber(&mut *tx, class_id).await?;
        tx.commit().await?;

        track_import("json", report.created, report.updated, report.ignored);
        info!(
            class_id = %class_id,
            created = report.created,
            updated = report.updated,
            ignored = report.ignored,
            "Lessons imported"
        );
        Ok(report)
    }

    #[instrument(skip(db, lessons), fields(lessons = lessons.len()))]
    pub async fn import_json(
        db: &SqlitePool,
        class_id: ClassId,
        lessons: Vec<LessonRecordInput>,
    ) -> Result<ImportReport, AppError> {
        open_class_context(db, class_id).await?;
        Self::import_into(db, class_id, lessons).await
    }

    /// Class named in an import block: by id, else by name in the active
    /// year, else by name in the most recent year holding it.
    async fn resolve_block_class(
        db: &SqlitePool,
        block: &ClassImportBlock,
    ) -> Result<Option<Class>, AppError> {
        if let Some(id) = block.turma_id {
            let class = sqlx::query_as::<_, Class>("SELECT * FROM classes WHERE id = ?")
                .bind(id)
                .fetch_optional(db)
                .await?;
            return Ok(class);
        }

        let Some(name) = block.turma_nome.as_deref().map(str::trim) else {
            return Ok(None);
        };
        let class = sqlx::query_as::<_, Class>(
            r#"SELECT c.* FROM classes c
               JOIN school_years y ON y.id = c.school_year_id
               WHERE c.name = ?
               ORDER BY y.is_active DESC, y.start_date DESC, c.id DESC
               LIMIT 1"#,
        )
        .bind(name)
        .fetch_optional(db)
        .await?;
        Ok(class)
    }

    async fn import_block(db: &SqlitePool, block: ClassImportBlock) -> ClassImportOutcome {
        let mut outcome = ClassImportOutcome {
            class_id: block.turma_id,
            class_name: block.turma_nome.clone(),
            report: ImportReport::default(),
            error: None,
        };

        let result = async {
            let class = Self::resolve_block_class(db, &block)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow!("Class not found")))?;
            outcome.class_id = Some(class.id);
            outcome.class_name = Some(class.name.clone());

            ensure_open(&find_school_year(db, class.school_year_id).await?)?;
            Self::import_into(db, class.id, block.aulas).await
        }
        .await;

        match result {
            Ok(report) => outcome.report = report,
            Err(err) => {
                warn!(class = ?outcome.class_name, error = %err.error, "Import block skipped");
                outcome.error = Some(err.error.to_string());
            }
        }
        outcome
    }

    /// Imports lessons into one or many classes. A bare list needs
    /// `class_id`; class blocks that cannot be imported are reported.
    #[instrument(skip(db, payload))]
    pub async fn import_multi(
        db: &SqlitePool,
        payload: MultiImportPayload,
        params: MultiImportParams,
    ) -> Result<MultiImportReport, AppError> {
        let blocks = match payload {
            MultiImportPayload::Classes { turmas } => turmas,
            MultiImportPayload::Lessons(aulas) | MultiImportPayload::Wrapped { aulas } => {
                let class_id = params.class_id.map(ClassId::from).ok_or_else(|| {
                    AppError::bad_request(anyhow!("class_id is required for a list of lessons"))
                })?;
                let context = open_class_context(db, class_id).await?;
                let report = Self::import_into(db, class_id, aulas).await?;
                return Ok(MultiImportReport {
                    totals: report,
                    classes: vec![ClassImportOutcome {
                        class_id: Some(class_id),
                        class_name: Some(context.class.name),
                        report,
                        error: None,
                    }],
                });
            }
        };

        let mut totals = ImportReport::default();
        let mut classes = Vec::with_capacity(blocks.len());
        for block in blocks {
            let outcome = Self::import_block(db, block).await;
            totals.merge(outcome.report);
            classes.push(outcome);
        }

        Ok(MultiImportReport { totals, classes })
    }

    /// Reads a summaries spreadsheet back. Each row's summary goes to the
    /// next unmatched live normal or extra entry on its date, the rows the
    /// export writes; rows without one are ignored.
    #[instrument(skip(db, text))]
    pub async fn import_csv(
        db: &SqlitePool,
        class_id: ClassId,
        text: &str,
    ) -> Result<ImportReport, AppError> {
        open_class_context(db, class_id).await?;
        let sheet = read_sheet(text).map_err(AppError::bad_request)?;
        let date_col = column(&sheet.headers, "DATA", 0);
        let summary_col = column(&sheet.headers, "Sumário", 3);

        let mut tx = db.begin().await?;
        let live = sqlx::query_as::<_, (LessonEntryId, NaiveDate)>(
            r#"SELECT id, date FROM lesson_entries
               WHERE class_id = ? AND is_deleted = 0 AND kind IN (?, ?)
               ORDER BY date, id"#,
        )
        .bind(class_id)
        .bind(LessonKind::Normal)
        .bind(LessonKind::Extra)
        .fetch_all(&mut *tx)
        .await?;

        let mut report = ImportReport::default();
        let mut matched = HashSet::new();
        for row in &sheet.rows {
            let date = row
                .get(date_col)
                .map(|cell| unwrap_excel_text(cell))
                .and_then(|cell| parse_flexible_date(&cell));
            let target = date.and_then(|date| {
                live.iter()
                    .find(|(id, entry_date)| *entry_date == date && !matched.contains(id))
                    .map(|(id, _)| *id)
            });
            let Some(id) = target else {
                report.ignored += 1;
                continue;
            };

            let summary = row
                .get(summary_col)
                .map(|cell| unwrap_excel_text(cell))
                .filter(|cell| !cell.is_empty());
            sqlx::query(
                "UPDATE lesson_entries SET summary = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            )
            .bind(summary)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            matched.insert(id);
            report.updated += 1;
        }

        CalendarService::renumber(&mut *tx, class_id).await?;
        tx.commit().await?;

        track_import("csv", report.created, report.updated, report.ignored);
        info!(class_id = %class_id, updated = report.updated, ignored = report.ignored, "Summaries imported");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::calendar::model::CalendarFilterParams;
    use crate::modules::school_years::service::SchoolYearService;
    use axum::http::StatusCode;

    async fn seed_class(pool: &SqlitePool, name: &str, year_name: &str, active: bool) -> (ClassId, i64) {
        let year_id: i64 = sqlx::query_scalar(
            "INSERT INTO school_years (name, start_date, end_date, is_active) VALUES (?, '2025-09-15', '2026-06-30', ?) RETURNING id",
        )
        .bind(year_name)
        .bind(active)
        .fetch_one(pool)
        .await
        .unwrap();
        let class_id = sqlx::query_scalar::<_, ClassId>(
            "INSERT INTO classes (school_year_id, name, load_monday, load_wednesday) VALUES (?, ?, 2, 1) RETURNING id",
        )
        .bind(year_id)
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
        CalendarService::generate_calendar(pool, class_id)
            .await
            .unwrap();
        (class_id, year_id)
    }

    fn lesson(data: &str, sumario: &str) -> LessonRecordInput {
        LessonRecordInput {
            data: Some(data.to_string()),
            sumario: Some(sumario.to_string()),
            ..Default::default()
        }
    }

    async fn entries(pool: &SqlitePool, class_id: ClassId) -> Vec<LessonEntry> {
        CalendarService::get_entries(pool, class_id, CalendarFilterParams::default())
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_json_import_updates_creates_and_ignores(pool: SqlitePool) {
        let (class_id, _) = seed_class(&pool, "10.º B", "2025/2026", true).await;
        let before = entries(&pool, class_id).await.len();

        let report = CalendarIoService::import_json(
            &pool,
            class_id,
            vec![
                lesson("2025-09-15", "Apresentação"),
                LessonRecordInput {
                    tipo: Some("greve".to_string()),
                    ..lesson("17/09/2025", "")
                },
                lesson("2025-09-16", "Aula extra"),
                LessonRecordInput::default(),
                lesson("amanhã", "x"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(
            report,
            ImportReport {
                created: 1,
                updated: 2,
                ignored: 2
            }
        );

        let all = entries(&pool, class_id).await;
        assert_eq!(all.len(), before + 1);
        assert_eq!(all[0].summary.as_deref(), Some("Apresentação"));
        let strike = all.iter().find(|e| e.date.to_string() == "2025-09-17").unwrap();
        assert_eq!(strike.kind, LessonKind::Strike);
        assert_eq!(strike.summary_numbers, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unknown_kind_imports_as_normal(pool: SqlitePool) {
        let (class_id, _) = seed_class(&pool, "10.º B", "2025/2026", true).await;
        CalendarIoService::import_json(
            &pool,
            class_id,
            vec![LessonRecordInput {
                tipo: Some("feriado?".to_string()),
                ..lesson("2025-09-16", "x")
            }],
        )
        .await
        .unwrap();

        let created = entries(&pool, class_id)
            .await
            .into_iter()
            .find(|e| e.date.to_string() == "2025-09-16")
            .unwrap();
        assert_eq!(created.kind, LessonKind::Normal);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_csv_round_trip_keeps_summaries(pool: SqlitePool) {
        let (class_id, _) = seed_class(&pool, "10.º B", "2025/2026", true).await;
        CalendarIoService::import_json(
            &pool,
            class_id,
            vec![
                lesson("2025-09-15", "Introdução à programação"),
                lesson("2025-09-17", "Variáveis; tipos \"primitivos\""),
            ],
        )
        .await
        .unwrap();

        let (class, csv) = CalendarIoService::export_csv(&pool, class_id).await.unwrap();
        assert_eq!(class.name, "10.º B");
        let sheet = read_sheet(&csv).unwrap();
        assert_eq!(sheet.headers, SUMMARY_HEADERS.map(String::from).to_vec());
        assert_eq!(sheet.rows[0][0], "15/09/2025");
        assert_eq!(sheet.rows[0][2], "=\"1,2\"");

        sqlx::query("UPDATE lesson_entries SET summary = NULL")
            .execute(&pool)
            .await
            .unwrap();
        let report = CalendarIoService::import_csv(&pool, class_id, &csv)
            .await
            .unwrap();
        assert_eq!(report.ignored, 0);
        assert_eq!(report.updated as usize, sheet.rows.len());

        let all = entries(&pool, class_id).await;
        assert_eq!(all[0].summary.as_deref(), Some("Introdução à programação"));
        assert_eq!(all[1].summary.as_deref(), Some("Variáveis; tipos \"primitivos\""));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_json_export_lists_live_entries(pool: SqlitePool) {
        let (class_id, _) = seed_class(&pool, "12.º A", "2025/2026", true).await;
        let live = entries(&pool, class_id).await.len();

        let (_, export) = CalendarIoService::export_json(&pool, class_id).await.unwrap();
        assert_eq!(export.turma.nome, "12.º A");
        assert_eq!(export.aulas.len(), live);
        assert_eq!(export.aulas[0].sumarios.as_deref(), Some("1,2"));
        assert_eq!(export.aulas[0].total_geral, Some(2));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_multi_import_reports_unknown_and_closed(pool: SqlitePool) {
        let (open_class, _) = seed_class(&pool, "10.º B", "2025/2026", true).await;
        let (_, closed_year) = seed_class(&pool, "9.º D", "2024/2025", false).await;
        SchoolYearService::set_closed(&pool, closed_year.into(), true)
            .await
            .unwrap();

        let payload: MultiImportPayload = serde_json::from_value(serde_json::json!({
            "turmas": [
                {"turma_nome": "10.º B", "aulas": [{"data": "2025-09-15", "sumario": "A"}]},
                {"turma_nome": "9.º D", "aulas": [{"data": "2025-09-15"}]},
                {"turma_nome": "11.º Z", "aulas": [{"data": "2025-09-15"}]}
            ]
        }))
        .unwrap();

        let report = CalendarIoService::import_multi(&pool, payload, MultiImportParams::default())
            .await
            .unwrap();

        assert_eq!(report.totals.updated, 1);
        assert_eq!(report.classes[0].class_id, Some(open_class));
        assert!(report.classes[0].error.is_none());
        assert!(report.classes[1].error.as_deref().unwrap().contains("closed"));
        assert!(report.classes[2].error.is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_multi_import_name_prefers_active_year(pool: SqlitePool) {
        let (_, _) = seed_class(&pool, "10.º B", "2024/2025", false).await;
        let (active_class, _) = seed_class(&pool, "10.º B", "2025/2026", true).await;

        let payload: MultiImportPayload = serde_json::from_value(serde_json::json!({
            "turmas": [{"turma_nome": "10.º B", "aulas": []}]
        }))
        .unwrap();
        let report = CalendarIoService::import_multi(&pool, payload, MultiImportParams::default())
            .await
            .unwrap();
        assert_eq!(report.classes[0].class_id, Some(active_class));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_bare_list_needs_class_id(pool: SqlitePool) {
        let payload = MultiImportPayload::Lessons(vec![lesson("2025-09-15", "x")]);
        let err = CalendarIoService::import_multi(&pool, payload, MultiImportParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
