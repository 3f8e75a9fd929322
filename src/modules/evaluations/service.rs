use anyhow::anyhow;
use lessonbook_core::AppError;
use lessonbook_core::spreadsheet::{SpreadsheetWriter, decimal_comma};
use lessonbook_models::classes::Class;
use lessonbook_models::ids::{ClassId, LessonEntryId};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{info, instrument};

use crate::modules::calendar::service::CalendarService;
use crate::modules::evaluations::model::{
    DEFAULT_DIMENSION, EvaluationRow, GRADES_HEADERS, GradeSummary, GradesFilterParams,
    UpsertEvaluationsDto,
};
use crate::utils::guards::{class_context, open_class_context};

fn average_cell(value: Option<f64>) -> String {
    value.map(|v| decimal_comma(v, 2)).unwrap_or_default()
}

pub struct EvaluationService;

impl EvaluationService {
    /// One row per student of the entry's class, stored values or defaults.
    #[instrument(skip(db))]
    pub async fn get_evaluations(
        db: &SqlitePool,
        entry_id: LessonEntryId,
    ) -> Result<Vec<EvaluationRow>, AppError> {
        let entry = CalendarService::get_entry(db, entry_id).await?;

        let rows = sqlx::query_as::<_, EvaluationRow>(
            r#"SELECT s.id AS student_id, s.number, s.name, s.short_name, s.special_needs,
                      d.id IS NOT NULL AS evaluated,
                      COALESCE(d.late, 0) AS late,
                      COALESCE(d.absences, 0) AS absences,
                      COALESCE(d.responsibility, ?1) AS responsibility,
                      COALESCE(d.behaviour, ?1) AS behaviour,
                      COALESCE(d.participation, ?1) AS participation,
                      COALESCE(d.autonomous_work, ?1) AS autonomous_work,
                      COALESCE(d.materials, ?1) AS materials,
                      COALESCE(d.activity, ?1) AS activity,
                      COALESCE(d.disciplinary_absence, 0) AS disciplinary_absence
               FROM students s
               LEFT JOIN daily_evaluations d ON d.student_id = s.id AND d.entry_id = ?2
               WHERE s.class_id = ?3
               ORDER BY s.number IS NULL, s.number, s.name, s.id"#,
        )
        .bind(DEFAULT_DIMENSION)
        .bind(entry_id)
        .bind(entry.class_id)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    /// Stores the evaluations of a lesson, replacing earlier ones.
    #[instrument(skip(db, dto), fields(count = dto.evaluations.len()))]
    pub async fn upsert_evaluations(
        db: &SqlitePool,
        entry_id: LessonEntryId,
        dto: UpsertEvaluationsDto,
    ) -> Result<Vec<EvaluationRow>, AppError> {
        let entry = CalendarService::get_entry(db, entry_id).await?;
        open_class_context(db, entry.class_id).await?;

        let mut tx = db.begin().await?;
        for evaluation in &dto.evaluations {
            let class_id = sqlx::query_scalar::<_, ClassId>("SELECT class_id FROM students WHERE id = ?")
                .bind(evaluation.student_id)
                .fetch_optional(&mut *tx)
                .await?;
            if class_id != Some(entry.class_id) {
                return Err(AppError::unprocessable(anyhow!(
                    "Student {} is not in the lesson's class",
                    evaluation.student_id
                )));
            }

            sqlx::query(
                r#"INSERT INTO daily_evaluations
                       (entry_id, student_id, late, absences, responsibility, behaviour,
                        participation, autonomous_work, materials, activity, disciplinary_absence)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                   ON CONFLICT (entry_id, student_id) DO UPDATE SET
                       late = excluded.late,
                       absences = excluded.absences,
                       responsibility = excluded.responsibility,
                       behaviour = excluded.behaviour,
                       participation = excluded.participation,
                       autonomous_work = excluded.autonomous_work,
                       materials = excluded.materials,
                       activity = excluded.activity,
                       disciplinary_absence = excluded.disciplinary_absence,
                       updated_at = CURRENT_TIMESTAMP"#,
            )
            .bind(entry_id)
            .bind(evaluation.student_id)
            .bind(evaluation.late)
            .bind(evaluation.absences)
            .bind(evaluation.responsibility)
            .bind(evaluation.behaviour)
            .bind(evaluation.participation)
            .bind(evaluation.autonomous_work)
            .bind(evaluation.materials)
            .bind(evaluation.activity)
            .bind(evaluation.disciplinary_absence)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        info!(entry_id = %entry_id, count = dto.evaluations.len(), "Evaluations saved");
        Self::get_evaluations(db, entry_id).await
    }

    /// Aggregates each student's evaluations over the class's live lessons
    /// in range.
    #[instrument(skip(db))]
    pub async fn get_grades(
        db: &SqlitePool,
        class_id: ClassId,
        filters: GradesFilterParams,
    ) -> Result<(Class, Vec<GradeSummary>), AppError> {
        let class = class_context(db, class_id).await?.class;

        let mut query = QueryBuilder::<Sqlite>::new(
            r#"SELECT s.id AS student_id, s.number, s.name,
                      COUNT(d.id) AS lessons_evaluated,
                      COALESCE(SUM(d.late), 0) AS late_count,
                      COALESCE(SUM(d.absences), 0) AS absences,
                      COALESCE(SUM(d.disciplinary_absence), 0) AS disciplinary_absences,
                      AVG(d.responsibility) AS responsibility,
                      AVG(d.behaviour) AS behaviour,
                      AVG(d.participation) AS participation,
                      AVG(d.autonomous_work) AS autonomous_work,
                      AVG(d.materials) AS materials,
                      AVG(d.activity) AS activity
               FROM students s
               LEFT JOIN daily_evaluations d ON d.student_id = s.id AND d.entry_id IN (
                   SELECT id FROM lesson_entries WHERE is_deleted = 0 AND class_id = "#,
        );
        query.push_bind(class_id);
        if let Some(from) = filters.from {
            query.push(" AND date >= ").push_bind(from);
        }
        if let Some(to) = filters.to {
            query.push(" AND date <= ").push_bind(to);
        }
        query.push(") WHERE s.class_id = ").push_bind(class_id);
        query.push(" GROUP BY s.id ORDER BY s.number IS NULL, s.number, s.name, s.id");

        let grades = query
            .build_query_as::<GradeSummary>()
            .fetch_all(db)
            .await?
            .into_iter()
            .map(GradeSummary::with_overall)
            .collect();

        Ok((class, grades))
    }

    pub fn render_csv(grades: &[GradeSummary]) -> Result<String, AppError> {
        let mut writer = SpreadsheetWriter::new(&GRADES_HEADERS)?;
        for grade in grades {
            let mut row = vec![
                grade.number.map(|n| n.to_string()).unwrap_or_default(),
                grade.name.clone(),
                grade.lessons_evaluated.to_string(),
                grade.late_count.to_string(),
                grade.absences.to_string(),
                grade.disciplinary_absences.to_string(),
            ];
            row.extend(grade.dimension_averages().into_iter().map(average_cell));
            row.push(average_cell(grade.overall));
            writer.write_row(row)?;
        }
        Ok(writer.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonbook_models::ids::StudentId;
    use crate::modules::evaluations::model::EvaluationInput;
    use crate::modules::calendar::model::{CalendarFilterParams, LessonEntry};
    use crate::modules::school_years::service::SchoolYearService;
    use axum::http::StatusCode;
    use lessonbook_core::spreadsheet::read_sheet;

    struct Fixture {
        class_id: ClassId,
        year_id: i64,
        entries: Vec<LessonEntry>,
        students: Vec<StudentId>,
    }

    async fn fixture(pool: &SqlitePool) -> Fixture {
        let year_id: i64 = sqlx::query_scalar(
            "INSERT INTO school_years (name, start_date, end_date, is_active) VALUES ('2025/2026', '2025-09-15', '2026-06-30', 1) RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        let class_id = sqlx::query_scalar::<_, ClassId>(
            "INSERT INTO classes (school_year_id, name, load_monday, load_wednesday) VALUES (?, '9.º D', 1, 1) RETURNING id",
        )
        .bind(year_id)
        .fetch_one(pool)
        .await
        .unwrap();
        CalendarService::generate_calendar(pool, class_id).await.unwrap();
        for (number, name) in [(1, "Ana"), (2, "Bruno")] {
            sqlx::query("INSERT INTO students (class_id, number, name) VALUES (?, ?, ?)")
                .bind(class_id)
                .bind(number)
                .bind(name)
                .execute(pool)
                .await
                .unwrap();
        }

        let entries = CalendarService::get_entries(pool, class_id, CalendarFilterParams::default())
            .await
            .unwrap();
        let students =
            sqlx::query_scalar::<_, StudentId>("SELECT id FROM students WHERE class_id = ? ORDER BY number")
                .bind(class_id)
                .fetch_all(pool)
                .await
                .unwrap();
        Fixture {
            class_id,
            year_id,
            entries,
            students,
        }
    }

    fn input(student_id: StudentId, behaviour: i64) -> EvaluationInput {
        EvaluationInput {
            student_id,
            late: false,
            absences: 0,
            responsibility: 3,
            behaviour,
            participation: 3,
            autonomous_work: 3,
            materials: 3,
            activity: 3,
            disciplinary_absence: 0,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unevaluated_students_get_defaults(pool: SqlitePool) {
        let f = fixture(&pool).await;
        let rows = EvaluationService::get_evaluations(&pool, f.entries[0].id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].evaluated);
        assert_eq!(rows[0].behaviour, 3);
        assert_eq!(rows[0].absences, 0);
        assert!(!rows[0].late);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_upsert_replaces_and_aggregates(pool: SqlitePool) {
        let f = fixture(&pool).await;
        let ana = f.students[0];

        for (entry, behaviour) in [(&f.entries[0], 5), (&f.entries[1], 4)] {
            EvaluationService::upsert_evaluations(
                &pool,
                entry.id,
                UpsertEvaluationsDto {
                    evaluations: vec![EvaluationInput {
                        late: true,
                        ..input(ana, behaviour)
                    }],
                },
            )
            .await
            .unwrap();
        }
        let rows = EvaluationService::upsert_evaluations(
            &pool,
            f.entries[1].id,
            UpsertEvaluationsDto {
                evaluations: vec![input(ana, 2)],
            },
        )
        .await
        .unwrap();
        assert!(rows[0].evaluated);
        assert_eq!(rows[0].behaviour, 2);

        let (_, grades) = EvaluationService::get_grades(&pool, f.class_id, GradesFilterParams::default())
            .await
            .unwrap();
        assert_eq!(grades[0].lessons_evaluated, 2);
        assert_eq!(grades[0].late_count, 1);
        assert_eq!(grades[0].behaviour, Some(3.5));
        assert_eq!(grades[1].lessons_evaluated, 0);
        assert_eq!(grades[1].overall, None);

        let (_, ranged) = EvaluationService::get_grades(
            &pool,
            f.class_id,
            GradesFilterParams {
                from: Some(f.entries[1].date),
                to: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(ranged[0].lessons_evaluated, 1);

        let csv = EvaluationService::render_csv(&grades).unwrap();
        let sheet = read_sheet(&csv).unwrap();
        assert_eq!(sheet.headers, GRADES_HEADERS.map(String::from).to_vec());
        assert_eq!(sheet.rows[0][1], "Ana");
        assert_eq!(sheet.rows[0][7], "3,50");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_upsert_guards(pool: SqlitePool) {
        let f = fixture(&pool).await;
        let other_class: i64 = sqlx::query_scalar(
            "INSERT INTO classes (school_year_id, name) VALUES (?, '9.º E') RETURNING id",
        )
        .bind(f.year_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        let stranger: StudentId = sqlx::query_scalar(
            "INSERT INTO students (class_id, name) VALUES (?, 'Carla') RETURNING id",
        )
        .bind(other_class)
        .fetch_one(&pool)
        .await
        .unwrap();

        let err = EvaluationService::upsert_evaluations(
            &pool,
            f.entries[0].id,
            UpsertEvaluationsDto {
                evaluations: vec![input(stranger, 3)],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);

        CalendarService::delete_entry(&pool, f.entries[0].id).await.unwrap();
        let err = EvaluationService::upsert_evaluations(
            &pool,
            f.entries[0].id,
            UpsertEvaluationsDto {
                evaluations: vec![input(f.students[0], 3)],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        SchoolYearService::set_closed(&pool, f.year_id.into(), true)
            .await
            .unwrap();
        let err = EvaluationService::upsert_evaluations(
            &pool,
            f.entries[1].id,
            UpsertEvaluationsDto {
                evaluations: vec![input(f.students[0], 3)],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
