use anyhow::anyhow;
use lessonbook_core::AppError;
use lessonbook_core::spreadsheet::{sniff_delimiter, strip_bom};
use lessonbook_models::classes::Class;
use lessonbook_models::ids::{ClassId, StudentId};
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::metrics::track_import;
use crate::modules::calendar::service::merge_text;
use crate::modules::students::model::{
    CreateStudentDto, PaginatedStudentsResponse, PaginationMeta, PaginationParams,
    ROSTER_HEADER_WORDS, RejectedRow, Student, StudentImportParams, StudentImportReport,
    TransferMode, TransferResponse, TransferStudentsDto, UpdateStudentDto, parse_special_needs,
};
use crate::utils::guards::{class_context, open_class_context, open_school_year};

/// One data row of a roster file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    /// 1-based line in the file
    pub line: usize,
    pub process_number: Option<String>,
    pub number: Option<i64>,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub special_needs: bool,
    pub observations: Option<String>,
    /// Class id or name
    pub class_ref: Option<String>,
}

fn cell(record: &csv::StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn is_header(record: &csv::StringRecord) -> bool {
    let Some(first) = record.get(0).map(|c| c.trim().to_lowercase()) else {
        return false;
    };
    first.parse::<i64>().is_err() && ROSTER_HEADER_WORDS.iter().any(|w| first.contains(w))
}

/// Parses a roster file: process, number, name, short name, special needs,
/// observations and an optional class column. A leading header row is
/// skipped.
pub fn parse_roster(text: &str) -> Result<Vec<RosterRow>, csv::Error> {
    let body = strip_bom(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(body))
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if index == 0 && is_header(&record) {
            continue;
        }
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 1);
        rows.push(RosterRow {
            line,
            process_number: cell(&record, 0),
            number: cell(&record, 1).and_then(|n| n.parse().ok()),
            name: cell(&record, 2),
            short_name: cell(&record, 3),
            special_needs: cell(&record, 4).is_some_and(|v| parse_special_needs(&v)),
            observations: cell(&record, 5),
            class_ref: cell(&record, 6),
        });
    }
    Ok(rows)
}

pub struct StudentService;

impl StudentService {
    async fn find_student(db: &SqlitePool, id: StudentId) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    #[instrument(skip(db))]
    pub async fn create_student(
        db: &SqlitePool,
        class_id: ClassId,
        dto: CreateStudentDto,
    ) -> Result<Student, AppError> {
        open_class_context(db, class_id).await?;

        let student = sqlx::query_as::<_, Student>(
            r#"INSERT INTO students
                   (class_id, process_number, number, name, short_name, special_needs, observations)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(class_id)
        .bind(&dto.process_number)
        .bind(dto.number)
        .bind(dto.name.trim())
        .bind(&dto.short_name)
        .bind(dto.special_needs)
        .bind(&dto.observations)
        .fetch_one(db)
        .await?;

        info!(student_id = %student.id, class_id = %class_id, "Student created");
        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn get_students(
        db: &SqlitePool,
        class_id: ClassId,
        pagination: PaginationParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        class_context(db, class_id).await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students WHERE class_id = ?")
            .bind(class_id)
            .fetch_one(db)
            .await?;

        let data = sqlx::query_as::<_, Student>(
            r#"SELECT * FROM students
               WHERE class_id = ?
               ORDER BY number IS NULL, number, name, id
               LIMIT ? OFFSET ?"#,
        )
        .bind(class_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedStudentsResponse {
            data,
            meta: PaginationMeta::new(&pagination, total),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &SqlitePool, id: StudentId) -> Result<Student, AppError> {
        Self::find_student(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn update_student(
        db: &SqlitePool,
        id: StudentId,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let existing = Self::find_student(db, id).await?;
        open_class_context(db, existing.class_id).await?;

        let student = sqlx::query_as::<_, Student>(
            r#"UPDATE students
               SET process_number = ?, number = ?, name = ?, short_name = ?,
                   special_needs = ?, observations = ?, updated_at = CURRENT_TIMESTAMP
               WHERE id = ?
               RETURNING *"#,
        )
        .bind(merge_text(dto.process_number, existing.process_number))
        .bind(dto.number.or(existing.number))
        .bind(
            dto.name
                .map(|n| n.trim().to_string())
                .unwrap_or(existing.name),
        )
        .bind(merge_text(dto.short_name, existing.short_name))
        .bind(dto.special_needs.unwrap_or(existing.special_needs))
        .bind(merge_text(dto.observations, existing.observations))
        .bind(id)
        .fetch_one(db)
        .await?;

        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn delete_student(db: &SqlitePool, id: StudentId) -> Result<(), AppError> {
        let existing = Self::find_student(db, id).await?;
        open_class_context(db, existing.class_id).await?;

        sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        info!(student_id = %id, "Student deleted");
        Ok(())
    }

    /// Class of a roster row: numeric references are ids, anything else is a
    /// name looked up in the active year first.
    async fn resolve_class_ref(db: &SqlitePool, reference: &str) -> Result<Option<Class>, AppError> {
        if let Ok(id) = reference.parse::<i64>() {
            let class = sqlx::query_as::<_, Class>("SELECT * FROM classes WHERE id = ?")
                .bind(id)
                .fetch_optional(db)
                .await?;
            return Ok(class);
        }

        let class = sqlx::query_as::<_, Class>(
            r#"SELECT c.* FROM classes c
               JOIN school_years y ON y.id = c.school_year_id
               WHERE c.name = ?
               ORDER BY y.is_active DESC, y.start_date DESC, c.id DESC
               LIMIT 1"#,
        )
        .bind(reference)
        .fetch_optional(db)
        .await?;
        Ok(class)
    }

    /// Imports a roster file. Bad rows are reported and skipped; closed
    /// years accept imports.
    #[instrument(skip(db, text))]
    pub async fn import_students(
        db: &SqlitePool,
        text: &str,
        params: StudentImportParams,
    ) -> Result<StudentImportReport, AppError> {
        let rows = parse_roster(text).map_err(AppError::bad_request)?;

        let default_class = match params.default_class_id {
            Some(id) => Some(class_context(db, ClassId::from(id)).await?.class.id),
            None => None,
        };

        let mut report = StudentImportReport::default();
        let mut accepted = Vec::with_capacity(rows.len());
        for row in rows {
            let class_id = match row.class_ref.as_deref() {
                Some(reference) => match Self::resolve_class_ref(db, reference).await? {
                    Some(class) => class.id,
                    None => {
                        report.rejected.push(RejectedRow {
                            row: row.line,
                            reason: format!("Unknown class {reference}"),
                        });
                        continue;
                    }
                },
                None => match default_class {
                    Some(id) => id,
                    None => {
                        report.rejected.push(RejectedRow {
                            row: row.line,
                            reason: "No class given and no default class".to_string(),
                        });
                        continue;
                    }
                },
            };
            let Some(name) = row.name.clone() else {
                report.rejected.push(RejectedRow {
                    row: row.line,
                    reason: "Missing name".to_string(),
                });
                continue;
            };
            accepted.push((class_id, name, row));
        }

        let mut tx = db.begin().await?;
        for (class_id, name, row) in accepted {
            sqlx::query(
                r#"INSERT INTO students
                       (class_id, process_number, number, name, short_name, special_needs, observations)
                   VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(class_id)
            .bind(&row.process_number)
            .bind(row.number)
            .bind(&name)
            .bind(&row.short_name)
            .bind(row.special_needs)
            .bind(&row.observations)
            .execute(&mut *tx)
            .await?;
            report.imported += 1;
        }
        tx.commit().await?;

        if !report.rejected.is_empty() {
            warn!(rejected = report.rejected.len(), "Roster rows rejected");
        }
        track_import("roster", report.imported, 0, report.rejected.len() as i64);
        info!(imported = report.imported, "Students imported");
        Ok(report)
    }

    /// Copies or moves students into another class, all or nothing.
    #[instrument(skip(db))]
    pub async fn transfer_students(
        db: &SqlitePool,
        dto: TransferStudentsDto,
    ) -> Result<TransferResponse, AppError> {
        let destination = class_context(db, dto.destination_class_id).await?.class;
        open_school_year(db, destination.school_year_id).await?;

        let mut tx = db.begin().await?;
        for student_id in &dto.student_ids {
            let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = ?")
                .bind(student_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow!("Student {student_id} not found")))?;

            match dto.mode {
                TransferMode::Copy => {
                    sqlx::query(
                        r#"INSERT INTO students
                               (class_id, process_number, number, name, short_name, special_needs, observations)
                           VALUES (?, ?, ?, ?, ?, ?, ?)"#,
                    )
                    .bind(destination.id)
                    .bind(&student.process_number)
                    .bind(student.number)
                    .bind(&student.name)
                    .bind(&student.short_name)
                    .bind(student.special_needs)
                    .bind(&student.observations)
                    .execute(&mut *tx)
                    .await?;
                }
                TransferMode::Move => {
                    sqlx::query(
                        "UPDATE students SET class_id = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                    )
                    .bind(destination.id)
                    .bind(student.id)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        let students = sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE class_id = ? ORDER BY number IS NULL, number, name, id",
        )
        .bind(destination.id)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(
            destination = %destination.id,
            mode = ?dto.mode,
            count = dto.student_ids.len(),
            "Students transferred"
        );
        Ok(TransferResponse {
            mode: dto.mode,
            destination_class_id: destination.id,
            students,
        })
    }
}
