//! Summary export and import payloads.
//!
//! The JSON shape uses Portuguese keys so that files exported by the
//! application can be edited by hand and imported back.

use crate::calendar::LessonKind;
use crate::ids::ClassId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use lessonbook_core::serde::deserialize_optional_i64;

/// Exported lesson.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LessonRecord {
    pub data: NaiveDate,
    pub tipo: LessonKind,
    pub numero_aulas: i64,
    pub modulo_nome: Option<String>,
    pub numero_modulo: Option<i64>,
    pub total_geral: Option<i64>,
    /// Summary numbers of the day, e.g. "12,13"
    pub sumarios: Option<String>,
    pub sumario: Option<String>,
    pub previsao: Option<String>,
    pub tempos_sem_aula: i64,
    pub observacoes: Option<String>,
    pub atividade: bool,
    pub atividade_nome: Option<String>,
}

/// One special lesson in the "outras datas" JSON export.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OtherDateRecord {
    pub data: NaiveDate,
    /// Class name
    pub turma: String,
    pub tipo: LessonKind,
    pub numero_aulas: i64,
    pub sumario: Option<String>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassRef {
    pub id: ClassId,
    pub nome: String,
}

/// Per-class summaries export.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassSummariesExport {
    pub turma: ClassRef,
    pub aulas: Vec<LessonRecord>,
}

/// Lesson object as read on import. Every field is optional; objects
/// without a parseable `data` are ignored.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LessonRecordInput {
    /// `YYYY-MM-DD` or `dd/mm/YYYY`
    pub data: Option<String>,
    pub tipo: Option<String>,
    pub numero_aulas: Option<i64>,
    pub sumario: Option<String>,
    pub previsao: Option<String>,
    pub tempos_sem_aula: Option<i64>,
    pub observacoes: Option<String>,
    pub atividade: Option<bool>,
    pub atividade_nome: Option<String>,
}

impl LessonRecordInput {
    /// Same bounds as the calendar forms: 1-12 lessons, 0-12 non-lesson
    /// periods. Absent counts pass.
    pub fn counts_in_range(&self) -> bool {
        self.numero_aulas.is_none_or(|n| (1..=12).contains(&n))
            && self.tempos_sem_aula.is_none_or(|n| (0..=12).contains(&n))
    }
}

/// Body of a single-class import: a bare list or `{"aulas": [...]}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ClassImportPayload {
    Lessons(Vec<LessonRecordInput>),
    Wrapped { aulas: Vec<LessonRecordInput> },
}

impl ClassImportPayload {
    pub fn into_lessons(self) -> Vec<LessonRecordInput> {
        match self {
            ClassImportPayload::Lessons(lessons) => lessons,
            ClassImportPayload::Wrapped { aulas } => aulas,
        }
    }
}

/// One class block of a multi-class import.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClassImportBlock {
    pub turma_id: Option<ClassId>,
    pub turma_nome: Option<String>,
    #[serde(default)]
    pub aulas: Vec<LessonRecordInput>,
}

/// Body of a multi-class import.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum MultiImportPayload {
    Classes { turmas: Vec<ClassImportBlock> },
    Lessons(Vec<LessonRecordInput>),
    Wrapped { aulas: Vec<LessonRecordInput> },
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MultiImportParams {
    /// Target class for a bare list of lessons
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub class_id: Option<i64>,
}

/// Import counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImportReport {
    pub created: i64,
    pub updated: i64,
    pub ignored: i64,
}

impl ImportReport {
    pub fn merge(&mut self, other: ImportReport) {
        self.created += other.created;
        self.updated += other.updated;
        self.ignored += other.ignored;
    }
}

/// Outcome of one class block in a multi-class import.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClassImportOutcome {
    pub class_id: Option<ClassId>,
    pub class_name: Option<String>,
    #[serde(flatten)]
    pub report: ImportReport,
    /// Why the block was skipped
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MultiImportReport {
    pub totals: ImportReport,
    pub classes: Vec<ClassImportOutcome>,
}
