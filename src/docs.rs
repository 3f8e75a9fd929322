use utoipa::OpenApi;

use crate::modules::backups::model::{BackupFile, BackupListing, JsonSnapshotResponse};
use crate::modules::calendar::model::{
    CreateLessonEntryDto, GenerateCalendarResponse, LessonEntry, LessonEntryWithClass, LessonKind,
    RenumberResponse, ResetCalendarResponse, UpdateLessonEntryDto, UpdateSummaryDto,
};
use crate::modules::calendar_io::model::{
    ClassImportBlock, ClassImportOutcome, ClassImportPayload, ClassRef, ClassSummariesExport,
    ImportReport, LessonRecord, LessonRecordInput, MultiImportPayload, MultiImportReport,
};
use crate::modules::classes::model::{
    Class, ClassKind, CreateClassDto, Module, ModuleDto, PeriodType, UpdateClassDto,
};
use crate::modules::evaluations::model::{
    EvaluationInput, EvaluationRow, GradeSummary, UpsertEvaluationsDto,
};
use crate::modules::other_dates::model::{
    AddExtraLessonDto, ChangeKindDto, ChangeKindResponse, OtherDateRecord,
};
use crate::modules::school_calendar::model::{
    Holiday, HolidayDto, Interruption, InterruptionDto, SchoolCalendarExport,
};
use crate::modules::school_years::model::{
    CreateSchoolYearDto, PaginatedSchoolYearsResponse, SchoolYear, UpdateSchoolYearDto,
};
use crate::modules::students::model::{
    CreateStudentDto, PaginatedStudentsResponse, PaginationMeta, RejectedRow, Student,
    StudentImportReport, TransferMode, TransferResponse, TransferStudentsDto, UpdateStudentDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::school_years::controller::create_school_year,
        crate::modules::school_years::controller::get_school_years,
        crate::modules::school_years::controller::get_active_school_year,
        crate::modules::school_years::controller::get_school_year,
        crate::modules::school_years::controller::update_school_year,
        crate::modules::school_years::controller::delete_school_year,
        crate::modules::school_years::controller::activate_school_year,
        crate::modules::school_years::controller::close_school_year,
        crate::modules::school_years::controller::reopen_school_year,
        crate::modules::school_calendar::controller::create_interruption,
        crate::modules::school_calendar::controller::get_interruptions,
        crate::modules::school_calendar::controller::update_interruption,
        crate::modules::school_calendar::controller::delete_interruption,
        crate::modules::school_calendar::controller::create_holiday,
        crate::modules::school_calendar::controller::get_holidays,
        crate::modules::school_calendar::controller::add_national_holidays,
        crate::modules::school_calendar::controller::update_holiday,
        crate::modules::school_calendar::controller::delete_holiday,
        crate::modules::school_calendar::controller::get_school_calendar,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::classes::controller::get_modules,
        crate::modules::classes::controller::create_module,
        crate::modules::classes::controller::update_module,
        crate::modules::classes::controller::delete_module,
        crate::modules::calendar::controller::generate_calendar,
        crate::modules::calendar::controller::reset_calendar,
        crate::modules::calendar::controller::renumber_calendar,
        crate::modules::calendar::controller::get_entries,
        crate::modules::calendar::controller::create_entry,
        crate::modules::calendar::controller::get_entry,
        crate::modules::calendar::controller::update_entry,
        crate::modules::calendar::controller::delete_entry,
        crate::modules::calendar::controller::update_summary,
        crate::modules::calendar::controller::get_day_entries,
        crate::modules::other_dates::controller::get_other_dates,
        crate::modules::other_dates::controller::add_extra_lesson,
        crate::modules::other_dates::controller::change_kind,
        crate::modules::other_dates::controller::export_other_dates_csv,
        crate::modules::other_dates::controller::export_other_dates_json,
        crate::modules::calendar_io::controller::export_summaries_json,
        crate::modules::calendar_io::controller::export_summaries_csv,
        crate::modules::calendar_io::controller::import_summaries_json,
        crate::modules::calendar_io::controller::import_summaries_csv,
        crate::modules::calendar_io::controller::import_multi_class_json,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::import_students,
        crate::modules::students::controller::transfer_students,
        crate::modules::evaluations::controller::get_evaluations,
        crate::modules::evaluations::controller::upsert_evaluations,
        crate::modules::evaluations::controller::get_grades,
        crate::modules::evaluations::controller::export_grades,
        crate::modules::backups::controller::list_backups,
        crate::modules::backups::controller::download_backup,
        crate::modules::backups::controller::write_json_snapshot,
    ),
    components(
        schemas(
            SchoolYear,
            CreateSchoolYearDto,
            UpdateSchoolYearDto,
            PaginatedSchoolYearsResponse,
            Interruption,
            InterruptionDto,
            Holiday,
            HolidayDto,
            SchoolCalendarExport,
            Class,
            ClassKind,
            PeriodType,
            CreateClassDto,
            UpdateClassDto,
            Module,
            ModuleDto,
            LessonKind,
            LessonEntry,
            LessonEntryWithClass,
            CreateLessonEntryDto,
            UpdateLessonEntryDto,
            UpdateSummaryDto,
            GenerateCalendarResponse,
            ResetCalendarResponse,
            RenumberResponse,
            AddExtraLessonDto,
            ChangeKindDto,
            ChangeKindResponse,
            OtherDateRecord,
            ClassRef,
            LessonRecord,
            LessonRecordInput,
            ClassSummariesExport,
            ClassImportPayload,
            ClassImportBlock,
            MultiImportPayload,
            ImportReport,
            ClassImportOutcome,
            MultiImportReport,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            PaginatedStudentsResponse,
            PaginationMeta,
            RejectedRow,
            StudentImportReport,
            TransferMode,
            TransferStudentsDto,
            TransferResponse,
            EvaluationRow,
            EvaluationInput,
            UpsertEvaluationsDto,
            GradeSummary,
            BackupFile,
            BackupListing,
            JsonSnapshotResponse,
        )
    ),
    tags(
        (name = "School Years", description = "School years, activation and closing"),
        (name = "School Calendar", description = "Interruptions and holidays of a school year"),
        (name = "Classes", description = "Classes and their modules"),
        (name = "Calendar", description = "Lesson calendar generation, entries and numbering"),
        (name = "Other Dates", description = "Special lessons: strikes, absences, extra lessons"),
        (name = "Calendar Import/Export", description = "Summaries as JSON and spreadsheet files"),
        (name = "Students", description = "Class rosters, import and transfer"),
        (name = "Evaluations", description = "Daily evaluations and aggregated grades"),
        (name = "Backups", description = "Database backups and JSON snapshots")
    ),
    info(
        title = "Lessonbook API",
        version = "0.1.0",
        description = "Teacher's lesson book: school calendars, numbered lesson summaries, rosters and evaluations.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;
