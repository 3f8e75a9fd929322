pub use lessonbook_models::calendar::{
    AddExtraLessonDto, ChangeKindDto, ChangeKindResponse, LessonEntry, LessonEntryWithClass,
    LessonKind, OtherDatesFilterParams,
};
pub use lessonbook_models::calendar_io::OtherDateRecord;

/// Header row of the "outras datas" spreadsheet.
pub const OTHER_DATES_HEADERS: [&str; 6] = [
    "DATA",
    "TURMA",
    "TIPO",
    "N.º Aulas",
    "Sumário",
    "Observações",
];
