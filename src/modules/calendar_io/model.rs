pub use lessonbook_models::calendar_io::*;

/// Header row of the summaries spreadsheet.
pub const SUMMARY_HEADERS: [&str; 4] = ["DATA", "MÓDULO", "N.º Sumário", "Sumário"];

/// `calendario_<class>_sumarios`, the stem of summaries export files.
pub fn summaries_stem(class_name: &str) -> String {
    format!("calendario_{class_name}_sumarios")
}
