pub use lessonbook_core::{PaginationMeta, PaginationParams};
pub use lessonbook_models::students::*;

/// Header words that mark the first row of a roster file as a header.
pub const ROSTER_HEADER_WORDS: [&str; 2] = ["processo", "process"];
