pub use lessonbook_models::calendar::*;
