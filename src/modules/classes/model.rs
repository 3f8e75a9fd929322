pub use lessonbook_models::classes::*;
