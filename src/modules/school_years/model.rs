pub use lessonbook_models::school_years::*;
