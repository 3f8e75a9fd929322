pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::{init_class_grades_router, init_entry_evaluations_router};
