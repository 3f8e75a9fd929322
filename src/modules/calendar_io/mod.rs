pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::{init_calendar_import_router, init_class_calendar_io_router};
