pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::{
    init_holidays_router, init_interruptions_router, init_school_calendar_router,
    init_year_calendar_router,
};
