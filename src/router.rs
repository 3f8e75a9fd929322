use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::modules::backups::init_backups_router;
use crate::modules::calendar::{init_calendar_entries_router, init_class_calendar_router};
use crate::modules::calendar_io::{init_calendar_import_router, init_class_calendar_io_router};
use crate::modules::classes::{init_classes_router, init_modules_router};
use crate::modules::evaluations::{init_class_grades_router, init_entry_evaluations_router};
use crate::modules::other_dates::init_other_dates_router;
use crate::modules::school_calendar::{
    init_holidays_router, init_interruptions_router, init_school_calendar_router,
    init_year_calendar_router,
};
use crate::modules::school_years::init_school_years_router;
use crate::modules::students::{init_class_students_router, init_students_router};
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

fn api_router() -> Router<AppState> {
    Router::new()
        .nest(
            "/school-years",
            init_school_years_router().nest("/{id}", init_year_calendar_router()),
        )
        .nest("/interruptions", init_interruptions_router())
        .nest("/holidays", init_holidays_router())
        .nest("/school-calendar", init_school_calendar_router())
        .nest(
            "/classes",
            init_classes_router()
                .nest(
                    "/{id}/calendar",
                    init_class_calendar_router().merge(init_class_calendar_io_router()),
                )
                .nest("/{id}/students", init_class_students_router())
                .nest("/{id}/grades", init_class_grades_router()),
        )
        .nest("/modules", init_modules_router())
        .nest(
            "/calendar",
            init_calendar_entries_router()
                .merge(init_calendar_import_router())
                .nest("/entries/{id}/evaluations", init_entry_evaluations_router())
                .nest("/other-dates", init_other_dates_router()),
        )
        .nest("/students", init_students_router())
        .nest("/backups", init_backups_router())
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/api", api_router())
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
