use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_class, create_module, delete_class, delete_module, get_class, get_classes,
    get_modules, update_class, update_module,
};

pub fn init_classes_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_class).get(get_classes))
        .route(
            "/{id}",
            get(get_class).put(update_class).delete(delete_class),
        )
        .route("/{id}/modules", post(create_module).get(get_modules))
}

pub fn init_modules_router() -> Router<AppState> {
    Router::new().route("/{id}", put(update_module).delete(delete_module))
}
