use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::student_modules::controller::{
    create, create_form, delete, update, update_form,
};
use crate::state::AppState;

/// Enrollment routes, mounted under `/student` next to the student pages.
pub fn init_student_modules_router() -> Router<AppState> {
    Router::new()
        .route("/moduleupdate/{id}", get(update_form).post(update))
        .route("/createmodule/{id}", get(create_form).post(create))
        .route("/moduledelete/{id}", post(delete))
}
