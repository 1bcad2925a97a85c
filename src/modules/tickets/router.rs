use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::tickets::controller::{
    close, create, create_form, details, index, index_extended, index_extended_search,
};
use crate::state::AppState;

pub fn init_tickets_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route(
            "/indexextended",
            get(index_extended).post(index_extended_search),
        )
        .route("/close", post(close))
        .route("/create", get(create_form).post(create))
        .route("/{id}", get(details))
}
