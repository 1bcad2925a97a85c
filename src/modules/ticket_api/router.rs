use axum::{Router, routing::get};

use crate::modules::ticket_api::controller::{get_all, get_one, get_open, search};
use crate::state::AppState;

pub fn init_ticket_api_router() -> Router<AppState> {
    let router = Router::new()
        .route("/", get(get_all))
        .route("/open", get(get_open))
        .route("/search", get(search))
        .route("/{id}", get(get_one));

    #[cfg(feature = "ticket-api-mutations")]
    let router = {
        use crate::modules::ticket_api::controller::{close, create};
        use axum::routing::{patch, post};

        router
            .route("/", post(create))
            .route("/{id}", patch(close))
    };

    router
}
