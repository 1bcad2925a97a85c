use axum::http::{HeaderValue, Method, header};
use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::api_doc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::csrf::{CSRF_HEADER, csrf_protection};
use crate::modules::student_modules::router::init_student_modules_router;
use crate::modules::students::router::init_students_router;
use crate::modules::ticket_api::router::init_ticket_api_router;
use crate::modules::tickets::router::init_tickets_router;
use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn init_router(state: AppState) -> Router {
    // Browser-facing pages; every state-changing request needs the
    // anti-forgery token. The JSON API below is exempt.
    let interactive = Router::new()
        .nest(
            "/student",
            init_students_router().merge(init_student_modules_router()),
        )
        .nest("/ticket", init_tickets_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            csrf_protection,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_doc()))
        .merge(Scalar::with_url("/scalar", api_doc()))
        .merge(interactive)
        .nest("/api/ticket", init_ticket_api_router())
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
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
                .allow_headers([
                    header::AUTHORIZATION,
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    header::HeaderName::from_static(CSRF_HEADER),
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
