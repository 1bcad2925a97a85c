use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use sms::logging::init_tracing;
use sms::metrics::{init_metrics, metrics_app};
use sms::router::init_router;
use sms::service::PgStudentService;
use sms::state::AppState;
use sms_config::ServerConfig;
use sms_db::{init_db_pool, run_migrations};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing().context("Failed to create logs directory")?;

    let server_config = ServerConfig::from_env();

    if let Some(handle) = init_metrics().context("Failed to install Prometheus recorder")? {
        let metrics_addr = server_config.metrics_addr();
        let listener = tokio::net::TcpListener::bind(&metrics_addr)
            .await
            .with_context(|| format!("Failed to bind metrics listener on {}", metrics_addr))?;
        info!("Metrics available at http://{}/metrics", metrics_addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let pool = init_db_pool()
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to apply migrations")?;

    let state = AppState::new(Arc::new(PgStudentService::new(pool)));
    let app = init_router(state);

    let addr = server_config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Scalar UI available at http://{}/scalar", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
