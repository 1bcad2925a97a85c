use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use sms_core::{AppError, ErrorResponse, Operation};
use sms_models::{TicketDto, TicketSearchQuery};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::authorize;
use crate::state::AppState;

#[cfg(feature = "ticket-api-mutations")]
use crate::{metrics, validator::ValidatedJson};
#[cfg(feature = "ticket-api-mutations")]
use sms_models::{CloseTicketDto, CreateTicketDto};

fn to_dtos(tickets: &[sms_models::Ticket]) -> Vec<TicketDto> {
    tickets.iter().map(TicketDto::from).collect()
}

#[utoipa::path(
    get,
    path = "/api/ticket",
    responses(
        (status = 200, description = "All tickets", body = Vec<TicketDto>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tickets"
)]
#[instrument(skip(state))]
pub async fn get_all(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<TicketDto>>, AppError> {
    authorize(&auth_user, Operation::TicketApiRead)?;

    let tickets = state.service.get_all_tickets().await?;
    Ok(Json(to_dtos(&tickets)))
}

#[utoipa::path(
    get,
    path = "/api/ticket/open",
    responses(
        (status = 200, description = "Open tickets", body = Vec<TicketDto>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tickets"
)]
#[instrument(skip(state))]
pub async fn get_open(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<TicketDto>>, AppError> {
    authorize(&auth_user, Operation::TicketApiRead)?;

    let tickets = state.service.get_open_tickets().await?;
    Ok(Json(to_dtos(&tickets)))
}

#[utoipa::path(
    get,
    path = "/api/ticket/{id}",
    params(
        ("id" = i32, Path, description = "Ticket ID")
    ),
    responses(
        (status = 200, description = "Ticket", body = TicketDto),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tickets"
)]
#[instrument(skip(state))]
pub async fn get_one(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<TicketDto>, AppError> {
    authorize(&auth_user, Operation::TicketApiRead)?;

    let ticket = state
        .service
        .get_ticket(id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Ticket {} not found", id)))?;

    Ok(Json(TicketDto::from(&ticket)))
}

#[utoipa::path(
    get,
    path = "/api/ticket/search",
    params(TicketSearchQuery),
    responses(
        (status = 200, description = "Matching tickets", body = Vec<TicketDto>),
        (status = 400, description = "Invalid search parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tickets"
)]
#[instrument(skip(state, query))]
pub async fn search(
    State(state): State<AppState>,
    auth_user: AuthUser,
    query: Result<Query<TicketSearchQuery>, QueryRejection>,
) -> Result<Json<Vec<TicketDto>>, AppError> {
    authorize(&auth_user, Operation::TicketApiRead)?;

    let Query(search) = query.map_err(|e| AppError::bad_request(anyhow!(e.body_text())))?;
    let tickets = state.service.search_tickets(&search).await?;
    Ok(Json(to_dtos(&tickets)))
}

#[cfg(feature = "ticket-api-mutations")]
#[utoipa::path(
    post,
    path = "/api/ticket",
    request_body = CreateTicketDto,
    responses(
        (status = 200, description = "Ticket created", body = TicketDto),
        (status = 400, description = "Ticket could not be created", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin or manager only", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tickets"
)]
#[instrument(skip(state, dto))]
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateTicketDto>,
) -> Result<Json<TicketDto>, AppError> {
    authorize(&auth_user, Operation::TicketApiWrite)?;

    let ticket = state
        .service
        .create_ticket(dto.student_id, dto.issue.trim())
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow!("Ticket could not be created")))?;

    metrics::track_ticket_created("api");
    Ok(Json(TicketDto::from(&ticket)))
}

#[cfg(feature = "ticket-api-mutations")]
#[utoipa::path(
    patch,
    path = "/api/ticket/{id}",
    params(
        ("id" = i32, Path, description = "Ticket ID")
    ),
    request_body = CloseTicketDto,
    responses(
        (status = 200, description = "Ticket closed", body = TicketDto),
        (status = 400, description = "Ticket could not be closed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - admin or manager only", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tickets"
)]
#[instrument(skip(state, dto))]
pub async fn close(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(dto): Json<CloseTicketDto>,
) -> Result<Json<TicketDto>, AppError> {
    authorize(&auth_user, Operation::TicketApiWrite)?;

    let ticket = state
        .service
        .close_ticket(id, dto.resolution.trim())
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow!("Ticket {} could not be closed", id)))?;

    metrics::track_ticket_closed();
    Ok(Json(TicketDto::from(&ticket)))
}
