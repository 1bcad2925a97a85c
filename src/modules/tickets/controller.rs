use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use sms_core::{AppError, Operation};
use sms_models::{
    Student, TicketCloseForm, TicketCreateViewModel, TicketSearchQuery, TicketSearchViewModel,
    parsed,
};
use tracing::{info, instrument};
use validator::Validate;

use crate::metrics::{track_ticket_closed, track_ticket_created};
use crate::middleware::auth::AuthUser;
use crate::middleware::role::authorize;
use crate::state::AppState;
use crate::validator::{FieldErrors, add_field_error, field_errors};
use crate::view::PageContext;

const INDEX: &str = "/ticket";

async fn search(
    state: &AppState,
    search: TicketSearchQuery,
) -> Result<TicketSearchViewModel, AppError> {
    let tickets = state.service.search_tickets(&search).await?;
    Ok(TicketSearchViewModel::new(search, tickets))
}

// GET /ticket?range=&query=
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ctx: PageContext,
    Query(query): Query<TicketSearchQuery>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::TicketSearch)?;

    let vm = search(&state, query).await?;
    Ok(ctx.render("ticket/index", vm))
}

// GET /ticket/indexextended
#[instrument(skip(state, ctx))]
pub async fn index_extended(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ctx: PageContext,
    Query(query): Query<TicketSearchQuery>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::TicketSearch)?;

    let vm = search(&state, query).await?;
    Ok(ctx.render("ticket/indexextended", vm))
}

// POST /ticket/indexextended
#[instrument(skip(state, ctx))]
pub async fn index_extended_search(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut ctx: PageContext,
    Form(query): Form<TicketSearchQuery>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::TicketSearch)?;

    let vm = search(&state, query.clone()).await?;
    ctx.info(query.summary(vm.tickets.len()));
    Ok(ctx.render("ticket/indexextended", vm))
}

// GET /ticket/{id}
#[instrument(skip(state, ctx))]
pub async fn details(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::TicketView)?;

    match state.service.get_ticket(id).await? {
        Some(ticket) => Ok(ctx.render("ticket/details", ticket)),
        None => {
            ctx.warning(format!("Ticket {} not found", id));
            Ok(ctx.redirect(INDEX))
        }
    }
}

// POST /ticket/close
#[instrument(skip(state, ctx, form))]
pub async fn close(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut ctx: PageContext,
    Form(form): Form<TicketCloseForm>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::TicketClose)?;

    let Some(id) = form.ticket_id() else {
        ctx.warning("Ticket not found");
        return Ok(ctx.redirect(INDEX));
    };

    match state
        .service
        .close_ticket(id, form.resolution.trim())
        .await?
    {
        Some(ticket) => {
            track_ticket_closed();
            info!(ticket_id = ticket.id, "Ticket closed");
            ctx.info(format!("Ticket {} closed", ticket.id));
        }
        None => ctx.warning(format!("Ticket {} not found", id)),
    }

    Ok(ctx.redirect(INDEX))
}

// GET /ticket/create
#[instrument(skip(state, ctx))]
pub async fn create_form(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ctx: PageContext,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::TicketCreate)?;

    let students = state.service.get_students().await?;
    let vm = TicketCreateViewModel {
        students: Student::select_list(&students, None),
        ..TicketCreateViewModel::default()
    };
    Ok(ctx.render("ticket/create", vm))
}

// POST /ticket/create
#[instrument(skip(state, ctx, form))]
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut ctx: PageContext,
    Form(mut form): Form<TicketCreateViewModel>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::TicketCreate)?;

    form.issue = form.issue.trim().to_string();
    let mut errors = form
        .validate()
        .map(|()| FieldErrors::new())
        .unwrap_or_else(|e| field_errors(&e));

    if errors.is_empty() {
        if let Some(student_id) = parsed(&form.student_id) {
            match state.service.create_ticket(student_id, &form.issue).await? {
                Some(ticket) => {
                    track_ticket_created("staff");
                    info!(ticket_id = ticket.id, student_id, "Ticket created");
                    ctx.info("Ticket created");
                    return Ok(ctx.redirect(INDEX));
                }
                None => add_field_error(
                    &mut errors,
                    "student_id",
                    format!("Student {} not found", student_id),
                ),
            }
        }
    }

    // The option list is never posted back; rebuild it for the redisplay
    let students = state.service.get_students().await?;
    form.students = Student::select_list(&students, parsed(&form.student_id));
    Ok(ctx.render_invalid("ticket/create", form, errors))
}
