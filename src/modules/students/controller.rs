use axum::{
    Form,
    extract::{Path, State},
    response::Response,
};
use sms_core::{AppError, Operation};
use sms_models::{StudentEditViewModel, StudentForm, StudentTicketForm, TicketDeleteForm};
use tracing::{info, instrument};
use validator::Validate;

use crate::metrics::{track_student_created, track_student_deleted, track_ticket_created};
use crate::middleware::auth::AuthUser;
use crate::middleware::role::authorize;
use crate::state::AppState;
use crate::validator::{FieldErrors, add_field_error, field_errors};
use crate::view::PageContext;

const INDEX: &str = "/student";

fn details_url(id: i32) -> String {
    format!("/student/details/{}", id)
}

fn student_not_found(mut ctx: PageContext, id: i32) -> Response {
    ctx.warning(format!("Student {} not found", id));
    ctx.redirect(INDEX)
}

fn validation_errors<T: Validate>(form: &T) -> FieldErrors {
    form.validate()
        .map(|()| FieldErrors::new())
        .unwrap_or_else(|e| field_errors(&e))
}

// GET /student
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ctx: PageContext,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::StudentList)?;

    let students = state.service.get_students().await?;
    Ok(ctx.render("student/index", students))
}

// GET /student/details/{id}
#[instrument(skip(state, ctx))]
pub async fn details(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::StudentView)?;

    match state.service.get_student(id).await? {
        Some(student) => Ok(ctx.render("student/details", student)),
        None => Ok(student_not_found(ctx, id)),
    }
}

// GET /student/create
#[instrument(skip(ctx))]
pub async fn create_form(auth_user: AuthUser, ctx: PageContext) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::StudentCreate)?;

    Ok(ctx.render("student/create", StudentForm::default()))
}

// POST /student/create
#[instrument(skip(state, ctx, form))]
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut ctx: PageContext,
    Form(form): Form<StudentForm>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::StudentCreate)?;

    let form = form.trimmed();
    let mut errors = validation_errors(&form);
    if state
        .service
        .is_duplicate_student_email(&form.email, None)
        .await?
    {
        add_field_error(&mut errors, "email", "The email address is already in use");
    }

    if !errors.is_empty() {
        return Ok(ctx.render_invalid("student/create", form, errors));
    }

    let student = state.service.add_student(form.to_data()).await?;
    track_student_created();
    info!(student_id = student.id, "Student created");

    ctx.success("Student created successfully");
    Ok(ctx.redirect(&details_url(student.id)))
}

// GET /student/edit/{id}
#[instrument(skip(state, ctx))]
pub async fn edit_form(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::StudentEdit)?;

    match state.service.get_student(id).await? {
        Some(student) => Ok(ctx.render(
            "student/edit",
            StudentEditViewModel {
                id,
                form: StudentForm::from(&student),
            },
        )),
        None => Ok(student_not_found(ctx, id)),
    }
}

// POST /student/edit/{id}
#[instrument(skip(state, ctx, form))]
pub async fn edit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut ctx: PageContext,
    Path(id): Path<i32>,
    Form(form): Form<StudentForm>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::StudentEdit)?;

    let form = form.trimmed();
    let mut errors = validation_errors(&form);
    if state
        .service
        .is_duplicate_student_email(&form.email, Some(id))
        .await?
    {
        add_field_error(&mut errors, "email", "This email is already registered");
    }

    if !errors.is_empty() {
        return Ok(ctx.render_invalid("student/edit", StudentEditViewModel { id, form }, errors));
    }

    match state.service.update_student(id, form.to_data()).await? {
        Some(student) => {
            ctx.info("Student updated successfully");
            Ok(ctx.redirect(&details_url(student.id)))
        }
        // Deleted between loading the form and saving it
        None => Ok(student_not_found(ctx, id)),
    }
}

// GET /student/delete/{id}
#[instrument(skip(state, ctx))]
pub async fn delete_form(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::StudentDelete)?;

    match state.service.get_student(id).await? {
        Some(student) => Ok(ctx.render("student/delete", student)),
        None => Ok(student_not_found(ctx, id)),
    }
}

// POST /student/deleteconfirm/{id}
#[instrument(skip(state, ctx))]
pub async fn delete_confirm(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::StudentDelete)?;

    if state.service.delete_student(id).await? {
        track_student_deleted();
        info!(student_id = id, "Student deleted");
    }

    ctx.success("Student deleted successfully");
    Ok(ctx.redirect(INDEX))
}

// GET /student/createticket/{id}
#[instrument(skip(state, ctx))]
pub async fn create_ticket_form(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::StudentTicketCreate)?;

    match state.service.get_student(id).await? {
        Some(student) => Ok(ctx.render(
            "student/createticket",
            StudentTicketForm {
                student_id: student.id,
                issue: String::new(),
            },
        )),
        None => Ok(student_not_found(ctx, id)),
    }
}

// POST /student/createticket/{id}
#[instrument(skip(state, ctx, form))]
pub async fn create_ticket(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut ctx: PageContext,
    Path(id): Path<i32>,
    Form(mut form): Form<StudentTicketForm>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::StudentTicketCreate)?;

    form.student_id = id;
    form.issue = form.issue.trim().to_string();
    let errors = validation_errors(&form);
    if !errors.is_empty() {
        return Ok(ctx.render_invalid("student/createticket", form, errors));
    }

    match state.service.create_ticket(id, &form.issue).await? {
        Some(ticket) => {
            track_ticket_created("student");
            info!(ticket_id = ticket.id, student_id = id, "Ticket created");
            ctx.info(format!("Ticket created successfully for student {}", id));
            Ok(ctx.redirect(&details_url(id)))
        }
        None => Ok(student_not_found(ctx, id)),
    }
}

// GET /student/ticketdelete/{id}
#[instrument(skip(state, ctx))]
pub async fn delete_ticket_form(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::StudentTicketDelete)?;

    match state.service.get_ticket(id).await? {
        Some(ticket) => Ok(ctx.render("student/ticketdelete", ticket)),
        None => {
            ctx.warning(format!("Ticket {} not found", id));
            Ok(ctx.redirect(INDEX))
        }
    }
}

// POST /student/ticketdeleteconfirm/{id}
#[instrument(skip(state, ctx, form))]
pub async fn delete_ticket_confirm(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut ctx: PageContext,
    Path(id): Path<i32>,
    Form(form): Form<TicketDeleteForm>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::StudentTicketDelete)?;

    let Some(student_id) = form.student_id() else {
        ctx.warning(format!("Ticket {} could not be deleted", id));
        return Ok(ctx.redirect(INDEX));
    };

    if state.service.delete_ticket(id).await? {
        info!(ticket_id = id, student_id, "Ticket deleted");
    }

    ctx.info(format!(
        "Ticket deleted successfully for student {}",
        student_id
    ));
    Ok(ctx.redirect(&details_url(student_id)))
}
