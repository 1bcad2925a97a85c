use axum::{
    Form,
    extract::{Path, State},
    response::Response,
};
use sms_core::{AppError, Operation};
use sms_models::{Module, SelectItem, StudentModule, StudentModuleViewModel, parsed};
use tracing::{info, instrument};
use validator::Validate;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::authorize;
use crate::state::AppState;
use crate::validator::{FieldErrors, field_errors};
use crate::view::PageContext;

const STUDENTS: &str = "/student";

fn details_url(student_id: i32) -> String {
    format!("/student/details/{}", student_id)
}

/// No parent student is known, so a missing enrollment falls back to the
/// student list.
fn student_module_not_found(mut ctx: PageContext, id: i32) -> Response {
    ctx.warning(format!("Student module {} not found", id));
    ctx.redirect(STUDENTS)
}

fn validation_errors(vm: &StudentModuleViewModel) -> FieldErrors {
    vm.validate()
        .map(|()| FieldErrors::new())
        .unwrap_or_else(|e| field_errors(&e))
}

// GET /student/moduleupdate/{id}
#[instrument(skip(state, ctx))]
pub async fn update_form(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::ModuleMarkUpdate)?;

    match state.service.get_student_module(id).await? {
        Some(enrollment) => Ok(ctx.render(
            "student/moduleupdate",
            StudentModuleViewModel::from(&enrollment),
        )),
        None => Ok(student_module_not_found(ctx, id)),
    }
}

// POST /student/moduleupdate/{id}
#[instrument(skip(state, ctx, form))]
pub async fn update(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ctx: PageContext,
    Path(id): Path<i32>,
    Form(form): Form<StudentModuleViewModel>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::ModuleMarkUpdate)?;

    let Some(enrollment) = state.service.get_student_module(id).await? else {
        return Ok(student_module_not_found(ctx, id));
    };

    // Only the mark is editable; the pair comes from the stored enrollment
    let vm = StudentModuleViewModel {
        mark: form.mark,
        ..StudentModuleViewModel::from(&enrollment)
    };
    let errors = validation_errors(&vm);
    let Some(mark) = parsed(&vm.mark).filter(|_| errors.is_empty()) else {
        return Ok(ctx.render_invalid("student/moduleupdate", vm, errors));
    };

    let updated = state
        .service
        .update_student_module_mark(enrollment.student_id, enrollment.module_id, mark)
        .await?;
    if updated.is_none() {
        return Ok(student_module_not_found(ctx, id));
    }

    info!(
        student_id = enrollment.student_id,
        module_id = enrollment.module_id,
        mark,
        "Module mark updated"
    );
    Ok(ctx.redirect(&details_url(enrollment.student_id)))
}

async fn available_modules(
    state: &AppState,
    student_id: i32,
    selected: Option<i32>,
) -> Result<Vec<SelectItem>, AppError> {
    let modules = state
        .service
        .get_available_modules_for_student(student_id)
        .await?;
    Ok(Module::select_list(&modules, selected))
}

// GET /student/createmodule/{id}
#[instrument(skip(state, ctx))]
pub async fn create_form(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::ModuleEnroll)?;

    if state.service.get_student(id).await?.is_none() {
        ctx.warning(format!("Student {} not found", id));
        return Ok(ctx.redirect(STUDENTS));
    }

    let vm = StudentModuleViewModel {
        student_id: id,
        modules: available_modules(&state, id, None).await?,
        ..StudentModuleViewModel::default()
    };
    Ok(ctx.render("student/createmodule", vm))
}

// POST /student/createmodule/{id}
#[instrument(skip(state, ctx, form))]
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut ctx: PageContext,
    Path(id): Path<i32>,
    Form(mut form): Form<StudentModuleViewModel>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::ModuleEnroll)?;

    form.student_id = id;
    let errors = validation_errors(&form);
    let valid = match (parsed(&form.module_id), parsed(&form.mark)) {
        (Some(module_id), Some(mark)) if errors.is_empty() => Some((module_id, mark)),
        _ => None,
    };
    let Some((module_id, mark)) = valid else {
        // The option list is never posted back; rebuild it for the redisplay
        form.modules = available_modules(&state, id, parsed(&form.module_id)).await?;
        return Ok(ctx.render_invalid("student/createmodule", form, errors));
    };

    match state
        .service
        .add_student_to_module(id, module_id, mark)
        .await?
    {
        Some(enrollment) => {
            info!(
                enrollment_id = enrollment.id,
                student_id = id,
                module_id,
                "Student enrolled on module"
            );
        }
        None => ctx.warning(format!(
            "Module {} could not be assigned to student {}",
            module_id, id
        )),
    }

    Ok(ctx.redirect(&details_url(id)))
}

// POST /student/moduledelete/{id}
#[instrument(skip(state, ctx))]
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ctx: PageContext,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    authorize(&auth_user, Operation::ModuleUnenroll)?;

    let Some(StudentModule {
        student_id,
        module_id,
        ..
    }) = state.service.get_student_module(id).await?
    else {
        return Ok(student_module_not_found(ctx, id));
    };

    if state
        .service
        .remove_student_from_module(student_id, module_id)
        .await?
    {
        info!(student_id, module_id, "Student removed from module");
    }

    Ok(ctx.redirect(&details_url(student_id)))
}
