use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::students::controller::{
    create, create_form, create_ticket, create_ticket_form, delete_confirm, delete_form,
    delete_ticket_confirm, delete_ticket_form, details, edit, edit_form, index,
};
use crate::state::AppState;

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/details/{id}", get(details))
        .route("/create", get(create_form).post(create))
        .route("/edit/{id}", get(edit_form).post(edit))
        .route("/delete/{id}", get(delete_form))
        .route("/deleteconfirm/{id}", post(delete_confirm))
        .route(
            "/createticket/{id}",
            get(create_ticket_form).post(create_ticket),
        )
        .route("/ticketdelete/{id}", get(delete_ticket_form))
        .route("/ticketdeleteconfirm/{id}", post(delete_ticket_confirm))
}
