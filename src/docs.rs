use sms_core::{ErrorResponse, Role};
use sms_models::{TicketDto, TicketRange, TicketSearchQuery};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::ticket_api::controller::get_all,
        crate::modules::ticket_api::controller::get_open,
        crate::modules::ticket_api::controller::get_one,
        crate::modules::ticket_api::controller::search,
    ),
    components(
        schemas(
            TicketDto,
            TicketRange,
            TicketSearchQuery,
            ErrorResponse,
            Role,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Tickets", description = "Read-only ticket API")
    ),
    info(
        title = "SMS API",
        version = "0.1.0",
        description = "JSON API of the student management service. Interactive pages are not documented here.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

#[cfg(feature = "ticket-api-mutations")]
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::ticket_api::controller::create,
        crate::modules::ticket_api::controller::close,
    ),
    components(schemas(sms_models::CreateTicketDto, sms_models::CloseTicketDto))
)]
struct TicketMutationsDoc;

/// OpenAPI document for the endpoints compiled into this build.
pub fn api_doc() -> utoipa::openapi::OpenApi {
    #[allow(unused_mut)]
    let mut doc = ApiDoc::openapi();
    #[cfg(feature = "ticket-api-mutations")]
    doc.merge(TicketMutationsDoc::openapi());
    doc
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
