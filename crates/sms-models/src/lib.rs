//! # SMS Models
//!
//! Domain entities, form/view models and API DTOs.
//!
//! # Modules
//!
//! - [`students`]: Student entity and the create/edit form
//! - [`tickets`]: Ticket entity, search range, view models and API projection
//! - [`modules`]: Module catalogue and student enrollments
//! - [`select`]: Option lists rendered as `<select>` inputs
//! - [`form`]: Numeric form inputs that survive non-numeric text
//!
//! Form models derive `validator::Validate`; entity models derive
//! `sqlx::FromRow` and are what the service layer hands back.

pub mod form;
pub mod modules;
pub mod select;
pub mod students;
pub mod tickets;

pub use form::{FormNumber, parsed};
pub use modules::{Module, StudentModule, StudentModuleViewModel};
pub use select::{SelectItem, select_list};
pub use students::{Student, StudentData, StudentEditViewModel, StudentForm};
pub use tickets::{
    CloseTicketDto, CreateTicketDto, StudentTicketForm, Ticket, TicketCloseForm,
    TicketCreateViewModel, TicketDeleteForm, TicketDto, TicketRange, TicketSearchQuery,
    TicketSearchViewModel,
};
