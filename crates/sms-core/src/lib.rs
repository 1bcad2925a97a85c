//! # SMS Core
//!
//! Core types shared by every SMS crate:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`authorization`]: Roles, guarded operations and the authorization predicate
//! - [`serde`]: Lenient deserializers for HTML form fields
//!
//! # Example
//!
//! ```ignore
//! use sms_core::authorization::{Operation, Role, is_authorized};
//! use sms_core::AppError;
//!
//! if !is_authorized(&[Role::Manager], Operation::StudentCreate) {
//!     return Err(AppError::forbidden("Administrator role required"));
//! }
//! ```

pub mod authorization;
pub mod errors;
pub mod serde;

pub use authorization::{Operation, Role, is_authorized};
pub use errors::{AppError, ErrorResponse};
