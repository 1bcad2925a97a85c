//! Role checks evaluated inside handlers.
//!
//! Each guarded handler starts with `authorize(&auth_user, Operation::..)?`;
//! the role table itself lives in [`sms_core::authorization`].

use sms_core::{AppError, Operation, Role, is_authorized};
use tracing::warn;

use crate::metrics::track_authorization_denied;
use crate::middleware::auth::AuthUser;

/// Fails with 403 unless the caller's roles allow `operation`.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn delete_student(auth_user: AuthUser, ..) -> Result<Response, AppError> {
///     authorize(&auth_user, Operation::StudentDelete)?;
///     // Handler logic
/// }
/// ```
pub fn authorize(auth_user: &AuthUser, operation: Operation) -> Result<(), AppError> {
    let roles = auth_user.roles();
    if is_authorized(&roles, operation) {
        return Ok(());
    }

    track_authorization_denied(&format!("{:?}", operation));
    warn!(
        user = %auth_user.user_id(),
        operation = ?operation,
        roles = ?roles,
        "Access denied"
    );
    Err(AppError::forbidden(format!(
        "Access denied. Required roles: {}",
        format_roles(operation.required_roles())
    )))
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
