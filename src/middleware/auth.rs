use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use sms_auth::{Claims, verify_token};
use sms_core::{AppError, Role};

use crate::state::AppState;

/// Extractor that validates the access token and provides the caller's
/// claims.
///
/// The token is read from `Authorization: Bearer <token>` and, for browser
/// requests that carry no header, from the access token cookie.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn roles(&self) -> Vec<Role> {
        self.0.roles()
    }

    pub fn user_id(&self) -> &str {
        &self.0.sub
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<String>, AppError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid authorization header format"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

    Ok(Some(token.to_string()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(parts)? {
            Some(token) => token,
            None => CookieJar::from_headers(&parts.headers)
                .get(state.cookie_config.token_cookie)
                .map(|c| c.value().to_string())
                .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?,
        };

        let claims = verify_token(&token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}
