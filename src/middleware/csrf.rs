//! Double-submit anti-forgery guard for the interactive routes.
//!
//! Every interactive request gets a token: the one already held in the
//! anti-forgery cookie or, on first contact, a fresh random one that is set
//! on the response. Handlers read it through [`CsrfToken`] (via the page
//! context) and embed it in forms. State-changing requests must echo the
//! cookie value back in the `csrf_token` form field or the `x-csrf-token`
//! header.

use axum::{
    body::{Body, Bytes},
    extract::{Form, FromRequest, Request, State},
    http::{HeaderMap, Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use sms_config::CookieConfig;
use sms_core::AppError;
use tracing::warn;

use crate::state::AppState;

pub const CSRF_FIELD: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Upper bound on a buffered form body.
const MAX_FORM_BYTES: usize = 64 * 1024;

/// Anti-forgery token for the current request, placed in request extensions.
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

#[derive(Deserialize)]
struct CsrfField {
    csrf_token: Option<String>,
}

pub fn generate_token() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

fn csrf_cookie(config: &CookieConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.csrf_cookie, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.secure)
        .build()
}

fn is_state_changing(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Compares without short-circuiting on the first differing byte.
fn tokens_match(expected: &str, submitted: &str) -> bool {
    expected.len() == submitted.len()
        && expected
            .bytes()
            .zip(submitted.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

async fn submitted_form_token(headers: &HeaderMap, body: Bytes) -> Option<String> {
    let content_type = headers.get(header::CONTENT_TYPE)?.clone();
    let req = Request::builder()
        .method(Method::POST)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .ok()?;

    Form::<CsrfField>::from_request(req, &())
        .await
        .ok()
        .and_then(|Form(field)| field.csrf_token)
}

pub async fn csrf_protection(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let config = &state.cookie_config;
    let jar = CookieJar::from_headers(req.headers());
    let existing = jar
        .get(config.csrf_cookie)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());

    let mut req = if is_state_changing(req.method()) {
        let Some(expected) = existing.as_deref() else {
            warn!(path = %req.uri().path(), "Rejected request without anti-forgery cookie");
            return Err(AppError::forbidden("Missing anti-forgery token"));
        };

        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, MAX_FORM_BYTES)
            .await
            .map_err(|_| AppError::bad_request(anyhow::anyhow!("Request body too large")))?;

        let from_header = parts
            .headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let submitted = match from_header {
            Some(token) => Some(token),
            None => submitted_form_token(&parts.headers, bytes.clone()).await,
        };

        if !submitted.is_some_and(|token| tokens_match(expected, &token)) {
            warn!(path = %parts.uri.path(), "Rejected request with invalid anti-forgery token");
            return Err(AppError::forbidden("Invalid anti-forgery token"));
        }

        Request::from_parts(parts, Body::from(bytes))
    } else {
        req
    };

    let (token, issued) = match existing {
        Some(token) => (token, false),
        None => (generate_token(), true),
    };
    req.extensions_mut().insert(CsrfToken(token.clone()));

    let response = next.run(req).await;
    if issued {
        let jar = CookieJar::new().add(csrf_cookie(config, token));
        return Ok((jar, response).into_response());
    }
    Ok(response)
}
