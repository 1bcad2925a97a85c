//! Page payloads, flash notices and redirects for the interactive surface.
//!
//! Interactive handlers never build responses by hand. They extract a
//! [`PageContext`], queue notices on it and finish with either
//! [`PageContext::render`] (a JSON page payload a template layer can draw)
//! or [`PageContext::redirect`] (303 with the notices carried in the flash
//! cookie). A rendered page consumes whatever the previous redirect left in
//! the flash cookie.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use data_encoding::BASE64URL_NOPAD;
use serde::{Deserialize, Serialize};
use sms_config::CookieConfig;
use sms_core::AppError;

use crate::middleware::csrf::CsrfToken;
use crate::state::AppState;
use crate::validator::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Body of every rendered interactive page.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub view: &'static str,
    pub model: T,
    pub notices: Vec<Notice>,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
    pub csrf_token: String,
}

pub fn encode_notices(notices: &[Notice]) -> Option<String> {
    serde_json::to_vec(notices)
        .ok()
        .map(|bytes| BASE64URL_NOPAD.encode(&bytes))
}

/// Decodes a flash cookie value. A tampered or stale cookie yields no
/// notices rather than an error.
pub fn decode_notices(value: &str) -> Vec<Notice> {
    BASE64URL_NOPAD
        .decode(value.as_bytes())
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// Per-request notice list, anti-forgery token and cookie jar.
#[derive(Debug)]
pub struct PageContext {
    jar: CookieJar,
    cookies: CookieConfig,
    notices: Vec<Notice>,
    had_flash: bool,
    csrf_token: String,
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookies = state.cookie_config.clone();

        let flash = jar.get(cookies.flash_cookie).map(|c| c.value().to_string());
        let notices = flash.as_deref().map(decode_notices).unwrap_or_default();

        let csrf_token = parts
            .extensions
            .get::<CsrfToken>()
            .map(|t| t.0.clone())
            .unwrap_or_default();

        Ok(Self {
            jar,
            cookies,
            notices,
            had_flash: flash.is_some(),
            csrf_token,
        })
    }
}

impl PageContext {
    pub fn alert(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notices.push(Notice {
            kind,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.alert(NoticeKind::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.alert(NoticeKind::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.alert(NoticeKind::Warning, message);
    }

    fn flash_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.cookies.flash_cookie, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookies.secure)
            .build()
    }

    fn page<T: Serialize>(
        self,
        status: StatusCode,
        view: &'static str,
        model: T,
        errors: FieldErrors,
    ) -> Response {
        let jar = if self.had_flash {
            self.jar
                .remove(Cookie::build(self.cookies.flash_cookie).path("/"))
        } else {
            self.jar
        };

        let page = Page {
            view,
            model,
            notices: self.notices,
            errors,
            csrf_token: self.csrf_token,
        };

        (status, jar, Json(page)).into_response()
    }

    /// Renders `view` with `model` and every pending notice.
    pub fn render<T: Serialize>(self, view: &'static str, model: T) -> Response {
        self.page(StatusCode::OK, view, model, FieldErrors::new())
    }

    /// Redisplays a form with its submitted values and field errors.
    pub fn render_invalid<T: Serialize>(
        self,
        view: &'static str,
        model: T,
        errors: FieldErrors,
    ) -> Response {
        self.page(StatusCode::UNPROCESSABLE_ENTITY, view, model, errors)
    }

    /// 303 to `to`, carrying pending notices in the flash cookie.
    pub fn redirect(self, to: &str) -> Response {
        let jar = match encode_notices(&self.notices).filter(|_| !self.notices.is_empty()) {
            Some(value) => {
                let cookie = self.flash_cookie(value);
                self.jar.add(cookie)
            }
            None => self.jar,
        };

        (jar, Redirect::to(to)).into_response()
    }
}
