//! Cookie settings for the interactive (browser) surface.
//!
//! Three cookies are involved:
//!
//! - the access token cookie, read when no `Authorization` header is sent
//! - the anti-forgery cookie, compared against the submitted form token
//! - the flash cookie, carrying notices across a redirect
//!
//! `COOKIE_SECURE=true` marks all of them `Secure`.

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieConfig {
    pub token_cookie: &'static str,
    pub csrf_cookie: &'static str,
    pub flash_cookie: &'static str,
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            token_cookie: "sms_token",
            csrf_cookie: "sms_csrf",
            flash_cookie: "sms_notices",
            secure: false,
        }
    }
}

impl CookieConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            secure: env_or("COOKIE_SECURE", false),
            ..Self::default()
        }
    }
}
