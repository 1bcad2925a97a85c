//! Middleware and extractors for cross-cutting request concerns.
//!
//! - [`auth`]: access token extractor ([`auth::AuthUser`])
//! - [`role`]: per-operation role checks
//! - [`csrf`]: anti-forgery guard for interactive routes
//!
//! # Request flow
//!
//! 1. `csrf_protection` (interactive routers only) rejects state-changing
//!    requests whose token does not match the anti-forgery cookie
//! 2. `AuthUser` verifies the bearer header or token cookie
//! 3. The handler calls `authorize(&auth_user, Operation::..)` before doing
//!    any work

pub mod auth;
pub mod csrf;
pub mod role;
