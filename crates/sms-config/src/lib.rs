//! # SMS Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: Access token verification settings
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`cookie`]: Cookie names and flags for the interactive surface
//! - [`server`]: Listener addresses
//!
//! # Example
//!
//! ```ignore
//! use sms_config::{CookieConfig, CorsConfig, JwtConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cookie;
pub mod cors;
pub mod jwt;
pub mod server;

pub use cookie::CookieConfig;
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
