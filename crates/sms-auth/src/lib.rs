//! # SMS Auth
//!
//! Access token handling for the SMS web service.
//!
//! Identity is provisioned elsewhere; this crate only knows how to read
//! (and, for development tooling, mint) the signed tokens that carry a
//! caller's roles.
//!
//! - [`claims`]: JWT claim structure
//! - [`jwt`]: Token creation and verification
//!
//! # Example
//!
//! ```ignore
//! use sms_auth::{create_access_token, verify_token};
//! use sms_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token("42", "staff@sms.test", vec!["manager".into()], &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
