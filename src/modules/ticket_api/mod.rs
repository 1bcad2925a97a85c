//! JSON ticket API.
//!
//! Read endpoints are always mounted. Create and close are compiled in only
//! with the `ticket-api-mutations` feature.

pub mod controller;
pub mod router;
