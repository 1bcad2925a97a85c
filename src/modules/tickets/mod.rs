//! Staff ticket pages: search, details, close and create.

pub mod controller;
pub mod router;
