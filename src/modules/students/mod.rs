//! Student pages: list, details, create/edit/delete and the student's own
//! ticket forms.

pub mod controller;
pub mod router;
