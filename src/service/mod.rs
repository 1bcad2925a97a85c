//! Data service boundary.
//!
//! Controllers only ever talk to [`StudentService`]; the application wires
//! in [`PgStudentService`] and the test-suite wires in
//! [`InMemoryStudentService`]. Lookups that can miss return `Option`, and
//! infrastructure faults surface as [`AppError`] (rendered as 500).

use async_trait::async_trait;
use sms_core::AppError;
use sms_models::{Module, Student, StudentData, StudentModule, Ticket, TicketSearchQuery};

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryStudentService;
pub use postgres::PgStudentService;

#[async_trait]
pub trait StudentService: Send + Sync {
    // ---- students ----

    /// All students ordered by name.
    async fn get_students(&self) -> Result<Vec<Student>, AppError>;

    /// One student with its tickets and module enrollments.
    async fn get_student(&self, id: i32) -> Result<Option<Student>, AppError>;

    async fn add_student(&self, data: StudentData) -> Result<Student, AppError>;

    /// Returns `None` when the student no longer exists.
    async fn update_student(&self, id: i32, data: StudentData)
    -> Result<Option<Student>, AppError>;

    /// Deletes the student together with its tickets and enrollments.
    /// Returns whether anything was deleted.
    async fn delete_student(&self, id: i32) -> Result<bool, AppError>;

    /// True when another student (any id other than `student_id`) already
    /// uses `email`. Comparison ignores case.
    async fn is_duplicate_student_email(
        &self,
        email: &str,
        student_id: Option<i32>,
    ) -> Result<bool, AppError>;

    // ---- tickets ----

    async fn get_all_tickets(&self) -> Result<Vec<Ticket>, AppError>;

    async fn get_open_tickets(&self) -> Result<Vec<Ticket>, AppError>;

    async fn get_ticket(&self, id: i32) -> Result<Option<Ticket>, AppError>;

    /// Opens a ticket stamped with the current time. `None` when the student
    /// does not exist.
    async fn create_ticket(&self, student_id: i32, issue: &str)
    -> Result<Option<Ticket>, AppError>;

    /// Closes an open ticket and records its resolution. `None` when the
    /// ticket does not exist or is already closed.
    async fn close_ticket(&self, id: i32, resolution: &str) -> Result<Option<Ticket>, AppError>;

    async fn delete_ticket(&self, id: i32) -> Result<bool, AppError>;

    async fn search_tickets(&self, search: &TicketSearchQuery) -> Result<Vec<Ticket>, AppError>;

    // ---- module enrollments ----

    async fn get_student_module(&self, id: i32) -> Result<Option<StudentModule>, AppError>;

    /// Modules the student is not enrolled on, ordered by title.
    async fn get_available_modules_for_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<Module>, AppError>;

    /// Enrolls the student with the given mark in one step. `None` when the
    /// student or module is unknown or the enrollment already exists.
    async fn add_student_to_module(
        &self,
        student_id: i32,
        module_id: i32,
        mark: i32,
    ) -> Result<Option<StudentModule>, AppError>;

    async fn update_student_module_mark(
        &self,
        student_id: i32,
        module_id: i32,
        mark: i32,
    ) -> Result<Option<StudentModule>, AppError>;

    async fn remove_student_from_module(
        &self,
        student_id: i32,
        module_id: i32,
    ) -> Result<bool, AppError>;
}
