//! Seed rows and the configuration controlling how many are generated.

use chrono::{DateTime, Utc};

pub struct StudentSeed {
    pub name: String,
    pub email: String,
    pub course: String,
    pub age: i32,
    pub grade: i32,
    pub photo_url: Option<String>,
}

pub struct ModuleSeed {
    pub code: &'static str,
    pub title: &'static str,
}

pub struct TicketSeed {
    pub student_id: i32,
    pub issue: String,
    pub created_on: DateTime<Utc>,
    pub active: bool,
    pub resolution: Option<String>,
}

pub struct EnrollmentSeed {
    pub student_id: i32,
    pub module_id: i32,
    pub mark: i32,
}

/// Complete configuration for database seeding.
#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub students: usize,
    pub tickets_per_student: usize,
    pub modules_per_student: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            students: 50,
            tickets_per_student: 2,
            modules_per_student: 3,
        }
    }
}

impl SeedConfig {
    pub fn new(students: usize) -> Self {
        Self {
            students,
            ..Default::default()
        }
    }

    pub fn with_tickets(mut self, per_student: usize) -> Self {
        self.tickets_per_student = per_student;
        self
    }

    pub fn with_modules(mut self, per_student: usize) -> Self {
        self.modules_per_student = per_student;
        self
    }
}
