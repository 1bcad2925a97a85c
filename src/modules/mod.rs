pub mod student_modules;
pub mod students;
pub mod ticket_api;
pub mod tickets;
