//! In-memory [`StudentService`] used by the integration tests.
//!
//! Mirrors the relational behaviour of the Postgres implementation: deleting
//! a student cascades to its tickets and enrollments, joined student fields
//! are resolved at read time and the enrollment pair is unique.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sms_core::AppError;
use sms_models::{Module, Student, StudentData, StudentModule, Ticket, TicketSearchQuery};
use tokio::sync::RwLock;

use super::StudentService;

#[derive(Default)]
struct Store {
    students: BTreeMap<i32, Student>,
    tickets: BTreeMap<i32, Ticket>,
    modules: BTreeMap<i32, Module>,
    enrollments: BTreeMap<i32, StudentModule>,
    next_student_id: i32,
    next_ticket_id: i32,
    next_module_id: i32,
    next_enrollment_id: i32,
}

impl Store {
    fn with_student_fields(&self, ticket: &Ticket) -> Ticket {
        let student = self.students.get(&ticket.student_id);
        Ticket {
            student_name: student.map(|s| s.name.clone()),
            student_email: student.map(|s| s.email.clone()),
            ..ticket.clone()
        }
    }

    fn with_module_title(&self, enrollment: &StudentModule) -> StudentModule {
        StudentModule {
            module_title: self
                .modules
                .get(&enrollment.module_id)
                .map(|m| m.title.clone()),
            ..enrollment.clone()
        }
    }

    fn tickets_where(&self, predicate: impl Fn(&Ticket) -> bool) -> Vec<Ticket> {
        self.tickets
            .values()
            .map(|t| self.with_student_fields(t))
            .filter(|t| predicate(t))
            .collect()
    }

    fn find_enrollment(&self, student_id: i32, module_id: i32) -> Option<i32> {
        self.enrollments
            .values()
            .find(|e| e.student_id == student_id && e.module_id == module_id)
            .map(|e| e.id)
    }
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

#[derive(Default)]
pub struct InMemoryStudentService {
    store: RwLock<Store>,
}

impl InMemoryStudentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalogue module. Modules have no management surface, so
    /// tests seed them directly.
    pub async fn insert_module(&self, code: &str, title: &str) -> Module {
        let mut store = self.store.write().await;
        let id = next(&mut store.next_module_id);
        let module = Module {
            id,
            code: code.to_string(),
            title: title.to_string(),
        };
        store.modules.insert(id, module.clone());
        module
    }

    /// Inserts a ticket with an explicit creation time and state.
    pub async fn insert_ticket(
        &self,
        student_id: i32,
        issue: &str,
        created_on: DateTime<Utc>,
        active: bool,
    ) -> Ticket {
        let mut store = self.store.write().await;
        let id = next(&mut store.next_ticket_id);
        let ticket = Ticket {
            id,
            issue: issue.to_string(),
            created_on,
            active,
            resolution: (!active).then(|| "Resolved".to_string()),
            student_id,
            student_name: None,
            student_email: None,
        };
        store.tickets.insert(id, ticket.clone());
        store.with_student_fields(&ticket)
    }
}

#[async_trait]
impl StudentService for InMemoryStudentService {
    async fn get_students(&self) -> Result<Vec<Student>, AppError> {
        let store = self.store.read().await;
        let mut students: Vec<Student> = store.students.values().cloned().collect();
        students.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(students)
    }

    async fn get_student(&self, id: i32) -> Result<Option<Student>, AppError> {
        let store = self.store.read().await;
        let Some(student) = store.students.get(&id) else {
            return Ok(None);
        };

        let mut student = student.clone();
        student.tickets = store.tickets_where(|t| t.student_id == id);
        student
            .tickets
            .sort_by(|a, b| (a.created_on, a.id).cmp(&(b.created_on, b.id)));
        student.modules = store
            .enrollments
            .values()
            .filter(|e| e.student_id == id)
            .map(|e| store.with_module_title(e))
            .collect();
        student
            .modules
            .sort_by(|a, b| a.module_title.cmp(&b.module_title));
        Ok(Some(student))
    }

    async fn add_student(&self, data: StudentData) -> Result<Student, AppError> {
        let mut store = self.store.write().await;
        if store
            .students
            .values()
            .any(|s| s.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Student with email {} already exists",
                data.email
            )));
        }

        let id = next(&mut store.next_student_id);
        let student = Student {
            id,
            name: data.name,
            email: data.email,
            course: data.course,
            age: data.age,
            grade: data.grade,
            photo_url: data.photo_url,
            tickets: vec![],
            modules: vec![],
        };
        store.students.insert(id, student.clone());
        Ok(student)
    }

    async fn update_student(
        &self,
        id: i32,
        data: StudentData,
    ) -> Result<Option<Student>, AppError> {
        let mut store = self.store.write().await;
        let Some(student) = store.students.get_mut(&id) else {
            return Ok(None);
        };

        student.name = data.name;
        student.email = data.email;
        student.course = data.course;
        student.age = data.age;
        student.grade = data.grade;
        student.photo_url = data.photo_url;
        Ok(Some(student.clone()))
    }

    async fn delete_student(&self, id: i32) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        let removed = store.students.remove(&id).is_some();
        store.tickets.retain(|_, t| t.student_id != id);
        store.enrollments.retain(|_, e| e.student_id != id);
        Ok(removed)
    }

    async fn is_duplicate_student_email(
        &self,
        email: &str,
        student_id: Option<i32>,
    ) -> Result<bool, AppError> {
        let store = self.store.read().await;
        let email = email.trim();
        Ok(store
            .students
            .values()
            .any(|s| s.email.eq_ignore_ascii_case(email) && Some(s.id) != student_id))
    }

    async fn get_all_tickets(&self) -> Result<Vec<Ticket>, AppError> {
        Ok(self.store.read().await.tickets_where(|_| true))
    }

    async fn get_open_tickets(&self) -> Result<Vec<Ticket>, AppError> {
        Ok(self.store.read().await.tickets_where(|t| t.active))
    }

    async fn get_ticket(&self, id: i32) -> Result<Option<Ticket>, AppError> {
        let store = self.store.read().await;
        Ok(store.tickets.get(&id).map(|t| store.with_student_fields(t)))
    }

    async fn create_ticket(
        &self,
        student_id: i32,
        issue: &str,
    ) -> Result<Option<Ticket>, AppError> {
        let mut store = self.store.write().await;
        if !store.students.contains_key(&student_id) {
            return Ok(None);
        }

        let id = next(&mut store.next_ticket_id);
        let ticket = Ticket {
            id,
            issue: issue.to_string(),
            created_on: Utc::now(),
            active: true,
            resolution: None,
            student_id,
            student_name: None,
            student_email: None,
        };
        store.tickets.insert(id, ticket.clone());
        Ok(Some(store.with_student_fields(&ticket)))
    }

    async fn close_ticket(&self, id: i32, resolution: &str) -> Result<Option<Ticket>, AppError> {
        let mut store = self.store.write().await;
        let Some(ticket) = store.tickets.get_mut(&id).filter(|t| t.active) else {
            return Ok(None);
        };

        ticket.active = false;
        ticket.resolution = Some(resolution.to_string());
        let ticket = ticket.clone();
        Ok(Some(store.with_student_fields(&ticket)))
    }

    async fn delete_ticket(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.store.write().await.tickets.remove(&id).is_some())
    }

    async fn search_tickets(&self, search: &TicketSearchQuery) -> Result<Vec<Ticket>, AppError> {
        Ok(self
            .store
            .read()
            .await
            .tickets_where(|t| search.matches(t)))
    }

    async fn get_student_module(&self, id: i32) -> Result<Option<StudentModule>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .enrollments
            .get(&id)
            .map(|e| store.with_module_title(e)))
    }

    async fn get_available_modules_for_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<Module>, AppError> {
        let store = self.store.read().await;
        let mut modules: Vec<Module> = store
            .modules
            .values()
            .filter(|m| store.find_enrollment(student_id, m.id).is_none())
            .cloned()
            .collect();
        modules.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(modules)
    }

    async fn add_student_to_module(
        &self,
        student_id: i32,
        module_id: i32,
        mark: i32,
    ) -> Result<Option<StudentModule>, AppError> {
        let mut store = self.store.write().await;
        if !store.students.contains_key(&student_id)
            || !store.modules.contains_key(&module_id)
            || store.find_enrollment(student_id, module_id).is_some()
        {
            return Ok(None);
        }

        let id = next(&mut store.next_enrollment_id);
        let enrollment = StudentModule {
            id,
            student_id,
            module_id,
            mark,
            module_title: None,
        };
        store.enrollments.insert(id, enrollment.clone());
        Ok(Some(enrollment))
    }

    async fn update_student_module_mark(
        &self,
        student_id: i32,
        module_id: i32,
        mark: i32,
    ) -> Result<Option<StudentModule>, AppError> {
        let mut store = self.store.write().await;
        let Some(id) = store.find_enrollment(student_id, module_id) else {
            return Ok(None);
        };

        Ok(store.enrollments.get_mut(&id).map(|e| {
            e.mark = mark;
            e.clone()
        }))
    }

    async fn remove_student_from_module(
        &self,
        student_id: i32,
        module_id: i32,
    ) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        let Some(id) = store.find_enrollment(student_id, module_id) else {
            return Ok(false);
        };
        Ok(store.enrollments.remove(&id).is_some())
    }
}
