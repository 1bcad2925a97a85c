use anyhow::Context;
use async_trait::async_trait;
use sms_core::AppError;
use sms_models::{Module, Student, StudentData, StudentModule, Ticket, TicketSearchQuery};
use sqlx::PgPool;
use tracing::instrument;

use super::StudentService;

const STUDENT_COLUMNS: &str = "id, name, email, course, age, grade, photo_url";

const TICKET_SELECT: &str = r#"
    SELECT t.id, t.issue, t.created_on, t.active, t.resolution, t.student_id,
           s.name AS student_name, s.email AS student_email
    FROM tickets t
    LEFT JOIN students s ON s.id = t.student_id
"#;

const STUDENT_MODULE_SELECT: &str = r#"
    SELECT sm.id, sm.student_id, sm.module_id, sm.mark, m.title AS module_title
    FROM student_modules sm
    JOIN modules m ON m.id = sm.module_id
"#;

/// [`StudentService`] backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PgStudentService {
    db: PgPool,
}

impl PgStudentService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Escapes `%`, `_` and `\` so user input is matched literally by `ILIKE`.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl StudentService for PgStudentService {
    #[instrument(skip(self))]
    async fn get_students(&self) -> Result<Vec<Student>, AppError> {
        let sql = format!("SELECT {} FROM students ORDER BY name, id", STUDENT_COLUMNS);
        let students = sqlx::query_as::<_, Student>(&sql)
            .fetch_all(&self.db)
            .await
            .context("Failed to fetch students")
            .map_err(AppError::database)?;

        Ok(students)
    }

    #[instrument(skip(self))]
    async fn get_student(&self, id: i32) -> Result<Option<Student>, AppError> {
        let sql = format!("SELECT {} FROM students WHERE id = $1", STUDENT_COLUMNS);
        let Some(mut student) = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("Failed to fetch student by ID")
            .map_err(AppError::database)?
        else {
            return Ok(None);
        };

        let tickets_sql = format!("{} WHERE t.student_id = $1 ORDER BY t.created_on, t.id", TICKET_SELECT);
        student.tickets = sqlx::query_as::<_, Ticket>(&tickets_sql)
            .bind(id)
            .fetch_all(&self.db)
            .await
            .context("Failed to fetch student tickets")
            .map_err(AppError::database)?;

        let modules_sql = format!("{} WHERE sm.student_id = $1 ORDER BY m.title", STUDENT_MODULE_SELECT);
        student.modules = sqlx::query_as::<_, StudentModule>(&modules_sql)
            .bind(id)
            .fetch_all(&self.db)
            .await
            .context("Failed to fetch student modules")
            .map_err(AppError::database)?;

        Ok(Some(student))
    }

    #[instrument(skip(self, data), fields(email = %data.email))]
    async fn add_student(&self, data: StudentData) -> Result<Student, AppError> {
        let sql = format!(
            r#"
            INSERT INTO students (name, email, course, age, grade, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        );

        sqlx::query_as::<_, Student>(&sql)
            .bind(&data.name)
            .bind(&data.email)
            .bind(&data.course)
            .bind(data.age)
            .bind(data.grade)
            .bind(&data.photo_url)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::bad_request(anyhow::anyhow!(
                            "Student with email {} already exists",
                            data.email
                        ));
                    }
                }
                AppError::database(anyhow::Error::from(e))
            })
    }

    #[instrument(skip(self, data))]
    async fn update_student(
        &self,
        id: i32,
        data: StudentData,
    ) -> Result<Option<Student>, AppError> {
        let sql = format!(
            r#"
            UPDATE students
            SET name = $1, email = $2, course = $3, age = $4, grade = $5, photo_url = $6
            WHERE id = $7
            RETURNING {}
            "#,
            STUDENT_COLUMNS
        );

        sqlx::query_as::<_, Student>(&sql)
            .bind(&data.name)
            .bind(&data.email)
            .bind(&data.course)
            .bind(data.age)
            .bind(data.grade)
            .bind(&data.photo_url)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::bad_request(anyhow::anyhow!(
                            "Student with email {} already exists",
                            data.email
                        ));
                    }
                }
                AppError::database(anyhow::Error::from(e))
            })
    }

    #[instrument(skip(self))]
    async fn delete_student(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("Failed to delete student")
            .map_err(AppError::database)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn is_duplicate_student_email(
        &self,
        email: &str,
        student_id: Option<i32>,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM students
                WHERE LOWER(email) = LOWER($1) AND ($2::INT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email.trim())
        .bind(student_id)
        .fetch_one(&self.db)
        .await
        .context("Failed to check student email")
        .map_err(AppError::database)?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn get_all_tickets(&self) -> Result<Vec<Ticket>, AppError> {
        let sql = format!("{} ORDER BY t.id", TICKET_SELECT);
        let tickets = sqlx::query_as::<_, Ticket>(&sql)
            .fetch_all(&self.db)
            .await
            .context("Failed to fetch tickets")
            .map_err(AppError::database)?;

        Ok(tickets)
    }

    #[instrument(skip(self))]
    async fn get_open_tickets(&self) -> Result<Vec<Ticket>, AppError> {
        let sql = format!("{} WHERE t.active ORDER BY t.id", TICKET_SELECT);
        let tickets = sqlx::query_as::<_, Ticket>(&sql)
            .fetch_all(&self.db)
            .await
            .context("Failed to fetch open tickets")
            .map_err(AppError::database)?;

        Ok(tickets)
    }

    #[instrument(skip(self))]
    async fn get_ticket(&self, id: i32) -> Result<Option<Ticket>, AppError> {
        let sql = format!("{} WHERE t.id = $1", TICKET_SELECT);
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("Failed to fetch ticket by ID")
            .map_err(AppError::database)?;

        Ok(ticket)
    }

    #[instrument(skip(self, issue))]
    async fn create_ticket(
        &self,
        student_id: i32,
        issue: &str,
    ) -> Result<Option<Ticket>, AppError> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            WITH inserted AS (
                INSERT INTO tickets (issue, created_on, active, student_id)
                SELECT $2, NOW(), TRUE, s.id FROM students s WHERE s.id = $1
                RETURNING id, issue, created_on, active, resolution, student_id
            )
            SELECT i.id, i.issue, i.created_on, i.active, i.resolution, i.student_id,
                   s.name AS student_name, s.email AS student_email
            FROM inserted i
            JOIN students s ON s.id = i.student_id
            "#,
        )
        .bind(student_id)
        .bind(issue)
        .fetch_optional(&self.db)
        .await;

        match ticket {
            Ok(ticket) => Ok(ticket),
            // Student deleted between the existence check and the insert
            Err(e) if is_foreign_key_violation(&e) => Ok(None),
            Err(e) => Err(AppError::database(
                anyhow::Error::from(e).context("Failed to create ticket"),
            )),
        }
    }

    #[instrument(skip(self, resolution))]
    async fn close_ticket(&self, id: i32, resolution: &str) -> Result<Option<Ticket>, AppError> {
        let closed: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE tickets
            SET active = FALSE, resolution = $2
            WHERE id = $1 AND active
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(resolution)
        .fetch_optional(&self.db)
        .await
        .context("Failed to close ticket")
        .map_err(AppError::database)?;

        match closed {
            Some(id) => self.get_ticket(id).await,
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn delete_ticket(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("Failed to delete ticket")
            .map_err(AppError::database)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn search_tickets(&self, search: &TicketSearchQuery) -> Result<Vec<Ticket>, AppError> {
        let query = search.query.trim();
        let sql = format!(
            r#"
            {}
            WHERE ($1 = 'ALL' OR ($1 = 'OPEN' AND t.active) OR ($1 = 'CLOSED' AND NOT t.active))
              AND ($2 = '' OR t.issue ILIKE $3 OR s.name ILIKE $3)
            ORDER BY t.id
            "#,
            TICKET_SELECT
        );

        let tickets = sqlx::query_as::<_, Ticket>(&sql)
            .bind(search.range.as_str())
            .bind(query)
            .bind(like_pattern(query))
            .fetch_all(&self.db)
            .await
            .context("Failed to search tickets")
            .map_err(AppError::database)?;

        Ok(tickets)
    }

    #[instrument(skip(self))]
    async fn get_student_module(&self, id: i32) -> Result<Option<StudentModule>, AppError> {
        let sql = format!("{} WHERE sm.id = $1", STUDENT_MODULE_SELECT);
        let enrollment = sqlx::query_as::<_, StudentModule>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("Failed to fetch student module")
            .map_err(AppError::database)?;

        Ok(enrollment)
    }

    #[instrument(skip(self))]
    async fn get_available_modules_for_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<Module>, AppError> {
        let modules = sqlx::query_as::<_, Module>(
            r#"
            SELECT m.id, m.code, m.title
            FROM modules m
            WHERE NOT EXISTS (
                SELECT 1 FROM student_modules sm
                WHERE sm.module_id = m.id AND sm.student_id = $1
            )
            ORDER BY m.title
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.db)
        .await
        .context("Failed to fetch available modules")
        .map_err(AppError::database)?;

        Ok(modules)
    }

    #[instrument(skip(self))]
    async fn add_student_to_module(
        &self,
        student_id: i32,
        module_id: i32,
        mark: i32,
    ) -> Result<Option<StudentModule>, AppError> {
        let enrollment = sqlx::query_as::<_, StudentModule>(
            r#"
            INSERT INTO student_modules (student_id, module_id, mark)
            VALUES ($1, $2, $3)
            ON CONFLICT (student_id, module_id) DO NOTHING
            RETURNING id, student_id, module_id, mark
            "#,
        )
        .bind(student_id)
        .bind(module_id)
        .bind(mark)
        .fetch_optional(&self.db)
        .await;

        match enrollment {
            Ok(enrollment) => Ok(enrollment),
            Err(e) if is_foreign_key_violation(&e) => Ok(None),
            Err(e) => Err(AppError::database(
                anyhow::Error::from(e).context("Failed to enroll student on module"),
            )),
        }
    }

    #[instrument(skip(self))]
    async fn update_student_module_mark(
        &self,
        student_id: i32,
        module_id: i32,
        mark: i32,
    ) -> Result<Option<StudentModule>, AppError> {
        let enrollment = sqlx::query_as::<_, StudentModule>(
            r#"
            UPDATE student_modules
            SET mark = $3
            WHERE student_id = $1 AND module_id = $2
            RETURNING id, student_id, module_id, mark
            "#,
        )
        .bind(student_id)
        .bind(module_id)
        .bind(mark)
        .fetch_optional(&self.db)
        .await
        .context("Failed to update module mark")
        .map_err(AppError::database)?;

        Ok(enrollment)
    }

    #[instrument(skip(self))]
    async fn remove_student_from_module(
        &self,
        student_id: i32,
        module_id: i32,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM student_modules WHERE student_id = $1 AND module_id = $2")
                .bind(student_id)
                .bind(module_id)
                .execute(&self.db)
                .await
                .context("Failed to remove student from module")
                .map_err(AppError::database)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("login"), "%login%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
    }
}
