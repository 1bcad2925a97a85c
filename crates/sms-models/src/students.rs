//! Student entity and form models.

use serde::{Deserialize, Serialize};
use sms_core::serde::deserialize_optional_string;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::form::{FormNumber, deserialize_form_number, parsed, validate_number};
use crate::modules::StudentModule;
use crate::select::{SelectItem, select_list};
use crate::tickets::Ticket;

/// A student in the system.
///
/// `tickets` and `modules` are only populated by the details lookup; list
/// queries leave them empty.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub course: String,
    pub age: i32,
    pub grade: i32,
    pub photo_url: Option<String>,
    #[sqlx(skip)]
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[sqlx(skip)]
    #[serde(default)]
    pub modules: Vec<StudentModule>,
}

impl Student {
    /// Builds the id/name option list used by the ticket create form.
    pub fn select_list(students: &[Student], selected: Option<i32>) -> Vec<SelectItem> {
        select_list(students, |s| s.id, |s| s.name.clone(), selected)
    }
}

/// Validated student attributes handed to the service layer.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentData {
    pub name: String,
    pub email: String,
    pub course: String,
    pub age: i32,
    pub grade: i32,
    pub photo_url: Option<String>,
}

/// Create/edit form for a student.
///
/// Numeric inputs bind as [`FormNumber`] so that blank or non-numeric input
/// is reported as a field error rather than rejecting the whole submission.
#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct StudentForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Course is required (max 100 characters)"))]
    pub course: String,
    #[serde(default, deserialize_with = "deserialize_form_number")]
    #[validate(
        required(message = "Age is required"),
        range(min = 16, max = 100, message = "Age must be between 16 and 100"),
        custom(function = "validate_number", message = "Age must be a number")
    )]
    #[schema(value_type = Option<i32>)]
    pub age: Option<FormNumber>,
    #[serde(default, deserialize_with = "deserialize_form_number")]
    #[validate(
        required(message = "Grade is required"),
        range(min = 0, max = 100, message = "Grade must be between 0 and 100"),
        custom(function = "validate_number", message = "Grade must be a number")
    )]
    #[schema(value_type = Option<i32>)]
    pub grade: Option<FormNumber>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(url(message = "Photo URL must be a valid URL"))]
    pub photo_url: Option<String>,
}

impl StudentForm {
    /// Strips surrounding whitespace from the text inputs so that blank
    /// values fail the length rules.
    #[must_use]
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            course: self.course.trim().to_string(),
            ..self
        }
    }

    /// Converts a validated form into service input.
    ///
    /// Only call after `validate()` succeeded; missing numbers fall back to 0.
    pub fn to_data(&self) -> StudentData {
        StudentData {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            course: self.course.trim().to_string(),
            age: parsed(&self.age).unwrap_or_default(),
            grade: parsed(&self.grade).unwrap_or_default(),
            photo_url: self.photo_url.clone(),
        }
    }
}

/// Edit page model: the student's id alongside the form values.
#[derive(Serialize, Debug, Clone)]
pub struct StudentEditViewModel {
    pub id: i32,
    #[serde(flatten)]
    pub form: StudentForm,
}

impl From<&Student> for StudentForm {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
            course: student.course.clone(),
            age: Some(student.age.into()),
            grade: Some(student.grade.into()),
            photo_url: student.photo_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> StudentForm {
        StudentForm {
            name: "Homer Simpson".to_string(),
            email: "homer@mail.com".to_string(),
            course: "Physics".to_string(),
            age: Some(40.into()),
            grade: Some(56.into()),
            photo_url: Some("https://static.wikia.nocookie.net/homer.png".to_string()),
        }
    }

    #[test]
    fn test_student_form_validation() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_student_form_without_photo_is_valid() {
        let form = StudentForm {
            photo_url: None,
            ..valid_form()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_student_form_invalid_email() {
        let form = StudentForm {
            email: "invalid-email".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_student_form_empty_name() {
        let form = StudentForm {
            name: String::new(),
            ..valid_form()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_student_form_missing_age() {
        let form = StudentForm {
            age: None,
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("age"));
    }

    #[test]
    fn test_student_form_grade_out_of_range() {
        let form = StudentForm {
            grade: Some(101.into()),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("grade"));
    }

    #[test]
    fn test_student_form_non_numeric_age() {
        let form = StudentForm {
            age: Some(FormNumber::Invalid("sixty".to_string())),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        let age = fields["age"];
        assert_eq!(age.len(), 1);
        assert_eq!(age[0].message.as_deref(), Some("Age must be a number"));
    }

    #[test]
    fn test_student_form_bad_photo_url() {
        let form = StudentForm {
            photo_url: Some("not a url".to_string()),
            ..valid_form()
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_trimmed_blank_name_fails_validation() {
        let form = StudentForm {
            name: "   ".to_string(),
            ..valid_form()
        }
        .trimmed();
        assert!(form.name.is_empty());
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_edit_view_model_flattens_form() {
        let vm = StudentEditViewModel {
            id: 7,
            form: valid_form(),
        };
        let json = serde_json::to_value(&vm).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "homer@mail.com");
    }

    #[test]
    fn test_to_data_trims_text() {
        let form = StudentForm {
            name: "  Marge ".to_string(),
            email: " marge@mail.com ".to_string(),
            ..valid_form()
        };
        let data = form.to_data();
        assert_eq!(data.name, "Marge");
        assert_eq!(data.email, "marge@mail.com");
        assert_eq!(data.age, 40);
    }

    #[test]
    fn test_form_from_student_round_trips_fields() {
        let student = Student {
            id: 3,
            name: "Bart".to_string(),
            email: "bart@mail.com".to_string(),
            course: "Art".to_string(),
            age: 18,
            grade: 30,
            photo_url: None,
            tickets: vec![],
            modules: vec![],
        };
        let form = StudentForm::from(&student);
        assert_eq!(form.age, Some(FormNumber::Value(18)));
        assert_eq!(form.email, "bart@mail.com");
        assert!(form.validate().is_ok());
    }
}
