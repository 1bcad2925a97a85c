//! Module catalogue and student enrollments.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::form::{FormNumber, deserialize_form_number, validate_number};
use crate::select::{SelectItem, select_list};

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Module {
    pub id: i32,
    pub code: String,
    pub title: String,
}

impl Module {
    pub fn select_list(modules: &[Module], selected: Option<i32>) -> Vec<SelectItem> {
        select_list(modules, |m| m.id, |m| m.title.clone(), selected)
    }
}

/// Enrollment of a student on a module, with the mark achieved.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct StudentModule {
    pub id: i32,
    pub student_id: i32,
    pub module_id: i32,
    pub mark: i32,
    #[sqlx(default)]
    pub module_title: Option<String>,
}

/// Enrollment form, shared by "assign module" and "update mark".
///
/// `student_id` always comes from the route or the stored enrollment and
/// `modules` is rebuilt by the handler, so neither is bound from the body.
#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct StudentModuleViewModel {
    #[serde(skip_deserializing)]
    pub student_id: i32,
    #[serde(default, deserialize_with = "deserialize_form_number")]
    #[validate(
        required(message = "Please select a module"),
        custom(function = "validate_number", message = "Please select a module")
    )]
    #[schema(value_type = Option<i32>)]
    pub module_id: Option<FormNumber>,
    #[serde(default, deserialize_with = "deserialize_form_number")]
    #[validate(
        required(message = "Mark is required"),
        range(min = 0, max = 100, message = "Mark must be between 0 and 100"),
        custom(function = "validate_number", message = "Mark must be a number")
    )]
    #[schema(value_type = Option<i32>)]
    pub mark: Option<FormNumber>,
    #[serde(skip_deserializing)]
    pub modules: Vec<SelectItem>,
}

impl From<&StudentModule> for StudentModuleViewModel {
    fn from(enrollment: &StudentModule) -> Self {
        Self {
            student_id: enrollment.student_id,
            module_id: Some(enrollment.module_id.into()),
            mark: Some(enrollment.mark.into()),
            modules: Vec::new(),
        }
    }
}
