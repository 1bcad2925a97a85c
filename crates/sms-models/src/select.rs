//! Option lists for `<select>` inputs.
//!
//! Submitted forms only carry the chosen value, so any handler that
//! redisplays a form must rebuild its option list from the service.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SelectItem {
    pub value: i32,
    pub text: String,
    pub selected: bool,
}

pub fn select_list<T>(
    items: &[T],
    value: impl Fn(&T) -> i32,
    text: impl Fn(&T) -> String,
    selected: Option<i32>,
) -> Vec<SelectItem> {
    items
        .iter()
        .map(|item| {
            let value = value(item);
            SelectItem {
                value,
                text: text(item),
                selected: selected == Some(value),
            }
        })
        .collect()
}
