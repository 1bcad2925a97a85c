//! Ticket entity, search range and the ticket view models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::form::{FormNumber, deserialize_form_number, parsed, validate_number};
use crate::select::SelectItem;

/// A support ticket raised by or for a student.
///
/// `student_name` and `student_email` come from a join and are absent when
/// the owning student cannot be resolved.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Ticket {
    pub id: i32,
    pub issue: String,
    pub created_on: DateTime<Utc>,
    pub active: bool,
    pub resolution: Option<String>,
    pub student_id: i32,
    #[sqlx(default)]
    pub student_name: Option<String>,
    #[sqlx(default)]
    pub student_email: Option<String>,
}

/// Which tickets a search covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketRange {
    #[default]
    All,
    Open,
    Closed,
}

impl TicketRange {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TicketRange::All => "ALL",
            TicketRange::Open => "OPEN",
            TicketRange::Closed => "CLOSED",
        }
    }

    /// Whether a ticket with the given `active` flag falls in this range.
    pub const fn includes(&self, active: bool) -> bool {
        match self {
            TicketRange::All => true,
            TicketRange::Open => active,
            TicketRange::Closed => !active,
        }
    }
}

impl fmt::Display for TicketRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "ALL" | "0" => Ok(TicketRange::All),
            "OPEN" | "1" => Ok(TicketRange::Open),
            "CLOSED" | "2" => Ok(TicketRange::Closed),
            other => Err(format!("Invalid ticket range: {}", other)),
        }
    }
}

impl<'de> Deserialize<'de> for TicketRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Search parameters bound from the query string or the search form.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, ToSchema, utoipa::IntoParams)]
pub struct TicketSearchQuery {
    #[serde(default)]
    pub range: TicketRange,
    #[serde(default)]
    pub query: String,
}

impl TicketSearchQuery {
    /// Case-insensitive match on the issue text or the student's name.
    /// An empty query matches every ticket in range.
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if !self.range.includes(ticket.active) {
            return false;
        }

        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        ticket.issue.to_lowercase().contains(&needle)
            || ticket
                .student_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
    }

    /// Human readable summary shown after a submitted search.
    pub fn summary(&self, count: usize) -> String {
        let mut summary = format!("{} result(s) found searching '{}' Tickets", count, self.range);
        if !self.query.is_empty() {
            summary.push_str(&format!(" for '{}'", self.query));
        }
        summary
    }
}

/// Ticket search page: the submitted parameters plus the matching tickets.
#[derive(Serialize, Debug, Clone, Default, ToSchema)]
pub struct TicketSearchViewModel {
    pub range: TicketRange,
    pub query: String,
    pub tickets: Vec<Ticket>,
}

impl TicketSearchViewModel {
    pub fn new(search: TicketSearchQuery, tickets: Vec<Ticket>) -> Self {
        Self {
            range: search.range,
            query: search.query,
            tickets,
        }
    }
}

/// Staff ticket create form. `students` is never bound from the request.
#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct TicketCreateViewModel {
    #[serde(default, deserialize_with = "deserialize_form_number")]
    #[validate(
        required(message = "Please select a student"),
        custom(function = "validate_number", message = "Please select a student")
    )]
    #[schema(value_type = Option<i32>)]
    pub student_id: Option<FormNumber>,
    #[serde(default)]
    #[validate(length(min = 1, max = 1000, message = "Issue is required (max 1000 characters)"))]
    pub issue: String,
    #[serde(skip_deserializing)]
    pub students: Vec<SelectItem>,
}

/// Ticket raised from a student's page. The student comes from the route.
#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate, ToSchema)]
pub struct StudentTicketForm {
    #[serde(skip_deserializing)]
    pub student_id: i32,
    #[serde(default)]
    #[validate(length(min = 1, max = 1000, message = "Issue is required (max 1000 characters)"))]
    pub issue: String,
}

/// Close form posted from the ticket list. A blank or non-numeric id binds
/// and is treated as an unknown ticket.
#[derive(Deserialize, Debug, Clone)]
pub struct TicketCloseForm {
    #[serde(default, deserialize_with = "deserialize_form_number")]
    pub id: Option<FormNumber>,
    #[serde(default)]
    pub resolution: String,
}

impl TicketCloseForm {
    pub fn ticket_id(&self) -> Option<i32> {
        parsed(&self.id)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TicketDeleteForm {
    #[serde(default, deserialize_with = "deserialize_form_number")]
    pub student_id: Option<FormNumber>,
}

impl TicketDeleteForm {
    pub fn student_id(&self) -> Option<i32> {
        parsed(&self.student_id)
    }
}

/// Public JSON projection of a ticket.
#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketDto {
    pub id: i32,
    pub issue: String,
    /// Short date, `M/D/YYYY`
    pub created_on: String,
    pub active: bool,
    pub resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&Ticket> for TicketDto {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            issue: ticket.issue.clone(),
            created_on: ticket.created_on.format("%-m/%-d/%Y").to_string(),
            active: ticket.active,
            resolution: ticket.resolution.clone(),
            student: ticket.student_name.clone(),
            email: ticket.student_email.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateTicketDto {
    pub student_id: i32,
    #[validate(length(min = 1, max = 1000, message = "Issue is required (max 1000 characters)"))]
    pub issue: String,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct CloseTicketDto {
    #[serde(default)]
    pub resolution: String,
}
