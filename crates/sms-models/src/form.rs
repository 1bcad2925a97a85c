//! Numeric inputs for HTML forms.
//!
//! A typed `i32` field would make `axum::Form` reject the whole body when a
//! user types "sixty" into an age box. [`FormNumber`] binds any text instead:
//! parseable input becomes a value, anything else is kept verbatim so the
//! page can be redisplayed with what was submitted and a field error.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::{ValidateRange, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNumber {
    Value(i32),
    Invalid(String),
}

impl FormNumber {
    pub fn value(&self) -> Option<i32> {
        match self {
            FormNumber::Value(v) => Some(*v),
            FormNumber::Invalid(_) => None,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(
            raw.parse()
                .map(FormNumber::Value)
                .unwrap_or_else(|_| FormNumber::Invalid(raw.to_string())),
        )
    }
}

impl From<i32> for FormNumber {
    fn from(value: i32) -> Self {
        FormNumber::Value(value)
    }
}

impl Serialize for FormNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FormNumber::Value(v) => serializer.serialize_i32(*v),
            FormNumber::Invalid(raw) => serializer.serialize_str(raw),
        }
    }
}

/// Range rules only apply to parsed values; unparseable text is reported by
/// [`validate_number`] instead.
impl ValidateRange<i32> for FormNumber {
    fn greater_than(&self, max: i32) -> Option<bool> {
        self.value().map(|v| v > max)
    }

    fn less_than(&self, min: i32) -> Option<bool> {
        self.value().map(|v| v < min)
    }
}

pub fn validate_number(value: &FormNumber) -> Result<(), ValidationError> {
    match value {
        FormNumber::Value(_) => Ok(()),
        FormNumber::Invalid(_) => Err(ValidationError::new("number")),
    }
}

/// Blank inputs bind as `None` so `required` reports them.
pub fn deserialize_form_number<'de, D>(deserializer: D) -> Result<Option<FormNumber>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(FormNumber::parse))
}

/// The parsed value of an optional numeric input, if it has one.
pub fn parsed(number: &Option<FormNumber>) -> Option<i32> {
    number.as_ref().and_then(FormNumber::value)
}
