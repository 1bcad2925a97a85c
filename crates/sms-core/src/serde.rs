//! Lenient deserializers for HTML form and query-string fields.
//!
//! Browsers submit untouched inputs as empty strings; these helpers turn
//! them into `None` so that optional fields stay unset instead of holding
//! whitespace.

use serde::{Deserialize, Deserializer};

pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}
