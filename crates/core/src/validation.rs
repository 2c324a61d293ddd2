//! Field validators shared by request inputs.
//!
//! Enum-valued fields arrive as free text so a bad value becomes a field
//! error rather than a deserialization failure.

#![allow(missing_docs)]

use std::borrow::Cow;

use fixit_db::entities::{
    complaint::{ComplaintCategory, ComplaintStatus, Priority},
    user::Role,
};
use validator::ValidationError;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Rejects empty and whitespace-only text.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "Field cannot be empty"));
    }
    Ok(())
}

pub fn complaint_status(value: &str) -> Result<(), ValidationError> {
    ComplaintStatus::parse(value)
        .map(|_| ())
        .ok_or_else(|| invalid("status", "Invalid status"))
}

pub fn complaint_category(value: &str) -> Result<(), ValidationError> {
    ComplaintCategory::parse(value)
        .map(|_| ())
        .ok_or_else(|| invalid("category", "Invalid category"))
}

pub fn priority(value: &str) -> Result<(), ValidationError> {
    Priority::parse(value)
        .map(|_| ())
        .ok_or_else(|| invalid("priority", "Invalid priority"))
}

pub fn role(value: &str) -> Result<(), ValidationError> {
    Role::parse(value)
        .map(|_| ())
        .ok_or_else(|| invalid("role", "Invalid role"))
}

/// Trimmed text, or `None` when blank.
#[must_use]
pub fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
