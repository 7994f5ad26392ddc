//! Small field validators shared by the catalog entities.

use crate::error::{DomainError, DomainResult};

/// Trim `value` and require it to be non-empty and at most `max_chars` long.
pub fn required_text(field: &str, value: &str, max_chars: usize) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Like [`required_text`], but blank input collapses to `None`.
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max_chars: Option<usize>,
) -> DomainResult<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if let Some(max) = max_chars {
        if value.chars().count() > max {
            return Err(DomainError::validation(format!(
                "{field} must be at most {max} characters"
            )));
        }
    }
    Ok(Some(value.to_string()))
}
