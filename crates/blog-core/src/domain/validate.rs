use crate::error::DomainError;

/// Normalization and validation run before a record is written.
///
/// Repositories call [`Validate::full_clean`] on every write, so a record
/// that reaches storage has always been normalized.
pub trait Validate {
    fn full_clean(&mut self) -> Result<(), DomainError>;
}

/// Rejects empty values and values longer than `max` characters.
pub(crate) fn check_len(field: &str, value: &str, max: Option<usize>) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be empty")));
    }
    if let Some(max) = max {
        let len = value.chars().count();
        if len > max {
            return Err(DomainError::Validation(format!(
                "{field} must be at most {max} characters (got {len})"
            )));
        }
    }
    Ok(())
}
