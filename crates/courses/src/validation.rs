//! Explicit input validation for course fields.
//!
//! Both functions return the normalized (trimmed) value so callers store exactly
//! what was validated.

use cursos_core::{DomainError, DomainResult};

pub fn validate_name(name: &str) -> DomainResult<String> {
    non_blank("name", name)
}

pub fn validate_professor(professor: &str) -> DomainResult<String> {
    non_blank("professor", professor)
}

fn non_blank(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(validate_name("  Algorithms \n").unwrap(), "Algorithms");
        assert_eq!(validate_professor("\tAda ").unwrap(), "Ada");
    }

    #[test]
    fn rejects_blank_values() {
        match validate_name("   ") {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("name")),
            other => panic!("expected Validation error, got {other:?}"),
        }
        assert!(matches!(validate_professor(""), Err(DomainError::Validation(_))));
    }
}
