//! Caller-facing error taxonomy of the course services.

use thiserror::Error;

use cursos_core::DomainError;
use cursos_courses::{CourseError, CourseId};

use crate::course_store::StoreError;
use crate::lock_table::LockTimeout;

/// Typed failure of a course service operation.
///
/// Everything except `StorageUnavailable` and `Contention` is a semantic
/// failure that will not change on retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("course {0} not found")]
    NotFound(CourseId),

    #[error("a course named '{0}' already exists")]
    DuplicateCourse(String),

    #[error("course {0} is already disabled")]
    AlreadyDisabled(CourseId),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Optimistic retries were exhausted by concurrent writers.
    #[error("concurrent modification: {0}")]
    Contention(String),
}

impl ServiceError {
    /// Whether a caller may retry the same request with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ServiceError::StorageUnavailable(_) | ServiceError::Contention(_)
        )
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::InvalidInput(msg),
            DomainError::InvalidId(msg) => ServiceError::InvalidInput(msg),
            DomainError::InvariantViolation(msg) => ServiceError::InvalidOperation(msg),
        }
    }
}

impl From<CourseError> for ServiceError {
    fn from(value: CourseError) -> Self {
        match value {
            CourseError::Domain(e) => e.into(),
            CourseError::AlreadyDisabled(id) => ServiceError::AlreadyDisabled(id),
            CourseError::NoEnrollments(id) => ServiceError::InvalidOperation(format!(
                "course {id} has no enrolled students to withdraw"
            )),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateName(name) => ServiceError::DuplicateCourse(name),
            StoreError::NotFound(id) => ServiceError::NotFound(id),
            e @ StoreError::VersionConflict { .. } => ServiceError::Contention(e.to_string()),
            StoreError::Unavailable(msg) => ServiceError::StorageUnavailable(msg),
        }
    }
}

impl From<LockTimeout> for ServiceError {
    fn from(value: LockTimeout) -> Self {
        ServiceError::StorageUnavailable(value.to_string())
    }
}
