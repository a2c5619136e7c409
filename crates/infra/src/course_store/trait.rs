use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use cursos_core::ExpectedVersion;
use cursos_courses::{Course, CourseId, NewCourse};

/// Course store operation error.
///
/// These are **infrastructure errors** as opposed to the domain errors decided
/// by the `Course` aggregate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("a course named '{0}' already exists")]
    DuplicateName(String),

    #[error("course {0} not found")]
    NotFound(CourseId),

    #[error("version conflict on course {id} (expected {expected:?}, found {actual})")]
    VersionConflict {
        id: CourseId,
        expected: ExpectedVersion,
        actual: u64,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Keyed storage of `Course` records.
///
/// ## Implementation Requirements
///
/// - `create` checks name uniqueness and inserts in one atomic step, assigns the
///   next id (ids start at 1 and are never reused).
/// - `fetch_all` returns courses in a stable order (ascending id = insertion order).
/// - `update` replaces the stored record only if its version matches `expected`
///   (compare-and-swap); otherwise `VersionConflict`, or `NotFound` if the id is absent.
/// - Transient backend failures surface as `Unavailable`, never as `NotFound`.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn create(&self, new_course: NewCourse) -> Result<Course, StoreError>;

    async fn fetch_by_id(&self, id: CourseId) -> Result<Course, StoreError>;

    async fn fetch_all(&self) -> Result<Vec<Course>, StoreError>;

    async fn update(&self, course: &Course, expected: ExpectedVersion) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> CourseStore for Arc<S>
where
    S: CourseStore + ?Sized,
{
    async fn create(&self, new_course: NewCourse) -> Result<Course, StoreError> {
        (**self).create(new_course).await
    }

    async fn fetch_by_id(&self, id: CourseId) -> Result<Course, StoreError> {
        (**self).fetch_by_id(id).await
    }

    async fn fetch_all(&self) -> Result<Vec<Course>, StoreError> {
        (**self).fetch_all().await
    }

    async fn update(&self, course: &Course, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).update(course, expected).await
    }
}
