//! Command execution pipeline for course mutations.
//!
//! ```text
//! Command
//!   ↓
//! 1. Acquire the course's mutation lock (bounded wait)
//!   ↓
//! 2. Load the current record from the store
//!   ↓
//! 3. Handle command (pure decision logic, produces events)
//!   ↓
//! 4. Apply events and write back with an exact-version check
//!   ↓
//! 5. On a version conflict, reload and retry (bounded attempts)
//! ```
//!
//! The lock serializes writers inside this process; the version check covers
//! writers in other processes sharing the same store.

use tracing::instrument;

use cursos_core::{Aggregate, AggregateRoot, ExpectedVersion};
use cursos_courses::{Course, CourseCommand};

use crate::config::DispatchConfig;
use crate::course_store::{CourseStore, StoreError};
use crate::error::ServiceError;
use crate::lock_table::CourseLocks;

/// Atomic read-modify-write executor shared by the lifecycle and enrollment services.
#[derive(Debug)]
pub struct CommandDispatcher<S> {
    store: S,
    locks: CourseLocks,
    config: DispatchConfig,
}

impl<S> CommandDispatcher<S> {
    pub fn new(store: S, config: DispatchConfig) -> Self {
        Self {
            store,
            locks: CourseLocks::new(),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: CourseStore> CommandDispatcher<S> {
    /// Run `command` against the current state of its course and persist the result.
    ///
    /// Returns the course as stored after the change. Domain rejections
    /// (`AlreadyDisabled`, `InvalidOperation`, ...) leave the record untouched.
    #[instrument(skip(self, command), fields(course_id = %command.course_id()), err)]
    pub async fn dispatch(&self, command: CourseCommand) -> Result<Course, ServiceError> {
        let course_id = command.course_id();
        let _guard = self
            .locks
            .acquire(course_id, self.config.lock_timeout)
            .await?;

        let mut attempt = 0u32;
        loop {
            attempt += 1;

            let mut course = self.store.fetch_by_id(course_id).await?;
            let expected = ExpectedVersion::Exact(course.version());

            let events = course.handle(&command)?;
            if events.is_empty() {
                return Ok(course);
            }
            for event in &events {
                course.apply(event);
            }

            match self.store.update(&course, expected).await {
                Ok(()) => {
                    for event in &events {
                        tracing::info!(
                            event_type = event.event_type(),
                            version = course.version(),
                            "course event committed"
                        );
                    }
                    return Ok(course);
                }
                Err(StoreError::VersionConflict { actual, .. })
                    if attempt < self.config.max_attempts =>
                {
                    tracing::debug!(attempt, actual, "version conflict; reloading course");
                    tokio::task::yield_now().await;
                }
                Err(e @ StoreError::VersionConflict { .. }) => {
                    tracing::warn!(attempt, "giving up after repeated version conflicts");
                    return Err(ServiceError::Contention(format!(
                        "{e} after {attempt} attempts"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
