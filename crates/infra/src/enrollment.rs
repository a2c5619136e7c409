//! Enrollment counter: per-course student count that never goes below zero.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use cursos_courses::{CourseCommand, CourseId, EnrollStudent, WithdrawStudent};

use crate::command_dispatcher::CommandDispatcher;
use crate::course_store::CourseStore;
use crate::error::ServiceError;

pub struct EnrollmentCounter<S> {
    dispatcher: Arc<CommandDispatcher<S>>,
}

impl<S: CourseStore> EnrollmentCounter<S> {
    pub fn new(dispatcher: Arc<CommandDispatcher<S>>) -> Self {
        Self { dispatcher }
    }

    #[instrument(skip(self, id), fields(course_id = %id))]
    pub async fn get_enrolled_count(&self, id: CourseId) -> Result<u32, ServiceError> {
        let course = self.dispatcher.store().fetch_by_id(id).await?;
        Ok(course.enrolled_count())
    }

    #[instrument(skip(self, id), fields(course_id = %id))]
    pub async fn enroll(&self, id: CourseId) -> Result<(), ServiceError> {
        self.dispatcher
            .dispatch(CourseCommand::EnrollStudent(EnrollStudent {
                course_id: id,
                occurred_at: Utc::now(),
            }))
            .await?;
        Ok(())
    }

    /// Fails with `InvalidOperation` when the count is already zero.
    #[instrument(skip(self, id), fields(course_id = %id))]
    pub async fn withdraw(&self, id: CourseId) -> Result<(), ServiceError> {
        self.dispatcher
            .dispatch(CourseCommand::WithdrawStudent(WithdrawStudent {
                course_id: id,
                occurred_at: Utc::now(),
            }))
            .await?;
        Ok(())
    }
}
