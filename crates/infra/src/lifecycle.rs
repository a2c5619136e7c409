//! Course lifecycle: creation, professor reassignment, one-way disable.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use cursos_courses::{ChangeProfessor, Course, CourseCommand, CourseId, DisableCourse, NewCourse};

use crate::command_dispatcher::CommandDispatcher;
use crate::course_store::CourseStore;
use crate::error::ServiceError;

pub struct CourseLifecycle<S> {
    dispatcher: Arc<CommandDispatcher<S>>,
}

impl<S: CourseStore> CourseLifecycle<S> {
    pub fn new(dispatcher: Arc<CommandDispatcher<S>>) -> Self {
        Self { dispatcher }
    }

    /// Create an ACTIVE course with no enrollments.
    ///
    /// Name uniqueness is enforced by the store inside the insert itself.
    #[instrument(skip(self), err)]
    pub async fn create_course(&self, name: &str, professor: &str) -> Result<Course, ServiceError> {
        let new_course = NewCourse::new(name, professor, Utc::now())?;
        let course = self.dispatcher.store().create(new_course).await?;
        tracing::info!(course_id = %course.id_typed(), "course created");
        Ok(course)
    }

    #[instrument(skip(self, id), fields(course_id = %id))]
    pub async fn disable_course(&self, id: CourseId) -> Result<Course, ServiceError> {
        self.dispatcher
            .dispatch(CourseCommand::DisableCourse(DisableCourse {
                course_id: id,
                occurred_at: Utc::now(),
            }))
            .await
    }

    #[instrument(skip(self, id), fields(course_id = %id))]
    pub async fn change_professor(
        &self,
        id: CourseId,
        professor: &str,
    ) -> Result<Course, ServiceError> {
        self.dispatcher
            .dispatch(CourseCommand::ChangeProfessor(ChangeProfessor {
                course_id: id,
                professor: professor.to_string(),
                occurred_at: Utc::now(),
            }))
            .await
    }

    #[instrument(skip(self, id), fields(course_id = %id))]
    pub async fn get_by_id(&self, id: CourseId) -> Result<Course, ServiceError> {
        Ok(self.dispatcher.store().fetch_by_id(id).await?)
    }

    /// All courses in insertion order; empty is a normal result.
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Course>, ServiceError> {
        Ok(self.dispatcher.store().fetch_all().await?)
    }
}
