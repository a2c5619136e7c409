use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::instrument;

use cursos_core::{AggregateRoot, ExpectedVersion};
use cursos_courses::{Course, CourseId, NewCourse};

use super::r#trait::{CourseStore, StoreError};

#[derive(Debug, Default)]
struct Catalog {
    courses: BTreeMap<CourseId, Course>,
    names: HashMap<String, CourseId>,
    last_id: u64,
}

/// In-memory course store.
///
/// Intended for tests/dev. The name index and the id sequence live under the
/// same lock as the records, so create-if-unique is a single critical section.
#[derive(Debug, Default)]
pub struct InMemoryCourseStore {
    catalog: RwLock<Catalog>,
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("course catalog lock poisoned".to_string())
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    #[instrument(level = "debug", skip(self, new_course), fields(name = %new_course.name()))]
    async fn create(&self, new_course: NewCourse) -> Result<Course, StoreError> {
        let mut catalog = self.catalog.write().map_err(|_| Self::poisoned())?;

        if catalog.names.contains_key(new_course.name()) {
            return Err(StoreError::DuplicateName(new_course.name().to_string()));
        }

        let next = catalog.last_id + 1;
        let id = CourseId::try_from(next)
            .map_err(|e| StoreError::Unavailable(format!("id sequence exhausted: {e}")))?;
        let course = Course::register(id, &new_course);

        catalog.last_id = next;
        catalog.names.insert(course.name().to_string(), id);
        catalog.courses.insert(id, course.clone());

        Ok(course)
    }

    #[instrument(level = "debug", skip(self, id), fields(course_id = %id))]
    async fn fetch_by_id(&self, id: CourseId) -> Result<Course, StoreError> {
        let catalog = self.catalog.read().map_err(|_| Self::poisoned())?;
        catalog.courses.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Course>, StoreError> {
        let catalog = self.catalog.read().map_err(|_| Self::poisoned())?;
        Ok(catalog.courses.values().cloned().collect())
    }

    #[instrument(level = "debug", skip(self, course), fields(course_id = %course.id_typed()))]
    async fn update(&self, course: &Course, expected: ExpectedVersion) -> Result<(), StoreError> {
        let mut catalog = self.catalog.write().map_err(|_| Self::poisoned())?;
        let id = course.id_typed();

        let (actual, old_name) = match catalog.courses.get(&id) {
            Some(stored) => (stored.version(), stored.name().to_string()),
            None => return Err(StoreError::NotFound(id)),
        };

        if !expected.matches(actual) {
            return Err(StoreError::VersionConflict {
                id,
                expected,
                actual,
            });
        }

        if old_name != course.name() {
            if catalog.names.contains_key(course.name()) {
                return Err(StoreError::DuplicateName(course.name().to_string()));
            }
            catalog.names.remove(&old_name);
            catalog.names.insert(course.name().to_string(), id);
        }

        catalog.courses.insert(id, course.clone());
        Ok(())
    }
}
