//! Infrastructure layer: course storage, per-course serialization, and the
//! lifecycle / enrollment services built on top of them.

pub mod command_dispatcher;
pub mod config;
pub mod course_store;
pub mod enrollment;
pub mod error;
pub mod lifecycle;
pub mod lock_table;


use std::sync::Arc;

pub use command_dispatcher::CommandDispatcher;
pub use config::DispatchConfig;
pub use course_store::{CourseStore, InMemoryCourseStore, StoreError};
pub use enrollment::EnrollmentCounter;
pub use error::ServiceError;
pub use lifecycle::CourseLifecycle;

/// Both course services wired over one store and one lock table.
pub struct CourseCatalog<S> {
    pub lifecycle: CourseLifecycle<S>,
    pub enrollment: EnrollmentCounter<S>,
}

impl<S: CourseStore> CourseCatalog<S> {
    pub fn new(store: S, config: DispatchConfig) -> Self {
        let dispatcher = Arc::new(CommandDispatcher::new(store, config));
        Self {
            lifecycle: CourseLifecycle::new(dispatcher.clone()),
            enrollment: EnrollmentCounter::new(dispatcher),
        }
    }
}
