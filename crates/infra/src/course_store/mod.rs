//! Durable keyed storage of course records.
//!
//! The store owns id assignment and the catalog-wide name uniqueness rule, so
//! both are enforced atomically with the write that depends on them.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCourseStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresCourseStore;
pub use r#trait::{CourseStore, StoreError};
