//! Courses domain module.
//!
//! Business rules for the course catalog (lifecycle and enrollment counter),
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod course;
pub mod validation;

pub use course::{
    ChangeProfessor, Course, CourseCommand, CourseDisabled, CourseError, CourseEvent, CourseId,
    CourseSnapshot, CourseStatus, DisableCourse, EnrollStudent, NewCourse, ProfessorChanged,
    StudentEnrolled, StudentWithdrawn, WithdrawStudent,
};
