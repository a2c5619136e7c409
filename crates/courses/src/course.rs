use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cursos_core::{Aggregate, AggregateRoot, DomainError, EntityId};

use crate::validation::{validate_name, validate_professor};

/// Course identifier (assigned by the store on creation).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub EntityId);

impl CourseId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for CourseId {
    type Error = DomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        EntityId::new(value).map(Self)
    }
}

impl FromStr for CourseId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<EntityId>()
            .map(Self)
            .map_err(|_| DomainError::invalid_id(format!("CourseId: '{s}' is not a positive integer")))
    }
}

impl core::fmt::Display for CourseId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Course status lifecycle: ACTIVE on creation, DISABLED is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseStatus {
    Active,
    Disabled,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Active => "ACTIVE",
            CourseStatus::Disabled => "DISABLED",
        }
    }
}

impl FromStr for CourseStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(CourseStatus::Active),
            "DISABLED" => Ok(CourseStatus::Disabled),
            other => Err(DomainError::validation(format!("unknown course status '{other}'"))),
        }
    }
}

/// Failures decided by the course aggregate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CourseError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("course {0} is already disabled")]
    AlreadyDisabled(CourseId),

    #[error("course {0} has no enrolled students to withdraw")]
    NoEnrollments(CourseId),
}

/// Validated input for creating a course. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    name: String,
    professor: String,
    created_at: DateTime<Utc>,
}

impl NewCourse {
    pub fn new(
        name: &str,
        professor: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CourseError> {
        Ok(Self {
            name: validate_name(name)?,
            professor: validate_professor(professor)?,
            created_at,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn professor(&self) -> &str {
        &self.professor
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Plain-data view of a course, used for persistence rows and API bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSnapshot {
    pub id: CourseId,
    pub name: String,
    pub professor: String,
    pub status: CourseStatus,
    pub enrolled_count: u32,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate root: Course.
///
/// Fields are private so the enrollment counter and status only change through
/// `handle` + `apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    name: String,
    professor: String,
    status: CourseStatus,
    enrolled_count: u32,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Course {
    /// Materialize a freshly created course: ACTIVE, counter 0, version 1.
    pub fn register(id: CourseId, new_course: &NewCourse) -> Self {
        Self {
            id,
            name: new_course.name.clone(),
            professor: new_course.professor.clone(),
            status: CourseStatus::Active,
            enrolled_count: 0,
            version: 1,
            created_at: new_course.created_at,
            updated_at: new_course.created_at,
        }
    }

    /// Rebuild a course from persisted data, re-checking field invariants.
    pub fn from_snapshot(snapshot: CourseSnapshot) -> Result<Self, CourseError> {
        if snapshot.version == 0 {
            return Err(DomainError::invariant("stored course version must be positive").into());
        }
        Ok(Self {
            id: snapshot.id,
            name: validate_name(&snapshot.name)?,
            professor: validate_professor(&snapshot.professor)?,
            status: snapshot.status,
            enrolled_count: snapshot.enrolled_count,
            version: snapshot.version,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        })
    }

    pub fn snapshot(&self) -> CourseSnapshot {
        CourseSnapshot {
            id: self.id,
            name: self.name.clone(),
            professor: self.professor.clone(),
            status: self.status,
            enrolled_count: self.enrolled_count,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id_typed(&self) -> CourseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn professor(&self) -> &str {
        &self.professor
    }

    pub fn status(&self) -> CourseStatus {
        self.status
    }

    pub fn enrolled_count(&self) -> u32 {
        self.enrolled_count
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_active(&self) -> bool {
        self.status == CourseStatus::Active
    }
}

impl AggregateRoot for Course {
    type Id = CourseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: DisableCourse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisableCourse {
    pub course_id: CourseId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeProfessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeProfessor {
    pub course_id: CourseId,
    pub professor: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: EnrollStudent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollStudent {
    pub course_id: CourseId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: WithdrawStudent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawStudent {
    pub course_id: CourseId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseCommand {
    DisableCourse(DisableCourse),
    ChangeProfessor(ChangeProfessor),
    EnrollStudent(EnrollStudent),
    WithdrawStudent(WithdrawStudent),
}

impl CourseCommand {
    pub fn course_id(&self) -> CourseId {
        match self {
            CourseCommand::DisableCourse(c) => c.course_id,
            CourseCommand::ChangeProfessor(c) => c.course_id,
            CourseCommand::EnrollStudent(c) => c.course_id,
            CourseCommand::WithdrawStudent(c) => c.course_id,
        }
    }
}

/// Event: CourseDisabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDisabled {
    pub course_id: CourseId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProfessorChanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfessorChanged {
    pub course_id: CourseId,
    pub previous: String,
    pub professor: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StudentEnrolled. Carries the resulting count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentEnrolled {
    pub course_id: CourseId,
    pub enrolled_count: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StudentWithdrawn. Carries the resulting count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentWithdrawn {
    pub course_id: CourseId,
    pub enrolled_count: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseEvent {
    CourseDisabled(CourseDisabled),
    ProfessorChanged(ProfessorChanged),
    StudentEnrolled(StudentEnrolled),
    StudentWithdrawn(StudentWithdrawn),
}

impl CourseEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            CourseEvent::CourseDisabled(_) => "courses.course.disabled",
            CourseEvent::ProfessorChanged(_) => "courses.course.professor_changed",
            CourseEvent::StudentEnrolled(_) => "courses.course.student_enrolled",
            CourseEvent::StudentWithdrawn(_) => "courses.course.student_withdrawn",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CourseEvent::CourseDisabled(e) => e.occurred_at,
            CourseEvent::ProfessorChanged(e) => e.occurred_at,
            CourseEvent::StudentEnrolled(e) => e.occurred_at,
            CourseEvent::StudentWithdrawn(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Course {
    type Command = CourseCommand;
    type Event = CourseEvent;
    type Error = CourseError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CourseEvent::CourseDisabled(_) => {
                self.status = CourseStatus::Disabled;
            }
            CourseEvent::ProfessorChanged(e) => {
                self.professor = e.professor.clone();
            }
            CourseEvent::StudentEnrolled(e) => {
                self.enrolled_count = e.enrolled_count;
            }
            CourseEvent::StudentWithdrawn(e) => {
                self.enrolled_count = e.enrolled_count;
            }
        }

        self.updated_at = event.occurred_at();
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        self.ensure_course_id(command.course_id())?;
        match command {
            CourseCommand::DisableCourse(cmd) => self.handle_disable(cmd),
            CourseCommand::ChangeProfessor(cmd) => self.handle_change_professor(cmd),
            CourseCommand::EnrollStudent(cmd) => self.handle_enroll(cmd),
            CourseCommand::WithdrawStudent(cmd) => self.handle_withdraw(cmd),
        }
    }
}

impl Course {
    fn ensure_course_id(&self, course_id: CourseId) -> Result<(), DomainError> {
        if self.id != course_id {
            return Err(DomainError::invariant("course_id mismatch"));
        }
        Ok(())
    }

    fn handle_disable(&self, cmd: &DisableCourse) -> Result<Vec<CourseEvent>, CourseError> {
        if self.status == CourseStatus::Disabled {
            return Err(CourseError::AlreadyDisabled(self.id));
        }

        Ok(vec![CourseEvent::CourseDisabled(CourseDisabled {
            course_id: cmd.course_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    // Allowed in any status; reassigning does not reactivate a disabled course.
    fn handle_change_professor(&self, cmd: &ChangeProfessor) -> Result<Vec<CourseEvent>, CourseError> {
        let professor = validate_professor(&cmd.professor)?;

        Ok(vec![CourseEvent::ProfessorChanged(ProfessorChanged {
            course_id: cmd.course_id,
            previous: self.professor.clone(),
            professor,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_enroll(&self, cmd: &EnrollStudent) -> Result<Vec<CourseEvent>, CourseError> {
        let enrolled_count = self
            .enrolled_count
            .checked_add(1)
            .ok_or_else(|| DomainError::invariant("enrolled count overflow"))?;

        Ok(vec![CourseEvent::StudentEnrolled(StudentEnrolled {
            course_id: cmd.course_id,
            enrolled_count,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_withdraw(&self, cmd: &WithdrawStudent) -> Result<Vec<CourseEvent>, CourseError> {
        let enrolled_count = self
            .enrolled_count
            .checked_sub(1)
            .ok_or(CourseError::NoEnrollments(self.id))?;

        Ok(vec![CourseEvent::StudentWithdrawn(StudentWithdrawn {
            course_id: cmd.course_id,
            enrolled_count,
            occurred_at: cmd.occurred_at,
        })])
    }
}
