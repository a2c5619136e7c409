//! Postgres-backed course store.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `DuplicateName` |
//! | Database (check violation) | `23514` | `Unavailable` (the counter check should never fire) |
//! | PoolClosed / Io / PoolTimedOut / other | N/A | `Unavailable` |
//!
//! Uniqueness is the `UNIQUE (name)` constraint, so two concurrent inserts with
//! the same name cannot both commit. Updates are a single conditional `UPDATE`
//! on `(id, version)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;

use cursos_core::{AggregateRoot, ExpectedVersion};
use cursos_courses::{Course, CourseId, CourseSnapshot, CourseStatus, NewCourse};

use super::r#trait::{CourseStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS courses (
    id              BIGSERIAL PRIMARY KEY,
    name            TEXT        NOT NULL UNIQUE,
    professor       TEXT        NOT NULL,
    status          TEXT        NOT NULL CHECK (status IN ('ACTIVE', 'DISABLED')),
    enrolled_count  BIGINT      NOT NULL CHECK (enrolled_count >= 0),
    version         BIGINT      NOT NULL CHECK (version > 0),
    created_at      TIMESTAMPTZ NOT NULL,
    updated_at      TIMESTAMPTZ NOT NULL
)
"#;

const SELECT_COLUMNS: &str =
    "id, name, professor, status, enrolled_count, version, created_at, updated_at";

/// Postgres-backed course store.
#[derive(Debug, Clone)]
pub struct PostgresCourseStore {
    pool: PgPool,
}

impl PostgresCourseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `courses` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl CourseStore for PostgresCourseStore {
    #[instrument(skip(self, new_course), fields(name = %new_course.name()), err)]
    async fn create(&self, new_course: NewCourse) -> Result<Course, StoreError> {
        // Read the row back so timestamps carry the column's precision.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO courses (name, professor, status, enrolled_count, version, created_at, updated_at)
            VALUES ($1, $2, 'ACTIVE', 0, 1, $3, $3)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(new_course.name())
        .bind(new_course.professor())
        .bind(new_course.created_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateName(new_course.name().to_string())
            }
            other => map_sqlx_error("create", other),
        })?;

        course_from_row(&row)
    }

    #[instrument(skip(self), fields(course_id = %id), err)]
    async fn fetch_by_id(&self, id: CourseId) -> Result<Course, StoreError> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM courses WHERE id = $1"))
            .bind(db_id(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_by_id", e))?;

        match row {
            Some(row) => course_from_row(&row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    #[instrument(skip(self), err)]
    async fn fetch_all(&self) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM courses ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_all", e))?;

        rows.iter().map(course_from_row).collect()
    }

    #[instrument(skip(self, course), fields(course_id = %course.id_typed()), err)]
    async fn update(&self, course: &Course, expected: ExpectedVersion) -> Result<(), StoreError> {
        let id = db_id(course.id_typed())?;
        let expected_db = match expected {
            ExpectedVersion::Any => None,
            ExpectedVersion::Exact(v) => Some(db_version(v)?),
        };

        let result = sqlx::query(
            r#"
            UPDATE courses
            SET name = $2, professor = $3, status = $4, enrolled_count = $5,
                version = $6, updated_at = $7
            WHERE id = $1 AND ($8::BIGINT IS NULL OR version = $8)
            "#,
        )
        .bind(id)
        .bind(course.name())
        .bind(course.professor())
        .bind(course.status().as_str())
        .bind(i64::from(course.enrolled_count()))
        .bind(db_version(course.version())?)
        .bind(course.updated_at())
        .bind(expected_db)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateName(course.name().to_string())
            }
            other => map_sqlx_error("update", other),
        })?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing matched: tell a missing row apart from a stale version.
        let current: Option<i64> = sqlx::query_scalar("SELECT version FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;

        match current {
            None => Err(StoreError::NotFound(course.id_typed())),
            Some(actual) => Err(StoreError::VersionConflict {
                id: course.id_typed(),
                expected,
                actual: u64::try_from(actual).unwrap_or_default(),
            }),
        }
    }
}

fn course_from_row(row: &PgRow) -> Result<Course, StoreError> {
    let status: String = row.try_get("status").map_err(decode_error)?;
    let enrolled_count: i64 = row.try_get("enrolled_count").map_err(decode_error)?;
    let version: i64 = row.try_get("version").map_err(decode_error)?;

    let snapshot = CourseSnapshot {
        id: course_id(row.try_get("id").map_err(decode_error)?)?,
        name: row.try_get("name").map_err(decode_error)?,
        professor: row.try_get("professor").map_err(decode_error)?,
        status: status
            .parse::<CourseStatus>()
            .map_err(|e| StoreError::Unavailable(format!("corrupt course row: {e}")))?,
        enrolled_count: count_from_db(enrolled_count)?,
        version: u64::try_from(version)
            .map_err(|_| StoreError::Unavailable("corrupt course row: negative version".to_string()))?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode_error)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(decode_error)?,
    };

    Course::from_snapshot(snapshot)
        .map_err(|e| StoreError::Unavailable(format!("corrupt course row: {e}")))
}

fn count_from_db(raw: i64) -> Result<u32, StoreError> {
    u32::try_from(raw)
        .map_err(|_| StoreError::Unavailable(format!("corrupt course row: enrolled count {raw}")))
}

fn course_id(raw: i64) -> Result<CourseId, StoreError> {
    u64::try_from(raw)
        .ok()
        .and_then(|v| CourseId::try_from(v).ok())
        .ok_or_else(|| StoreError::Unavailable(format!("corrupt course id {raw}")))
}

fn db_id(id: CourseId) -> Result<i64, StoreError> {
    i64::try_from(id.get()).map_err(|_| StoreError::NotFound(id))
}

fn db_version(version: u64) -> Result<i64, StoreError> {
    i64::try_from(version)
        .map_err(|_| StoreError::Unavailable("version exceeds column range".to_string()))
}

fn decode_error(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(format!("failed to decode course row: {e}"))
}

fn map_sqlx_error(operation: &str, e: sqlx::Error) -> StoreError {
    tracing::warn!(operation, error = %e, "postgres course store error");
    StoreError::Unavailable(format!("{operation}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_column_holds_the_full_domain_range() {
        assert!(SCHEMA.contains("enrolled_count  BIGINT"));
        assert_eq!(count_from_db(i64::from(u32::MAX)).unwrap(), u32::MAX);
        assert!(matches!(count_from_db(-1), Err(StoreError::Unavailable(_))));
    }

    /// Runs against a live database when `DATABASE_URL` is set; skipped otherwise.
    #[tokio::test]
    async fn created_course_matches_a_later_fetch() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };
        let store = PostgresCourseStore::connect(&url).await.unwrap();
        store.ensure_schema().await.unwrap();

        let name = format!("Algorithms {}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        let created = store
            .create(NewCourse::new(&name, "Ada", Utc::now()).unwrap())
            .await
            .unwrap();
        let fetched = store.fetch_by_id(created.id_typed()).await.unwrap();

        assert_eq!(created.snapshot(), fetched.snapshot());
    }
}
