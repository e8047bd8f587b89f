//! School-scoped persistence.
//!
//! [`SchoolStore`] is the seam between the API services and storage. Every
//! student operation takes the caller's resolved `school_id` and never
//! touches rows outside it.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::student::{SchoolStudentRequest, StudentWithParent};

pub use memory::MemorySchoolStore;
pub use postgres::PgSchoolStore;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    DbError(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict("parent email already in use".into())
            }
            _ => StoreError::DbError(e),
        }
    }
}

/// Persistence operations for a school's student roster.
#[async_trait]
pub trait SchoolStore: Send + Sync {
    /// Cheap liveness probe.
    async fn ping(&self) -> Result<(), StoreError>;

    /// The school `user_id` may manage, or `None` when the user has no
    /// permitted school.
    async fn permitted_school(&self, user_id: Uuid) -> Result<Option<Uuid>, StoreError>;

    /// All students of a school with their guardian, ordered by last then
    /// first name.
    async fn list_students_with_parents(
        &self,
        school_id: Uuid,
    ) -> Result<Vec<StudentWithParent>, StoreError>;

    /// Insert a student and its guardian, returning the new student id.
    ///
    /// A guardian with the same e-mail in the same school is reused and its
    /// details refreshed.
    async fn add_student_with_parent(
        &self,
        school_id: Uuid,
        student: &SchoolStudentRequest,
        created_by: &str,
    ) -> Result<Uuid, StoreError>;

    /// Replace a student's fields and those of its guardian.
    async fn update_student_with_parent(
        &self,
        school_id: Uuid,
        student_id: Uuid,
        student: &SchoolStudentRequest,
    ) -> Result<(), StoreError>;

    /// Remove a student, and its guardian when no sibling remains.
    async fn delete_student_with_parent(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), StoreError>;
}
