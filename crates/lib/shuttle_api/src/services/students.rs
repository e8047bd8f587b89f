//! Student roster service — every operation is confined to the caller's
//! [`SchoolScope`].

use shuttle_core::models::student::{SchoolStudentRequest, StudentWithParent};
use shuttle_core::store::{SchoolStore, StoreError};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::permissions::SchoolScope;

/// Map a store failure to the API error for operation `failure`.
///
/// Database and internal errors surface as `failure` with the detail
/// logged; the rest keep their specific status.
fn store_error(failure: &'static str) -> impl Fn(StoreError) -> AppError {
    move |e| match e {
        StoreError::NotFound(_) => AppError::NotFound("Student not found".into()),
        StoreError::Conflict(_) => {
            AppError::Conflict("Parent email already belongs to another guardian".into())
        }
        StoreError::Unavailable(m) => AppError::DbUnavailable(m),
        StoreError::DbError(e) => AppError::internal(failure, e),
        StoreError::Internal(m) => AppError::internal(failure, m),
    }
}

/// Parse a path `{id}` into a student id.
pub fn parse_student_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::Validation("Invalid student id".into()))
}

/// All students of the caller's school with their guardians.
pub async fn list_students(
    store: &dyn SchoolStore,
    scope: &SchoolScope,
) -> AppResult<Vec<StudentWithParent>> {
    store
        .list_students_with_parents(scope.school_id)
        .await
        .map_err(store_error("Failed to retrieve students"))
}

/// Create a student and guardian; `created_by` is the caller's username.
///
/// `student` is expected in normalized form, as produced by
/// [`ValidatedJson`](crate::extract::ValidatedJson).
pub async fn add_student(
    store: &dyn SchoolStore,
    scope: &SchoolScope,
    student: SchoolStudentRequest,
) -> AppResult<Uuid> {
    let id = store
        .add_student_with_parent(scope.school_id, &student, &scope.username)
        .await
        .map_err(store_error("Failed to create student"))?;
    info!(school_id = %scope.school_id, student_id = %id, by = %scope.username, "student created");
    Ok(id)
}

/// Replace a student's and its guardian's details.
pub async fn update_student(
    store: &dyn SchoolStore,
    scope: &SchoolScope,
    student_id: Uuid,
    student: SchoolStudentRequest,
) -> AppResult<()> {
    store
        .update_student_with_parent(scope.school_id, student_id, &student)
        .await
        .map_err(store_error("Failed to update student"))?;
    info!(school_id = %scope.school_id, %student_id, by = %scope.username, "student updated");
    Ok(())
}

/// Delete a student, and its guardian when no sibling remains.
pub async fn delete_student(
    store: &dyn SchoolStore,
    scope: &SchoolScope,
    student_id: Uuid,
) -> AppResult<()> {
    store
        .delete_student_with_parent(scope.school_id, student_id)
        .await
        .map_err(store_error("Failed to delete student"))?;
    info!(school_id = %scope.school_id, %student_id, by = %scope.username, "student deleted");
    Ok(())
}
