//! School student request handlers.
//!
//! Routes are mounted behind `require_auth` and `require_school_scope`, so
//! every handler receives the caller's [`SchoolScope`].

use axum::Extension;
use axum::extract::{Path, State};
use serde::Serialize;
use shuttle_core::models::student::{SchoolStudentRequest, StudentWithParent};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ValidatedJson;
use crate::response::ApiResponse;
use crate::services::permissions::SchoolScope;
use crate::services::students;

/// `data` of a successful create.
#[derive(Debug, Serialize)]
pub struct CreatedStudent {
    pub id: Uuid,
}

/// `GET /api/school/students` — list the school's students with parents.
pub async fn list_students_handler(
    State(state): State<AppState>,
    Extension(scope): Extension<SchoolScope>,
) -> AppResult<ApiResponse<Vec<StudentWithParent>>> {
    let list = students::list_students(state.store.as_ref(), &scope).await?;
    Ok(ApiResponse::success(list, "Students retrieved successfully"))
}

/// `POST /api/school/students` — add a student with its parent.
pub async fn create_student_handler(
    State(state): State<AppState>,
    Extension(scope): Extension<SchoolScope>,
    ValidatedJson(body): ValidatedJson<SchoolStudentRequest>,
) -> AppResult<ApiResponse<CreatedStudent>> {
    let id = students::add_student(state.store.as_ref(), &scope, body).await?;
    Ok(ApiResponse::success(
        CreatedStudent { id },
        "Student created successfully",
    ))
}

/// `PUT /api/school/students/{id}` — replace a student and its parent.
pub async fn update_student_handler(
    State(state): State<AppState>,
    Extension(scope): Extension<SchoolScope>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<SchoolStudentRequest>,
) -> AppResult<ApiResponse<()>> {
    let student_id = students::parse_student_id(&id)?;
    students::update_student(state.store.as_ref(), &scope, student_id, body).await?;
    Ok(ApiResponse::ok("Student updated successfully"))
}

/// `DELETE /api/school/students/{id}` — remove a student.
pub async fn delete_student_handler(
    State(state): State<AppState>,
    Extension(scope): Extension<SchoolScope>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let student_id = students::parse_student_id(&id)?;
    students::delete_student(state.store.as_ref(), &scope, student_id).await?;
    Ok(ApiResponse::ok("Student deleted successfully"))
}
