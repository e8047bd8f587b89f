//! PostgreSQL-backed [`SchoolStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{SchoolStore, StoreError};
use crate::models::auth::SchoolRole;
use crate::models::student::{Parent, SchoolStudentRequest, StudentWithParent};
use crate::uuid::uuidv7;

/// Student joined with its guardian, as selected by the list query.
#[derive(Debug, sqlx::FromRow)]
struct StudentParentRow {
    id: Uuid,
    school_id: Uuid,
    first_name: String,
    last_name: String,
    gender: String,
    grade: String,
    address: String,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    parent_id: Uuid,
    parent_school_id: Uuid,
    parent_first_name: String,
    parent_last_name: String,
    parent_email: String,
    parent_phone: String,
    parent_address: String,
    parent_created_by: String,
    parent_created_at: DateTime<Utc>,
    parent_updated_at: DateTime<Utc>,
}

impl From<StudentParentRow> for StudentWithParent {
    fn from(r: StudentParentRow) -> Self {
        StudentWithParent {
            id: r.id,
            school_id: r.school_id,
            first_name: r.first_name,
            last_name: r.last_name,
            gender: r.gender,
            grade: r.grade,
            address: r.address,
            created_by: r.created_by,
            created_at: r.created_at,
            updated_at: r.updated_at,
            parent: Parent {
                id: r.parent_id,
                school_id: r.parent_school_id,
                first_name: r.parent_first_name,
                last_name: r.parent_last_name,
                email: r.parent_email,
                phone: r.parent_phone,
                address: r.parent_address,
                created_by: r.parent_created_by,
                created_at: r.parent_created_at,
                updated_at: r.parent_updated_at,
            },
        }
    }
}

/// [`SchoolStore`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgSchoolStore {
    pool: PgPool,
}

impl PgSchoolStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SchoolStore for PgSchoolStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn permitted_school(&self, user_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let school_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT u.school_id FROM users u \
             JOIN schools s ON s.id = u.school_id \
             WHERE u.id = $1 AND u.role = $2",
        )
        .bind(user_id)
        .bind(SchoolRole::SchoolAdmin.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(school_id)
    }

    async fn list_students_with_parents(
        &self,
        school_id: Uuid,
    ) -> Result<Vec<StudentWithParent>, StoreError> {
        let rows = sqlx::query_as::<_, StudentParentRow>(
            "SELECT s.id, s.school_id, s.first_name, s.last_name, s.gender, s.grade, \
                    s.address, s.created_by, s.created_at, s.updated_at, \
                    p.id AS parent_id, p.school_id AS parent_school_id, \
                    p.first_name AS parent_first_name, \
                    p.last_name AS parent_last_name, p.email AS parent_email, \
                    p.phone AS parent_phone, p.address AS parent_address, \
                    p.created_by AS parent_created_by, \
                    p.created_at AS parent_created_at, p.updated_at AS parent_updated_at \
             FROM students s \
             JOIN parents p ON p.id = s.parent_id \
             WHERE s.school_id = $1 \
             ORDER BY s.last_name, s.first_name, s.id",
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(StudentWithParent::from).collect())
    }

    async fn add_student_with_parent(
        &self,
        school_id: Uuid,
        student: &SchoolStudentRequest,
        created_by: &str,
    ) -> Result<Uuid, StoreError> {
        let now = Utc::now();
        let parent = &student.parent;
        let mut tx = self.pool.begin().await?;

        let parent_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO parents \
                (id, school_id, first_name, last_name, email, phone, address, created_by, \
                 created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) \
             ON CONFLICT (school_id, email) DO UPDATE SET \
                first_name = EXCLUDED.first_name, \
                last_name = EXCLUDED.last_name, \
                phone = EXCLUDED.phone, \
                address = EXCLUDED.address, \
                updated_at = EXCLUDED.updated_at \
             RETURNING id",
        )
        .bind(uuidv7())
        .bind(school_id)
        .bind(&parent.first_name)
        .bind(&parent.last_name)
        .bind(&parent.email)
        .bind(&parent.phone)
        .bind(&parent.address)
        .bind(created_by)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let student_id = uuidv7();
        sqlx::query(
            "INSERT INTO students \
                (id, school_id, parent_id, first_name, last_name, gender, grade, address, \
                 created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)",
        )
        .bind(student_id)
        .bind(school_id)
        .bind(parent_id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.gender)
        .bind(&student.grade)
        .bind(&student.address)
        .bind(created_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(%school_id, %student_id, %parent_id, "student inserted");
        Ok(student_id)
    }

    async fn update_student_with_parent(
        &self,
        school_id: Uuid,
        student_id: Uuid,
        student: &SchoolStudentRequest,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let parent = &student.parent;
        let mut tx = self.pool.begin().await?;

        let parent_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT parent_id FROM students WHERE id = $1 AND school_id = $2 FOR UPDATE",
        )
        .bind(student_id)
        .bind(school_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("student {student_id}")))?;

        sqlx::query(
            "UPDATE parents SET first_name = $1, last_name = $2, email = $3, phone = $4, \
                address = $5, updated_at = $6 \
             WHERE id = $7 AND school_id = $8",
        )
        .bind(&parent.first_name)
        .bind(&parent.last_name)
        .bind(&parent.email)
        .bind(&parent.phone)
        .bind(&parent.address)
        .bind(now)
        .bind(parent_id)
        .bind(school_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE students SET first_name = $1, last_name = $2, gender = $3, grade = $4, \
                address = $5, updated_at = $6 \
             WHERE id = $7 AND school_id = $8",
        )
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.gender)
        .bind(&student.grade)
        .bind(&student.address)
        .bind(now)
        .bind(student_id)
        .bind(school_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_student_with_parent(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let parent_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM students WHERE id = $1 AND school_id = $2 RETURNING parent_id",
        )
        .bind(student_id)
        .bind(school_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("student {student_id}")))?;

        // Serializes sibling deletes so the last one sees no remaining students.
        sqlx::query("SELECT id FROM parents WHERE id = $1 FOR UPDATE")
            .bind(parent_id)
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query(
            "DELETE FROM parents p WHERE p.id = $1 \
             AND NOT EXISTS (SELECT 1 FROM students s WHERE s.parent_id = p.id)",
        )
        .bind(parent_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        debug!(%school_id, %student_id, parent_removed = removed > 0, "student deleted");
        Ok(())
    }
}
