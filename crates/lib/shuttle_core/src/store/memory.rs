//! In-process [`SchoolStore`].
//!
//! Mirrors the PostgreSQL store's semantics without a database. Used by
//! tests and by `shuttle_api_server serve --in-memory`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{SchoolStore, StoreError};
use crate::models::auth::SchoolRole;
use crate::models::student::{Parent, SchoolStudentRequest, StudentWithParent};
use crate::uuid::uuidv7;

#[derive(Debug, Clone)]
struct UserEntry {
    role: SchoolRole,
    school_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
struct StudentEntry {
    school_id: Uuid,
    parent_id: Uuid,
    first_name: String,
    last_name: String,
    gender: String,
    grade: String,
    address: String,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    schools: HashMap<Uuid, String>,
    users: HashMap<Uuid, UserEntry>,
    usernames: HashMap<String, Uuid>,
    parents: HashMap<Uuid, Parent>,
    students: HashMap<Uuid, StudentEntry>,
}

impl State {
    fn parent_by_email(&self, school_id: Uuid, email: &str) -> Option<Uuid> {
        self.parents
            .iter()
            .find(|(_, p)| p.school_id == school_id && p.email == email)
            .map(|(id, _)| *id)
    }
}

/// [`SchoolStore`] holding everything in memory behind a lock.
#[derive(Debug, Default)]
pub struct MemorySchoolStore {
    state: RwLock<State>,
}

impl MemorySchoolStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a school, returning its id.
    pub async fn add_school(&self, name: &str) -> Uuid {
        let id = uuidv7();
        self.state.write().await.schools.insert(id, name.to_string());
        id
    }

    /// Register a user, returning its id. Usernames are unique.
    pub async fn add_user(
        &self,
        username: &str,
        role: SchoolRole,
        school_id: Option<Uuid>,
    ) -> Result<Uuid, StoreError> {
        let mut state = self.state.write().await;
        if state.usernames.contains_key(username) {
            return Err(StoreError::Conflict(format!("username {username} taken")));
        }
        if let Some(school) = school_id
            && !state.schools.contains_key(&school)
        {
            return Err(StoreError::NotFound(format!("school {school}")));
        }
        let id = uuidv7();
        state.users.insert(id, UserEntry { role, school_id });
        state.usernames.insert(username.to_string(), id);
        Ok(id)
    }
}

#[async_trait]
impl SchoolStore for MemorySchoolStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn permitted_school(&self, user_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(&user_id)
            .filter(|u| u.role.manages_students())
            .and_then(|u| u.school_id)
            .filter(|school| state.schools.contains_key(school)))
    }

    async fn list_students_with_parents(
        &self,
        school_id: Uuid,
    ) -> Result<Vec<StudentWithParent>, StoreError> {
        let state = self.state.read().await;
        let mut out = Vec::new();
        for (id, s) in state.students.iter().filter(|(_, s)| s.school_id == school_id) {
            let parent = state
                .parents
                .get(&s.parent_id)
                .ok_or_else(|| StoreError::Internal(format!("student {id} has no parent")))?;
            out.push(StudentWithParent {
                id: *id,
                school_id: s.school_id,
                first_name: s.first_name.clone(),
                last_name: s.last_name.clone(),
                gender: s.gender.clone(),
                grade: s.grade.clone(),
                address: s.address.clone(),
                created_by: s.created_by.clone(),
                created_at: s.created_at,
                updated_at: s.updated_at,
                parent: parent.clone(),
            });
        }
        out.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(out)
    }

    async fn add_student_with_parent(
        &self,
        school_id: Uuid,
        student: &SchoolStudentRequest,
        created_by: &str,
    ) -> Result<Uuid, StoreError> {
        let now = Utc::now();
        let req = &student.parent;
        let mut state = self.state.write().await;

        let parent_id = match state.parent_by_email(school_id, &req.email) {
            Some(id) => {
                if let Some(parent) = state.parents.get_mut(&id) {
                    parent.first_name = req.first_name.clone();
                    parent.last_name = req.last_name.clone();
                    parent.phone = req.phone.clone();
                    parent.address = req.address.clone();
                    parent.updated_at = now;
                }
                id
            }
            None => {
                let id = uuidv7();
                state.parents.insert(
                    id,
                    Parent {
                        id,
                        school_id,
                        first_name: req.first_name.clone(),
                        last_name: req.last_name.clone(),
                        email: req.email.clone(),
                        phone: req.phone.clone(),
                        address: req.address.clone(),
                        created_by: created_by.to_string(),
                        created_at: now,
                        updated_at: now,
                    },
                );
                id
            }
        };

        let student_id = uuidv7();
        state.students.insert(
            student_id,
            StudentEntry {
                school_id,
                parent_id,
                first_name: student.first_name.clone(),
                last_name: student.last_name.clone(),
                gender: student.gender.clone(),
                grade: student.grade.clone(),
                address: student.address.clone(),
                created_by: created_by.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(student_id)
    }

    async fn update_student_with_parent(
        &self,
        school_id: Uuid,
        student_id: Uuid,
        student: &SchoolStudentRequest,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let req = &student.parent;
        let mut state = self.state.write().await;

        let parent_id = state
            .students
            .get(&student_id)
            .filter(|s| s.school_id == school_id)
            .map(|s| s.parent_id)
            .ok_or_else(|| StoreError::NotFound(format!("student {student_id}")))?;

        if let Some(other) = state.parent_by_email(school_id, &req.email)
            && other != parent_id
        {
            return Err(StoreError::Conflict("parent email already in use".into()));
        }

        let parent = state
            .parents
            .get_mut(&parent_id)
            .ok_or_else(|| StoreError::Internal(format!("student {student_id} has no parent")))?;
        parent.first_name = req.first_name.clone();
        parent.last_name = req.last_name.clone();
        parent.email = req.email.clone();
        parent.phone = req.phone.clone();
        parent.address = req.address.clone();
        parent.updated_at = now;

        if let Some(entry) = state.students.get_mut(&student_id) {
            entry.first_name = student.first_name.clone();
            entry.last_name = student.last_name.clone();
            entry.gender = student.gender.clone();
            entry.grade = student.grade.clone();
            entry.address = student.address.clone();
            entry.updated_at = now;
        }
        Ok(())
    }

    async fn delete_student_with_parent(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        let in_scope = state
            .students
            .get(&student_id)
            .is_some_and(|s| s.school_id == school_id);
        if !in_scope {
            return Err(StoreError::NotFound(format!("student {student_id}")));
        }
        let Some(removed) = state.students.remove(&student_id) else {
            return Err(StoreError::NotFound(format!("student {student_id}")));
        };

        let orphaned = !state
            .students
            .values()
            .any(|s| s.parent_id == removed.parent_id);
        if orphaned {
            state.parents.remove(&removed.parent_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student::ParentRequest;

    fn request(first: &str, parent_email: &str) -> SchoolStudentRequest {
        SchoolStudentRequest {
            first_name: first.into(),
            last_name: "Finn".into(),
            gender: "male".into(),
            grade: "5".into(),
            address: "3 Main St".into(),
            parent: ParentRequest {
                first_name: "Pap".into(),
                last_name: "Finn".into(),
                email: parent_email.into(),
                phone: "5550001111".into(),
                address: "3 Main St".into(),
            },
        }
    }

    async fn store_with_admin() -> (MemorySchoolStore, Uuid, Uuid) {
        let store = MemorySchoolStore::new();
        let school = store.add_school("Hillside").await;
        let admin = store
            .add_user("admin", SchoolRole::SchoolAdmin, Some(school))
            .await
            .unwrap();
        (store, school, admin)
    }

    #[tokio::test]
    async fn only_school_admins_are_permitted() {
        let (store, school, admin) = store_with_admin().await;
        let driver = store
            .add_user("driver", SchoolRole::Driver, Some(school))
            .await
            .unwrap();
        let orphan = store
            .add_user("orphan", SchoolRole::SchoolAdmin, None)
            .await
            .unwrap();

        assert_eq!(store.permitted_school(admin).await.unwrap(), Some(school));
        assert_eq!(store.permitted_school(driver).await.unwrap(), None);
        assert_eq!(store.permitted_school(orphan).await.unwrap(), None);
        assert_eq!(store.permitted_school(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let (store, school, _) = store_with_admin().await;
        let err = store
            .add_user("admin", SchoolRole::Parent, Some(school))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn siblings_share_a_parent() {
        let (store, school, _) = store_with_admin().await;
        store
            .add_student_with_parent(school, &request("Huck", "pap@example.com"), "admin")
            .await
            .unwrap();
        store
            .add_student_with_parent(school, &request("Mary", "pap@example.com"), "admin")
            .await
            .unwrap();

        let list = store.list_students_with_parents(school).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].first_name, "Huck");
        assert_eq!(list[1].first_name, "Mary");
        assert_eq!(list[0].parent.id, list[1].parent.id);
        assert_eq!(list[0].created_by, "admin");
    }

    #[tokio::test]
    async fn parent_records_school_and_first_creator() {
        let (store, school, _) = store_with_admin().await;
        store
            .add_student_with_parent(school, &request("Huck", "pap@example.com"), "admin")
            .await
            .unwrap();
        store
            .add_student_with_parent(school, &request("Mary", "pap@example.com"), "deputy")
            .await
            .unwrap();

        let list = store.list_students_with_parents(school).await.unwrap();
        let mary = list.iter().find(|s| s.first_name == "Mary").unwrap();
        assert_eq!(mary.created_by, "deputy");
        assert_eq!(mary.parent.school_id, school);
        assert_eq!(mary.parent.created_by, "admin");
    }

    #[tokio::test]
    async fn other_schools_are_invisible() {
        let (store, school, _) = store_with_admin().await;
        let other = store.add_school("Riverside").await;
        let id = store
            .add_student_with_parent(school, &request("Huck", "pap@example.com"), "admin")
            .await
            .unwrap();

        assert!(store.list_students_with_parents(other).await.unwrap().is_empty());
        let err = store
            .update_student_with_parent(other, id, &request("Tom", "pap@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        let err = store.delete_student_with_parent(other, id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.list_students_with_parents(school).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_rejects_email_of_another_parent() {
        let (store, school, _) = store_with_admin().await;
        store
            .add_student_with_parent(school, &request("Huck", "pap@example.com"), "admin")
            .await
            .unwrap();
        let tom = store
            .add_student_with_parent(school, &request("Tom", "polly@example.com"), "admin")
            .await
            .unwrap();

        let err = store
            .update_student_with_parent(school, tom, &request("Tom", "pap@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        store
            .update_student_with_parent(school, tom, &request("Thomas", "polly@example.com"))
            .await
            .unwrap();
        let list = store.list_students_with_parents(school).await.unwrap();
        assert!(list.iter().any(|s| s.first_name == "Thomas"));
    }

    #[tokio::test]
    async fn delete_keeps_parent_while_a_sibling_remains() {
        let (store, school, _) = store_with_admin().await;
        let huck = store
            .add_student_with_parent(school, &request("Huck", "pap@example.com"), "admin")
            .await
            .unwrap();
        let mary = store
            .add_student_with_parent(school, &request("Mary", "pap@example.com"), "admin")
            .await
            .unwrap();

        store.delete_student_with_parent(school, huck).await.unwrap();
        assert_eq!(store.state.read().await.parents.len(), 1);

        store.delete_student_with_parent(school, mary).await.unwrap();
        assert!(store.state.read().await.parents.is_empty());
        assert!(store.list_students_with_parents(school).await.unwrap().is_empty());
    }
}
