//! Student and guardian models.
//!
//! Request types carry `validator` rules; records are what the stores return.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::validation::RequestBody;

/// Accepted values for `gender`.
pub const GENDERS: &[&str] = &["male", "female"];

/// Body of `POST /api/school/students` and `PUT /api/school/students/{id}`.
///
/// Missing fields deserialize to empty strings so they surface as
/// `"<field> is required"` instead of a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SchoolStudentRequest {
    #[validate(custom(function = "non_blank"))]
    pub first_name: String,

    #[validate(custom(function = "non_blank"))]
    pub last_name: String,

    #[validate(custom(function = "known_gender"))]
    pub gender: String,

    #[validate(custom(function = "non_blank"))]
    pub grade: String,

    #[validate(custom(function = "non_blank"))]
    pub address: String,

    #[validate(nested)]
    pub parent: ParentRequest,
}

/// Guardian details embedded in [`SchoolStudentRequest`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ParentRequest {
    #[validate(custom(function = "non_blank"))]
    pub first_name: String,

    #[validate(custom(function = "non_blank"))]
    pub last_name: String,

    #[validate(custom(function = "non_blank"), email)]
    pub email: String,

    #[validate(custom(function = "non_blank"), length(min = 8, max = 15))]
    pub phone: String,

    #[validate(custom(function = "non_blank"))]
    pub address: String,
}

impl RequestBody for SchoolStudentRequest {
    const FIELD_ORDER: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "gender",
        "grade",
        "address",
        "parent.first_name",
        "parent.last_name",
        "parent.email",
        "parent.phone",
        "parent.address",
    ];

    /// Trim every field; lowercase `gender` and the parent e-mail.
    fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            gender: self.gender.trim().to_lowercase(),
            grade: self.grade.trim().to_string(),
            address: self.address.trim().to_string(),
            parent: ParentRequest {
                first_name: self.parent.first_name.trim().to_string(),
                last_name: self.parent.last_name.trim().to_string(),
                email: self.parent.email.trim().to_lowercase(),
                phone: self.parent.phone.trim().to_string(),
                address: self.parent.address.trim().to_string(),
            },
        }
    }
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn known_gender(value: &str) -> Result<(), ValidationError> {
    non_blank(value)?;
    if GENDERS.iter().any(|g| g.eq_ignore_ascii_case(value.trim())) {
        return Ok(());
    }
    Err(ValidationError::new("oneof"))
}

/// Stored guardian record.
///
/// `created_by` is the username that first registered the guardian; reuse by
/// a sibling does not change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub id: Uuid,
    pub school_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored student record with its guardian embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentWithParent {
    pub id: Uuid,
    pub school_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub grade: String,
    pub address: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub parent: Parent,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SchoolStudentRequest {
        SchoolStudentRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            gender: "female".into(),
            grade: "4".into(),
            address: "12 Analytical Way".into(),
            parent: ParentRequest {
                first_name: "Anne".into(),
                last_name: "Byron".into(),
                email: "anne@example.com".into(),
                phone: "0812345678".into(),
                address: "12 Analytical Way".into(),
            },
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn gender_is_case_insensitive() {
        let mut req = valid_request();
        req.gender = "Male".into();
        assert!(req.validate().is_ok());
        assert_eq!(req.normalized().gender, "male");
    }

    #[test]
    fn unknown_gender_fails() {
        let mut req = valid_request();
        req.gender = "robot".into();
        let errs = req.validate().unwrap_err();
        let field = &errs.field_errors()["gender"];
        assert_eq!(field[0].code, "oneof");
    }

    #[test]
    fn missing_fields_deserialize_blank() {
        let req: SchoolStudentRequest = serde_json::from_str("{}").unwrap();
        assert!(req.first_name.is_empty());
        assert!(req.parent.email.is_empty());
        assert!(req.validate().is_err());
    }

    #[test]
    fn normalized_trims_and_lowercases_email() {
        let mut req = valid_request();
        req.first_name = "  Ada ".into();
        req.parent.email = " Anne@Example.COM ".into();
        let req = req.normalized();
        assert_eq!(req.first_name, "Ada");
        assert_eq!(req.parent.email, "anne@example.com");
    }
}
