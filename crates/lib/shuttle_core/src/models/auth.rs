//! Authentication domain models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject — user ID (standard JWT `sub` claim).
    pub sub: String,
    /// Login name of the user, recorded as `created_by` on new records.
    pub username: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

impl TokenClaims {
    /// The subject parsed as a user id, if it is a UUID.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Role a user holds within a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolRole {
    /// Administers one school; may manage its students.
    SchoolAdmin,
    Driver,
    Parent,
}

impl SchoolRole {
    pub fn as_str(self) -> &'static str {
        match self {
            SchoolRole::SchoolAdmin => "school_admin",
            SchoolRole::Driver => "driver",
            SchoolRole::Parent => "parent",
        }
    }

    /// Whether this role grants access to the school's student roster.
    pub fn manages_students(self) -> bool {
        matches!(self, SchoolRole::SchoolAdmin)
    }
}
