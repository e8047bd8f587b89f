//! School permission checks.

use shuttle_core::models::auth::TokenClaims;
use shuttle_core::store::SchoolStore;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Message returned whenever a caller has no permitted school.
pub const FORBIDDEN_MESSAGE: &str = "You don't have permission to access this resource";

/// The school an authenticated caller may act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolScope {
    pub school_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
}

/// Resolve token claims to the caller's single permitted school.
pub async fn check_permitted_school_access(
    store: &dyn SchoolStore,
    claims: &TokenClaims,
) -> AppResult<SchoolScope> {
    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;

    let school_id = store
        .permitted_school(user_id)
        .await
        .map_err(|e| {
            warn!(%user_id, error = %e, "permission lookup failed");
            AppError::from(e)
        })?
        .ok_or_else(|| {
            debug!(%user_id, "user has no permitted school");
            AppError::Forbidden(FORBIDDEN_MESSAGE.into())
        })?;

    Ok(SchoolScope {
        school_id,
        user_id,
        username: claims.username.clone(),
    })
}
